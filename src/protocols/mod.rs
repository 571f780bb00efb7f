//! Payload types exchanged with graph nodes

pub mod message;

use serde::Serialize;

pub use message::{
    DefaultData, Feedback, MessageData, MessageError, Meta, Metric, MetricType, SeldonMessage,
    SeldonMessageList, Status, StatusFlag, Tensor, TensorData,
};

/// Borrowed request body for one node call.
///
/// Serializes as the bare inner message so the REST adapter can post it
/// directly; the gRPC adapter converts it to the matching protobuf type.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum NodePayload<'a> {
    Message(&'a SeldonMessage),
    Feedback(&'a Feedback),
    Batch(&'a SeldonMessageList),
}

impl NodePayload<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            NodePayload::Message(_) => "SeldonMessage",
            NodePayload::Feedback(_) => "Feedback",
            NodePayload::Batch(_) => "SeldonMessageList",
        }
    }
}
