use std::{fmt, time::Duration};

use async_trait::async_trait;
use tokio::time::timeout;
use tonic::{transport::Channel, Request};
use tracing::{debug, warn};

use super::proto::{
    self, combiner_client::CombinerClient, generic_client::GenericClient,
    model_client::ModelClient, output_transformer_client::OutputTransformerClient,
    router_client::RouterClient, transformer_client::TransformerClient,
};
use crate::{
    config::DispatchPolicy,
    core::Endpoint,
    protocols::{NodePayload, SeldonMessage},
};

pub type GrpcError = Box<dyn std::error::Error + Send + Sync>;

/// One concrete RPC on one role-scoped service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrpcMethod {
    GenericRoute,
    GenericSendFeedback,
    GenericTransformInput,
    GenericTransformOutput,
    GenericAggregate,
    ModelPredict,
    ModelSendFeedback,
    RouterRoute,
    RouterSendFeedback,
    TransformerTransformInput,
    OutputTransformerTransformOutput,
    CombinerAggregate,
}

impl GrpcMethod {
    /// Fully qualified `package.Service/Method` path
    pub fn path(&self) -> &'static str {
        match self {
            GrpcMethod::GenericRoute => "seldon.protos.Generic/Route",
            GrpcMethod::GenericSendFeedback => "seldon.protos.Generic/SendFeedback",
            GrpcMethod::GenericTransformInput => "seldon.protos.Generic/TransformInput",
            GrpcMethod::GenericTransformOutput => "seldon.protos.Generic/TransformOutput",
            GrpcMethod::GenericAggregate => "seldon.protos.Generic/Aggregate",
            GrpcMethod::ModelPredict => "seldon.protos.Model/Predict",
            GrpcMethod::ModelSendFeedback => "seldon.protos.Model/SendFeedback",
            GrpcMethod::RouterRoute => "seldon.protos.Router/Route",
            GrpcMethod::RouterSendFeedback => "seldon.protos.Router/SendFeedback",
            GrpcMethod::TransformerTransformInput => "seldon.protos.Transformer/TransformInput",
            GrpcMethod::OutputTransformerTransformOutput => {
                "seldon.protos.OutputTransformer/TransformOutput"
            }
            GrpcMethod::CombinerAggregate => "seldon.protos.Combiner/Aggregate",
        }
    }
}

impl fmt::Display for GrpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Invokes a single RPC against a node.
///
/// Errors are returned unchanged so the dispatcher can wrap them.
#[async_trait]
pub trait GrpcInvoker: Send + Sync + fmt::Debug {
    async fn invoke(
        &self,
        endpoint: &Endpoint,
        method: GrpcMethod,
        payload: NodePayload<'_>,
    ) -> Result<SeldonMessage, GrpcError>;
}

/// Per-call limits bound to every RPC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrpcCallOptions {
    pub connect_timeout: Duration,
    pub deadline: Duration,
    pub max_message_size: usize,
}

impl From<&DispatchPolicy> for GrpcCallOptions {
    fn from(policy: &DispatchPolicy) -> Self {
        Self {
            connect_timeout: policy.connect_timeout(),
            deadline: policy.grpc_deadline(),
            max_message_size: policy.grpc_max_message_size,
        }
    }
}

/// Build a plaintext channel to `endpoint`.
///
/// The channel connects on first use, so connection setup counts against the
/// call's deadline. Every call gets its own channel; it closes when the last
/// client using it is dropped.
pub fn create_node_channel(
    endpoint: &Endpoint,
    options: &GrpcCallOptions,
) -> Result<Channel, GrpcError> {
    let uri = endpoint.base_url()?.to_string();

    let channel = Channel::from_shared(uri)?
        .connect_timeout(options.connect_timeout)
        .timeout(options.deadline)
        .tcp_nodelay(true)
        .connect_lazy();

    Ok(channel)
}

/// gRPC client for predictive unit microservices
#[derive(Debug, Clone)]
pub struct SeldonNodeClient {
    options: GrpcCallOptions,
}

impl SeldonNodeClient {
    pub fn new(policy: &DispatchPolicy) -> Self {
        Self {
            options: policy.into(),
        }
    }

    pub fn options(&self) -> &GrpcCallOptions {
        &self.options
    }

    fn request<T>(&self, message: T) -> Request<T> {
        let mut request = Request::new(message);
        request.set_timeout(self.options.deadline);
        request
    }

    async fn call(
        &self,
        channel: Channel,
        method: GrpcMethod,
        payload: NodePayload<'_>,
    ) -> Result<proto::SeldonMessage, GrpcError> {
        let max = self.options.max_message_size;

        let response = match (method, payload) {
            (GrpcMethod::GenericRoute, NodePayload::Message(msg)) => {
                generic(channel, max)
                    .route(self.request(proto::SeldonMessage::from(msg)))
                    .await?
            }
            (GrpcMethod::GenericTransformInput, NodePayload::Message(msg)) => {
                generic(channel, max)
                    .transform_input(self.request(proto::SeldonMessage::from(msg)))
                    .await?
            }
            (GrpcMethod::GenericTransformOutput, NodePayload::Message(msg)) => {
                generic(channel, max)
                    .transform_output(self.request(proto::SeldonMessage::from(msg)))
                    .await?
            }
            (GrpcMethod::GenericSendFeedback, NodePayload::Feedback(feedback)) => {
                generic(channel, max)
                    .send_feedback(self.request(proto::Feedback::from(feedback)))
                    .await?
            }
            (GrpcMethod::GenericAggregate, NodePayload::Batch(batch)) => {
                generic(channel, max)
                    .aggregate(self.request(proto::SeldonMessageList::from(batch)))
                    .await?
            }
            (GrpcMethod::ModelPredict, NodePayload::Message(msg)) => {
                model(channel, max)
                    .predict(self.request(proto::SeldonMessage::from(msg)))
                    .await?
            }
            (GrpcMethod::ModelSendFeedback, NodePayload::Feedback(feedback)) => {
                model(channel, max)
                    .send_feedback(self.request(proto::Feedback::from(feedback)))
                    .await?
            }
            (GrpcMethod::RouterRoute, NodePayload::Message(msg)) => {
                router(channel, max)
                    .route(self.request(proto::SeldonMessage::from(msg)))
                    .await?
            }
            (GrpcMethod::RouterSendFeedback, NodePayload::Feedback(feedback)) => {
                router(channel, max)
                    .send_feedback(self.request(proto::Feedback::from(feedback)))
                    .await?
            }
            (GrpcMethod::TransformerTransformInput, NodePayload::Message(msg)) => {
                transformer(channel, max)
                    .transform_input(self.request(proto::SeldonMessage::from(msg)))
                    .await?
            }
            (GrpcMethod::OutputTransformerTransformOutput, NodePayload::Message(msg)) => {
                output_transformer(channel, max)
                    .transform_output(self.request(proto::SeldonMessage::from(msg)))
                    .await?
            }
            (GrpcMethod::CombinerAggregate, NodePayload::Batch(batch)) => {
                combiner(channel, max)
                    .aggregate(self.request(proto::SeldonMessageList::from(batch)))
                    .await?
            }
            (method, payload) => {
                return Err(format!("{} does not accept a {}", method, payload.kind()).into());
            }
        };

        Ok(response.into_inner())
    }
}

#[async_trait]
impl GrpcInvoker for SeldonNodeClient {
    async fn invoke(
        &self,
        endpoint: &Endpoint,
        method: GrpcMethod,
        payload: NodePayload<'_>,
    ) -> Result<SeldonMessage, GrpcError> {
        debug!("Connecting to {} for {}", endpoint, method);
        let channel = create_node_channel(endpoint, &self.options)?;

        let deadline = self.options.deadline;
        let result = match timeout(deadline, self.call(channel, method, payload)).await {
            Ok(result) => result,
            Err(_) => Err(format!("Deadline of {}ms exceeded", deadline.as_millis()).into()),
        };

        match result {
            Ok(reply) => {
                debug!("{} response received from {}", method, endpoint);
                Ok(reply.into())
            }
            Err(e) => {
                warn!("{} failed against {}: {}", method, endpoint, e);
                Err(e)
            }
        }
    }
}

fn generic(channel: Channel, max: usize) -> GenericClient<Channel> {
    GenericClient::new(channel)
        .max_decoding_message_size(max)
        .max_encoding_message_size(max)
}

fn model(channel: Channel, max: usize) -> ModelClient<Channel> {
    ModelClient::new(channel)
        .max_decoding_message_size(max)
        .max_encoding_message_size(max)
}

fn router(channel: Channel, max: usize) -> RouterClient<Channel> {
    RouterClient::new(channel)
        .max_decoding_message_size(max)
        .max_encoding_message_size(max)
}

fn transformer(channel: Channel, max: usize) -> TransformerClient<Channel> {
    TransformerClient::new(channel)
        .max_decoding_message_size(max)
        .max_encoding_message_size(max)
}

fn output_transformer(channel: Channel, max: usize) -> OutputTransformerClient<Channel> {
    OutputTransformerClient::new(channel)
        .max_decoding_message_size(max)
        .max_encoding_message_size(max)
}

fn combiner(channel: Channel, max: usize) -> CombinerClient<Channel> {
    CombinerClient::new(channel)
        .max_decoding_message_size(max)
        .max_encoding_message_size(max)
}
