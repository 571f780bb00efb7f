//! Canonical in-process prediction messages
//!
//! Field names and encodings follow the proto3 JSON mapping of
//! `src/proto/prediction.proto`: camelCase keys, default values omitted,
//! bytes as base64 and enums by name. Unknown keys are ignored when parsing
//! so newer nodes can add fields without breaking older engines.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reasons a JSON message is rejected
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Invalid base64 in binData: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Only one of {0} may be set")]
    ConflictingOneof(&'static str),
}

/// A prediction request or response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SeldonMessageWire", into = "SeldonMessageWire")]
pub struct SeldonMessage {
    pub status: Option<Status>,
    pub meta: Option<Meta>,
    pub data: Option<MessageData>,
}

/// JSON shape of [`SeldonMessage`]: each oneof member is its own optional
/// field, accepted under both its JSON and proto name
#[derive(Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeldonMessageWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<DefaultData>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "bin_data")]
    bin_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "str_data")]
    str_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "json_data")]
    json_data: Option<Value>,
}

impl TryFrom<SeldonMessageWire> for SeldonMessage {
    type Error = MessageError;

    fn try_from(wire: SeldonMessageWire) -> Result<Self, Self::Error> {
        let mut members = Vec::with_capacity(1);
        if let Some(data) = wire.data {
            members.push(MessageData::Data(data));
        }
        if let Some(encoded) = wire.bin_data {
            members.push(MessageData::BinData(STANDARD.decode(encoded.as_bytes())?));
        }
        if let Some(s) = wire.str_data {
            members.push(MessageData::StrData(s));
        }
        if let Some(value) = wire.json_data {
            members.push(MessageData::JsonData(value));
        }
        if members.len() > 1 {
            return Err(MessageError::ConflictingOneof(
                "data, binData, strData, jsonData",
            ));
        }

        Ok(Self {
            status: wire.status,
            meta: wire.meta,
            data: members.pop(),
        })
    }
}

impl From<SeldonMessage> for SeldonMessageWire {
    fn from(msg: SeldonMessage) -> Self {
        let mut wire = Self {
            status: msg.status,
            meta: msg.meta,
            ..Default::default()
        };
        match msg.data {
            Some(MessageData::Data(data)) => wire.data = Some(data),
            Some(MessageData::BinData(bytes)) => wire.bin_data = Some(STANDARD.encode(bytes)),
            Some(MessageData::StrData(s)) => wire.str_data = Some(s),
            Some(MessageData::JsonData(value)) => wire.json_data = Some(value),
            None => {}
        }
        wire
    }
}

impl SeldonMessage {
    pub fn with_data(data: MessageData) -> Self {
        Self {
            data: Some(data),
            ..Default::default()
        }
    }

    pub fn tensor(names: Vec<String>, shape: Vec<i32>, values: Vec<f64>) -> Self {
        Self::with_data(MessageData::Data(DefaultData {
            names,
            payload: Some(TensorData::Tensor(Tensor { shape, values })),
        }))
    }

    pub fn ndarray(names: Vec<String>, rows: Vec<Value>) -> Self {
        Self::with_data(MessageData::Data(DefaultData {
            names,
            payload: Some(TensorData::Ndarray(rows)),
        }))
    }

    pub fn str_data(s: impl Into<String>) -> Self {
        Self::with_data(MessageData::StrData(s.into()))
    }

    pub fn bin_data(bytes: impl Into<Vec<u8>>) -> Self {
        Self::with_data(MessageData::BinData(bytes.into()))
    }

    pub fn json_data(value: Value) -> Self {
        Self::with_data(MessageData::JsonData(value))
    }

    /// True when the payload uses the built-in `data` representation rather
    /// than one of the custom `binData`, `strData` or `jsonData` forms
    pub fn has_default_shape(&self) -> bool {
        matches!(self.data, Some(MessageData::Data(_)))
    }

    pub fn puid(&self) -> Option<&str> {
        self.meta
            .as_ref()
            .map(|meta| meta.puid.as_str())
            .filter(|puid| !puid.is_empty())
    }
}

/// The `data_oneof` of a message
#[derive(Debug, Clone, PartialEq)]
pub enum MessageData {
    Data(DefaultData),
    BinData(Vec<u8>),
    StrData(String),
    JsonData(Value),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DefaultDataWire", into = "DefaultDataWire")]
pub struct DefaultData {
    pub names: Vec<String>,
    pub payload: Option<TensorData>,
}

#[derive(Default, Serialize, Deserialize)]
struct DefaultDataWire {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tensor: Option<Tensor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ndarray: Option<Vec<Value>>,
}

impl TryFrom<DefaultDataWire> for DefaultData {
    type Error = MessageError;

    fn try_from(wire: DefaultDataWire) -> Result<Self, Self::Error> {
        let payload = match (wire.tensor, wire.ndarray) {
            (Some(_), Some(_)) => return Err(MessageError::ConflictingOneof("tensor, ndarray")),
            (Some(tensor), None) => Some(TensorData::Tensor(tensor)),
            (None, Some(rows)) => Some(TensorData::Ndarray(rows)),
            (None, None) => None,
        };
        Ok(Self {
            names: wire.names,
            payload,
        })
    }
}

impl From<DefaultData> for DefaultDataWire {
    fn from(data: DefaultData) -> Self {
        let mut wire = Self {
            names: data.names,
            ..Default::default()
        };
        match data.payload {
            Some(TensorData::Tensor(tensor)) => wire.tensor = Some(tensor),
            Some(TensorData::Ndarray(rows)) => wire.ndarray = Some(rows),
            None => {}
        }
        wire
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    Tensor(Tensor),
    Ndarray(Vec<Value>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shape: Vec<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub puid: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub routing: HashMap<String, i32>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty", alias = "request_path")]
    pub request_path: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(rename = "type", default, skip_serializing_if = "is_default")]
    pub metric_type: MetricType,
    #[serde(default, skip_serializing_if = "is_default")]
    pub value: f32,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricType {
    Gauge,
    Timer,
    // Unrecognised names decode as the proto default
    #[default]
    #[serde(other)]
    Counter,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default, skip_serializing_if = "is_default")]
    pub code: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub info: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    #[serde(default, skip_serializing_if = "is_default")]
    pub status: StatusFlag,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusFlag {
    Failure,
    #[default]
    #[serde(other)]
    Success,
}

/// Ordered outputs handed to a combiner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeldonMessageList {
    #[serde(default, alias = "seldon_messages")]
    pub seldon_messages: Vec<SeldonMessage>,
}

impl SeldonMessageList {
    pub fn new(seldon_messages: Vec<SeldonMessage>) -> Self {
        Self { seldon_messages }
    }
}

/// A reward signal for an earlier request/response pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<SeldonMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<SeldonMessage>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub reward: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truth: Option<SeldonMessage>,
}

// proto3 JSON leaves scalar fields at their default out of the output
fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}
