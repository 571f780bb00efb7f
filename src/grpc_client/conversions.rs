//! Conversions between the canonical messages and the generated protobuf types

use prost_types::{value::Kind, ListValue, Struct};
use serde_json::{Map, Number, Value};

use super::proto;
use crate::protocols::{
    DefaultData, Feedback, MessageData, Meta, Metric, MetricType, SeldonMessage,
    SeldonMessageList, Status, StatusFlag, Tensor, TensorData,
};

pub fn json_to_proto(value: &Value) -> prost_types::Value {
    let kind = match value {
        Value::Null => Kind::NullValue(0),
        Value::Bool(b) => Kind::BoolValue(*b),
        // protobuf only has doubles
        Value::Number(n) => Kind::NumberValue(n.as_f64().unwrap_or_default()),
        Value::String(s) => Kind::StringValue(s.clone()),
        Value::Array(items) => Kind::ListValue(list_to_proto(items)),
        Value::Object(map) => Kind::StructValue(Struct {
            fields: map
                .iter()
                .map(|(k, v)| (k.clone(), json_to_proto(v)))
                .collect(),
        }),
    };
    prost_types::Value { kind: Some(kind) }
}

pub fn proto_to_json(value: prost_types::Value) -> Value {
    match value.kind {
        None | Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::NumberValue(n)) => Number::from_f64(n).map_or(Value::Null, Value::Number),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::ListValue(list)) => Value::Array(list_to_json(list)),
        Some(Kind::StructValue(s)) => Value::Object(
            s.fields
                .into_iter()
                .map(|(k, v)| (k, proto_to_json(v)))
                .collect::<Map<String, Value>>(),
        ),
    }
}

fn list_to_proto(items: &[Value]) -> ListValue {
    ListValue {
        values: items.iter().map(json_to_proto).collect(),
    }
}

fn list_to_json(list: ListValue) -> Vec<Value> {
    list.values.into_iter().map(proto_to_json).collect()
}

impl From<&SeldonMessage> for proto::SeldonMessage {
    fn from(msg: &SeldonMessage) -> Self {
        use proto::seldon_message::DataOneof;

        let data_oneof = msg.data.as_ref().map(|data| match data {
            MessageData::Data(d) => DataOneof::Data(d.into()),
            MessageData::BinData(bytes) => DataOneof::BinData(bytes.clone()),
            MessageData::StrData(s) => DataOneof::StrData(s.clone()),
            MessageData::JsonData(v) => DataOneof::JsonData(json_to_proto(v)),
        });

        Self {
            status: msg.status.as_ref().map(Into::into),
            meta: msg.meta.as_ref().map(Into::into),
            data_oneof,
        }
    }
}

impl From<proto::SeldonMessage> for SeldonMessage {
    fn from(msg: proto::SeldonMessage) -> Self {
        use proto::seldon_message::DataOneof;

        let data = msg.data_oneof.map(|data| match data {
            DataOneof::Data(d) => MessageData::Data(d.into()),
            DataOneof::BinData(bytes) => MessageData::BinData(bytes),
            DataOneof::StrData(s) => MessageData::StrData(s),
            DataOneof::JsonData(v) => MessageData::JsonData(proto_to_json(v)),
        });

        Self {
            status: msg.status.map(Into::into),
            meta: msg.meta.map(Into::into),
            data,
        }
    }
}

impl From<&DefaultData> for proto::DefaultData {
    fn from(data: &DefaultData) -> Self {
        use proto::default_data::DataOneof;

        Self {
            names: data.names.clone(),
            data_oneof: data.payload.as_ref().map(|payload| match payload {
                TensorData::Tensor(t) => DataOneof::Tensor(proto::Tensor {
                    shape: t.shape.clone(),
                    values: t.values.clone(),
                }),
                TensorData::Ndarray(rows) => DataOneof::Ndarray(list_to_proto(rows)),
            }),
        }
    }
}

impl From<proto::DefaultData> for DefaultData {
    fn from(data: proto::DefaultData) -> Self {
        use proto::default_data::DataOneof;

        Self {
            names: data.names,
            payload: data.data_oneof.map(|payload| match payload {
                DataOneof::Tensor(t) => TensorData::Tensor(Tensor {
                    shape: t.shape,
                    values: t.values,
                }),
                DataOneof::Ndarray(list) => TensorData::Ndarray(list_to_json(list)),
            }),
        }
    }
}

impl From<&Meta> for proto::Meta {
    fn from(meta: &Meta) -> Self {
        Self {
            puid: meta.puid.clone(),
            tags: meta
                .tags
                .iter()
                .map(|(k, v)| (k.clone(), json_to_proto(v)))
                .collect(),
            routing: meta.routing.clone(),
            request_path: meta.request_path.clone(),
            metrics: meta.metrics.iter().map(Into::into).collect(),
        }
    }
}

impl From<proto::Meta> for Meta {
    fn from(meta: proto::Meta) -> Self {
        Self {
            puid: meta.puid,
            tags: meta
                .tags
                .into_iter()
                .map(|(k, v)| (k, proto_to_json(v)))
                .collect(),
            routing: meta.routing,
            request_path: meta.request_path,
            metrics: meta.metrics.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&Metric> for proto::Metric {
    fn from(metric: &Metric) -> Self {
        use proto::metric::MetricType as ProtoMetricType;

        let metric_type = match metric.metric_type {
            MetricType::Counter => ProtoMetricType::Counter,
            MetricType::Gauge => ProtoMetricType::Gauge,
            MetricType::Timer => ProtoMetricType::Timer,
        };
        Self {
            key: metric.key.clone(),
            r#type: metric_type as i32,
            value: metric.value,
            tags: metric.tags.clone(),
        }
    }
}

impl From<proto::Metric> for Metric {
    fn from(metric: proto::Metric) -> Self {
        use proto::metric::MetricType as ProtoMetricType;

        let metric_type = match ProtoMetricType::try_from(metric.r#type) {
            Ok(ProtoMetricType::Gauge) => MetricType::Gauge,
            Ok(ProtoMetricType::Timer) => MetricType::Timer,
            Ok(ProtoMetricType::Counter) | Err(_) => MetricType::Counter,
        };
        Self {
            key: metric.key,
            metric_type,
            value: metric.value,
            tags: metric.tags,
        }
    }
}

impl From<&Status> for proto::Status {
    fn from(status: &Status) -> Self {
        use proto::status::StatusFlag as ProtoStatusFlag;

        let flag = match status.status {
            StatusFlag::Success => ProtoStatusFlag::Success,
            StatusFlag::Failure => ProtoStatusFlag::Failure,
        };
        Self {
            code: status.code,
            info: status.info.clone(),
            reason: status.reason.clone(),
            status: flag as i32,
        }
    }
}

impl From<proto::Status> for Status {
    fn from(status: proto::Status) -> Self {
        use proto::status::StatusFlag as ProtoStatusFlag;

        let flag = match ProtoStatusFlag::try_from(status.status) {
            Ok(ProtoStatusFlag::Failure) => StatusFlag::Failure,
            Ok(ProtoStatusFlag::Success) | Err(_) => StatusFlag::Success,
        };
        Self {
            code: status.code,
            info: status.info,
            reason: status.reason,
            status: flag,
        }
    }
}

impl From<&SeldonMessageList> for proto::SeldonMessageList {
    fn from(list: &SeldonMessageList) -> Self {
        Self {
            seldon_messages: list.seldon_messages.iter().map(Into::into).collect(),
        }
    }
}

impl From<proto::SeldonMessageList> for SeldonMessageList {
    fn from(list: proto::SeldonMessageList) -> Self {
        Self {
            seldon_messages: list.seldon_messages.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&Feedback> for proto::Feedback {
    fn from(feedback: &Feedback) -> Self {
        Self {
            request: feedback.request.as_ref().map(Into::into),
            response: feedback.response.as_ref().map(Into::into),
            reward: feedback.reward,
            truth: feedback.truth.as_ref().map(Into::into),
        }
    }
}

impl From<proto::Feedback> for Feedback {
    fn from(feedback: proto::Feedback) -> Self {
        Self {
            request: feedback.request.map(Into::into),
            response: feedback.response.map(Into::into),
            reward: feedback.reward,
            truth: feedback.truth.map(Into::into),
        }
    }
}
