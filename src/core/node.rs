use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use super::{DispatchError, DispatchResult};

/// Wire protocol a graph node is reachable over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EndpointType {
    /// Form-encoded JSON over HTTP
    #[default]
    Rest,
    /// Protobuf over plaintext gRPC
    Grpc,
}

impl fmt::Display for EndpointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointType::Rest => write!(f, "REST"),
            EndpointType::Grpc => write!(f, "gRPC"),
        }
    }
}

impl std::str::FromStr for EndpointType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("rest") || s.eq_ignore_ascii_case("http") {
            Ok(EndpointType::Rest)
        } else if s.eq_ignore_ascii_case("grpc") {
            Ok(EndpointType::Grpc)
        } else {
            Err(format!("Unknown endpoint type: {}", s))
        }
    }
}

/// Network location of one downstream node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    #[serde(rename = "type", default)]
    pub endpoint_type: EndpointType,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16, endpoint_type: EndpointType) -> Self {
        Self {
            host: host.into(),
            port,
            endpoint_type,
        }
    }

    pub fn rest(host: impl Into<String>, port: u16) -> Self {
        Self::new(host, port, EndpointType::Rest)
    }

    pub fn grpc(host: impl Into<String>, port: u16) -> Self {
        Self::new(host, port, EndpointType::Grpc)
    }

    /// `http://{host}:{port}/`, the base both transports dial.
    ///
    /// Fails with [`DispatchError::InvalidEndpoint`] when the host cannot be
    /// part of a URI; no network I/O happens here.
    pub fn base_url(&self) -> DispatchResult<Url> {
        let invalid = || DispatchError::InvalidEndpoint {
            host: self.host.clone(),
            port: self.port,
        };

        let mut url = Url::parse("http://localhost/").map_err(|_| invalid())?;
        url.set_host(Some(&self.host)).map_err(|_| invalid())?;
        url.set_port(Some(self.port)).map_err(|_| invalid())?;
        Ok(url)
    }

    /// Base URL with `path` appended
    pub fn url_for(&self, path: &str) -> DispatchResult<Url> {
        let mut url = self.base_url()?;
        url.set_path(path);
        Ok(url)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.host, self.port, self.endpoint_type)
    }
}

/// Declared role of a predictive unit in the inference graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitRole {
    #[default]
    #[serde(alias = "UNKNOWN_TYPE")]
    Unknown,
    Model,
    Router,
    Transformer,
    OutputTransformer,
    Combiner,
}

impl UnitRole {
    pub const ALL: [UnitRole; 6] = [
        UnitRole::Unknown,
        UnitRole::Model,
        UnitRole::Router,
        UnitRole::Transformer,
        UnitRole::OutputTransformer,
        UnitRole::Combiner,
    ];
}

impl fmt::Display for UnitRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnitRole::Unknown => "UNKNOWN",
            UnitRole::Model => "MODEL",
            UnitRole::Router => "ROUTER",
            UnitRole::Transformer => "TRANSFORMER",
            UnitRole::OutputTransformer => "OUTPUT_TRANSFORMER",
            UnitRole::Combiner => "COMBINER",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for UnitRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace('-', "_");
        UnitRole::ALL
            .into_iter()
            .find(|role| {
                role.to_string().eq_ignore_ascii_case(&normalized)
                    || (*role == UnitRole::Unknown
                        && normalized.eq_ignore_ascii_case("unknown_type"))
            })
            .ok_or_else(|| format!("Unknown unit role: {}", s))
    }
}

/// Everything the dispatcher needs to know about the node being called.
///
/// Supplied by the graph scheduler per call. The role picks the service
/// contract; name and image are only forwarded as REST headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictiveUnitState {
    pub name: String,
    #[serde(rename = "type", default)]
    pub role: UnitRole,
    #[serde(default)]
    pub image_name: String,
    #[serde(default)]
    pub image_version: String,
    pub endpoint: Endpoint,
}

impl PredictiveUnitState {
    pub fn new(name: impl Into<String>, role: UnitRole, endpoint: Endpoint) -> Self {
        Self {
            name: name.into(),
            role,
            image_name: String::new(),
            image_version: String::new(),
            endpoint,
        }
    }

    pub fn with_image(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.image_name = name.into();
        self.image_version = version.into();
        self
    }
}
