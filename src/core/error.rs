//! Error type returned by every dispatch call
//!
//! Transport-specific failures (reqwest, tonic, serde) are folded into one of
//! three kinds before they reach the caller.

use super::{Endpoint, EndpointType, UnitRole, Verb};

/// Coarse classification of a [`DispatchError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchErrorKind {
    InvalidEndpoint,
    DownstreamError,
    UnsupportedOperation,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Invalid endpoint URL - host: {host} port: {port}")]
    InvalidEndpoint { host: String, port: u16 },

    #[error("Microservice error from {endpoint}: {detail}")]
    Downstream {
        endpoint: String,
        /// HTTP status when the node answered with a non-success code
        status: Option<u16>,
        detail: String,
    },

    #[error("No {verb} operation for {role} unit over {transport}")]
    UnsupportedOperation {
        verb: Verb,
        transport: EndpointType,
        role: UnitRole,
    },
}

/// Result type for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;

impl DispatchError {
    pub fn kind(&self) -> DispatchErrorKind {
        match self {
            DispatchError::InvalidEndpoint { .. } => DispatchErrorKind::InvalidEndpoint,
            DispatchError::Downstream { .. } => DispatchErrorKind::DownstreamError,
            DispatchError::UnsupportedOperation { .. } => DispatchErrorKind::UnsupportedOperation,
        }
    }

    /// Transport, serialization or RPC failure while talking to `endpoint`
    pub fn downstream(endpoint: &Endpoint, detail: impl ToString) -> Self {
        DispatchError::Downstream {
            endpoint: endpoint.to_string(),
            status: None,
            detail: detail.to_string(),
        }
    }

    /// Node answered with a non-2xx status
    pub fn bad_status(endpoint: &Endpoint, status: u16) -> Self {
        DispatchError::Downstream {
            endpoint: endpoint.to_string(),
            status: Some(status),
            detail: format!("Bad return code {}", status),
        }
    }

    /// Status code carried by a downstream failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            DispatchError::Downstream { status, .. } => *status,
            _ => None,
        }
    }
}
