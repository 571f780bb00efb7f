use std::{fmt::Display, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::Annotations;

pub const ANNOTATION_REST_CONNECTION_TIMEOUT: &str = "seldon.io/rest-connection-timeout";
pub const ANNOTATION_REST_READ_TIMEOUT: &str = "seldon.io/rest-read-timeout";
pub const ANNOTATION_GRPC_READ_TIMEOUT: &str = "seldon.io/grpc-read-timeout";
pub const ANNOTATION_GRPC_MAX_MESSAGE_SIZE: &str = "seldon.io/grpc-max-message-size";

pub const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 10000;
pub const DEFAULT_GRPC_READ_TIMEOUT_MS: u64 = 5000;
/// gRPC's conventional 4 MiB message ceiling
pub const DEFAULT_GRPC_MAX_MESSAGE_SIZE: usize = 4 * 1024 * 1024;

/// Timeouts and size limits applied to every outbound node call.
///
/// Resolved once at startup and never mutated; share it by reference or
/// clone it into whatever needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchPolicy {
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub grpc_read_timeout_ms: u64,
    pub grpc_max_message_size: usize,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            connect_timeout_ms: DEFAULT_CONNECTION_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            grpc_read_timeout_ms: DEFAULT_GRPC_READ_TIMEOUT_MS,
            grpc_max_message_size: DEFAULT_GRPC_MAX_MESSAGE_SIZE,
        }
    }
}

impl DispatchPolicy {
    /// Resolve each setting independently from `annotations`.
    ///
    /// A value that fails to parse is logged and replaced by that setting's
    /// default; it never affects the other settings and never fails.
    pub fn from_annotations(annotations: &Annotations) -> Self {
        let policy = Self {
            connect_timeout_ms: resolve(
                annotations,
                ANNOTATION_REST_CONNECTION_TIMEOUT,
                DEFAULT_CONNECTION_TIMEOUT_MS,
            ),
            read_timeout_ms: resolve(
                annotations,
                ANNOTATION_REST_READ_TIMEOUT,
                DEFAULT_READ_TIMEOUT_MS,
            ),
            grpc_read_timeout_ms: resolve(
                annotations,
                ANNOTATION_GRPC_READ_TIMEOUT,
                DEFAULT_GRPC_READ_TIMEOUT_MS,
            ),
            grpc_max_message_size: resolve(
                annotations,
                ANNOTATION_GRPC_MAX_MESSAGE_SIZE,
                DEFAULT_GRPC_MAX_MESSAGE_SIZE,
            ),
        };

        info!("REST connection timeout set to {}ms", policy.connect_timeout_ms);
        info!("REST read timeout set to {}ms", policy.read_timeout_ms);
        info!("gRPC read timeout set to {}ms", policy.grpc_read_timeout_ms);
        info!(
            "gRPC max message size set to {} bytes",
            policy.grpc_max_message_size
        );

        policy
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn grpc_deadline(&self) -> Duration {
        Duration::from_millis(self.grpc_read_timeout_ms)
    }
}

/// Parse one annotation, falling back to `default` when absent or invalid.
/// Zero is rejected: a zero timeout or size limit fails every call.
fn resolve<T>(annotations: &Annotations, key: &str, default: T) -> T
where
    T: FromStr + Display + Default + PartialEq + Copy,
    T::Err: Display,
{
    let Some(raw) = annotations.get(key) else {
        return default;
    };

    match raw.trim().parse::<T>() {
        Ok(value) if value != T::default() => {
            info!("Setting {} from annotation to {}", key, value);
            value
        }
        Ok(_) => {
            warn!(
                "Annotation {} must be greater than zero, keeping default {}",
                key, default
            );
            default
        }
        Err(e) => {
            warn!(
                "Failed to parse annotation {} with value {:?}: {}, keeping default {}",
                key, raw, e, default
            );
            default
        }
    }
}
