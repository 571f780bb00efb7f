pub mod config;
pub mod core;
pub mod grpc_client;
pub mod http_client;
pub mod logging;
pub mod protocols;
pub mod routers;

pub use crate::core::{DispatchError, DispatchErrorKind, DispatchResult};
pub use routers::Dispatcher;
