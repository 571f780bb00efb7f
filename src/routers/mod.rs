//! Verb dispatch to graph nodes

pub mod dispatcher;
pub mod table;

pub use dispatcher::Dispatcher;
pub use table::{resolve_route, rest_path, Route};
