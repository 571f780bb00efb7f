//! Core types shared by the dispatcher and both transport adapters
//!
//! - Node descriptors and endpoints supplied by the graph scheduler
//! - The verb vocabulary
//! - The dispatch error type

pub mod error;
pub mod node;
pub mod verb;

pub use error::{DispatchError, DispatchErrorKind, DispatchResult};
pub use node::{Endpoint, EndpointType, PredictiveUnitState, UnitRole};
pub use verb::Verb;
