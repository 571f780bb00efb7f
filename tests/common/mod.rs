// These modules are used by the integration tests
#![allow(dead_code)]

pub mod counting_transport;
pub mod mock_grpc_node;
pub mod mock_node;

use inference_dispatch::core::{Endpoint, PredictiveUnitState, UnitRole};

pub fn rest_unit(name: &str, role: UnitRole, port: u16) -> PredictiveUnitState {
    PredictiveUnitState::new(name, role, Endpoint::rest("127.0.0.1", port))
        .with_image("seldonio/mock_node", "0.1")
}

pub fn grpc_unit(name: &str, role: UnitRole, port: u16) -> PredictiveUnitState {
    PredictiveUnitState::new(name, role, Endpoint::grpc("127.0.0.1", port))
}
