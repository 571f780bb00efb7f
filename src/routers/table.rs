//! Verb × transport × role routing table

use crate::{
    core::{DispatchError, DispatchResult, EndpointType, UnitRole, Verb},
    grpc_client::GrpcMethod,
};

/// Where one dispatch goes on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// POST to this path on the node
    Rest(&'static str),
    Grpc(GrpcMethod),
}

/// HTTP path for `verb`. Only `transform_input` depends on the role.
pub fn rest_path(verb: Verb, role: UnitRole) -> &'static str {
    match verb {
        Verb::Route => "/route",
        Verb::SendFeedback => "/send-feedback",
        Verb::TransformInput if role == UnitRole::Model => "/predict",
        Verb::TransformInput => "/transform-input",
        Verb::TransformOutput => "/transform-output",
        Verb::Aggregate => "/aggregate",
    }
}

/// Pick the call for `verb` on a node with `role` reachable over `transport`.
///
/// Every verb is available for every role over REST. Over gRPC a role only
/// exposes the services it implements; feedback to a role with no feedback
/// RPC of its own goes to the Router service.
pub fn resolve_route(
    verb: Verb,
    transport: EndpointType,
    role: UnitRole,
) -> DispatchResult<Route> {
    use GrpcMethod::*;
    use UnitRole::*;

    let method = match transport {
        EndpointType::Rest => return Ok(Route::Rest(rest_path(verb, role))),
        EndpointType::Grpc => match (verb, role) {
            (Verb::Route, Unknown) => Some(GenericRoute),
            (Verb::Route, Router) => Some(RouterRoute),

            (Verb::SendFeedback, Unknown) => Some(GenericSendFeedback),
            (Verb::SendFeedback, Model) => Some(ModelSendFeedback),
            (Verb::SendFeedback, Router | Transformer | OutputTransformer | Combiner) => {
                Some(RouterSendFeedback)
            }

            (Verb::TransformInput, Unknown) => Some(GenericTransformInput),
            (Verb::TransformInput, Model) => Some(ModelPredict),
            (Verb::TransformInput, Transformer) => Some(TransformerTransformInput),

            (Verb::TransformOutput, Unknown) => Some(GenericTransformOutput),
            (Verb::TransformOutput, OutputTransformer) => Some(OutputTransformerTransformOutput),

            (Verb::Aggregate, Unknown) => Some(GenericAggregate),
            (Verb::Aggregate, Combiner) => Some(CombinerAggregate),

            _ => None,
        },
    };

    method
        .map(Route::Grpc)
        .ok_or(DispatchError::UnsupportedOperation {
            verb,
            transport,
            role,
        })
}
