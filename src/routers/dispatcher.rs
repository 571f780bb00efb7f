use std::sync::Arc;

use tracing::debug;

use super::table::{resolve_route, Route};
use crate::{
    config::{ConfigResult, DispatchPolicy},
    core::{DispatchError, DispatchResult, PredictiveUnitState, Verb},
    grpc_client::{GrpcInvoker, SeldonNodeClient},
    http_client::{FormTransport, ReqwestFormTransport, RestNodeClient},
    protocols::{Feedback, NodePayload, SeldonMessage, SeldonMessageList},
};

/// Sends one verb to one graph node and returns its reply.
///
/// Holds no per-call state: share it behind an `Arc` across tasks.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    rest: RestNodeClient,
    grpc: Arc<dyn GrpcInvoker>,
}

impl Dispatcher {
    pub fn new(policy: &DispatchPolicy) -> ConfigResult<Self> {
        let transport = ReqwestFormTransport::new(policy)?;
        Ok(Self::with_transports(
            Arc::new(transport),
            Arc::new(SeldonNodeClient::new(policy)),
        ))
    }

    pub fn with_transports(rest: Arc<dyn FormTransport>, grpc: Arc<dyn GrpcInvoker>) -> Self {
        Self {
            rest: RestNodeClient::new(rest),
            grpc,
        }
    }

    pub async fn route(
        &self,
        input: &SeldonMessage,
        state: &PredictiveUnitState,
    ) -> DispatchResult<SeldonMessage> {
        self.dispatch(
            Verb::Route,
            state,
            NodePayload::Message(input),
            input.has_default_shape(),
        )
        .await
    }

    pub async fn send_feedback(
        &self,
        feedback: &Feedback,
        state: &PredictiveUnitState,
    ) -> DispatchResult<SeldonMessage> {
        self.dispatch(Verb::SendFeedback, state, NodePayload::Feedback(feedback), true)
            .await
    }

    pub async fn transform_input(
        &self,
        input: &SeldonMessage,
        state: &PredictiveUnitState,
    ) -> DispatchResult<SeldonMessage> {
        self.dispatch(
            Verb::TransformInput,
            state,
            NodePayload::Message(input),
            input.has_default_shape(),
        )
        .await
    }

    pub async fn transform_output(
        &self,
        output: &SeldonMessage,
        state: &PredictiveUnitState,
    ) -> DispatchResult<SeldonMessage> {
        self.dispatch(
            Verb::TransformOutput,
            state,
            NodePayload::Message(output),
            output.has_default_shape(),
        )
        .await
    }

    /// Combine the outputs of several children into one message
    pub async fn aggregate(
        &self,
        outputs: &[SeldonMessage],
        state: &PredictiveUnitState,
    ) -> DispatchResult<SeldonMessage> {
        let batch = SeldonMessageList::new(outputs.to_vec());
        self.dispatch(Verb::Aggregate, state, NodePayload::Batch(&batch), true)
            .await
    }

    async fn dispatch(
        &self,
        verb: Verb,
        state: &PredictiveUnitState,
        payload: NodePayload<'_>,
        is_default: bool,
    ) -> DispatchResult<SeldonMessage> {
        let endpoint = &state.endpoint;
        let route = resolve_route(verb, endpoint.endpoint_type, state.role)?;
        debug!(
            "Dispatching {} to {} unit {} at {}",
            verb, state.role, state.name, endpoint
        );

        match route {
            Route::Rest(path) => self.rest.query(path, &payload, state, is_default).await,
            Route::Grpc(method) => {
                endpoint.base_url()?;
                self.grpc
                    .invoke(endpoint, method, payload)
                    .await
                    .map_err(|e| DispatchError::downstream(endpoint, e))
            }
        }
    }
}
