// Transport doubles that count invocations without touching the network
#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use inference_dispatch::{
    core::Endpoint,
    grpc_client::{GrpcError, GrpcInvoker, GrpcMethod},
    http_client::{FormRequest, FormResponse, FormTransport, TransportError},
    protocols::{NodePayload, SeldonMessage},
};

#[derive(Debug, Default)]
pub struct CountingTransport {
    invocations: AtomicUsize,
}

impl CountingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FormTransport for CountingTransport {
    async fn post_form(&self, _request: FormRequest) -> Result<FormResponse, TransportError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(FormResponse {
            status: reqwest::StatusCode::OK,
            body: "{}".to_string(),
        })
    }
}

#[async_trait]
impl GrpcInvoker for CountingTransport {
    async fn invoke(
        &self,
        _endpoint: &Endpoint,
        _method: GrpcMethod,
        _payload: NodePayload<'_>,
    ) -> Result<SeldonMessage, GrpcError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(SeldonMessage::default())
    }
}
