// Mock gRPC node for testing - these functions are used by integration tests
#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use inference_dispatch::grpc_client::proto::{
    combiner_server::{Combiner, CombinerServer},
    generic_server::{Generic, GenericServer},
    model_server::{Model, ModelServer},
    output_transformer_server::{OutputTransformer, OutputTransformerServer},
    router_server::{Router, RouterServer},
    seldon_message::DataOneof,
    transformer_server::{Transformer, TransformerServer},
    Feedback, Meta, SeldonMessage, SeldonMessageList,
};
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{transport::Server, Request, Response, Status};

/// Implements all six services. Each reply carries the invoked
/// `seldon.protos.Service/Method` path as `strData` and echoes the puid of
/// the first message it received.
#[derive(Clone, Default)]
struct MockGrpcService {
    delay: Duration,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockGrpcService {
    async fn reply(&self, method: &str, puid: String) -> Result<Response<SeldonMessage>, Status> {
        self.calls.lock().unwrap().push(method.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(Response::new(SeldonMessage {
            status: None,
            meta: Some(Meta {
                puid,
                ..Default::default()
            }),
            data_oneof: Some(DataOneof::StrData(method.to_string())),
        }))
    }
}

fn puid_of(msg: Option<&SeldonMessage>) -> String {
    msg.and_then(|m| m.meta.as_ref())
        .map(|meta| meta.puid.clone())
        .unwrap_or_default()
}

fn message_puid(request: &Request<SeldonMessage>) -> String {
    puid_of(Some(request.get_ref()))
}

fn feedback_puid(request: &Request<Feedback>) -> String {
    puid_of(request.get_ref().request.as_ref())
}

fn list_puid(request: &Request<SeldonMessageList>) -> String {
    puid_of(request.get_ref().seldon_messages.first())
}

#[tonic::async_trait]
impl Generic for MockGrpcService {
    async fn transform_input(
        &self,
        request: Request<SeldonMessage>,
    ) -> Result<Response<SeldonMessage>, Status> {
        self.reply("seldon.protos.Generic/TransformInput", message_puid(&request))
            .await
    }

    async fn transform_output(
        &self,
        request: Request<SeldonMessage>,
    ) -> Result<Response<SeldonMessage>, Status> {
        self.reply("seldon.protos.Generic/TransformOutput", message_puid(&request))
            .await
    }

    async fn route(
        &self,
        request: Request<SeldonMessage>,
    ) -> Result<Response<SeldonMessage>, Status> {
        self.reply("seldon.protos.Generic/Route", message_puid(&request))
            .await
    }

    async fn aggregate(
        &self,
        request: Request<SeldonMessageList>,
    ) -> Result<Response<SeldonMessage>, Status> {
        self.reply("seldon.protos.Generic/Aggregate", list_puid(&request))
            .await
    }

    async fn send_feedback(
        &self,
        request: Request<Feedback>,
    ) -> Result<Response<SeldonMessage>, Status> {
        self.reply("seldon.protos.Generic/SendFeedback", feedback_puid(&request))
            .await
    }
}

#[tonic::async_trait]
impl Model for MockGrpcService {
    async fn predict(
        &self,
        request: Request<SeldonMessage>,
    ) -> Result<Response<SeldonMessage>, Status> {
        self.reply("seldon.protos.Model/Predict", message_puid(&request))
            .await
    }

    async fn send_feedback(
        &self,
        request: Request<Feedback>,
    ) -> Result<Response<SeldonMessage>, Status> {
        self.reply("seldon.protos.Model/SendFeedback", feedback_puid(&request))
            .await
    }
}

#[tonic::async_trait]
impl Router for MockGrpcService {
    async fn route(
        &self,
        request: Request<SeldonMessage>,
    ) -> Result<Response<SeldonMessage>, Status> {
        self.reply("seldon.protos.Router/Route", message_puid(&request))
            .await
    }

    async fn send_feedback(
        &self,
        request: Request<Feedback>,
    ) -> Result<Response<SeldonMessage>, Status> {
        self.reply("seldon.protos.Router/SendFeedback", feedback_puid(&request))
            .await
    }
}

#[tonic::async_trait]
impl Transformer for MockGrpcService {
    async fn transform_input(
        &self,
        request: Request<SeldonMessage>,
    ) -> Result<Response<SeldonMessage>, Status> {
        self.reply(
            "seldon.protos.Transformer/TransformInput",
            message_puid(&request),
        )
        .await
    }
}

#[tonic::async_trait]
impl OutputTransformer for MockGrpcService {
    async fn transform_output(
        &self,
        request: Request<SeldonMessage>,
    ) -> Result<Response<SeldonMessage>, Status> {
        self.reply(
            "seldon.protos.OutputTransformer/TransformOutput",
            message_puid(&request),
        )
        .await
    }
}

#[tonic::async_trait]
impl Combiner for MockGrpcService {
    async fn aggregate(
        &self,
        request: Request<SeldonMessageList>,
    ) -> Result<Response<SeldonMessage>, Status> {
        self.reply("seldon.protos.Combiner/Aggregate", list_puid(&request))
            .await
    }
}

/// Mock gRPC graph node on an ephemeral port
pub struct MockGrpcNode {
    service: MockGrpcService,
    port: Option<u16>,
    shutdown_handle: Option<tokio::task::JoinHandle<()>>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockGrpcNode {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    /// Every RPC sleeps for `delay` before replying
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            service: MockGrpcService {
                delay,
                ..Default::default()
            },
            port: None,
            shutdown_handle: None,
            shutdown_tx: None,
        }
    }

    pub async fn start(&mut self) -> Result<u16, Box<dyn std::error::Error>> {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await?;
        let port = listener.local_addr()?.port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        let service = self.service.clone();
        let handle = tokio::spawn(async move {
            let result = Server::builder()
                .add_service(GenericServer::new(service.clone()))
                .add_service(ModelServer::new(service.clone()))
                .add_service(RouterServer::new(service.clone()))
                .add_service(TransformerServer::new(service.clone()))
                .add_service(OutputTransformerServer::new(service.clone()))
                .add_service(CombinerServer::new(service))
                .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
                    let _ = shutdown_rx.await;
                })
                .await;

            if let Err(e) = result {
                eprintln!("gRPC server error: {}", e);
            }
        });

        self.shutdown_handle = Some(handle);
        self.port = Some(port);
        Ok(port)
    }

    pub fn port(&self) -> u16 {
        self.port.expect("mock gRPC node not started")
    }

    /// Method paths invoked so far, in arrival order
    pub fn calls(&self) -> Vec<String> {
        self.service.calls.lock().unwrap().clone()
    }

    pub async fn stop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }

        if let Some(handle) = self.shutdown_handle.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }
    }
}

impl Drop for MockGrpcNode {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
    }
}
