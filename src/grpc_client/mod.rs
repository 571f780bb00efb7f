//! gRPC client for predictive unit microservices

pub mod conversions;
pub mod node_client;

// Include the generated protobuf code
#[allow(clippy::all)]
pub mod proto {
    #![allow(clippy::all, unused_qualifications)]
    tonic::include_proto!("seldon.protos");
}

pub use node_client::{
    create_node_channel, GrpcCallOptions, GrpcError, GrpcInvoker, GrpcMethod, SeldonNodeClient,
};
