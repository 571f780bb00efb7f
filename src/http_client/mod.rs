//! REST adapter: form-encoded JSON over HTTP

pub mod rest_client;
pub mod transport;

pub use rest_client::{
    RestNodeClient, MODEL_IMAGE_HEADER, MODEL_NAME_HEADER, MODEL_VERSION_HEADER,
};
pub use transport::{
    FormRequest, FormResponse, FormTransport, ReqwestFormTransport, TransportError,
};
