use std::fmt;

use async_trait::async_trait;
use reqwest::{header::HeaderMap, StatusCode, Url};

use crate::config::{ConfigResult, DispatchPolicy};

pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// A form-encoded POST ready to send
#[derive(Debug, Clone)]
pub struct FormRequest {
    pub url: Url,
    pub headers: HeaderMap,
    pub fields: Vec<(&'static str, String)>,
}

impl FormRequest {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct FormResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Sends one form POST and returns the raw reply.
///
/// Non-2xx statuses are returned as responses, not errors.
#[async_trait]
pub trait FormTransport: Send + Sync + fmt::Debug {
    async fn post_form(&self, request: FormRequest) -> Result<FormResponse, TransportError>;
}

/// reqwest-backed transport with the policy's connect and read timeouts
#[derive(Debug, Clone)]
pub struct ReqwestFormTransport {
    client: reqwest::Client,
}

impl ReqwestFormTransport {
    pub fn new(policy: &DispatchPolicy) -> ConfigResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(policy.connect_timeout())
            .read_timeout(policy.read_timeout())
            .build()?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FormTransport for ReqwestFormTransport {
    async fn post_form(&self, request: FormRequest) -> Result<FormResponse, TransportError> {
        let response = self
            .client
            .post(request.url)
            .headers(request.headers)
            .form(&request.fields)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        Ok(FormResponse { status, body })
    }
}
