use std::{sync::Arc, time::Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use tracing::{debug, error};

use super::transport::{FormRequest, FormTransport};
use crate::{
    core::{DispatchError, DispatchResult, PredictiveUnitState},
    protocols::SeldonMessage,
};

pub const MODEL_NAME_HEADER: &str = "Seldon-model-name";
pub const MODEL_IMAGE_HEADER: &str = "Seldon-model-image";
pub const MODEL_VERSION_HEADER: &str = "Seldon-model-version";

/// Posts canonical JSON to REST nodes and parses their replies
#[derive(Debug, Clone)]
pub struct RestNodeClient {
    transport: Arc<dyn FormTransport>,
}

impl RestNodeClient {
    pub fn new(transport: Arc<dyn FormTransport>) -> Self {
        Self { transport }
    }

    /// POST `payload` to `path` on the node described by `state`.
    ///
    /// The URL is validated before anything is sent, so a malformed host
    /// never reaches the transport.
    pub async fn query<T>(
        &self,
        path: &str,
        payload: &T,
        state: &PredictiveUnitState,
        is_default: bool,
    ) -> DispatchResult<SeldonMessage>
    where
        T: Serialize + ?Sized,
    {
        let endpoint = &state.endpoint;
        let url = endpoint.url_for(path)?;

        let json =
            serde_json::to_string(payload).map_err(|e| DispatchError::downstream(endpoint, e))?;
        let headers = model_headers(state).map_err(|e| DispatchError::downstream(endpoint, e))?;

        let request = FormRequest {
            url,
            headers,
            fields: vec![("json", json), ("isDefault", is_default.to_string())],
        };

        debug!("Requesting {}", request.url);
        let start = Instant::now();
        let result = self.transport.post_form(request).await;
        debug!(
            "External prediction server took {}ms",
            start.elapsed().as_millis()
        );

        let response = result.map_err(|e| {
            error!(
                "Couldn't retrieve prediction from external prediction server - {}",
                e
            );
            DispatchError::downstream(endpoint, e)
        })?;

        if !response.status.is_success() {
            error!(
                "Couldn't retrieve prediction from external prediction server -- bad http return code: {}",
                response.status
            );
            return Err(DispatchError::bad_status(
                endpoint,
                response.status.as_u16(),
            ));
        }

        serde_json::from_str(&response.body).map_err(|e| {
            error!("Failed to parse reply from {}: {}", endpoint, e);
            DispatchError::downstream(endpoint, e)
        })
    }
}

fn model_headers(state: &PredictiveUnitState) -> Result<HeaderMap, String> {
    let mut headers = HeaderMap::new();
    for (name, value) in [
        (MODEL_NAME_HEADER, &state.name),
        (MODEL_IMAGE_HEADER, &state.image_name),
        (MODEL_VERSION_HEADER, &state.image_version),
    ] {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| e.to_string())?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| format!("Invalid {} header value {:?}: {}", name, value, e))?;
        headers.insert(name, value);
    }
    Ok(headers)
}
