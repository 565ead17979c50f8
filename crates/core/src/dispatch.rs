use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::{
    config::ClientConfig,
    error::{DispatchError, Result},
    request::{AnalysisRequest, DocumentRequest},
    types::{AnalysisResponse, AnalysisResult},
    view::shape_response,
};

/// Multipart field carrying the uploaded document.
pub const FILE_FIELD: &str = "file";

/// Status and body of a completed HTTP exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one network round trip for a request.
///
/// Implementations report transport failures only; status handling and body
/// parsing belong to [`SubmissionDispatcher`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: &AnalysisRequest,
    ) -> std::result::Result<RawResponse, DispatchError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn transport_error(&self, error: reqwest::Error) -> DispatchError {
        if error.is_timeout() {
            DispatchError::Timeout {
                after: self.config.timeout,
            }
        } else {
            DispatchError::Network {
                message: error.to_string(),
            }
        }
    }
}

fn file_part(request: &DocumentRequest) -> Part {
    let file = &request.file;
    let part = || Part::bytes(file.bytes.clone()).file_name(file.name.clone());
    part().mime_str(&file.mime_type).unwrap_or_else(|e| {
        warn!(mime = %file.mime_type, error = %e, "sending upload without a content type");
        part()
    })
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &AnalysisRequest,
    ) -> std::result::Result<RawResponse, DispatchError> {
        let url = self.config.endpoint(request.kind());
        let builder = match request {
            AnalysisRequest::Youtube(body) => self.client.post(&url).json(body),
            AnalysisRequest::Document(doc) => {
                let form = Form::new().part(FILE_FIELD, file_part(doc));
                self.client.post(&url).multipart(form)
            }
        };

        debug!(url = %url, "sending analysis request");
        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Sends requests and normalizes every outcome into a shaped result or a
/// [`DispatchError`]. Exactly one attempt per call.
#[derive(Clone)]
pub struct SubmissionDispatcher {
    transport: Arc<dyn Transport>,
}

impl SubmissionDispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn http(config: ClientConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    #[instrument(skip_all, fields(kind = %request.kind()))]
    pub async fn dispatch(
        &self,
        request: &AnalysisRequest,
    ) -> std::result::Result<AnalysisResult, DispatchError> {
        let response = self.transport.send(request).await?;
        info!(
            status = response.status,
            bytes = response.body.len(),
            "analysis response received"
        );

        if !response.is_success() {
            return Err(DispatchError::server(
                Some(response.status),
                error_message(&response),
            ));
        }

        let parsed: AnalysisResponse = serde_json::from_slice(&response.body).map_err(|e| {
            DispatchError::server(
                Some(response.status),
                format!("Invalid response from analysis service: {e}"),
            )
        })?;

        Ok(shape_response(parsed, request.kind()))
    }
}

/// `detail` from a JSON error body, else a generic status message.
fn error_message(response: &RawResponse) -> String {
    serde_json::from_slice::<Value>(&response.body)
        .ok()
        .and_then(|body| body.get("detail").and_then(Value::as_str).map(str::to_string))
        .filter(|detail| !detail.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP error! status: {}", response.status))
}
