use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::config::StudioConfig;
use crate::error::{LuminaError, Result};
use crate::operation::{ErrorInfo, Operation, OperationResource};
use crate::request::{ApiKey, GenerationRequest, VideoConfig};
use crate::retrieval::redact;
use crate::service::VideoService;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: [Instance<'a>; 1],
    parameters: &'a VideoConfig,
}

#[derive(Serialize)]
struct Instance<'a> {
    prompt: &'a str,
    image: InlineImage<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineImage<'a> {
    bytes_base64_encoded: String,
    mime_type: &'a str,
}

#[derive(Deserialize)]
struct PredictResponse {
    name: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorInfo,
}

/// Veo client for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    request_timeout: Duration,
    download_timeout: Duration,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| LuminaError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
        })
    }

    pub fn from_config(config: &StudioConfig) -> Result<Self> {
        Ok(Self::new(config.api_base.clone())?
            .with_timeouts(config.request_timeout, config.download_timeout))
    }

    pub fn with_timeouts(mut self, request: Duration, download: Duration) -> Self {
        self.request_timeout = request;
        self.download_timeout = download;
        self
    }

    fn predict_url(&self, model: &str) -> String {
        format!("{}/models/{}:predictLongRunning", self.base_url, model)
    }

    fn operation_url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name.trim_start_matches('/'))
    }
}

#[async_trait]
impl VideoService for GeminiClient {
    async fn submit(&self, request: &GenerationRequest, key: &ApiKey) -> Result<Operation> {
        let image = request.image();
        let body = PredictRequest {
            instances: [Instance {
                prompt: request.prompt(),
                image: InlineImage {
                    bytes_base64_encoded: image.base64_payload(),
                    mime_type: &image.mime,
                },
            }],
            parameters: request.config(),
        };

        info!("Submitting generation to {}", request.model());

        let response = self.http
            .post(self.predict_url(request.model()))
            .header(API_KEY_HEADER, key.expose())
            .json(&body)
            .timeout(self.request_timeout)
            .send()
            .await?;

        let created: PredictResponse = check(response).await?.json().await?;
        debug!("Operation created: {}", created.name);

        Ok(Operation::pending(created.name))
    }

    async fn poll(&self, operation: &Operation, key: &ApiKey) -> Result<Operation> {
        let response = self.http
            .get(self.operation_url(&operation.name))
            .header(API_KEY_HEADER, key.expose())
            .timeout(self.request_timeout)
            .send()
            .await?;

        let resource: OperationResource = check(response).await?.json().await?;
        Ok(resource.into())
    }

    async fn download(&self, asset_uri: &str, key: &ApiKey) -> Result<Vec<u8>> {
        let url = download_url(asset_uri, key)?;
        debug!("Downloading {}", redact(url.as_str()));

        let response = self.http
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await?;

        let bytes = check(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// Append the credential as the `key` query parameter.
pub fn download_url(asset_uri: &str, key: &ApiKey) -> Result<Url> {
    let mut url = Url::parse(asset_uri)
        .map_err(|e| LuminaError::Validation(format!("Invalid asset reference {}: {}", redact(asset_uri), e)))?;
    url.query_pairs_mut().append_pair("key", key.expose());
    Ok(url)
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);

    Err(LuminaError::from_remote(status.as_u16(), message))
}
