use serde::{Deserialize, Serialize};
use crate::error::{LuminaError, Result};
use crate::media::{MediaFile, MediaKind};
use crate::settings::{GenerationSettings, DEFAULT_CONTEXT};

pub const DEFAULT_MODEL: &str = "veo-3.1-fast-generate-preview";

/// Output parameters sent alongside the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoConfig {
    #[serde(rename = "sampleCount")]
    pub count: u32,
    pub resolution: String,
    pub aspect_ratio: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            count: 1,
            resolution: "1080p".to_string(),
            aspect_ratio: "16:9".to_string(),
        }
    }
}

/// A fully formed generation request. Built once per submission and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    model: String,
    prompt: String,
    image: MediaFile,
    config: VideoConfig,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, image: MediaFile, settings: GenerationSettings, context: &str) -> Result<Self> {
        if image.kind != MediaKind::Photo {
            return Err(LuminaError::Validation("source image must be a photo".into()));
        }
        if image.is_empty() {
            return Err(LuminaError::Validation("source image is empty".into()));
        }

        let model = model.into();
        if model.trim().is_empty() {
            return Err(LuminaError::Validation("model identifier is empty".into()));
        }

        Ok(Self {
            model,
            prompt: settings.compose_prompt(context),
            image,
            config: VideoConfig::default(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn image(&self) -> &MediaFile {
        &self.image
    }

    pub fn config(&self) -> &VideoConfig {
        &self.config
    }
}

/// Everything the form holds at the moment the user presses generate.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub photo: Option<MediaFile>,
    pub voice: Option<MediaFile>,
    pub settings: GenerationSettings,
    pub context: Option<String>,
    pub consent: bool,
}

impl Submission {
    pub fn context(&self) -> &str {
        self.context
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_CONTEXT)
    }

    /// Build the request for `model`. Consent is checked by the session, not here.
    pub fn to_request(&self, model: &str) -> Result<GenerationRequest> {
        let photo = self
            .photo
            .clone()
            .ok_or_else(|| LuminaError::Validation("a portrait photo is required".into()))?;

        GenerationRequest::new(model, photo, self.settings, self.context())
    }
}

/// API credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let key = key.trim();
        if key.is_empty() {
            return Err(LuminaError::Auth("no API key configured".into()));
        }
        Ok(Self(key.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}
