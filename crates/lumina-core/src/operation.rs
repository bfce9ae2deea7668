use serde::{Deserialize, Serialize};

/// Error payload reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    Video { asset_uris: Vec<String> },
    Failed(ErrorInfo),
}

/// Snapshot of a remote long-running generation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    pub done: bool,
    pub result: Option<OperationOutcome>,
}

impl Operation {
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
            result: None,
        }
    }

    pub fn completed(name: impl Into<String>, asset_uris: Vec<String>) -> Self {
        Self {
            name: name.into(),
            done: true,
            result: Some(OperationOutcome::Video { asset_uris }),
        }
    }

    pub fn failed(name: impl Into<String>, error: ErrorInfo) -> Self {
        Self {
            name: name.into(),
            done: true,
            result: Some(OperationOutcome::Failed(error)),
        }
    }

    /// First usable asset URI, if the job produced one.
    pub fn asset_uri(&self) -> Option<&str> {
        match &self.result {
            Some(OperationOutcome::Video { asset_uris }) => asset_uris
                .iter()
                .map(|uri| uri.as_str())
                .find(|uri| !uri.trim().is_empty()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match &self.result {
            Some(OperationOutcome::Failed(info)) => Some(info),
            _ => None,
        }
    }
}

// Wire format of the operations endpoint.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OperationResource {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub response: Option<OperationResponse>,
    #[serde(default)]
    pub error: Option<ErrorInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OperationResponse {
    #[serde(default)]
    pub generate_video_response: Option<GeneratedVideos>,
    #[serde(default, alias = "generatedSamples")]
    pub generated_videos: Vec<GeneratedVideo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeneratedVideos {
    #[serde(default, alias = "generatedVideos")]
    pub generated_samples: Vec<GeneratedVideo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GeneratedVideo {
    #[serde(default)]
    pub video: Option<VideoRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct VideoRef {
    #[serde(default)]
    pub uri: Option<String>,
}

impl From<OperationResource> for Operation {
    fn from(res: OperationResource) -> Self {
        if !res.done {
            return Operation::pending(res.name);
        }

        if let Some(error) = res.error {
            return Operation::failed(res.name, error);
        }

        let samples = res
            .response
            .map(|r| {
                let mut videos = r.generated_videos;
                if let Some(nested) = r.generate_video_response {
                    videos.extend(nested.generated_samples);
                }
                videos
            })
            .unwrap_or_default();

        let asset_uris = samples
            .into_iter()
            .filter_map(|s| s.video.and_then(|v| v.uri))
            .collect();

        Operation::completed(res.name, asset_uris)
    }
}
