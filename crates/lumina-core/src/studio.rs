use std::path::PathBuf;
use tracing::info;
use crate::config::StudioConfig;
use crate::error::{LuminaError, Result};
use crate::poller::{CancelToken, PollAttempt, PollPolicy, Poller};
use crate::request::{ApiKey, GenerationRequest, Submission};
use crate::retrieval::{fetch_result, LocalAsset};
use crate::service::VideoService;
use crate::session::Session;

/// Progress reported while a generation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Stage(String),
    Pending(PollAttempt),
}

/// Submit → poll → download, on top of a [`VideoService`].
pub struct Studio<S: VideoService> {
    service: S,
    model: String,
    policy: PollPolicy,
    output_dir: PathBuf,
}

impl<S: VideoService> Studio<S> {
    pub fn new(service: S, model: impl Into<String>, policy: PollPolicy, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            service,
            model: model.into(),
            policy,
            output_dir: output_dir.into(),
        }
    }

    pub fn from_config(service: S, config: &StudioConfig) -> Self {
        Self::new(service, config.model.clone(), config.policy.clone(), config.output_dir.clone())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Run the remote part of a generation. Does not touch any session;
    /// progress goes to `on_progress`.
    pub async fn execute<F>(
        &self,
        request: &GenerationRequest,
        key: &ApiKey,
        cancel: &CancelToken,
        mut on_progress: F,
    ) -> Result<LocalAsset>
    where
        F: FnMut(Progress) + Send,
    {
        let poller = Poller::new(&self.service, self.policy.clone());

        on_progress(Progress::Stage(format!("Submitting portrait and prompt to {}...", self.model)));
        let operation = cancel.guard(poller.submit(request, key)).await?;

        on_progress(Progress::Stage("Generating cinematic sequence...".to_string()));
        let operation = poller
            .await_completion(operation, key, cancel, |attempt| on_progress(Progress::Pending(attempt)))
            .await?;

        on_progress(Progress::Stage("Downloading rendered video...".to_string()));
        let asset = cancel
            .guard(fetch_result(&self.service, &operation, key, &self.output_dir))
            .await?;

        info!("Generation finished: {}", asset.path().display());
        Ok(asset)
    }

    /// Full flow against a session: validate, run, record the outcome.
    pub async fn generate(
        &self,
        session: &mut Session,
        submission: &Submission,
        key: Option<&ApiKey>,
        cancel: &CancelToken,
    ) -> Result<LocalAsset> {
        let request = session.begin(submission, &self.model)?;

        let result = match key {
            Some(key) => self.execute(&request, key, cancel, |p| session.record(p)).await,
            None => Err(LuminaError::Auth("no API key configured".into())),
        };

        session.finish(&result);
        result
    }
}
