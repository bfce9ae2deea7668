use std::sync::mpsc::{channel, Receiver, Sender};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use crate::error::{LuminaError, Result};
use crate::media::MediaKind;
use crate::request::{GenerationRequest, Submission};
use crate::studio::Progress;

pub const BILLING_HINT: &str = "Error: The current API key may not have billing enabled for Veo models.";
pub const PERMISSION_HINT: &str =
    "Check that the key has permission to use Veo and that billing is enabled: https://ai.google.dev/gemini-api/docs/billing";
pub const CONSENT_REQUIRED: &str = "Please provide explicit consent for the use of uploaded identity data.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppStatus {
    #[default]
    Idle,
    Configuring,
    Processing,
    Completed,
    Error,
}

impl AppStatus {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Processing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Idle => "Idle",
            Self::Configuring => "Configuring",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Error => "Error",
        }
    }

    /// Forward edges of the status machine. `reset` is handled separately.
    pub fn can_transition_to(&self, next: AppStatus) -> bool {
        use AppStatus::*;
        matches!(
            (self, next),
            (Idle, Configuring)
                | (Idle | Configuring, Processing)
                | (Processing, Completed | Error)
                | (Completed | Error, Processing)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    /// A poll that came back not done.
    Progress,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub message: String,
    pub level: LogLevel,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            message: message.into(),
            level,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.level == LogLevel::Critical
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    StatusChanged { from: AppStatus, to: AppStatus },
    LogAppended(LogEntry),
    LogCleared,
}

/// Status and activity log of one user session.
///
/// This is the single writer for both. Observers receive every change
/// through [`Session::subscribe`].
#[derive(Debug, Default)]
pub struct Session {
    status: AppStatus,
    log: Vec<LogEntry>,
    last_error: Option<String>,
    subscribers: Vec<Sender<SessionEvent>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn status(&self) -> AppStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Log entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.log.iter().rev()
    }

    pub fn log_len(&self) -> usize {
        self.log.len()
    }

    /// The user changed media or settings.
    pub fn configure(&mut self) -> bool {
        if self.status == AppStatus::Idle {
            self.transition(AppStatus::Configuring);
        }
        self.status == AppStatus::Configuring
    }

    pub fn media_loaded(&mut self, kind: MediaKind, name: &str) {
        self.append(LogLevel::Info, format!("{} uploaded successfully ({}).", kind.name(), name));
        self.configure();
    }

    /// Validate the form and move to Processing.
    ///
    /// Local failures (busy, no consent, missing photo) leave the status
    /// untouched and never reach the remote service.
    pub fn begin(&mut self, submission: &Submission, model: &str) -> Result<GenerationRequest> {
        if self.status.is_busy() {
            return Err(LuminaError::Busy);
        }

        if !submission.consent {
            self.append(LogLevel::Critical, CONSENT_REQUIRED);
            return Err(LuminaError::Validation(CONSENT_REQUIRED.into()));
        }

        let request = match submission.to_request(model) {
            Ok(request) => request,
            Err(e) => {
                self.append(LogLevel::Critical, e.to_string());
                return Err(e);
            }
        };

        self.clear_log();
        self.last_error = None;
        self.transition(AppStatus::Processing);
        self.append(LogLevel::Info, "Initializing Lumina Engine...");
        if let Some(voice) = &submission.voice {
            self.append(LogLevel::Info, format!("Voice track '{}' attached.", voice.name));
        }

        Ok(request)
    }

    pub fn record(&mut self, progress: Progress) {
        match progress {
            Progress::Stage(message) => self.append(LogLevel::Info, message),
            Progress::Pending(attempt) => self.append(
                LogLevel::Progress,
                format!(
                    "Rendering in progress... (poll #{}, {}s elapsed)",
                    attempt.attempt,
                    attempt.elapsed.as_secs()
                ),
            ),
        }
    }

    pub fn complete(&mut self) {
        if self.transition(AppStatus::Completed) {
            self.append(LogLevel::Info, "Video generation finalized. 1080p output ready.");
        }
    }

    pub fn fail(&mut self, err: &LuminaError) {
        error!("Generation failed: {}", err);
        self.last_error = Some(err.to_string());
        self.transition(AppStatus::Error);

        self.append(LogLevel::Critical, format!("System Error: {}", err));
        if err.is_auth() {
            self.append(LogLevel::Critical, BILLING_HINT);
            self.append(LogLevel::Info, PERMISSION_HINT);
        }
    }

    /// Log a local failure (unreadable file, save error) without leaving the
    /// current status.
    pub fn note_error(&mut self, err: &LuminaError) {
        self.append(LogLevel::Critical, format!("System Error: {}", err));
    }

    /// Apply the outcome of a generation run.
    pub fn finish<T>(&mut self, result: &Result<T>) {
        match result {
            Ok(_) => self.complete(),
            Err(e) => self.fail(e),
        }
    }

    /// Back to Idle with an empty log. Not allowed while processing.
    pub fn reset(&mut self) -> Result<()> {
        if self.status.is_busy() {
            return Err(LuminaError::Busy);
        }
        self.clear_log();
        self.last_error = None;
        self.set_status(AppStatus::Idle);
        Ok(())
    }

    fn transition(&mut self, next: AppStatus) -> bool {
        if !self.status.can_transition_to(next) {
            debug!("Ignoring transition {:?} -> {:?}", self.status, next);
            return false;
        }
        self.set_status(next);
        true
    }

    fn set_status(&mut self, next: AppStatus) {
        let from = self.status;
        if from == next {
            return;
        }
        info!("Status {} -> {}", from.label(), next.label());
        self.status = next;
        self.emit(SessionEvent::StatusChanged { from, to: next });
    }

    fn append(&mut self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry::new(level, message);
        self.log.push(entry.clone());
        self.emit(SessionEvent::LogAppended(entry));
    }

    fn clear_log(&mut self) {
        self.log.clear();
        self.emit(SessionEvent::LogCleared);
    }

    fn emit(&mut self, event: SessionEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
