pub mod config;
pub mod error;
pub mod gemini;
pub mod media;
pub mod operation;
pub mod poller;
pub mod request;
pub mod retrieval;
pub mod service;
pub mod session;
pub mod settings;
pub mod studio;

pub use config::StudioConfig;
pub use error::{LuminaError, Result};
pub use gemini::GeminiClient;
pub use media::{MediaFile, MediaKind};
pub use operation::{ErrorInfo, Operation, OperationOutcome};
pub use poller::{CancelToken, PollAttempt, PollPolicy, Poller};
pub use request::{ApiKey, GenerationRequest, Submission, VideoConfig};
pub use retrieval::{fetch_result, LocalAsset};
pub use service::VideoService;
pub use session::{AppStatus, LogEntry, LogLevel, Session, SessionEvent};
pub use settings::{BackgroundStyle, FacialExpressiveness, GenerationSettings, GestureIntensity};
pub use studio::{Progress, Studio};
