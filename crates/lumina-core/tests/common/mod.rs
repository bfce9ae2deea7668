#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use lumina_core::{
    ApiKey, GenerationRequest, GenerationSettings, LuminaError, MediaFile, MediaKind, Operation,
    Result, Submission, VideoService,
};

pub const OP_NAME: &str = "models/veo-3.1-fast-generate-preview/operations/test-op";
pub const VIDEO_URI: &str = "https://files.example/v1beta/files/abc:download?alt=media";

/// In-memory service that replays a script of poll results.
#[derive(Default)]
pub struct ScriptedService {
    submit_error: Mutex<Option<LuminaError>>,
    polls: Mutex<VecDeque<Result<Operation>>>,
    stuck: bool,
    download_error: Mutex<Option<LuminaError>>,
    download_delay: Option<Duration>,
    empty_download: bool,
    last_prompt: Mutex<Option<String>>,
    pub submits: AtomicUsize,
    pub poll_calls: AtomicUsize,
    pub downloads: AtomicUsize,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never finishes: every poll returns a pending operation.
    pub fn stuck() -> Self {
        Self { stuck: true, ..Self::default() }
    }

    pub fn pending(self, times: usize) -> Self {
        {
            let mut polls = self.polls.lock().unwrap();
            for _ in 0..times {
                polls.push_back(Ok(Operation::pending(OP_NAME)));
            }
        }
        self
    }

    pub fn then(self, result: Result<Operation>) -> Self {
        self.polls.lock().unwrap().push_back(result);
        self
    }

    pub fn then_video(self) -> Self {
        self.then(Ok(Operation::completed(OP_NAME, vec![VIDEO_URI.to_string()])))
    }

    pub fn failing_submit(self, err: LuminaError) -> Self {
        *self.submit_error.lock().unwrap() = Some(err);
        self
    }

    pub fn failing_download(self, err: LuminaError) -> Self {
        *self.download_error.lock().unwrap() = Some(err);
        self
    }

    /// Downloads take `delay` before returning.
    pub fn slow_download(self, delay: Duration) -> Self {
        Self { download_delay: Some(delay), ..self }
    }

    /// Downloads succeed with an empty body.
    pub fn empty_download(self) -> Self {
        Self { empty_download: true, ..self }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }

    pub fn remote_calls(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
            + self.poll_calls.load(Ordering::SeqCst)
            + self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoService for ScriptedService {
    async fn submit(&self, request: &GenerationRequest, _key: &ApiKey) -> Result<Operation> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(request.prompt().to_string());

        match self.submit_error.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(Operation::pending(OP_NAME)),
        }
    }

    async fn poll(&self, operation: &Operation, _key: &ApiKey) -> Result<Operation> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        assert!(!operation.done, "polled a finished operation");

        match self.polls.lock().unwrap().pop_front() {
            Some(result) => result,
            None if self.stuck => Ok(Operation::pending(OP_NAME)),
            None => Err(LuminaError::NotFound(operation.name.clone())),
        }
    }

    async fn download(&self, _asset_uri: &str, _key: &ApiKey) -> Result<Vec<u8>> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.download_delay {
            tokio::time::sleep(delay).await;
        }
        match self.download_error.lock().unwrap().take() {
            Some(err) => Err(err),
            None if self.empty_download => Ok(Vec::new()),
            None => Ok(b"\x00\x00\x00\x18ftypmp42 fake video".to_vec()),
        }
    }
}

pub fn key() -> ApiKey {
    ApiKey::new("test-key").unwrap()
}

pub fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0, 0, 0, 13, b'I', b'H', b'D', b'R']);
    bytes.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 1, 8, 6, 0, 0, 0]);
    bytes
}

pub fn photo() -> MediaFile {
    MediaFile::from_bytes(MediaKind::Photo, "portrait.png", png_bytes()).unwrap()
}

pub fn submission(settings: GenerationSettings, consent: bool) -> Submission {
    Submission {
        photo: Some(photo()),
        voice: Some(MediaFile::from_bytes(MediaKind::Voice, "narration.mp3", vec![0xFF, 0xFB, 0x90]).unwrap()),
        settings,
        context: None,
        consent,
    }
}

pub fn output_dir() -> PathBuf {
    std::env::temp_dir().join(format!("lumina-tests-{}", uuid::Uuid::new_v4()))
}
