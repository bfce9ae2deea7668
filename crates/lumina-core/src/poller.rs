use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};
use crate::error::{looks_like_auth, LuminaError, Result};
use crate::operation::Operation;
use crate::request::{ApiKey, GenerationRequest};
use crate::service::VideoService;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// How often and for how long an operation is polled.
///
/// The interval is fixed. There is no backoff between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
    pub deadline: Option<Duration>,
    /// Extra tries for a single poll that failed with a transport error.
    pub transport_retries: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: Some(DEFAULT_MAX_ATTEMPTS),
            deadline: None,
            transport_retries: 0,
        }
    }
}

/// Progress report for a poll that came back not done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollAttempt {
    pub attempt: u32,
    pub elapsed: Duration,
}

/// Abandons an in-flight wait. Cloned handles share the same flag.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [`CancelToken::cancel`] has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Run `work` unless cancelled first. Cancelling while it runs drops it.
    pub async fn guard<T>(&self, work: impl Future<Output = Result<T>>) -> Result<T> {
        if self.is_cancelled() {
            return Err(LuminaError::Cancelled);
        }
        tokio::select! {
            result = work => result,
            _ = self.cancelled() => Err(LuminaError::Cancelled),
        }
    }
}

/// Drives a remote operation from submission to a terminal state.
pub struct Poller<'a, S: VideoService + ?Sized> {
    service: &'a S,
    policy: PollPolicy,
}

impl<'a, S: VideoService + ?Sized> Poller<'a, S> {
    pub fn new(service: &'a S, policy: PollPolicy) -> Self {
        Self { service, policy }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    pub async fn submit(&self, request: &GenerationRequest, key: &ApiKey) -> Result<Operation> {
        let operation = self.service.submit(request, key).await?;
        info!("Submitted operation {}", operation.name);
        Ok(operation)
    }

    /// Refresh an operation. A finished operation is returned as-is without
    /// touching the network.
    pub async fn poll(&self, operation: &Operation, key: &ApiKey) -> Result<Operation> {
        if operation.done {
            return Ok(operation.clone());
        }
        self.service.poll(operation, key).await
    }

    /// Poll at a fixed cadence until the operation is done, the attempt or
    /// time budget runs out, or `cancel` fires.
    pub async fn await_completion<F>(
        &self,
        operation: Operation,
        key: &ApiKey,
        cancel: &CancelToken,
        mut on_pending: F,
    ) -> Result<Operation>
    where
        F: FnMut(PollAttempt) + Send,
    {
        let started = Instant::now();
        let mut current = operation;
        let mut attempts = 0u32;

        while !current.done {
            if cancel.is_cancelled() {
                info!("Polling of {} cancelled", current.name);
                return Err(LuminaError::Cancelled);
            }

            let elapsed = started.elapsed();
            let out_of_attempts = self.policy.max_attempts.is_some_and(|max| attempts >= max);
            let past_deadline = self.policy.deadline.is_some_and(|deadline| elapsed >= deadline);
            if out_of_attempts || past_deadline {
                warn!("Gave up on {} after {} polls", current.name, attempts);
                return Err(LuminaError::Timeout { attempts, elapsed });
            }

            self.wait(self.pause(started), cancel).await?;

            attempts += 1;
            current = self.poll_with_retries(&current, key, started, cancel).await?;
            debug!("Poll #{} of {}: done={}", attempts, current.name, current.done);

            if !current.done {
                on_pending(PollAttempt { attempt: attempts, elapsed: started.elapsed() });
            }
        }

        settle(current)
    }

    /// One interval, cut short so the last poll lands on the deadline.
    fn pause(&self, started: Instant) -> Duration {
        match self.policy.deadline {
            Some(deadline) => deadline.saturating_sub(started.elapsed()).min(self.policy.interval),
            None => self.policy.interval,
        }
    }

    async fn wait(&self, pause: Duration, cancel: &CancelToken) -> Result<()> {
        tokio::select! {
            _ = sleep(pause) => Ok(()),
            _ = cancel.cancelled() => Err(LuminaError::Cancelled),
        }
    }

    async fn poll_with_retries(
        &self,
        operation: &Operation,
        key: &ApiKey,
        started: Instant,
        cancel: &CancelToken,
    ) -> Result<Operation> {
        let mut retries_left = self.policy.transport_retries;
        loop {
            match self.poll(operation, key).await {
                Err(err) if err.is_retryable() && retries_left > 0 => {
                    retries_left -= 1;
                    warn!("Poll of {} failed ({}), {} retries left", operation.name, err, retries_left);
                    self.wait(self.pause(started), cancel).await?;
                }
                other => return other,
            }
        }
    }
}

/// Turn a failed terminal operation into the matching error.
fn settle(operation: Operation) -> Result<Operation> {
    let Some(info) = operation.error() else {
        return Ok(operation);
    };

    let status = info.status.as_deref().unwrap_or_default();
    if status == "PERMISSION_DENIED" || status == "UNAUTHENTICATED" || looks_like_auth(&info.message) {
        return Err(LuminaError::Auth(info.message.clone()));
    }

    Err(LuminaError::OperationFailed {
        code: info.code,
        message: info.message.clone(),
    })
}
