mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;
use common::{key, output_dir, ScriptedService, OP_NAME, VIDEO_URI};
use lumina_core::{
    fetch_result, CancelToken, ErrorInfo, LuminaError, Operation, PollPolicy, Poller,
};

fn policy() -> PollPolicy {
    PollPolicy::default()
}

#[tokio::test(start_paused = true)]
async fn test_polls_until_done() {
    let service = ScriptedService::new().pending(2).then_video();
    let poller = Poller::new(&service, policy());
    let mut pending = Vec::new();

    let op = poller
        .await_completion(Operation::pending(OP_NAME), &key(), &CancelToken::new(), |a| pending.push(a))
        .await
        .unwrap();

    assert!(op.done);
    assert_eq!(op.asset_uri(), Some(VIDEO_URI));
    assert_eq!(service.poll_calls.load(Ordering::SeqCst), 3);
    assert_eq!(pending.iter().map(|a| a.attempt).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(pending[0].elapsed, Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_poll_on_done_operation_is_local() {
    let service = ScriptedService::new();
    let poller = Poller::new(&service, policy());
    let done = Operation::completed(OP_NAME, vec![VIDEO_URI.to_string()]);

    let first = poller.poll(&done, &key()).await.unwrap();
    let second = poller.poll(&first, &key()).await.unwrap();

    assert_eq!(first, done);
    assert_eq!(second, done);
    assert_eq!(service.poll_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_await_on_done_operation_does_not_poll() {
    let service = ScriptedService::new();
    let poller = Poller::new(&service, policy());
    let done = Operation::completed(OP_NAME, vec![VIDEO_URI.to_string()]);

    let op = poller.await_completion(done.clone(), &key(), &CancelToken::new(), |_| {}).await.unwrap();
    assert_eq!(op, done);
    assert_eq!(service.remote_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stuck_job_times_out() {
    let service = ScriptedService::stuck();
    let poller = Poller::new(&service, PollPolicy { max_attempts: Some(5), ..policy() });

    let err = poller
        .await_completion(Operation::pending(OP_NAME), &key(), &CancelToken::new(), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, LuminaError::Timeout { attempts: 5, .. }));
    assert_eq!(service.poll_calls.load(Ordering::SeqCst), 5);
}

#[tokio::test(start_paused = true)]
async fn test_deadline() {
    let service = ScriptedService::stuck();
    let poller = Poller::new(&service, PollPolicy {
        max_attempts: None,
        deadline: Some(Duration::from_secs(35)),
        ..policy()
    });

    let mut pending = Vec::new();

    let err = poller
        .await_completion(Operation::pending(OP_NAME), &key(), &CancelToken::new(), |a| pending.push(a))
        .await
        .unwrap_err();

    // Polls at 10, 20 and 30s, then a short wait lands the last one on the deadline
    let times: Vec<u64> = pending.iter().map(|a| a.elapsed.as_secs()).collect();
    assert_eq!(times, vec![10, 20, 30, 35]);
    match err {
        LuminaError::Timeout { attempts, elapsed } => {
            assert_eq!(attempts, 4);
            assert_eq!(elapsed, Duration::from_secs(35));
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_deadline_shorter_than_interval() {
    let service = ScriptedService::stuck();
    let poller = Poller::new(&service, PollPolicy {
        max_attempts: None,
        deadline: Some(Duration::from_secs(3)),
        ..policy()
    });
    let started = tokio::time::Instant::now();

    let err = poller
        .await_completion(Operation::pending(OP_NAME), &key(), &CancelToken::new(), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, LuminaError::Timeout { attempts: 1, .. }));
    assert_eq!(started.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_aborts_by_default() {
    let service = ScriptedService::new()
        .pending(1)
        .then(Err(LuminaError::Transport("connection reset".into())))
        .then_video();
    let poller = Poller::new(&service, policy());

    let err = poller
        .await_completion(Operation::pending(OP_NAME), &key(), &CancelToken::new(), |_| {})
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(service.poll_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_transport_retry_budget() {
    let service = ScriptedService::new()
        .then(Err(LuminaError::Transport("connection reset".into())))
        .then_video();
    let poller = Poller::new(&service, PollPolicy { transport_retries: 1, ..policy() });

    let op = poller
        .await_completion(Operation::pending(OP_NAME), &key(), &CancelToken::new(), |_| {})
        .await
        .unwrap();

    assert!(op.done);
    assert_eq!(service.poll_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_not_found_is_not_retried() {
    let service = ScriptedService::new().then(Err(LuminaError::NotFound(OP_NAME.into())));
    let poller = Poller::new(&service, PollPolicy { transport_retries: 3, ..policy() });

    let err = poller
        .await_completion(Operation::pending(OP_NAME), &key(), &CancelToken::new(), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, LuminaError::NotFound(_)));
    assert_eq!(service.poll_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_remote_failure_is_classified() {
    let service = ScriptedService::new().then(Ok(Operation::failed(OP_NAME, ErrorInfo {
        code: 3,
        message: "Prompt rejected by safety filters".into(),
        status: Some("INVALID_ARGUMENT".into()),
    })));
    let poller = Poller::new(&service, policy());

    let err = poller
        .await_completion(Operation::pending(OP_NAME), &key(), &CancelToken::new(), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, LuminaError::OperationFailed { code: 3, .. }));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_wait() {
    let service = ScriptedService::stuck();
    let poller = Poller::new(&service, PollPolicy { max_attempts: None, ..policy() });
    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    let key = key();

    let (result, _) = tokio::join!(
        poller.await_completion(Operation::pending(OP_NAME), &key, &cancel, |_| {}),
        async move {
            tokio::time::sleep(Duration::from_secs(25)).await;
            trigger.cancel();
        }
    );

    assert!(matches!(result, Err(LuminaError::Cancelled)));
    assert_eq!(service.poll_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_fetch_result_without_asset() {
    let service = ScriptedService::new();
    let done = Operation::completed(OP_NAME, Vec::new());

    let err = fetch_result(&service, &done, &key(), &output_dir()).await.unwrap_err();
    assert!(matches!(err, LuminaError::MissingResult));
    assert_eq!(service.downloads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_fetch_result_empty_body() {
    let service = ScriptedService::new().empty_download();
    let dir = output_dir();
    let done = Operation::completed(OP_NAME, vec![VIDEO_URI.to_string()]);

    let err = fetch_result(&service, &done, &key(), &dir).await.unwrap_err();
    assert!(matches!(err, LuminaError::MissingResult));
    assert_eq!(service.downloads.load(Ordering::SeqCst), 1);
    assert!(!dir.exists());
}

#[tokio::test]
async fn test_fetch_result_requires_done() {
    let service = ScriptedService::new();
    let err = fetch_result(&service, &Operation::pending(OP_NAME), &key(), &output_dir())
        .await
        .unwrap_err();
    assert!(matches!(err, LuminaError::Validation(_)));
}

#[tokio::test]
async fn test_fetch_result_writes_file() {
    let service = ScriptedService::new();
    let dir = output_dir();
    let done = Operation::completed(OP_NAME, vec![VIDEO_URI.to_string()]);

    let asset = fetch_result(&service, &done, &key(), &dir).await.unwrap();
    let path = asset.path().to_path_buf();
    assert!(path.exists());
    assert!(path.starts_with(&dir));
    assert!(!asset.is_empty());
    // The player is handed this path, so it must be a complete .mp4 on disk
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("mp4"));
    assert_eq!(std::fs::read(&path).unwrap().len(), asset.len());

    let copy = dir.join("copy.mp4");
    asset.save_as(&copy).await.unwrap();
    assert!(copy.exists());

    asset.release();
    assert!(!path.exists());
    std::fs::remove_dir_all(&dir).unwrap();
}
