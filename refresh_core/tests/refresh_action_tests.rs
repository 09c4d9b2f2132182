use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use refresh_core::config::RefreshConfig;
use refresh_core::refresher::refresh_action::{cancellable_delay, RefreshAction};
use refresh_core::refresher::strategy::refresh_handler::RefreshHandler;
use refresh_core::status::{RecordingObserver, StatusHolder};
use refresh_core::types::types::{RefreshError, RefreshPhase};

/// Helper: an action with the reference 2s delay and a recorder attached.
fn make_action() -> (Arc<RefreshAction>, Arc<RecordingObserver>) {
    let action = Arc::new(RefreshAction::new(RefreshConfig::default()));
    let recorder = Arc::new(RecordingObserver::new());
    action.status().add_observer(recorder.clone());
    (action, recorder)
}

const ENTER: &str = "refresh_action: enter";
const LEAVE: &str = "refresh_action: leave";
const CANCELLED: &str = "refresh_action: operation cancelled";

// ---------------------------------------------------------------
// cancellable_delay
// ---------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_delay_elapses_without_cancellation() {
    let token = CancellationToken::new();
    let start = tokio::time::Instant::now();

    cancellable_delay(Duration::from_secs(2), &token).await.unwrap();

    assert!(start.elapsed() >= Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_delay_stops_at_cancellation() {
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        canceller.cancel();
    });

    let start = tokio::time::Instant::now();
    let err = cancellable_delay(Duration::from_secs(2), &token).await.unwrap_err();

    assert!(err.is_cancelled());
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_precancelled_token_wins_over_zero_delay() {
    let token = CancellationToken::new();
    token.cancel();

    let result = cancellable_delay(Duration::ZERO, &token).await;
    assert!(matches!(result, Err(RefreshError::Cancelled)));
}

// ---------------------------------------------------------------
// RefreshAction::run
// ---------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_run_enter_then_leave_after_delay() {
    let (action, recorder) = make_action();

    let phase = action.run(CancellationToken::new()).await;

    assert_eq!(phase, RefreshPhase::Left);
    assert_eq!(recorder.values(), vec![ENTER.to_string(), LEAVE.to_string()]);

    let entered = recorder.offset_of(ENTER).unwrap();
    let left = recorder.offset_of(LEAVE).unwrap();
    assert!(left - entered >= Duration::from_secs(2), "leave came {:?} after enter", left - entered);
}

#[tokio::test(start_paused = true)]
async fn test_enter_is_written_before_first_suspension() {
    let (action, _recorder) = make_action();
    let status = action.status().clone();

    let task = tokio::spawn({
        let action = action.clone();
        async move { action.run(CancellationToken::new()).await }
    });

    // Let the task run up to its delay, then look before any time passes.
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
    assert_eq!(status.get_status(), ENTER);

    tokio::time::sleep(Duration::from_millis(1999)).await;
    assert_eq!(status.get_status(), ENTER);

    assert_eq!(task.await.unwrap(), RefreshPhase::Left);
    assert_eq!(status.get_status(), LEAVE);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_during_delay_reports_failure() {
    let (action, recorder) = make_action();
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        canceller.cancel();
    });

    let phase = action.run(token).await;

    assert_eq!(phase, RefreshPhase::Failed);
    assert_eq!(recorder.values(), vec![ENTER.to_string(), CANCELLED.to_string()]);
    assert!(!recorder.values().iter().any(|v| v == LEAVE));

    let snap = action.status().snapshot();
    assert_eq!(snap.phase, Some(RefreshPhase::Failed));
    assert!(snap.value.contains("cancelled"));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_after_leave_changes_nothing() {
    let (action, recorder) = make_action();
    let token = CancellationToken::new();

    action.run(token.clone()).await;
    token.cancel();
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(recorder.values(), vec![ENTER.to_string(), LEAVE.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_sequential_invocations_are_independent() {
    let (action, recorder) = make_action();

    assert_eq!(action.run(CancellationToken::new()).await, RefreshPhase::Left);
    assert_eq!(action.run(CancellationToken::new()).await, RefreshPhase::Left);

    assert_eq!(
        recorder.values(),
        vec![ENTER.to_string(), LEAVE.to_string(), ENTER.to_string(), LEAVE.to_string()]
    );

    let snaps = recorder.snapshots();
    assert_eq!(snaps[0].invocation, snaps[1].invocation);
    assert_eq!(snaps[2].invocation, snaps[3].invocation);
    assert_ne!(snaps[0].invocation, snaps[2].invocation);
    assert_eq!(
        snaps.iter().map(|s| s.seq).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
}

#[tokio::test(start_paused = true)]
async fn test_custom_operation_and_delay() {
    let config = RefreshConfig::default()
        .with_operation("reload")
        .with_delay(Duration::from_millis(100));
    let action = RefreshAction::new(config);
    let recorder = Arc::new(RecordingObserver::new());
    action.status().add_observer(recorder.clone());

    action.run(CancellationToken::new()).await;

    assert_eq!(recorder.values(), vec!["reload: enter".to_string(), "reload: leave".to_string()]);
    assert!(recorder.offset_of("reload: leave").unwrap() >= Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn test_shared_holder_is_used() {
    let holder = Arc::new(StatusHolder::new("placeholder"));
    let action = RefreshAction::with_status(holder.clone(), RefreshConfig::default());

    assert_eq!(holder.get_status(), "placeholder");
    action.run(CancellationToken::new()).await;
    assert_eq!(holder.get_status(), LEAVE);
}

#[tokio::test(start_paused = true)]
async fn test_handler_trait_never_surfaces_failure() {
    let (action, _recorder) = make_action();
    let handler: Arc<dyn RefreshHandler> = action.clone();
    let token = CancellationToken::new();
    token.cancel();

    // Returns `()` even though the delay was cancelled.
    handler.refresh(token).await;

    assert_eq!(action.status().get_status(), CANCELLED);
}
