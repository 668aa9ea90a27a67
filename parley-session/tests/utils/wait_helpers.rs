use parley_session::{SessionEvent, SessionHandle};
use std::time::Duration;

/// Timeout for event delivery within one process (ms).
pub const EVENT_TIMEOUT_MS: u64 = 5000;

/// Poll a predicate until it holds or the timeout elapses.
pub async fn wait_until<F>(mut check: F, timeout_ms: u64) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Next session event, or panic when none arrives in time.
pub async fn next_event(handle: &mut SessionHandle) -> SessionEvent {
    tokio::time::timeout(Duration::from_millis(EVENT_TIMEOUT_MS), handle.next_event())
        .await
        .expect("timed out waiting for session event")
        .expect("session event stream closed")
}

/// Drain events until one matches the predicate, or panic on timeout.
pub async fn wait_for_event<F>(handle: &mut SessionHandle, mut matches: F) -> SessionEvent
where
    F: FnMut(&SessionEvent) -> bool,
{
    loop {
        let event = next_event(handle).await;
        tracing::debug!("[test] session event: {:?}", event);
        if matches(&event) {
            return event;
        }
    }
}
