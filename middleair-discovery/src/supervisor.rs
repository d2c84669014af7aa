//! Supervisor: wrap a long-running task so a panic or abnormal return is
//! logged and the task restarted, with exponential backoff on repeated
//! failures (§4.3 "Supervisor behavior", §9 "Panic-caught restart loops",
//! SPEC_FULL §10.4). Mirrors the reconnect-on-error loop in
//! `layer_client::Client::run_update_loop`, generalized to catch panics too.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;

const INITIAL_BACKOFF: Duration = Duration::from_millis(100);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Run `make_attempt()` in a loop forever. Each attempt is one "pass"; on
/// `Ok(())` the backoff resets and the next pass starts immediately. On
/// `Err` or panic, the failure is logged and the task sleeps for a
/// doubling backoff (capped) before retrying.
pub async fn spawn_supervised<F, Fut>(name: &str, mut make_attempt: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), String>>,
{
    let mut backoff = INITIAL_BACKOFF;
    loop {
        let outcome = AssertUnwindSafe(make_attempt()).catch_unwind().await;
        match outcome {
            Ok(Ok(())) => {
                backoff = INITIAL_BACKOFF;
                continue;
            }
            Ok(Err(message)) => {
                tracing::warn!(task = name, error = %message, "task returned an error, restarting");
            }
            Err(panic) => {
                let message = panic_message(&panic);
                tracing::error!(task = name, panic = %message, "task panicked, restarting");
            }
        }
        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
