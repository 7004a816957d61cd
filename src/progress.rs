//! Progress UI (spinner) for long-running rebuilds.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spawns the spinner when requested.
/// Returns (handle, stop) so the caller can signal stop and await the handle.
/// When `use_spinner` is false, returns (None, stop) with stop already true.
pub(crate) fn spawn_progress_ui(
    use_spinner: bool,
    message: &str,
) -> (Option<tokio::task::JoinHandle<()>>, Arc<AtomicBool>) {
    if !use_spinner {
        return (None, Arc::new(AtomicBool::new(true)));
    }
    let stop = Arc::new(AtomicBool::new(false));
    let handle = spawn_spinner_inner(message.to_string(), Arc::clone(&stop));
    (Some(handle), stop)
}

fn spawn_spinner_inner(message: String, stop: Arc<AtomicBool>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(100));

        while !stop.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(120)).await;
        }

        spinner.finish_and_clear();
    })
}

/// Signals the spinner to stop and waits for it to clear the line.
pub(crate) async fn stop_progress_ui(
    handle: Option<tokio::task::JoinHandle<()>>,
    stop: &AtomicBool,
) {
    stop.store(true, Ordering::SeqCst);
    if let Some(handle) = handle {
        let _ = handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::{spawn_progress_ui, stop_progress_ui};
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn spawn_progress_ui_when_disabled_returns_none_handle_and_stop_already_true() {
        let (handle, stop) = spawn_progress_ui(false, "rebuilding");

        assert!(handle.is_none());
        assert!(
            stop.load(Ordering::SeqCst),
            "stop signal should be true when spinner disabled"
        );
    }

    #[tokio::test]
    async fn spawn_progress_ui_when_enabled_stops_on_signal() {
        let (handle, stop) = spawn_progress_ui(true, "rebuilding");

        assert!(handle.is_some(), "handle should be Some when spinner enabled");
        assert!(!stop.load(Ordering::SeqCst), "stop should be false initially");

        stop_progress_ui(handle, &stop).await;
        assert!(stop.load(Ordering::SeqCst));
    }
}
