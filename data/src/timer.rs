use std::time::Duration;

use tokio::time;
use tokio_util::sync::{CancellationToken, DropGuard};

/// A one-shot timer. The callback runs at most once, and not at all if the
/// deadline is cancelled or dropped before it expires.
#[derive(Debug)]
pub struct Deadline {
    _guard: DropGuard,
}

impl Deadline {
    /// Must be called from within a Tokio runtime.
    pub fn after<F>(duration: Duration, on_expiry: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancelled.cancelled() => {}
                () = time::sleep(duration) => on_expiry(),
            }
        });

        Self {
            _guard: token.drop_guard(),
        }
    }
}
