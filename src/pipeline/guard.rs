// ABOUTME: Cancellation and deadline enforcement for the forward steps of a run.
// ABOUTME: A child token fires on Ctrl-C (via the parent) or when the deadline elapses.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const CANCELLED: &str = "cancelled";
pub const DEADLINE_EXCEEDED: &str = "deadline exceeded";

/// Aborts guarded work when the run is cancelled or out of time.
#[derive(Debug)]
pub struct RunGuard {
    parent: CancellationToken,
    token: CancellationToken,
    timer: Option<JoinHandle<()>>,
}

impl RunGuard {
    pub fn new(parent: &CancellationToken, deadline: Option<Duration>) -> Self {
        let token = parent.child_token();
        let timer = deadline.map(|deadline| {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(deadline).await;
                tracing::warn!("run deadline of {:?} exceeded", deadline);
                token.cancel();
            })
        });

        Self {
            parent: parent.clone(),
            token,
            timer,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Why guarded work stopped.
    pub fn reason(&self) -> &'static str {
        if self.parent.is_cancelled() {
            CANCELLED
        } else {
            DEADLINE_EXCEEDED
        }
    }

    /// Run `fut` unless the guard fires first. Errors become step reasons.
    pub async fn run<T, E, F>(&self, fut: F) -> Result<T, String>
    where
        E: Display,
        F: Future<Output = Result<T, E>>,
    {
        if self.token.is_cancelled() {
            return Err(self.reason().to_string());
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(self.reason().to_string()),
            result = fut => result.map_err(|e| e.to_string()),
        }
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
