//! Periodic run loop.
//!
//! One pass per cycle, then sleep for the interval. Cancellation is checked
//! between passes only: a pass that has started always runs to completion,
//! while the sleep is cut short as soon as the token is cancelled.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::sync::engine::SyncEngine;

/// Outcome of a run loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Passes attempted, including failed ones.
    pub passes: usize,
    /// Passes that were aborted or panicked.
    pub failed_passes: usize,
}

/// Drives a `SyncEngine` until cancelled.
pub struct SyncRunner {
    engine: Arc<SyncEngine>,
    interval: Duration,
    shutdown: CancellationToken,
    max_passes: Option<usize>,
}

impl SyncRunner {
    pub fn new(engine: SyncEngine, interval: Duration, shutdown: CancellationToken) -> Self {
        Self {
            engine: Arc::new(engine),
            interval,
            shutdown,
            max_passes: None,
        }
    }

    /// Stop after `passes` cycles even without cancellation.
    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = Some(passes);
        self
    }

    /// Run passes until the shutdown token is cancelled.
    pub async fn run(&self) -> RunSummary {
        let mut summary = RunSummary::default();

        info!(
            "Sync started: {} -> {} every {}s",
            self.engine.source().display(),
            self.engine.replica().display(),
            self.interval.as_secs()
        );

        while !self.shutdown.is_cancelled() {
            if !self.run_pass().await {
                summary.failed_passes += 1;
            }
            summary.passes += 1;

            if self.max_passes.is_some_and(|max| summary.passes >= max) {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.shutdown.cancelled() => {}
            }
        }

        info!("Sync process terminated.");
        summary
    }

    /// One pass on the blocking pool. Returns false if the pass did not complete.
    async fn run_pass(&self) -> bool {
        let engine = Arc::clone(&self.engine);

        match tokio::task::spawn_blocking(move || engine.synchronize()).await {
            Ok(Ok(stats)) => {
                if stats.is_clean() {
                    debug!("Sync pass complete: {}", stats.summary());
                } else {
                    info!("Sync pass complete: {}", stats.summary());
                }
                true
            }
            Ok(Err(err)) => {
                error!("Sync pass aborted: {}", err);
                false
            }
            Err(err) => {
                error!("Unexpected error during sync: {}", err);
                false
            }
        }
    }
}
