//! Processing status poller.
//!
//! A spawned task requests `GET /api/status/{id}` once per interval and
//! forwards what it sees over a channel. The task ends on its own after a
//! terminal status or after too many consecutive failures, and is aborted
//! when its [`PollHandle`] is dropped.

use crate::api::StudioClient;
use shared::config::PollingConfig;
use shared::{ProcessingStatus, RecordId};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Something the poll task observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// A status response arrived
    Status {
        status: ProcessingStatus,
        error_message: Option<String>,
    },
    /// The status endpoint failed `failures` times in a row; polling stopped
    Stalled { failures: u32, last_error: String },
}

/// Owner of a running poll task.
///
/// Dropping the handle aborts the task, after which no further request is
/// issued and no further event is delivered.
#[derive(Debug)]
pub struct PollHandle {
    events: mpsc::Receiver<PollEvent>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Wait for the next event; `None` once the task has stopped
    pub async fn next(&mut self) -> Option<PollEvent> {
        self.events.recv().await
    }

    /// Stop polling now
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// tokio intervals need a non-zero period
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Poll task settings
#[derive(Debug, Clone, Copy)]
pub struct StatusPoller {
    period: Duration,
    max_consecutive_failures: u32,
}

impl StatusPoller {
    pub fn new(config: &PollingConfig) -> Self {
        Self {
            period: config.interval().max(MIN_PERIOD),
            max_consecutive_failures: config.max_consecutive_failures.max(1),
        }
    }

    /// Start polling the status of `video_id`.
    ///
    /// The first request is made one full period after this call.
    pub fn spawn(&self, client: StudioClient, video_id: RecordId) -> PollHandle {
        let (tx, rx) = mpsc::channel(1);
        let period = self.period;
        let max_failures = self.max_consecutive_failures;

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut failures = 0u32;

            loop {
                ticker.tick().await;
                debug!(video_id = %video_id, "Polling processing status");

                let event = match client.get_status(&video_id).await {
                    Ok(response) => {
                        failures = 0;
                        PollEvent::Status {
                            status: response.status,
                            error_message: response.error_message,
                        }
                    }
                    Err(e) => {
                        failures += 1;
                        warn!(
                            video_id = %video_id,
                            failures,
                            error = %e,
                            "Status poll failed"
                        );
                        if failures < max_failures {
                            continue;
                        }
                        PollEvent::Stalled {
                            failures,
                            last_error: e.to_string(),
                        }
                    }
                };

                let finished = match &event {
                    PollEvent::Status { status, .. } => status.is_terminal(),
                    PollEvent::Stalled { .. } => true,
                };

                if tx.send(event).await.is_err() || finished {
                    break;
                }
            }

            info!(video_id = %video_id, "Status polling stopped");
        });

        PollHandle { events: rx, task }
    }
}
