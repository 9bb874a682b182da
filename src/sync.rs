//! Sync manager: routes submissions into the outbox when the backend is
//! unreachable and replays queued entries once connectivity returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::connectivity::{ConnectivityHandle, ConnectivityMonitor};
use crate::error::SubmitError;
use crate::model::{NewSubmission, SubmissionReceipt};
use crate::outbox::Outbox;
use crate::remote::SubmissionBackend;

pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Tally of one drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
  pub attempted: usize,
  pub synced: usize,
  pub failed: usize,
}

/// Replays the outbox against the backend.
pub struct SyncManager<B> {
  outbox: Outbox,
  backend: Arc<B>,
  timeout: Duration,
  draining: AtomicBool,
}

impl<B: SubmissionBackend> SyncManager<B> {
  pub fn new(outbox: Outbox, backend: Arc<B>) -> Self {
    Self {
      outbox,
      backend,
      timeout: DEFAULT_WRITE_TIMEOUT,
      draining: AtomicBool::new(false),
    }
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  /// One delivery pass over the snapshot of unsynced entries taken at
  /// entry. Each entry is attempted and marked independently, so one
  /// failing item never aborts the batch; delivered entries are swept at
  /// the end. Entries enqueued after the snapshot wait for the next drain.
  ///
  /// Overlapping calls are serialized: a `drain()` while another is in
  /// flight is a no-op, so no entry is ever double-submitted by two
  /// concurrent passes.
  pub async fn drain(&self) -> DrainReport {
    if self.draining.swap(true, Ordering::AcqRel) {
      debug!("drain already in flight, skipping");
      return DrainReport::default();
    }
    let _guard = DrainGuard(&self.draining);

    let entries = match self.outbox.unsynced() {
      Ok(entries) => entries,
      Err(e) => {
        // Store unavailable: leave every entry untouched for the next
        // trigger rather than failing loudly.
        warn!(error = %e, "outbox unavailable, drain skipped");
        return DrainReport::default();
      }
    };

    let mut report = DrainReport {
      attempted: entries.len(),
      ..DrainReport::default()
    };

    for entry in &entries {
      let draft = entry.draft();
      match tokio::time::timeout(self.timeout, self.backend.submit(&draft)).await {
        Ok(Ok(reply)) => {
          if let Some(message) = reply.error {
            self.record_failure(entry.id, &message, &mut report);
          } else {
            match self.outbox.mark_synced(entry.id) {
              Ok(()) => {
                debug!(id = entry.id, assignment = %entry.assignment_id, "submission delivered");
                report.synced += 1;
              }
              Err(e) => {
                // Delivered remotely but not recorded locally; the next
                // drain re-submits it (at-least-once delivery).
                warn!(id = entry.id, error = %e, "delivered but could not mark synced");
                report.failed += 1;
              }
            }
          }
        }
        Ok(Err(e)) => self.record_failure(entry.id, &e.to_string(), &mut report),
        Err(_) => self.record_failure(entry.id, "network request timed out", &mut report),
      }
    }

    if report.synced > 0 {
      if let Err(e) = self.outbox.sweep_synced() {
        warn!(error = %e, "sweep after drain failed");
      }
    }

    info!(
      attempted = report.attempted,
      synced = report.synced,
      failed = report.failed,
      "drain pass finished"
    );
    report
  }

  fn record_failure(&self, id: i64, message: &str, report: &mut DrainReport) {
    report.failed += 1;
    if let Err(e) = self.outbox.mark_failed(id, message) {
      warn!(id, error = %e, "could not record delivery failure");
    }
  }
}

struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
  fn drop(&mut self) {
    self.0.store(false, Ordering::Release);
  }
}

/// Drive the sync manager from connectivity transitions: exactly one drain
/// per offline -> online flip, none while offline. Reads do not subscribe
/// here; they check the current boolean per call instead.
pub fn spawn_autosync<B>(
  monitor: &ConnectivityMonitor,
  manager: Arc<SyncManager<B>>,
) -> tokio::task::JoinHandle<()>
where
  B: SubmissionBackend + 'static,
{
  let mut rx = monitor.subscribe();
  tokio::spawn(async move {
    let mut was_online = *rx.borrow();
    while rx.changed().await.is_ok() {
      let online = *rx.borrow_and_update();
      if online && !was_online {
        manager.drain().await;
      }
      was_online = online;
    }
  })
}

/// Outcome of a submission write.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
  /// Accepted by the backend right away.
  Delivered(SubmissionReceipt),
  /// Stored in the outbox; delivered on the next drain.
  Queued { local_id: i64 },
}

/// Write path for assignment submissions: direct delivery when online,
/// outbox fallback on transport failure, timeout, or while offline.
pub struct Submissions<B> {
  connectivity: ConnectivityHandle,
  outbox: Outbox,
  backend: Arc<B>,
  timeout: Duration,
}

impl<B: SubmissionBackend> Submissions<B> {
  pub fn new(connectivity: ConnectivityHandle, outbox: Outbox, backend: Arc<B>) -> Self {
    Self {
      connectivity,
      outbox,
      backend,
      timeout: DEFAULT_WRITE_TIMEOUT,
    }
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  /// Submit an assignment. A backend rejection surfaces as
  /// [`SubmitError::Rejected`] without queuing: the backend saw the
  /// submission and said no, so retrying the same bytes would not help.
  /// Enqueue failure also surfaces, loudly, because it means the
  /// submission may be lost.
  pub async fn create(&self, submission: NewSubmission) -> Result<SubmitOutcome, SubmitError> {
    if self.connectivity.is_online() {
      match tokio::time::timeout(self.timeout, self.backend.submit(&submission)).await {
        Ok(Ok(reply)) => {
          if let Some(message) = reply.error {
            return Err(SubmitError::Rejected(message));
          }
          return Ok(SubmitOutcome::Delivered(reply.data.unwrap_or_default()));
        }
        Ok(Err(e)) => {
          debug!(error = %e, "direct submit failed, queueing");
        }
        Err(_) => {
          debug!("direct submit timed out, queueing");
        }
      }
    }

    let local_id = self.outbox.enqueue(&submission)?;
    info!(
      local_id,
      assignment = %submission.assignment_id,
      "submission queued for sync"
    );
    Ok(SubmitOutcome::Queued { local_id })
  }
}
