//! Durable outbox for submissions made while disconnected.
//!
//! Entries move `pending -> synced` on confirmed delivery or
//! `pending -> failed` on rejection; failed entries are retained and
//! re-attempted on the next drain, so delivery is at-least-once, never
//! silently dropped. Enqueue failure is the one local-storage error that
//! propagates to the caller: it means the submission may be lost.

use chrono::{DateTime, Utc};
use rusqlite::{params, types::Type, Row};
use std::sync::Arc;

use crate::error::StoreError;
use crate::model::{NewSubmission, PendingSubmission, SubmissionPayload, SubmissionStatus};
use crate::store::{millis_to_datetime, LocalStore};

#[derive(Clone)]
pub struct Outbox {
  store: Arc<LocalStore>,
}

impl Outbox {
  pub fn new(store: Arc<LocalStore>) -> Self {
    Self { store }
  }

  /// Append a submission and return its local queue id immediately, so the
  /// caller can show "queued" feedback without waiting on the network.
  pub fn enqueue(&self, submission: &NewSubmission) -> Result<i64, StoreError> {
    let payload = serde_json::to_vec(&submission.payload)?;
    let conn = self.store.lock()?;

    conn.execute(
      "INSERT INTO pending_submissions
         (assignment_id, student_id, payload, due_at, created_at, status)
       VALUES (?, ?, ?, ?, ?, 'pending')",
      params![
        submission.assignment_id,
        submission.student_id,
        payload,
        submission.due_at.map(|d| d.to_rfc3339()),
        Utc::now().timestamp_millis()
      ],
    )?;

    Ok(conn.last_insert_rowid())
  }

  /// Entries still awaiting confirmed delivery (pending and failed alike),
  /// in enqueue order.
  pub fn unsynced(&self) -> Result<Vec<PendingSubmission>, StoreError> {
    let conn = self.store.lock()?;

    let mut stmt = conn.prepare(
      "SELECT id, assignment_id, student_id, payload, due_at, created_at, status, last_error
       FROM pending_submissions
       WHERE status != 'synced'
       ORDER BY id",
    )?;

    let entries = stmt
      .query_map([], row_to_entry)?
      .collect::<Result<Vec<_>, _>>()?;

    Ok(entries)
  }

  pub fn mark_synced(&self, id: i64) -> Result<(), StoreError> {
    let conn = self.store.lock()?;
    conn.execute(
      "UPDATE pending_submissions SET status = 'synced', last_error = NULL WHERE id = ?",
      params![id],
    )?;
    Ok(())
  }

  pub fn mark_failed(&self, id: i64, message: &str) -> Result<(), StoreError> {
    let conn = self.store.lock()?;
    conn.execute(
      "UPDATE pending_submissions SET status = 'failed', last_error = ? WHERE id = ?",
      params![message, id],
    )?;
    Ok(())
  }

  /// Delete delivered entries so the queue does not grow without bound.
  /// Returns how many rows were removed.
  pub fn sweep_synced(&self) -> Result<usize, StoreError> {
    let conn = self.store.lock()?;
    let deleted = conn.execute("DELETE FROM pending_submissions WHERE status = 'synced'", [])?;
    Ok(deleted)
  }

  /// Entries not yet delivered; drives the "N submissions pending"
  /// indicator.
  pub fn unsynced_count(&self) -> Result<u64, StoreError> {
    let conn = self.store.lock()?;
    let count: i64 = conn.query_row(
      "SELECT COUNT(*) FROM pending_submissions WHERE status != 'synced'",
      [],
      |row| row.get(0),
    )?;
    Ok(count as u64)
  }

  /// Total rows in the queue, whatever their status.
  pub fn count(&self) -> Result<u64, StoreError> {
    let conn = self.store.lock()?;
    let count: i64 =
      conn.query_row("SELECT COUNT(*) FROM pending_submissions", [], |row| row.get(0))?;
    Ok(count as u64)
  }
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<PendingSubmission> {
  let payload_blob: Vec<u8> = row.get(3)?;
  let payload: SubmissionPayload = serde_json::from_slice(&payload_blob)
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Blob, Box::new(e)))?;

  let due_at: Option<String> = row.get(4)?;
  let due_at = match due_at {
    Some(raw) => Some(
      DateTime::parse_from_rfc3339(&raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?,
    ),
    None => None,
  };

  let status_raw: String = row.get(6)?;
  let status = SubmissionStatus::parse(&status_raw).unwrap_or(SubmissionStatus::Pending);

  Ok(PendingSubmission {
    id: row.get(0)?,
    assignment_id: row.get(1)?,
    student_id: row.get(2)?,
    payload,
    due_at,
    created_at: millis_to_datetime(row.get(5)?),
    status,
    last_error: row.get(7)?,
  })
}
