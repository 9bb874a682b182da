//! Call contracts toward the remote backend.
//!
//! The backend itself is an external collaborator; this layer only knows
//! the `{data, error}` reply shape its calls resolve to, and treats the
//! error payload as opaque beyond "present means rejected".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::model::{NewSubmission, SubmissionReceipt};

/// The `{data, error}` reply every backend call resolves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply<T> {
  pub data: Option<T>,
  pub error: Option<String>,
}

impl<T> Reply<T> {
  pub fn ok(data: T) -> Self {
    Self {
      data: Some(data),
      error: None,
    }
  }

  pub fn err(message: impl Into<String>) -> Self {
    Self {
      data: None,
      error: Some(message.into()),
    }
  }
}

/// Transport result of a backend call. `Err` is the "request never
/// completed" case (connection refused, timeout); `Ok` carries the
/// backend's own reply, which may still hold an application error.
pub type RemoteResult<T> = Result<Reply<T>, TransportError>;

/// Write path toward the backend, replayed by the sync manager.
#[async_trait]
pub trait SubmissionBackend: Send + Sync {
  /// Deliver one submission. A transport `Err` leaves the entry queued for
  /// a later pass; an application error in the reply marks it failed.
  async fn submit(&self, submission: &NewSubmission) -> RemoteResult<SubmissionReceipt>;
}
