//! Error taxonomy for the offline layer.
//!
//! Connectivity, remote-application, and local-store failures are distinct
//! types so callers can react differently: connectivity problems fall back
//! to cache or outbox, remote rejections pass through untouched, and store
//! failures degrade to "cache unavailable" everywhere except the outbox.

use thiserror::Error;

/// Failures of the embedded local store.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("failed to open local store: {0}")]
  Open(String),

  #[error("local store error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("failed to serialize cached record: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error("local store lock poisoned")]
  LockPoisoned,
}

/// Transport-level failure of a remote call.
///
/// Treated identically to being offline: reads fall back to the cache,
/// submission writes fall back to the outbox.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
  #[error("network request failed: {0}")]
  Failed(String),

  #[error("network request timed out")]
  TimedOut,
}

/// Why an offline-aware read could not produce data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
  /// The backend answered with a business-level error (validation,
  /// permission, not-found). Passed through verbatim; never triggers cache
  /// fallback, so a real rejection is never masked by stale data.
  #[error("remote error: {0}")]
  Remote(String),

  /// Offline (or the call failed in transit) and nothing usable is cached.
  #[error("offline and no cached copy is available")]
  Unavailable,
}

/// Why a submission write failed outright.
#[derive(Debug, Error)]
pub enum SubmitError {
  /// The backend looked at the submission and rejected it. Queuing would
  /// not help, so this is surfaced instead.
  #[error("submission rejected: {0}")]
  Rejected(String),

  /// The outbox itself could not be written. The one local-storage failure
  /// that must reach the user, because it means the submission may be lost.
  #[error("could not queue submission: {0}")]
  Outbox(#[from] StoreError),
}

/// Configuration file problems.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("config file not found: {0}")]
  NotFound(String),

  #[error("failed to read config file {path}: {source}")]
  Read {
    path: String,
    source: std::io::Error,
  },

  #[error("failed to parse config file {path}: {source}")]
  Parse {
    path: String,
    source: serde_yaml::Error,
  },
}
