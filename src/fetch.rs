//! Network-first read strategy with cache fallback.
//!
//! Network-first is deliberate: course and grade data changes often and
//! staleness is costly, so the cache exists for resilience, not as the
//! primary path. The outcome keeps "served from cache" as a first-class
//! variant so the UI can warn that data may be outdated.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::connectivity::ConnectivityHandle;
use crate::error::FetchError;
use crate::remote::RemoteResult;

pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(15);

/// Outcome of an offline-aware read.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
  /// Fresh data straight from the backend.
  Network(T),
  /// Served from the local cache; may be stale.
  CacheHit(T),
  /// No data: the backend rejected the request, or we are offline with
  /// nothing cached.
  Failed(FetchError),
}

impl<T> FetchOutcome<T> {
  pub fn data(&self) -> Option<&T> {
    match self {
      FetchOutcome::Network(data) | FetchOutcome::CacheHit(data) => Some(data),
      FetchOutcome::Failed(_) => None,
    }
  }

  pub fn into_data(self) -> Option<T> {
    match self {
      FetchOutcome::Network(data) | FetchOutcome::CacheHit(data) => Some(data),
      FetchOutcome::Failed(_) => None,
    }
  }

  pub fn is_from_cache(&self) -> bool {
    matches!(self, FetchOutcome::CacheHit(_))
  }
}

/// Decides, per read, whether to trust the network or the cache, and keeps
/// the cache warm as a side effect of successful network reads.
#[derive(Clone)]
pub struct ReadThrough {
  connectivity: ConnectivityHandle,
  timeout: Duration,
}

impl ReadThrough {
  pub fn new(connectivity: ConnectivityHandle) -> Self {
    Self {
      connectivity,
      timeout: DEFAULT_READ_TIMEOUT,
    }
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  /// Network-first fetch.
  ///
  /// 1. Online: run `network` under the read timeout. Data without an
  ///    error is returned as [`FetchOutcome::Network`], with `cache_set`
  ///    spawned as a detached task the result never waits on.
  /// 2. A reply carrying an application error is passed through as
  ///    [`FetchError::Remote`] with no cache fallback, so a validation
  ///    failure is never hidden behind stale data.
  /// 3. Transport failure, timeout, or being offline falls back to
  ///    `cache_get`: a hit is [`FetchOutcome::CacheHit`], a miss is
  ///    [`FetchError::Unavailable`]. The network closure is never invoked
  ///    while offline.
  pub async fn fetch<T, N, NF, G, S>(
    &self,
    network: N,
    cache_get: G,
    cache_set: Option<S>,
  ) -> FetchOutcome<T>
  where
    T: Clone + Send + 'static,
    N: FnOnce() -> NF,
    NF: Future<Output = RemoteResult<T>>,
    G: FnOnce() -> Option<T>,
    S: FnOnce(T) + Send + 'static,
  {
    if self.connectivity.is_online() {
      match tokio::time::timeout(self.timeout, network()).await {
        Ok(Ok(reply)) => {
          if let Some(message) = reply.error {
            return FetchOutcome::Failed(FetchError::Remote(message));
          }
          if let Some(data) = reply.data {
            if let Some(set) = cache_set {
              // Best-effort side effect; the setter logs its own failures.
              let copy = data.clone();
              tokio::spawn(async move { set(copy) });
            }
            return FetchOutcome::Network(data);
          }
          debug!("backend reply carried neither data nor error, trying cache");
        }
        Ok(Err(e)) => {
          debug!(error = %e, "network call failed, trying cache");
        }
        Err(_) => {
          warn!(timeout_ms = self.timeout.as_millis() as u64, "network call timed out, trying cache");
        }
      }
    }

    match cache_get() {
      Some(data) => FetchOutcome::CacheHit(data),
      None => FetchOutcome::Failed(FetchError::Unavailable),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::connectivity::ConnectivityMonitor;
  use crate::remote::Reply;
  use crate::TransportError;

  fn wrapper(online: bool) -> ReadThrough {
    ReadThrough::new(ConnectivityMonitor::new(online).handle())
  }

  #[tokio::test]
  async fn online_success_is_network() {
    let outcome = wrapper(true)
      .fetch(
        || async { Ok(Reply::ok(vec![1, 2])) },
        || None,
        None::<fn(Vec<i32>)>,
      )
      .await;

    assert_eq!(outcome, FetchOutcome::Network(vec![1, 2]));
    assert!(!outcome.is_from_cache());
  }

  #[tokio::test]
  async fn offline_never_invokes_network() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let called = Arc::new(AtomicBool::new(false));
    let seen = Arc::clone(&called);

    let outcome = wrapper(false)
      .fetch(
        move || async move {
          seen.store(true, Ordering::SeqCst);
          Ok(Reply::ok(0))
        },
        || Some(7),
        None::<fn(i32)>,
      )
      .await;

    assert_eq!(outcome, FetchOutcome::CacheHit(7));
    assert!(!called.load(Ordering::SeqCst));
  }

  #[tokio::test]
  async fn offline_without_cache_is_unavailable() {
    let outcome: FetchOutcome<i32> = wrapper(false)
      .fetch(
        || async { Ok(Reply::ok(0)) },
        || None,
        None::<fn(i32)>,
      )
      .await;

    assert_eq!(outcome, FetchOutcome::Failed(FetchError::Unavailable));
  }

  #[tokio::test]
  async fn transport_failure_falls_back_to_cache() {
    let outcome = wrapper(true)
      .fetch(
        || async { Err(TransportError::Failed("connection reset".into())) },
        || Some("cached".to_string()),
        None::<fn(String)>,
      )
      .await;

    assert_eq!(outcome, FetchOutcome::CacheHit("cached".to_string()));
  }

  #[tokio::test]
  async fn application_error_passes_through_despite_cache() {
    let outcome: FetchOutcome<String> = wrapper(true)
      .fetch(
        || async { Ok(Reply::err("course not found")) },
        || Some("stale".to_string()),
        None::<fn(String)>,
      )
      .await;

    assert_eq!(
      outcome,
      FetchOutcome::Failed(FetchError::Remote("course not found".into()))
    );
  }
}
