//! Offline-resilience data layer for the Lectern LMS client.
//!
//! Reads go network-first with cache fallback: a successful remote fetch is
//! returned immediately and cached as a detached side effect; when the
//! network is absent or fails at the transport level, the read is served
//! from an embedded SQLite store and flagged as a cache hit. Writes
//! (assignment submissions) that cannot reach the backend land in a durable
//! outbox and are replayed when connectivity returns.

pub mod cache;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod fetch;
pub mod model;
pub mod outbox;
pub mod remote;
pub mod store;
pub mod sync;

pub use cache::{CacheAccessor, Cacheable, CachedRecord, Collection, IndexSlot};
pub use config::OfflineConfig;
pub use connectivity::{ConnectivityHandle, ConnectivityMonitor};
pub use error::{ConfigError, FetchError, StoreError, SubmitError, TransportError};
pub use fetch::{FetchOutcome, ReadThrough};
pub use outbox::Outbox;
pub use remote::{RemoteResult, Reply, SubmissionBackend};
pub use store::LocalStore;
pub use sync::{spawn_autosync, DrainReport, SubmitOutcome, Submissions, SyncManager};
