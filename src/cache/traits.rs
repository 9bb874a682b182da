//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

/// Named record collections in the local store.
///
/// The pending-submission outbox lives in its own table and is not a
/// generic collection; see [`crate::outbox`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
  Courses,
  Modules,
  Content,
  Enrollments,
  UserProfile,
}

impl Collection {
  pub fn as_str(self) -> &'static str {
    match self {
      Collection::Courses => "courses",
      Collection::Modules => "modules",
      Collection::Content => "content",
      Collection::Enrollments => "enrollments",
      Collection::UserProfile => "user_profile",
    }
  }
}

/// Which secondary-index column a lookup goes against.
///
/// Each collection has up to two indexed foreign keys; the cache accessor
/// is the only place that knows which slot means what for which entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSlot {
  A,
  B,
}

impl IndexSlot {
  pub(crate) fn column(self) -> &'static str {
    match self {
      IndexSlot::A => "idx_a",
      IndexSlot::B => "idx_b",
    }
  }
}

/// Trait for entities that can be cached.
///
/// Implementors declare their primary key, their collection, and the
/// foreign-key values populating the collection's secondary indexes.
pub trait Cacheable: Clone + Send + Sync + Serialize + DeserializeOwned {
  /// Primary key within the collection (e.g. course id, enrollment id).
  fn cache_key(&self) -> String;

  /// The record collection this entity belongs to.
  fn collection() -> Collection;

  /// Secondary-index values by slot. Entities without foreign keys leave
  /// both empty.
  fn index_values(&self) -> (Option<String>, Option<String>) {
    (None, None)
  }
}

/// A cached entity plus the timestamp stamped at write time.
///
/// The timestamp is metadata only, never part of the record's identity.
#[derive(Debug, Clone)]
pub struct CachedRecord<T> {
  /// The cached entity
  pub record: T,
  /// When the entity was written to the cache
  pub cached_at: DateTime<Utc>,
}
