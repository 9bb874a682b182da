//! Embedded local store: one SQLite database holding every cached
//! collection plus the pending-submission outbox.
//!
//! The store is opened once at application startup and passed by `Arc` to
//! every component that needs it; tests open an isolated in-memory
//! instance per case. Open failure is a typed [`StoreError`]; callers
//! above the accessor layer treat a failed store as "cache unavailable"
//! rather than crashing.

pub mod schema;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::cache::{Cacheable, CachedRecord, Collection, IndexSlot};
use crate::error::StoreError;

/// Handle to the local database. Cheap to share behind an `Arc`; all
/// access serializes on an internal connection lock.
pub struct LocalStore {
  conn: Mutex<Connection>,
}

impl LocalStore {
  /// Open (or create) the store at `path`, applying any pending schema
  /// migrations. Idempotent: reopening an up-to-date database is a no-op
  /// beyond the version check.
  pub fn open(path: &Path) -> Result<Self, StoreError> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| StoreError::Open(format!("failed to create store directory: {}", e)))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| StoreError::Open(format!("{}: {}", path.display(), e)))?;

    Self::from_connection(conn)
  }

  /// Open the store at the platform's default data location.
  pub fn open_default() -> Result<Self, StoreError> {
    Self::open(&Self::default_path()?)
  }

  /// In-memory store for tests; contents vanish when dropped.
  pub fn open_in_memory() -> Result<Self, StoreError> {
    let conn = Connection::open_in_memory()
      .map_err(|e| StoreError::Open(format!("in-memory: {}", e)))?;
    Self::from_connection(conn)
  }

  fn default_path() -> Result<PathBuf, StoreError> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| StoreError::Open("could not determine data directory".into()))?;

    Ok(data_dir.join("lectern").join("offline.db"))
  }

  fn from_connection(conn: Connection) -> Result<Self, StoreError> {
    let store = Self {
      conn: Mutex::new(conn),
    };
    store.migrate()?;
    Ok(store)
  }

  /// Raise `PRAGMA user_version` to the current schema version, applying
  /// each pending migration inside its own transaction. Never recreates
  /// tables destructively.
  fn migrate(&self) -> Result<(), StoreError> {
    let conn = self.lock()?;

    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    for (step, migration) in schema::MIGRATIONS.iter().enumerate() {
      let target = (step + 1) as i32;
      if version >= target {
        continue;
      }
      debug!(from = target - 1, to = target, "applying store migration");
      conn.execute_batch(&format!(
        "BEGIN;\n{}\nPRAGMA user_version = {};\nCOMMIT;",
        migration, target
      ))?;
    }

    Ok(())
  }

  pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
    self.conn.lock().map_err(|_| StoreError::LockPoisoned)
  }

  /// Upsert a single record, stamping the retrieval timestamp. Writing the
  /// same key twice overwrites, never duplicates.
  pub fn put<T: Cacheable>(&self, record: &T) -> Result<(), StoreError> {
    let conn = self.lock()?;
    upsert(&conn, record)
  }

  /// Upsert a batch within one transaction: a crash mid-batch leaves
  /// either none or all records applied.
  pub fn put_many<T: Cacheable>(&self, records: &[T]) -> Result<(), StoreError> {
    let mut conn = self.lock()?;
    let tx = conn.transaction()?;
    for record in records {
      upsert(&tx, record)?;
    }
    tx.commit()?;
    Ok(())
  }

  /// Fetch one record by key. Absence is `Ok(None)`, never an error.
  pub fn get<T: Cacheable>(&self, key: &str) -> Result<Option<CachedRecord<T>>, StoreError> {
    let conn = self.lock()?;

    let row: Option<(Vec<u8>, i64)> = conn
      .query_row(
        "SELECT data, cached_at FROM records WHERE collection = ? AND key = ?",
        params![T::collection().as_str(), key],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()?;

    match row {
      Some((data, cached_at)) => {
        let record: T = serde_json::from_slice(&data)?;
        Ok(Some(CachedRecord {
          record,
          cached_at: millis_to_datetime(cached_at),
        }))
      }
      None => Ok(None),
    }
  }

  /// All records whose secondary index in `slot` equals `value`.
  /// Insertion order is not guaranteed. Rows that fail to decode are
  /// skipped with a warning rather than failing the whole read.
  pub fn get_all_by_index<T: Cacheable>(
    &self,
    slot: IndexSlot,
    value: &str,
  ) -> Result<Vec<T>, StoreError> {
    let conn = self.lock()?;

    let sql = format!(
      "SELECT data FROM records WHERE collection = ? AND {} = ?",
      slot.column()
    );
    let mut stmt = conn.prepare(&sql)?;

    let blobs: Vec<Vec<u8>> = stmt
      .query_map(params![T::collection().as_str(), value], |row| row.get(0))?
      .collect::<Result<_, _>>()?;

    let mut records = Vec::with_capacity(blobs.len());
    for data in blobs {
      match serde_json::from_slice(&data) {
        Ok(record) => records.push(record),
        Err(e) => warn!(
          collection = T::collection().as_str(),
          error = %e,
          "skipping undecodable cached record"
        ),
      }
    }

    Ok(records)
  }

  pub fn delete(&self, collection: Collection, key: &str) -> Result<(), StoreError> {
    let conn = self.lock()?;
    conn.execute(
      "DELETE FROM records WHERE collection = ? AND key = ?",
      params![collection.as_str(), key],
    )?;
    Ok(())
  }

  pub fn clear_collection(&self, collection: Collection) -> Result<(), StoreError> {
    let conn = self.lock()?;
    conn.execute(
      "DELETE FROM records WHERE collection = ?",
      params![collection.as_str()],
    )?;
    Ok(())
  }

  pub fn count(&self, collection: Collection) -> Result<u64, StoreError> {
    let conn = self.lock()?;
    let count: i64 = conn.query_row(
      "SELECT COUNT(*) FROM records WHERE collection = ?",
      params![collection.as_str()],
      |row| row.get(0),
    )?;
    Ok(count as u64)
  }
}

fn upsert<T: Cacheable>(conn: &Connection, record: &T) -> Result<(), StoreError> {
  let (idx_a, idx_b) = record.index_values();
  let data = serde_json::to_vec(record)?;

  conn.execute(
    "INSERT OR REPLACE INTO records (collection, key, idx_a, idx_b, data, cached_at)
     VALUES (?, ?, ?, ?, ?, ?)",
    params![
      T::collection().as_str(),
      record.cache_key(),
      idx_a,
      idx_b,
      data,
      Utc::now().timestamp_millis()
    ],
  )?;

  Ok(())
}

/// Epoch-millisecond column to a timestamp; an out-of-range value degrades
/// to the epoch instead of failing the read.
pub(crate) fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
  DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{Course, Enrollment};
  use chrono::TimeZone;

  fn course(id: &str, teacher_id: &str) -> Course {
    Course {
      id: id.into(),
      teacher_id: teacher_id.into(),
      name: format!("Course {}", id),
      description: String::new(),
      syllabus: String::new(),
      category_weights: Default::default(),
      archived: false,
    }
  }

  #[test]
  fn put_then_get_roundtrip() {
    let store = LocalStore::open_in_memory().unwrap();
    let c = course("c1", "t1");

    store.put(&c).unwrap();
    let cached = store.get::<Course>("c1").unwrap().unwrap();

    assert_eq!(cached.record, c);
    assert!(cached.cached_at > Utc.timestamp_opt(0, 0).unwrap());
  }

  #[test]
  fn get_missing_is_none_not_error() {
    let store = LocalStore::open_in_memory().unwrap();
    assert!(store.get::<Course>("nope").unwrap().is_none());
  }

  #[test]
  fn caching_is_idempotent() {
    let store = LocalStore::open_in_memory().unwrap();
    let mut c = course("c1", "t1");

    store.put(&c).unwrap();
    c.name = "Renamed".into();
    store.put(&c).unwrap();

    assert_eq!(store.count(Collection::Courses).unwrap(), 1);
    let cached = store.get::<Course>("c1").unwrap().unwrap();
    assert_eq!(cached.record.name, "Renamed");
  }

  #[test]
  fn put_many_and_index_lookup() {
    let store = LocalStore::open_in_memory().unwrap();
    let batch = vec![course("c1", "t1"), course("c2", "t1"), course("c3", "t2")];

    store.put_many(&batch).unwrap();

    let mine: Vec<Course> = store.get_all_by_index(IndexSlot::A, "t1").unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|c| c.teacher_id == "t1"));
  }

  #[test]
  fn second_index_slot_is_independent() {
    let store = LocalStore::open_in_memory().unwrap();
    let e = Enrollment {
      id: "e1".into(),
      course_id: "c1".into(),
      student_id: "s1".into(),
      enrolled_at: Utc::now(),
      computed_grade: None,
    };
    store.put(&e).unwrap();

    let by_student: Vec<Enrollment> = store.get_all_by_index(IndexSlot::A, "s1").unwrap();
    let by_course: Vec<Enrollment> = store.get_all_by_index(IndexSlot::B, "c1").unwrap();
    assert_eq!(by_student.len(), 1);
    assert_eq!(by_course.len(), 1);
  }

  #[test]
  fn delete_and_clear() {
    let store = LocalStore::open_in_memory().unwrap();
    store
      .put_many(&[course("c1", "t1"), course("c2", "t1")])
      .unwrap();

    store.delete(Collection::Courses, "c1").unwrap();
    assert_eq!(store.count(Collection::Courses).unwrap(), 1);

    store.clear_collection(Collection::Courses).unwrap();
    assert_eq!(store.count(Collection::Courses).unwrap(), 0);
  }

  #[test]
  fn migrations_reach_current_version() {
    let store = LocalStore::open_in_memory().unwrap();
    let conn = store.lock().unwrap();
    let version: i32 = conn
      .query_row("PRAGMA user_version", [], |row| row.get(0))
      .unwrap();
    assert_eq!(version, schema::SCHEMA_VERSION);
  }

  #[test]
  fn version_bump_preserves_queued_submissions() {
    let path = std::env::temp_dir().join(format!(
      "lectern-offline-migrate-{}.db",
      std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    // Build a version-1 database by hand, with one queued entry, the way
    // an older build would have left it on disk.
    {
      let conn = Connection::open(&path).unwrap();
      conn
        .execute_batch(&format!(
          "BEGIN;\n{}\nPRAGMA user_version = 1;\nCOMMIT;",
          schema::MIGRATIONS[0]
        ))
        .unwrap();
      conn
        .execute(
          "INSERT INTO pending_submissions
             (assignment_id, student_id, payload, created_at, status)
           VALUES ('a1', 's1', ?, 0, 'pending')",
          params![b"{}".to_vec()],
        )
        .unwrap();
    }

    // Reopening upgrades in place; the queued row must survive.
    let store = LocalStore::open(&path).unwrap();
    {
      let conn = store.lock().unwrap();
      let version: i32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .unwrap();
      assert_eq!(version, schema::SCHEMA_VERSION);
    }

    let outbox = crate::outbox::Outbox::new(std::sync::Arc::new(store));
    let entries = outbox.unsynced().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].assignment_id, "a1");
    assert_eq!(entries[0].status, crate::model::SubmissionStatus::Pending);

    let _ = std::fs::remove_file(&path);
  }
}
