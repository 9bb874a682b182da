//! Typed per-entity helpers over the local store.
//!
//! Setters are total: a cache write must never block a successful network
//! response from reaching the caller, so store failures are logged and
//! swallowed here. Getters return `None`/empty on miss or store failure,
//! never an error: a broken store reads as an empty cache.

use std::sync::Arc;
use tracing::warn;

use crate::model::{ContentItem, ContentKind, Course, CourseModule, Enrollment, UserProfile};
use crate::store::LocalStore;

use super::traits::{Cacheable, CachedRecord, IndexSlot};

#[derive(Clone)]
pub struct CacheAccessor {
  store: Arc<LocalStore>,
}

impl CacheAccessor {
  pub fn new(store: Arc<LocalStore>) -> Self {
    Self { store }
  }

  fn put_one<T: Cacheable>(&self, record: &T) {
    if let Err(e) = self.store.put(record) {
      warn!(
        collection = T::collection().as_str(),
        error = %e,
        "cache write dropped"
      );
    }
  }

  fn put_all<T: Cacheable>(&self, records: &[T]) {
    if let Err(e) = self.store.put_many(records) {
      warn!(
        collection = T::collection().as_str(),
        count = records.len(),
        error = %e,
        "cache batch write dropped"
      );
    }
  }

  fn get_one<T: Cacheable>(&self, key: &str) -> Option<T> {
    match self.store.get::<T>(key) {
      Ok(found) => found.map(|c| c.record),
      Err(e) => {
        warn!(collection = T::collection().as_str(), error = %e, "cache read failed");
        None
      }
    }
  }

  fn get_indexed<T: Cacheable>(&self, slot: IndexSlot, value: &str) -> Vec<T> {
    match self.store.get_all_by_index::<T>(slot, value) {
      Ok(records) => records,
      Err(e) => {
        warn!(collection = T::collection().as_str(), error = %e, "cache index read failed");
        Vec::new()
      }
    }
  }

  // Courses -----------------------------------------------------------

  pub fn cache_course(&self, course: &Course) {
    self.put_one(course)
  }

  pub fn cache_courses(&self, courses: &[Course]) {
    self.put_all(courses)
  }

  pub fn course(&self, id: &str) -> Option<Course> {
    self.get_one(id)
  }

  /// With the write-time timestamp, for callers that surface data age.
  pub fn course_record(&self, id: &str) -> Option<CachedRecord<Course>> {
    match self.store.get(id) {
      Ok(found) => found,
      Err(e) => {
        warn!(collection = Course::collection().as_str(), error = %e, "cache read failed");
        None
      }
    }
  }

  pub fn courses_by_teacher(&self, teacher_id: &str) -> Vec<Course> {
    self.get_indexed(IndexSlot::A, teacher_id)
  }

  // Modules -----------------------------------------------------------

  pub fn cache_modules(&self, modules: &[CourseModule]) {
    self.put_all(modules)
  }

  pub fn modules_by_course(&self, course_id: &str) -> Vec<CourseModule> {
    self.get_indexed(IndexSlot::A, course_id)
  }

  // Content -----------------------------------------------------------

  pub fn cache_content_items(&self, items: &[ContentItem]) {
    self.put_all(items)
  }

  pub fn content_item(&self, id: &str) -> Option<ContentItem> {
    self.get_one(id)
  }

  pub fn content_by_module(&self, module_id: &str) -> Vec<ContentItem> {
    self.get_indexed(IndexSlot::A, module_id)
  }

  pub fn content_by_kind(&self, kind: ContentKind) -> Vec<ContentItem> {
    self.get_indexed(IndexSlot::B, kind.as_str())
  }

  // Enrollments -------------------------------------------------------

  pub fn cache_enrollments(&self, enrollments: &[Enrollment]) {
    self.put_all(enrollments)
  }

  pub fn enrollments_by_student(&self, student_id: &str) -> Vec<Enrollment> {
    self.get_indexed(IndexSlot::A, student_id)
  }

  pub fn enrollments_by_course(&self, course_id: &str) -> Vec<Enrollment> {
    self.get_indexed(IndexSlot::B, course_id)
  }

  // Profile -----------------------------------------------------------

  pub fn cache_profile(&self, profile: &UserProfile) {
    self.put_one(profile)
  }

  pub fn profile(&self, id: &str) -> Option<UserProfile> {
    self.get_one(id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::Collection;

  fn accessor() -> (CacheAccessor, Arc<LocalStore>) {
    let store = Arc::new(LocalStore::open_in_memory().unwrap());
    (CacheAccessor::new(Arc::clone(&store)), store)
  }

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
  fn caching_twice_leaves_one_record_with_fresh_timestamp() {
    let (cache, store) = accessor();
    let c = course("c1", "t1");

    cache.cache_course(&c);
    let first = cache.course_record("c1").unwrap().cached_at;

    std::thread::sleep(std::time::Duration::from_millis(5));
    cache.cache_course(&c);

    assert_eq!(store.count(Collection::Courses).unwrap(), 1);
    let second = cache.course_record("c1").unwrap().cached_at;
    assert!(second >= first);
  }

  #[test]
  fn broken_store_reads_as_empty_cache() {
    let (cache, store) = accessor();
    cache.cache_course(&course("c1", "t1"));

    store
      .lock()
      .unwrap()
      .execute("DROP TABLE records", [])
      .unwrap();

    assert!(cache.course("c1").is_none());
    assert!(cache.course_record("c1").is_none());
    assert!(cache.courses_by_teacher("t1").is_empty());
  }

  #[test]
  fn miss_returns_none_and_empty() {
    let (cache, _store) = accessor();
    assert!(cache.course("c1").is_none());
    assert!(cache.courses_by_teacher("t1").is_empty());
    assert!(cache.modules_by_course("c1").is_empty());
  }

  #[test]
  fn content_indexed_by_module_and_kind() {
    let (cache, _store) = accessor();
    let items = vec![
      ContentItem {
        id: "i1".into(),
        module_id: "m1".into(),
        kind: ContentKind::Reading,
        name: "Intro".into(),
        position: 1,
        file_url: None,
        due_at: None,
        points: None,
        submission_kind: None,
        evaluation_kind: None,
        questions: None,
      },
      ContentItem {
        id: "i2".into(),
        module_id: "m1".into(),
        kind: ContentKind::Assignment,
        name: "Homework 1".into(),
        position: 2,
        file_url: None,
        due_at: None,
        points: Some(10.0),
        submission_kind: Some("text".into()),
        evaluation_kind: None,
        questions: None,
      },
    ];
    cache.cache_content_items(&items);

    assert_eq!(cache.content_by_module("m1").len(), 2);
    let assignments = cache.content_by_kind(ContentKind::Assignment);
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].id, "i2");
  }
}
