//! Cacheable implementations for the domain entities.

use crate::cache::{Cacheable, Collection};

use super::{ContentItem, Course, CourseModule, Enrollment, UserProfile};

impl Cacheable for Course {
  fn cache_key(&self) -> String {
    self.id.clone()
  }

  fn collection() -> Collection {
    Collection::Courses
  }

  fn index_values(&self) -> (Option<String>, Option<String>) {
    (Some(self.teacher_id.clone()), None)
  }
}

impl Cacheable for CourseModule {
  fn cache_key(&self) -> String {
    self.id.clone()
  }

  fn collection() -> Collection {
    Collection::Modules
  }

  fn index_values(&self) -> (Option<String>, Option<String>) {
    (Some(self.course_id.clone()), None)
  }
}

impl Cacheable for ContentItem {
  fn cache_key(&self) -> String {
    self.id.clone()
  }

  fn collection() -> Collection {
    Collection::Content
  }

  // Slot A: owning module. Slot B: content kind, so assignment lists can
  // be served offline without scanning a whole course.
  fn index_values(&self) -> (Option<String>, Option<String>) {
    (
      Some(self.module_id.clone()),
      Some(self.kind.as_str().to_string()),
    )
  }
}

impl Cacheable for Enrollment {
  fn cache_key(&self) -> String {
    self.id.clone()
  }

  fn collection() -> Collection {
    Collection::Enrollments
  }

  // Slot A: student. Slot B: course.
  fn index_values(&self) -> (Option<String>, Option<String>) {
    (Some(self.student_id.clone()), Some(self.course_id.clone()))
  }
}

impl Cacheable for UserProfile {
  fn cache_key(&self) -> String {
    self.id.clone()
  }

  fn collection() -> Collection {
    Collection::UserProfile
  }
}
