//! Domain entities handled by the offline layer.
//!
//! These are the cached shapes of the backend's rows, not the backend
//! schema itself: the store holds them as opaque JSON and re-associates
//! foreign keys (modules to a course, content to a module) at read time.

mod cache;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
  pub id: String,
  pub teacher_id: String,
  pub name: String,
  #[serde(default)]
  pub description: String,
  /// Rich-text syllabus, kept in the editor's serialized form.
  #[serde(default)]
  pub syllabus: String,
  /// Grading category -> weight, e.g. "homework" -> 0.3.
  #[serde(default)]
  pub category_weights: BTreeMap<String, f64>,
  #[serde(default)]
  pub archived: bool,
}

/// A named, ordered section of a course. `position` is unique within the
/// course and dense, but not required to be contiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseModule {
  pub id: String,
  pub course_id: String,
  pub name: String,
  pub position: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
  Reading,
  Video,
  Assignment,
  Quiz,
}

impl ContentKind {
  pub fn as_str(self) -> &'static str {
    match self {
      ContentKind::Reading => "reading",
      ContentKind::Video => "video",
      ContentKind::Assignment => "assignment",
      ContentKind::Quiz => "quiz",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
  pub id: String,
  pub module_id: String,
  pub kind: ContentKind,
  pub name: String,
  pub position: i64,
  #[serde(default)]
  pub file_url: Option<String>,
  #[serde(default)]
  pub due_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub points: Option<f64>,
  #[serde(default)]
  pub submission_kind: Option<String>,
  #[serde(default)]
  pub evaluation_kind: Option<String>,
  /// Question set for quiz items; opaque to this layer.
  #[serde(default)]
  pub questions: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
  pub id: String,
  pub course_id: String,
  pub student_id: String,
  pub enrolled_at: DateTime<Utc>,
  #[serde(default)]
  pub computed_grade: Option<f64>,
}

/// Cached identity for offline continuity. Not an authentication artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
  pub id: String,
  pub display_name: String,
  pub role: String,
  #[serde(default)]
  pub student_id: Option<String>,
}

/// The body of an assignment submission: free text and/or an uploaded
/// file reference. Upload mechanics live elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
  #[serde(default)]
  pub text: Option<String>,
  #[serde(default)]
  pub file_url: Option<String>,
}

/// A submission as handed to the write path, before it has any identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubmission {
  pub assignment_id: String,
  pub student_id: String,
  pub payload: SubmissionPayload,
  /// Assignment due date, carried so lateness can still be judged when the
  /// entry is finally delivered.
  pub due_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
  Pending,
  Synced,
  Failed,
}

impl SubmissionStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      SubmissionStatus::Pending => "pending",
      SubmissionStatus::Synced => "synced",
      SubmissionStatus::Failed => "failed",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "pending" => Some(SubmissionStatus::Pending),
      "synced" => Some(SubmissionStatus::Synced),
      "failed" => Some(SubmissionStatus::Failed),
      _ => None,
    }
  }
}

/// An outbox entry: a submission awaiting confirmed delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSubmission {
  /// Locally auto-incremented queue id; never shared with the backend.
  pub id: i64,
  pub assignment_id: String,
  pub student_id: String,
  pub payload: SubmissionPayload,
  pub due_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub status: SubmissionStatus,
  /// Error captured on the last failed delivery attempt.
  pub last_error: Option<String>,
}

impl PendingSubmission {
  /// Re-shape the entry for replay against the backend's submit call.
  pub fn draft(&self) -> NewSubmission {
    NewSubmission {
      assignment_id: self.assignment_id.clone(),
      student_id: self.student_id.clone(),
      payload: self.payload.clone(),
      due_at: self.due_at,
    }
  }
}

/// What the backend returns for an accepted submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
  pub id: String,
  #[serde(default)]
  pub late: bool,
}
