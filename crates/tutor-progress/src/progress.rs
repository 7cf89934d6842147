//! Lesson progress tracking and session chat history.
//!
//! Progress lives under one canonical storage key as a flat map of lesson
//! id to record. Two legacy layouts from earlier client versions are
//! still readable: a nested per-unit syllabus and a flat done/last map.
//! Legacy data is converted on load and replaced by the canonical layout
//! on the first mutation.
//!
//! Chat history is session-scoped and stored separately so resetting
//! progress and clearing the conversation go together.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use tutor_lessons::Message;

use crate::storage::Storage;

/// Canonical storage key for lesson progress.
pub const PROGRESS_KEY: &str = "tutorProgressV2";

/// Storage key for the session chat history.
pub const HISTORY_KEY: &str = "history";

/// Legacy storage key: flat map of lesson id to `{done, last}`.
pub const LEGACY_PROGRESS_KEY: &str = "dadTutorProgress";

/// Legacy storage key: nested per-unit syllabus with lesson statuses.
pub const LEGACY_SYLLABUS_KEY: &str = "dadTutorSyllabusV1";

// ============================================================================
// Progress Types
// ============================================================================

/// Where a lesson stands for this learner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonStatus {
    /// Never opened.
    #[default]
    NotStarted,
    /// Opened at least once, not yet mastered.
    InProgress,
    /// Completed, with a quiz result recorded.
    Mastered,
}

/// Outcome of one end-of-lesson quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    /// Questions answered correctly (out of 3).
    pub score: u32,
    /// The learner's answers, in question order.
    pub answers: Vec<String>,
    /// When the quiz was taken.
    pub timestamp: DateTime<Utc>,
}

/// Progress record for a single lesson.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    /// Current status.
    #[serde(default)]
    pub status: LessonStatus,
    /// Most recent quiz result, if any.
    #[serde(default)]
    pub last_result: Option<QuizResult>,
    /// How many times a quiz result was recorded.
    #[serde(default)]
    pub attempts: u32,
    /// Last time this lesson was started or completed.
    #[serde(default)]
    pub last_touched: Option<DateTime<Utc>>,
}

/// The full progress state: one record per touched lesson.
///
/// Lessons with no record are simply not started; the book never
/// pre-populates the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressBook {
    /// Lesson id to progress record.
    #[serde(default)]
    pub lessons: BTreeMap<String, ProgressRecord>,
    /// When any record last changed.
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

// ============================================================================
// Progress Store
// ============================================================================

/// Progress and history state over a storage substrate.
///
/// Reads convert legacy layouts in memory; the canonical layout is
/// written (and legacy keys removed) on the first mutation. All reads
/// fail soft: malformed stored JSON behaves like a fresh install.
#[derive(Debug, Clone)]
pub struct ProgressStore<S: Storage> {
    storage: S,
}

impl<S: Storage> ProgressStore<S> {
    /// Creates a store over the given substrate.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Consumes the store, returning the underlying substrate.
    pub fn into_inner(self) -> S {
        self.storage
    }

    /// Returns the current progress book.
    ///
    /// Prefers the canonical key; falls back to converting legacy data.
    /// This is a read and never writes anything back.
    pub fn book(&self) -> ProgressBook {
        if let Some(raw) = self.storage.get(PROGRESS_KEY) {
            return match serde_json::from_str(&raw) {
                Ok(book) => book,
                Err(err) => {
                    warn!(error = %err, "Ignoring malformed progress data");
                    ProgressBook::default()
                }
            };
        }

        migrate_legacy(&self.storage).unwrap_or_default()
    }

    /// Returns the record for one lesson, defaulting to not-started for
    /// any lesson id without a record.
    pub fn progress(&self, lesson_id: &str) -> ProgressRecord {
        self.book().lessons.get(lesson_id).cloned().unwrap_or_default()
    }

    /// Marks a lesson as started.
    ///
    /// Moves the lesson to in-progress from any status, including
    /// mastered, and stamps the touch time.
    pub fn start(&mut self, lesson_id: &str) {
        let mut book = self.book();
        let record = book.lessons.entry(lesson_id.to_string()).or_default();
        record.status = LessonStatus::InProgress;
        record.last_touched = Some(Utc::now());
        self.save_book(book);
    }

    /// Records a quiz result and marks the lesson mastered.
    ///
    /// Valid from any prior status; every call counts one attempt.
    pub fn complete(&mut self, lesson_id: &str, result: QuizResult) {
        let mut book = self.book();
        let record = book.lessons.entry(lesson_id.to_string()).or_default();
        record.status = LessonStatus::Mastered;
        record.attempts = record.attempts.saturating_add(1);
        record.last_touched = Some(Utc::now());
        record.last_result = Some(result);
        self.save_book(book);
    }

    /// Clears all progress and history, legacy keys included.
    ///
    /// A reset store is indistinguishable from a fresh install.
    pub fn reset(&mut self) {
        self.storage.remove(PROGRESS_KEY);
        self.storage.remove(HISTORY_KEY);
        self.storage.remove(LEGACY_PROGRESS_KEY);
        self.storage.remove(LEGACY_SYLLABUS_KEY);
        info!("Progress and history reset");
    }

    /// Returns the session chat history, empty when absent or malformed.
    pub fn history(&self) -> Vec<Message> {
        self.storage
            .get(HISTORY_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Replaces the session chat history.
    pub fn set_history(&mut self, history: &[Message]) {
        match serde_json::to_string(history) {
            Ok(raw) => self.storage.set(HISTORY_KEY, &raw),
            Err(err) => warn!(error = %err, "Could not serialize chat history"),
        }
    }

    /// Appends one message to the session chat history.
    pub fn push_message(&mut self, message: Message) {
        let mut history = self.history();
        history.push(message);
        self.set_history(&history);
    }

    /// Writes the book under the canonical key and drops legacy keys.
    fn save_book(&mut self, mut book: ProgressBook) {
        book.last_updated = Some(Utc::now());

        match serde_json::to_string(&book) {
            Ok(raw) => {
                self.storage.set(PROGRESS_KEY, &raw);
                self.storage.remove(LEGACY_PROGRESS_KEY);
                self.storage.remove(LEGACY_SYLLABUS_KEY);
            }
            Err(err) => warn!(error = %err, "Could not serialize progress data"),
        }
    }
}

// ============================================================================
// Legacy Migration
// ============================================================================

/// Converts legacy storage layouts into a progress book.
///
/// The nested syllabus is the richer source (status, attempts, quiz
/// results); the flat map contributes done flags and touch timestamps
/// for lessons the syllabus missed. Returns `None` when neither legacy
/// key holds parseable data.
fn migrate_legacy<S: Storage>(storage: &S) -> Option<ProgressBook> {
    let syllabus = storage
        .get(LEGACY_SYLLABUS_KEY)
        .and_then(|raw| serde_json::from_str::<Value>(&raw).ok());
    let flat = storage
        .get(LEGACY_PROGRESS_KEY)
        .and_then(|raw| serde_json::from_str::<Value>(&raw).ok());

    if syllabus.is_none() && flat.is_none() {
        return None;
    }

    let mut book = ProgressBook::default();

    if let Some(syllabus) = &syllabus {
        book.last_updated = syllabus
            .get("lastUpdated")
            .and_then(Value::as_str)
            .and_then(parse_timestamp);

        if let Some(units) = syllabus.get("units").and_then(Value::as_object) {
            for unit in units.values() {
                let Some(lessons) = unit.get("lessons").and_then(Value::as_object) else {
                    continue;
                };
                for (lesson_id, lesson) in lessons {
                    let record = ProgressRecord {
                        status: lesson
                            .get("status")
                            .and_then(Value::as_str)
                            .map_or_else(LessonStatus::default, parse_status),
                        last_result: lesson
                            .get("lastResult")
                            .cloned()
                            .and_then(|value| serde_json::from_value(value).ok()),
                        attempts: lesson
                            .get("attempts")
                            .and_then(Value::as_u64)
                            .and_then(|n| u32::try_from(n).ok())
                            .unwrap_or(0),
                        last_touched: None,
                    };
                    book.lessons.insert(lesson_id.clone(), record);
                }
            }
        }
    }

    if let Some(entries) = flat.as_ref().and_then(Value::as_object) {
        for (lesson_id, entry) in entries {
            let done = entry.get("done").and_then(Value::as_bool).unwrap_or(false);
            let last = entry
                .get("last")
                .and_then(Value::as_str)
                .and_then(parse_timestamp);

            let record = book
                .lessons
                .entry(lesson_id.clone())
                .or_insert_with(|| ProgressRecord {
                    status: if done {
                        LessonStatus::Mastered
                    } else if last.is_some() {
                        LessonStatus::InProgress
                    } else {
                        LessonStatus::NotStarted
                    },
                    ..ProgressRecord::default()
                });

            if record.last_touched.is_none() {
                record.last_touched = last;
            }
        }
    }

    info!(lessons = book.lessons.len(), "Converted legacy progress data");
    Some(book)
}

/// Parses a legacy status string; unknown values mean not started.
fn parse_status(status: &str) -> LessonStatus {
    match status {
        "mastered" => LessonStatus::Mastered,
        "in_progress" => LessonStatus::InProgress,
        _ => LessonStatus::NotStarted,
    }
}

/// Parses a legacy ISO-8601 timestamp.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
