//! Excel Tutor Progress Store
//!
//! Lesson progress and session chat history over a pluggable key/value
//! substrate, with conversion from legacy storage layouts.

pub mod progress;
pub mod storage;

pub use progress::{
    LessonStatus, ProgressBook, ProgressRecord, ProgressStore, QuizResult, HISTORY_KEY,
    LEGACY_PROGRESS_KEY, LEGACY_SYLLABUS_KEY, PROGRESS_KEY,
};
pub use storage::{FileStorage, MemoryStorage, Storage};
