//! Excel Tutor lesson catalog and conversation assembly.
//!
//! Pure domain logic shared by the HTTP server and the client-state store:
//! the built-in lesson catalog, the chat message model, and the ordered
//! construction of the prompt sequence sent to the completion API.

pub mod catalog;
pub mod conversation;
pub mod message;

pub use catalog::{Catalog, Lesson, LessonSummary, Unit, SYSTEM_PROMPT};
pub use conversation::{build_messages, Mode};
pub use message::{ClientMessage, Message, Role};
