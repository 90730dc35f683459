//! Chats with lawyer personas and their messages.

mod chat;
mod message;

pub use chat::{ChatStatus, LawyerChat, TITLE_PROBLEM_CHARS};
pub use message::{ChatMessage, Sender, MAX_AI_MESSAGE_CHARS, OPENING_PROBLEM_CHARS};
