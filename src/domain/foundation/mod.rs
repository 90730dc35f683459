//! Foundation value objects shared across the domain.

mod errors;
mod ids;
mod text;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{AssistantRef, ChatId, ConversationSessionId, LawyerId, MessageId, RequestId};
pub use text::truncate_chars;
pub use timestamp::Timestamp;
