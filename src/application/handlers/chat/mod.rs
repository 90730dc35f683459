//! Chat session handlers.

mod close_chat;
mod debug_context;
mod list_messages;
mod render;
mod reset_context;
mod send_message;
mod start_chat;

pub use close_chat::{CloseChatError, CloseChatHandler};
pub use debug_context::{DebugContextError, DebugContextHandler, DebugSnapshot, MessagePreview};
pub use list_messages::{ListMessagesError, ListMessagesHandler};
pub use render::display_text;
pub use reset_context::{ResetContextError, ResetContextHandler};
pub use send_message::{
    history_window, HistoryMessage, HistoryRole, LawyerReply, SendMessageCommand,
    SendMessageError, SendMessageHandler, HISTORY_WINDOW,
};
pub use start_chat::{StartChatCommand, StartChatError, StartChatHandler, StartChatResult};
