use async_trait::async_trait;

use crate::domain::{ChatId, MemberRole, MessageRef, ThreadId, UserId};
use crate::Result;

/// Hexagonal port for the chat platform.
///
/// The Telegram adapter implements this; the core never sees teloxide
/// types.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    /// Send `text` into a topic thread (`None` targets the general topic).
    async fn send_text(
        &self,
        chat_id: ChatId,
        thread_id: Option<ThreadId>,
        text: &str,
    ) -> Result<MessageRef>;

    /// Reply to an existing message.
    async fn reply_text(&self, target: MessageRef, text: &str) -> Result<MessageRef>;

    /// Forward a message into another topic thread of the same chat.
    async fn forward_to_topic(&self, message: MessageRef, thread_id: ThreadId) -> Result<()>;

    async fn delete_message(&self, message: MessageRef) -> Result<()>;

    /// Membership standing of `user_id` in `chat_id`.
    async fn member_role(&self, chat_id: ChatId, user_id: UserId) -> Result<MemberRole>;
}

/// Port for the text-classification endpoint.
#[async_trait]
pub trait ClassifierPort: Send + Sync {
    /// Classify a message. Returns the raw label text from the model;
    /// callers match labels by substring containment.
    async fn classify(&self, text: &str) -> Result<String>;
}

/// Port for the free-form chat-completion endpoint.
#[async_trait]
pub trait CompletionPort: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
