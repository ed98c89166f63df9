/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// Forum topic thread id within a chat. Messages in the general topic
/// carry no thread id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ThreadId(pub i32);

/// A stable reference to a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Chat membership standing, as reported by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberRole {
    Owner,
    Administrator,
    Member,
}

impl MemberRole {
    /// The owner counts as an administrator everywhere admin rights are
    /// checked.
    pub fn is_admin(self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Administrator)
    }

    pub fn is_owner(self) -> bool {
        matches!(self, MemberRole::Owner)
    }
}

/// Cross-adapter incoming message model.
///
/// Platform-specific fields stay in the adapter; non-text content arrives
/// here with `text: None` and is ignored downstream.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub thread_id: Option<ThreadId>,
    pub sender: Option<UserId>,
    pub text: Option<String>,
}

impl InboundMessage {
    pub fn message_ref(&self) -> MessageRef {
        MessageRef {
            chat_id: self.chat_id,
            message_id: self.message_id,
        }
    }
}
