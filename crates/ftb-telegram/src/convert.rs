//! teloxide → core message conversion, shared by both delivery shells.

use teloxide::types::{Message, Update, UpdateKind};

use ftb_core::domain::{ChatId, InboundMessage, MessageId, ThreadId, UserId};

/// Core view of a Telegram message. Non-text content maps to
/// `text: None` and is ignored downstream.
pub fn inbound_from_message(msg: &Message) -> InboundMessage {
    InboundMessage {
        chat_id: ChatId(msg.chat.id.0),
        message_id: MessageId(msg.id.0),
        thread_id: msg.thread_id.map(ThreadId),
        sender: msg.from().map(|u| UserId(u.id.0 as i64)),
        text: msg.text().map(str::to_string),
    }
}

/// Extract the message from an update, if it carries one. Edited
/// messages and other update kinds are not moderated.
pub fn inbound_from_update(update: &Update) -> Option<InboundMessage> {
    match &update.kind {
        UpdateKind::Message(msg) => Some(inbound_from_message(msg)),
        _ => None,
    }
}
