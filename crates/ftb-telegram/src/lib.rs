//! Telegram adapter (teloxide) and the delivery shells.
//!
//! Implements the `ftb-core` MessagingPort over the Telegram Bot API and
//! hosts the two delivery modes: long polling and the webhook server.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::{prelude::*, types::ParseMode};
use tokio::time::sleep;

pub mod convert;
pub mod polling;
pub mod webhook;

use ftb_core::config::{Config, TopicMap};
use ftb_core::domain::{ChatId, MemberRole, MessageId, MessageRef, ThreadId, UserId};
use ftb_core::errors::Error;
use ftb_core::moderator::Moderator;
use ftb_core::ports::{ClassifierPort, CompletionPort, MessagingPort};
use ftb_core::Result;

/// Shared state for both delivery shells.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub bot: Bot,
    pub moderator: Arc<Moderator>,
}

/// Wire the Telegram adapter and the core moderator together.
pub fn build_state(
    cfg: Arc<Config>,
    topics: TopicMap,
    classifier: Arc<dyn ClassifierPort>,
    completions: Arc<dyn CompletionPort>,
) -> AppState {
    let bot = Bot::new(cfg.bot_token.clone());
    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let moderator = Arc::new(Moderator::new(
        cfg.clone(),
        topics,
        messenger,
        classifier,
        completions,
    ));
    AppState {
        cfg,
        bot,
        moderator,
    }
}

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }

    /// Markdown first with a plain-text retry: replies carry model output,
    /// which is not guaranteed to be valid Telegram markup.
    async fn send_with_fallback(
        &self,
        chat: teloxide::types::ChatId,
        thread_id: Option<i32>,
        reply_to: Option<teloxide::types::MessageId>,
        text: &str,
    ) -> Result<teloxide::types::Message> {
        let build = |markdown: bool| {
            let mut req = self.bot.send_message(chat, text.to_string());
            if markdown {
                req = req.parse_mode(ParseMode::Markdown);
            }
            if let Some(t) = thread_id {
                req = req.message_thread_id(t);
            }
            if let Some(m) = reply_to {
                req = req.reply_to_message_id(m);
            }
            req
        };

        match self.with_retry(|| build(true)).await {
            Ok(msg) => Ok(msg),
            Err(_) => self.with_retry(|| build(false)).await,
        }
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_text(
        &self,
        chat_id: ChatId,
        thread_id: Option<ThreadId>,
        text: &str,
    ) -> Result<MessageRef> {
        let msg = self
            .send_with_fallback(Self::tg_chat(chat_id), thread_id.map(|t| t.0), None, text)
            .await?;
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn reply_text(&self, target: MessageRef, text: &str) -> Result<MessageRef> {
        let msg = self
            .send_with_fallback(
                Self::tg_chat(target.chat_id),
                None,
                Some(Self::tg_msg_id(target.message_id)),
                text,
            )
            .await?;
        Ok(MessageRef {
            chat_id: target.chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn forward_to_topic(&self, message: MessageRef, thread_id: ThreadId) -> Result<()> {
        let chat = Self::tg_chat(message.chat_id);
        self.with_retry(|| {
            self.bot
                .forward_message(chat, chat, Self::tg_msg_id(message.message_id))
                .message_thread_id(thread_id.0)
        })
        .await?;
        Ok(())
    }

    async fn delete_message(&self, message: MessageRef) -> Result<()> {
        self.with_retry(|| {
            self.bot
                .delete_message(Self::tg_chat(message.chat_id), Self::tg_msg_id(message.message_id))
        })
        .await?;
        Ok(())
    }

    async fn member_role(&self, chat_id: ChatId, user_id: UserId) -> Result<MemberRole> {
        let member = self
            .with_retry(|| {
                self.bot.get_chat_member(
                    Self::tg_chat(chat_id),
                    teloxide::types::UserId(user_id.0 as u64),
                )
            })
            .await?;

        Ok(match member.status() {
            teloxide::types::ChatMemberStatus::Owner => MemberRole::Owner,
            teloxide::types::ChatMemberStatus::Administrator => MemberRole::Administrator,
            _ => MemberRole::Member,
        })
    }
}
