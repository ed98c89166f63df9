//! The dispatch gate and topic router.
//!
//! `Moderator::process` is the single entry point for every inbound
//! message, in both delivery modes. It returns an explicit `Result`; the
//! delivery shell logs failures and moves on, so one bad message can
//! never stop the update loop.

use std::sync::Arc;

use tracing::debug;

use crate::config::{Config, Mode, TopicMap};
use crate::domain::{InboundMessage, UserId};
use crate::formatting::split_message;
use crate::ports::{ClassifierPort, CompletionPort, MessagingPort};
use crate::routing::{self, Forum, TopicPolicy, Verdict};
use crate::Result;

/// `/gpt` — the prompt is everything after this prefix.
const GPT_PREFIX: &str = "/gpt";
const RULES_PREFIX: &str = "/rules";

/// Usage help for `/gpt` without a prompt.
const GPT_USAGE: &str = "Usage: /gpt {prompt}";

/// Fixed refusal shown to non-administrators invoking `/gpt`.
const GPT_REFUSAL: &str =
    "At present, the /gpt command is reserved for administrators and mentors.\u{1F64F}";

/// Notice posted in the target topic after an announced move.
pub fn forwarded_notice(source: Forum) -> String {
    format!(
        "\u{1F446}Forwarded from ***{}*** Topic. Apologies if wrongly classified.",
        source.display_name()
    )
}

/// What happened to one inbound message. Mostly of interest to tests and
/// debug logs; the delivery shell only cares about `Err`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Non-text content, or no sender; nothing to do.
    Skipped,
    /// Removed from the general topic (non-admin sender).
    DeletedFromGeneral,
    CommandHandled,
    /// Production-mode owner exemption.
    OwnerExempt,
    /// No routing policy for this thread.
    Unrouted,
    /// Classifier labels matched the stay vocabulary.
    Stayed,
    Moved { target: Forum, notified: bool },
}

pub struct Moderator {
    cfg: Arc<Config>,
    topics: TopicMap,
    messenger: Arc<dyn MessagingPort>,
    classifier: Arc<dyn ClassifierPort>,
    completions: Arc<dyn CompletionPort>,
}

impl Moderator {
    pub fn new(
        cfg: Arc<Config>,
        topics: TopicMap,
        messenger: Arc<dyn MessagingPort>,
        classifier: Arc<dyn ClassifierPort>,
        completions: Arc<dyn CompletionPort>,
    ) -> Self {
        Self {
            cfg,
            topics,
            messenger,
            classifier,
            completions,
        }
    }

    /// Run one message through the gate: content check, general-topic
    /// rule, commands, owner exemption, then topic routing.
    pub async fn process(&self, msg: &InboundMessage) -> Result<Outcome> {
        let Some(text) = msg.text.as_deref() else {
            return Ok(Outcome::Skipped);
        };
        let Some(sender) = msg.sender else {
            return Ok(Outcome::Skipped);
        };

        // Only administrators may post directly in the general topic.
        if msg.thread_id.is_none() {
            let role = self.messenger.member_role(msg.chat_id, sender).await?;
            if !role.is_admin() {
                self.messenger.delete_message(msg.message_ref()).await?;
                return Ok(Outcome::DeletedFromGeneral);
            }
        }

        if text.starts_with(GPT_PREFIX) {
            self.handle_gpt(msg, text, sender).await?;
            return Ok(Outcome::CommandHandled);
        }
        if text.starts_with(RULES_PREFIX) {
            self.handle_rules(msg).await?;
            return Ok(Outcome::CommandHandled);
        }

        // The owner may post anywhere without being moderated.
        if self.cfg.mode == Mode::Prod {
            let role = self.messenger.member_role(msg.chat_id, sender).await?;
            if role.is_owner() {
                return Ok(Outcome::OwnerExempt);
            }
        }

        let source = msg.thread_id.and_then(|t| self.topics.forum_of(t));
        let Some(policy) = source.and_then(routing::policy_for) else {
            return Ok(Outcome::Unrouted);
        };

        self.route(msg, text, policy).await
    }

    async fn route(
        &self,
        msg: &InboundMessage,
        text: &str,
        policy: &TopicPolicy,
    ) -> Result<Outcome> {
        let labels = self.classifier.classify(text.trim()).await?;

        match routing::decide(policy, &labels) {
            Verdict::Stay => Ok(Outcome::Stayed),
            Verdict::Move(mv) => {
                let thread = self.topics.thread_of(mv.target);
                self.messenger
                    .forward_to_topic(msg.message_ref(), thread)
                    .await?;
                self.messenger.delete_message(msg.message_ref()).await?;
                if mv.notice {
                    let notice = forwarded_notice(policy.source);
                    self.messenger
                        .send_text(msg.chat_id, Some(thread), &notice)
                        .await?;
                }

                debug!(
                    source = policy.source.display_name(),
                    target = mv.target.display_name(),
                    labels = %labels.trim(),
                    "moved message"
                );
                Ok(Outcome::Moved {
                    target: mv.target,
                    notified: mv.notice,
                })
            }
        }
    }

    async fn handle_gpt(&self, msg: &InboundMessage, text: &str, sender: UserId) -> Result<()> {
        let role = self.messenger.member_role(msg.chat_id, sender).await?;
        if !role.is_admin() {
            self.messenger
                .reply_text(msg.message_ref(), GPT_REFUSAL)
                .await?;
            return Ok(());
        }

        if text.split_whitespace().count() == 1 {
            self.messenger
                .reply_text(msg.message_ref(), GPT_USAGE)
                .await?;
            return Ok(());
        }

        // The prompt passes through unmodified; the command is restricted
        // to administrators.
        let prompt = &text[GPT_PREFIX.len()..];
        let answer = self.completions.complete(prompt).await?;
        self.messenger
            .reply_text(msg.message_ref(), &answer)
            .await?;
        Ok(())
    }

    async fn handle_rules(&self, msg: &InboundMessage) -> Result<()> {
        // Read at send time so edits to the document apply immediately.
        let doc = tokio::fs::read_to_string(self.cfg.welcome_path()).await?;
        for chunk in split_message(&doc, self.cfg.message_chunk_limit) {
            self.messenger.send_text(msg.chat_id, None, &chunk).await?;
        }
        Ok(())
    }
}
