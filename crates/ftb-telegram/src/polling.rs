//! Polling delivery shell.

use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tracing::{error, info};

use crate::convert;
use crate::AppState;

/// Long-poll for updates and run each message through the moderator.
///
/// Useful for local testing; production deployments usually run the
/// webhook shell instead.
pub async fn run_polling(state: AppState) -> anyhow::Result<()> {
    let bot = state.bot.clone();

    if let Ok(me) = bot.get_me().await {
        info!(bot = me.username(), "polling started");
    }

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![Arc::new(state)])
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let inbound = convert::inbound_from_message(&msg);

    // One bad message must never stop the dispatch loop.
    if let Err(e) = state.moderator.process(&inbound).await {
        error!(
            chat = inbound.chat_id.0,
            message = inbound.message_id.0,
            error = %e,
            "message processing failed"
        );
    }

    Ok(())
}
