//! Webhook delivery shell.
//!
//! The update route lives at a path equal to the shared-secret token, so
//! only callers that know the token can reach it. Telegram is answered
//! with an empty 200 body no matter what processing does.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use teloxide::prelude::*;
use reqwest::Url;
use tracing::{error, info, warn};

use crate::convert;
use crate::AppState;

pub async fn run_webhook(state: AppState) -> anyhow::Result<()> {
    let port = state.cfg.port;
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    info!(port, "webhook server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health).post(health))
        .route("/setwebhook", get(set_webhook).post(set_webhook))
        .route("/removewebhook", get(remove_webhook).post(remove_webhook))
        .route("/{token}", post(receive_update))
        .with_state(state)
}

async fn health() -> &'static str {
    "It works!"
}

async fn receive_update(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, &'static str) {
    if token != state.cfg.hook_token {
        return (StatusCode::NOT_FOUND, "");
    }

    if is_json(&headers) {
        match serde_json::from_str::<teloxide::types::Update>(&body) {
            Ok(update) => {
                if let Some(inbound) = convert::inbound_from_update(&update) {
                    if let Err(e) = state.moderator.process(&inbound).await {
                        error!(
                            chat = inbound.chat_id.0,
                            message = inbound.message_id.0,
                            error = %e,
                            "message processing failed"
                        );
                    }
                }
            }
            Err(e) => warn!(error = %e, "undecodable webhook update"),
        }
    }

    (StatusCode::OK, "")
}

async fn set_webhook(State(state): State<Arc<AppState>>) -> &'static str {
    let endpoint = webhook_endpoint(&state.cfg.hook_url, &state.cfg.hook_token);
    let Ok(url) = Url::parse(&endpoint) else {
        error!(endpoint = %endpoint, "webhook endpoint is not a valid url");
        return "webhook setup failed";
    };

    // Telegram rejects a registration while an old one is live.
    let _ = state.bot.delete_webhook().await;
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    match state.bot.set_webhook(url).await {
        Ok(_) => {
            info!(endpoint = %endpoint, "webhook registered");
            "Webhook setup ok"
        }
        Err(e) => {
            error!(error = %e, "webhook registration failed");
            "webhook setup failed"
        }
    }
}

async fn remove_webhook(State(state): State<Arc<AppState>>) -> &'static str {
    match state.bot.delete_webhook().await {
        Ok(_) => "Webhook is removed",
        Err(e) => {
            error!(error = %e, "webhook removal failed");
            "webhook cannot be removed"
        }
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().starts_with("application/json"))
        .unwrap_or(false)
}

fn webhook_endpoint(hook_url: &str, token: &str) -> String {
    format!("{}/{token}", hook_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_and_token_once() {
        assert_eq!(
            webhook_endpoint("https://bot.example.com", "sekret"),
            "https://bot.example.com/sekret"
        );
        assert_eq!(
            webhook_endpoint("https://bot.example.com/", "sekret"),
            "https://bot.example.com/sekret"
        );
    }

    #[test]
    fn json_content_type_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_json(&headers));

        headers.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        assert!(is_json(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            "application/json; charset=utf-8".parse().unwrap(),
        );
        assert!(is_json(&headers));

        headers.insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());
        assert!(!is_json(&headers));
    }
}
