use std::sync::Arc;

use ftb_core::config::{Config, TopicMap};
use ftb_core::ports::{ClassifierPort, CompletionPort};
use ftb_openai::OpenAiClient;

#[tokio::main]
async fn main() -> Result<(), ftb_core::Error> {
    // Config errors are fatal; nothing runs partially configured.
    let cfg = match Config::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            eprintln!("fatal: {e}");
            std::process::exit(1);
        }
    };
    ftb_core::logging::init(cfg.mode, cfg.debug)?;

    let topics = match TopicMap::load(&cfg.topics_path()) {
        Ok(topics) => topics,
        Err(e) => {
            eprintln!("fatal: cannot load {}: {e}", cfg.topics_path().display());
            std::process::exit(1);
        }
    };

    let openai = Arc::new(OpenAiClient::new(
        cfg.openai_api_key.clone(),
        cfg.finetuned_model.clone(),
    ));
    let classifier: Arc<dyn ClassifierPort> = openai.clone();
    let completions: Arc<dyn CompletionPort> = openai;

    let state = ftb_telegram::build_state(cfg, topics, classifier, completions);

    let mode = std::env::args().nth(1).unwrap_or_else(|| "poll".to_string());
    let run = match mode.as_str() {
        "poll" => ftb_telegram::polling::run_polling(state).await,
        "serve" => ftb_telegram::webhook::run_webhook(state).await,
        other => {
            eprintln!("unknown delivery mode '{other}' (expected 'poll' or 'serve')");
            std::process::exit(2);
        }
    };

    run.map_err(|e| ftb_core::Error::External(format!("delivery shell failed: {e}")))
}
