use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
};

use crate::domain::ThreadId;
use crate::routing::Forum;
use crate::{errors::Error, Result};

/// Placeholder webhook secret. Deployments must override `HOOK_TOKEN`;
/// the default only exists so the dev loop works out of the box.
pub const DEFAULT_HOOK_TOKEN: &str =
    "Wq7dHcVrT2mAzKx9oLuJnE4bYgS8iRfP5vNtM3eZkQyXaGdC6sUwBhF1jDplO0Tr";

/// Runtime environment. Selects the config directory and toggles the
/// owner moderation exemption and the default log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Prod,
    Dev,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Prod => "prod",
            Mode::Dev => "dev",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "prod" => Ok(Mode::Prod),
            "dev" => Ok(Mode::Dev),
            other => Err(Error::Config(format!(
                "MODE must be 'prod' or 'dev', got '{other}'"
            ))),
        }
    }
}

/// Typed runtime configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub mode: Mode,
    pub bot_token: String,
    pub openai_api_key: String,
    pub finetuned_model: String,

    // Webhook service
    pub hook_url: String,
    pub hook_token: String,
    pub port: u16,
    pub debug: bool,

    // Files
    pub config_root: PathBuf,

    // Platform limits
    pub message_chunk_limit: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        // Required env vars; missing ones are fatal at startup.
        let mode = Mode::parse(&require_env("MODE")?)?;
        let bot_token = require_env("BOT_TOKEN")?;
        let openai_api_key = require_env("OPENAI_API_KEY")?;
        let finetuned_model = require_env("FINETUNED_MODEL")?;

        // Webhook settings only matter in serve mode and carry defaults.
        let hook_url = env_str("HOOK_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| "http://127.0.0.1:8080".to_string());
        let hook_token = env_str("HOOK_TOKEN")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_HOOK_TOKEN.to_string());
        let port = env_u16("PORT").unwrap_or(8080);
        let debug = env_bool("DEBUG").unwrap_or(false);

        let config_root = env_path("CONFIG_DIR").unwrap_or_else(|| PathBuf::from("config"));

        // Telegram caps messages at 4096 chars; the rules document is
        // chunked well below that.
        let message_chunk_limit = 3000;

        Ok(Self {
            mode,
            bot_token,
            openai_api_key,
            finetuned_model,
            hook_url,
            hook_token,
            port,
            debug,
            config_root,
            message_chunk_limit,
        })
    }

    /// Path to the per-mode forum map.
    pub fn topics_path(&self) -> PathBuf {
        self.config_root.join(self.mode.as_str()).join("config.json")
    }

    /// Path to the static house-rules document, read at send time.
    pub fn welcome_path(&self) -> PathBuf {
        self.config_root.join("welcome.md")
    }
}

/// Immutable mapping between symbolic forum topics and numeric thread
/// ids, loaded once from `config/{mode}/config.json`.
#[derive(Clone, Debug)]
pub struct TopicMap {
    threads: HashMap<Forum, ThreadId>,
    forums: HashMap<i32, Forum>,
}

#[derive(serde::Deserialize)]
struct TopicFile {
    #[serde(rename = "FORUMS")]
    forums: HashMap<String, i32>,
}

impl TopicMap {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Every forum the routing table can name must be mapped; a missing
    /// entry is a configuration error, not a per-message surprise.
    pub fn from_json(raw: &str) -> Result<Self> {
        let file: TopicFile = serde_json::from_str(raw)?;

        let mut threads = HashMap::new();
        let mut forums = HashMap::new();
        for forum in Forum::ALL {
            let id = *file.forums.get(forum.key()).ok_or_else(|| {
                Error::Config(format!("FORUMS entry {} is missing", forum.key()))
            })?;
            threads.insert(forum, ThreadId(id));
            forums.insert(id, forum);
        }

        Ok(Self { threads, forums })
    }

    pub fn thread_of(&self, forum: Forum) -> ThreadId {
        // Construction guarantees every forum is present.
        self.threads[&forum]
    }

    pub fn forum_of(&self, thread: ThreadId) -> Option<Forum> {
        self.forums.get(&thread.0).copied()
    }
}

fn require_env(key: &str) -> Result<String> {
    env_str(key)
        .and_then(non_empty)
        .ok_or_else(|| Error::Config(format!("{key} environment variable is required")))
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_bool(key: &str) -> Option<bool> {
    env_str(key).map(|s| {
        matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_u16(key: &str) -> Option<u16> {
    env_str(key).and_then(|s| s.trim().parse::<u16>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(PathBuf::from)
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
