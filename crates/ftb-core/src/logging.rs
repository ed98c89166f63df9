use crate::config::Mode;
use crate::Result;

/// Initialize tracing for the bot.
///
/// The default level follows the runtime mode (dev is chatty, prod is
/// quiet); the `DEBUG` flag forces verbose output in any mode, and
/// `RUST_LOG` overrides everything.
pub fn init(mode: Mode, debug: bool) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match (debug, mode) {
        (true, _) | (_, Mode::Dev) => "debug",
        (false, Mode::Prod) => "info",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .init();

    tracing::info!(mode = mode.as_str(), "bot starting");
    Ok(())
}
