use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

pub fn parse_level(raw: &str) -> Option<Level> {
    match raw.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Installs the stderr subscriber. Diagnostics must never touch stdout: that
/// is the command channel.
pub fn init_logging(level: &str) {
    let level = parse_level(level).unwrap_or(Level::WARN);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .finish();

    // Ignore error if a global subscriber is already set (e.g., in tests)
    let _ = tracing::subscriber::set_global_default(subscriber);
}
