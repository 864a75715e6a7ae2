// Logging setup on top of tracing.
// Call sites keep using the small debug/info/warn/error helpers; the
// subscriber decides what reaches stderr.

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::Level;

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

// Install the global subscriber. INFO by default, DEBUG with --debug.
pub fn init(debug: bool) {
    DEBUG_ENABLED.store(debug, Ordering::Relaxed);
    let level = if debug { Level::DEBUG } else { Level::INFO };
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// Returns true if debug logging is enabled.
pub fn is_debug() -> bool {
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

pub fn info(msg: &str) {
    tracing::info!("{}", msg);
}

pub fn debug(msg: &str) {
    tracing::debug!("{}", msg);
}

pub fn warn(msg: &str) {
    tracing::warn!("{}", msg);
}

pub fn error(msg: &str) {
    tracing::error!("{}", msg);
}
