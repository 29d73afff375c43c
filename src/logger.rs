use std::fmt::Display;
use std::sync::OnceLock;

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::RuntimeMode;

static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Install the process-wide tracing subscriber.
///
/// Only the first call does any work. Returns `true` when the global
/// subscriber is the one installed here, `false` when another subscriber
/// was already in place; neither case is an error.
pub fn init(mode: RuntimeMode) -> bool {
    *INSTALLED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(mode.default_log_filter()));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .is_ok()
    })
}

/// Named logging handle. Every event carries a `logger` field with the
/// caller's name.
#[derive(Debug, Clone, Copy)]
pub struct Logger {
    name: &'static str,
}

pub fn get_logger(name: &'static str) -> Logger {
    Logger { name }
}

impl Logger {
    pub fn info(&self, message: impl Display) {
        info!(logger = self.name, "{}", message);
    }

    pub fn warn(&self, message: impl Display) {
        warn!(logger = self.name, "{}", message);
    }

    pub fn error(&self, message: impl Display) {
        error!(logger = self.name, "{}", message);
    }
}
