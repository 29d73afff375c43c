use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::config::{Settings, SERVICE_NAME};
use crate::logger::get_logger;

pub type HookAction = Box<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// A named lifecycle action
pub struct Hook {
    name: &'static str,
    action: HookAction,
}

/// Outcome of running one lifecycle phase
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HookReport {
    pub completed: Vec<&'static str>,
    pub failed: Vec<(&'static str, String)>,
}

impl HookReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Ordered startup and shutdown actions.
///
/// Each phase runs at most once. Actions run in registration order and a
/// failing or panicking action never prevents the ones after it.
#[derive(Default)]
pub struct Lifecycle {
    startup: Vec<Hook>,
    shutdown: Vec<Hook>,
    started: AtomicBool,
    stopped: AtomicBool,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_startup<F>(mut self, name: &'static str, action: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.startup.push(Hook {
            name,
            action: Box::new(action),
        });
        self
    }

    pub fn on_shutdown<F>(mut self, name: &'static str, action: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.shutdown.push(Hook {
            name,
            action: Box::new(action),
        });
        self
    }

    pub fn run_startup(&self) -> HookReport {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("Startup hooks already ran");
            return HookReport::default();
        }
        run_phase("startup", &self.startup)
    }

    pub fn run_shutdown(&self) -> HookReport {
        if self.stopped.swap(true, Ordering::SeqCst) {
            debug!("Shutdown hooks already ran");
            return HookReport::default();
        }
        run_phase("shutdown", &self.shutdown)
    }

    pub fn hook_names(&self) -> (Vec<&'static str>, Vec<&'static str>) {
        (
            self.startup.iter().map(|h| h.name).collect(),
            self.shutdown.iter().map(|h| h.name).collect(),
        )
    }
}

fn run_phase(phase: &str, hooks: &[Hook]) -> HookReport {
    let logger = get_logger(module_path!());
    let mut report = HookReport::default();

    for hook in hooks {
        match catch_unwind(AssertUnwindSafe(|| (hook.action)())) {
            Ok(Ok(())) => report.completed.push(hook.name),
            Ok(Err(e)) => {
                logger.warn(format!("⚠️  {} hook '{}' failed: {:#}", phase, hook.name, e));
                report.failed.push((hook.name, e.to_string()));
            }
            Err(_) => {
                logger.error(format!("{} hook '{}' panicked", phase, hook.name));
                report.failed.push((hook.name, "panicked".to_string()));
            }
        }
    }

    report
}

/// The service's standard hooks: boot banner and environment on startup,
/// termination banner on shutdown.
pub fn default_lifecycle(settings: &Settings) -> Lifecycle {
    let logger = get_logger(module_path!());
    let environment = settings.environment.clone();

    Lifecycle::new()
        .on_startup("boot_banner", move || {
            logger.info(format!("🚀 {} Backend Started", SERVICE_NAME));
            Ok(())
        })
        .on_startup("environment", move || {
            logger.info(format!("📊 Environment: {}", environment));
            Ok(())
        })
        .on_shutdown("shutdown_banner", move || {
            logger.info(format!("🛑 {} Backend Shutdown", SERVICE_NAME));
            Ok(())
        })
}
