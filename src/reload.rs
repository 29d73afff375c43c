use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, SystemTime};

use tracing::{debug, info};

pub const RELOAD_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Why the server stopped serving
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerExit {
    Shutdown,
    /// The executable at this path was rebuilt
    Reload(PathBuf),
}

/// Watches the running executable so a rebuild restarts the process.
#[derive(Debug, Clone)]
pub struct ExecutableWatcher {
    path: PathBuf,
    modified: Option<SystemTime>,
}

impl ExecutableWatcher {
    pub fn current() -> io::Result<Self> {
        Self::for_path(std::env::current_exe()?)
    }

    pub fn for_path(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let modified = modified_at(&path)?;
        Ok(Self { path, modified })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A file that is briefly missing (mid-rebuild) does not count as changed.
    pub fn has_changed(&self) -> bool {
        match modified_at(&self.path) {
            Ok(modified) => modified != self.modified,
            Err(_) => false,
        }
    }

    /// Resolves once the executable has been replaced.
    pub async fn changed(self, poll: Duration) {
        let mut interval = tokio::time::interval(poll);
        loop {
            interval.tick().await;
            if self.has_changed() {
                info!("♻️  {} changed on disk, reloading", self.path.display());
                return;
            }
        }
    }
}

fn modified_at(path: &Path) -> io::Result<Option<SystemTime>> {
    Ok(std::fs::metadata(path)?.modified().ok())
}

/// Replace the current process with a fresh copy of `exe`.
///
/// Takes the path recorded at startup: once the binary is replaced,
/// `current_exe` on Linux points at the deleted original. Only returns if
/// the restart could not be performed.
pub fn restart(exe: &Path) -> io::Error {
    debug!("Re-executing {}", exe.display());

    let mut command = Command::new(exe);
    command.args(std::env::args_os().skip(1));
    exec(command)
}

#[cfg(unix)]
fn exec(mut command: Command) -> io::Error {
    use std::os::unix::process::CommandExt;
    command.exec()
}

#[cfg(not(unix))]
fn exec(mut command: Command) -> io::Error {
    match command.spawn() {
        Ok(_) => std::process::exit(0),
        Err(e) => e,
    }
}
