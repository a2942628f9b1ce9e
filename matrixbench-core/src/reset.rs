//! Environment Reset
//!
//! Before the first sample and after every sample the runner returns the
//! machine to a cold state: build output directories are deleted and any
//! lingering runtime process (e.g. a `dotnet` build server) is killed.
//!
//! Reset is best effort. A directory that does not exist or a process that
//! is not running is the normal case, so nothing here ever fails; problems
//! are logged at debug level and otherwise ignored.

use std::path::PathBuf;

/// Capability to return the environment to a clean state
pub trait Reset {
    /// Clean up. Never fails.
    fn reset(&mut self);
}

impl<R: Reset + ?Sized> Reset for &mut R {
    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Reset that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReset;

impl Reset for NoopReset {
    fn reset(&mut self) {}
}

/// Deletes build directories and kills a runtime process by name
#[derive(Debug, Clone, Default)]
pub struct EnvironmentReset {
    directories: Vec<PathBuf>,
    process_name: Option<String>,
}

impl EnvironmentReset {
    /// Create a reset for the given directories and process name
    pub fn new<I, P>(directories: I, process_name: Option<String>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            directories: directories.into_iter().map(Into::into).collect(),
            process_name: process_name.filter(|n| !n.is_empty()),
        }
    }

    /// Directories removed on each reset
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Process killed on each reset
    pub fn process_name(&self) -> Option<&str> {
        self.process_name.as_deref()
    }

    fn remove_directories(&self) {
        for dir in &self.directories {
            match std::fs::remove_dir_all(dir) {
                Ok(()) => tracing::debug!(dir = %dir.display(), "removed build directory"),
                Err(e) => tracing::debug!(dir = %dir.display(), error = %e, "directory not removed"),
            }
        }
    }
}

impl Reset for EnvironmentReset {
    fn reset(&mut self) {
        self.remove_directories();
        if let Some(name) = &self.process_name {
            let killed = kill_by_name(name);
            tracing::debug!(process = %name, killed, "killed stray processes");
        }
    }
}

/// Linux: `comm` holds at most 15 bytes of the executable name.
#[cfg(target_os = "linux")]
const COMM_LEN: usize = 15;

/// Send SIGKILL to every process whose name is `name`. Returns how many
/// signals were delivered.
#[cfg(target_os = "linux")]
fn kill_by_name(name: &str) -> usize {
    let wanted = truncate_comm(name);
    let own_pid = std::process::id();

    let entries = match std::fs::read_dir("/proc") {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(error = %e, "cannot list /proc");
            return 0;
        }
    };

    let mut killed = 0;
    for entry in entries.flatten() {
        let Some(pid) = entry
            .file_name()
            .to_str()
            .and_then(|s| s.parse::<u32>().ok())
        else {
            continue;
        };
        if pid == own_pid {
            continue;
        }
        let Ok(comm) = std::fs::read_to_string(entry.path().join("comm")) else {
            continue;
        };
        if comm.trim_end_matches('\n') != wanted {
            continue;
        }
        let ret = unsafe { libc::kill(pid as libc::pid_t, libc::SIGKILL) };
        if ret == 0 {
            killed += 1;
        } else {
            tracing::debug!(
                pid,
                error = %std::io::Error::last_os_error(),
                "failed to kill process"
            );
        }
    }
    killed
}

#[cfg(target_os = "linux")]
fn truncate_comm(name: &str) -> &str {
    if name.len() <= COMM_LEN {
        return name;
    }
    let mut end = COMM_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

#[cfg(all(unix, not(target_os = "linux")))]
fn kill_by_name(name: &str) -> usize {
    run_quietly(std::process::Command::new("pkill").args(["-9", "-x", name]))
}

#[cfg(windows)]
fn kill_by_name(name: &str) -> usize {
    let image = if name.to_ascii_lowercase().ends_with(".exe") {
        name.to_string()
    } else {
        format!("{}.exe", name)
    };
    run_quietly(std::process::Command::new("taskkill").args(["/F", "/IM", &image, "/T"]))
}

/// Run a kill helper with output discarded; 1 if it reported success.
#[cfg(not(target_os = "linux"))]
fn run_quietly(command: &mut std::process::Command) -> usize {
    use std::process::Stdio;
    match command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) if status.success() => 1,
        Ok(_) => 0,
        Err(e) => {
            tracing::debug!(error = %e, "kill helper unavailable");
            0
        }
    }
}
