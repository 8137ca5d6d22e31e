//! Detached execution of the chosen entry's command.

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::info;

/// Runs entry commands through a shell, detached from this process.
#[derive(Debug, Clone)]
pub struct Launcher {
    shell: PathBuf,
}

impl Launcher {
    pub fn new(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    /// Starts `command` as `<shell> -c <command>` in a new session and returns its pid.
    ///
    /// The child is never waited on; its exit status is not observed, and it keeps
    /// running after this process exits.
    pub fn launch(&self, command: &str) -> Result<u32> {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(false);

        #[cfg(unix)]
        unsafe {
            cmd.pre_exec(|| {
                if libc::setsid() == -1 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }

        let child = cmd
            .spawn()
            .with_context(|| format!("failed to launch '{}'", command))?;
        let pid = child.id().unwrap_or(0);
        info!(pid, command, "launched");
        Ok(pid)
    }
}
