//! Selection through an external menu program.
//!
//! The selector is spawned with both standard streams piped. The menu is written to
//! its stdin, which is then closed so the selector sees end of input. Only after the
//! selector has exited is its stdout read. Reading early, or keeping stdin open,
//! deadlocks selectors that wait for the full list before rendering.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, warn};

/// An external program that reads menu lines on stdin and prints the chosen one.
#[derive(Debug, Clone)]
pub struct Selector {
    /// Selector executable.
    pub program: PathBuf,
    /// Arguments passed to the selector unchanged.
    pub args: Vec<String>,
    /// Upper bound on how long the selector may stay open.
    pub timeout: Option<Duration>,
}

impl Selector {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Presents `names` and returns the chosen line, or `None` when the user cancelled.
    pub async fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Option<String>> {
        let menu = render_menu(names);

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .with_context(|| format!("failed to spawn selector {}", self.program.display()))?;
        debug!(
            program = %self.program.display(),
            pid = child.id().unwrap_or(0),
            entries = names.len(),
            "selector started"
        );

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("selector stdin was not captured"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("selector stdout was not captured"))?;

        match stdin.write_all(menu.as_bytes()).await {
            Ok(()) => {}
            // The selector may exit without consuming the whole menu.
            Err(err) if err.kind() == ErrorKind::BrokenPipe => {
                debug!("selector closed its input early");
            }
            Err(err) => return Err(err).context("failed to write menu to selector"),
        }
        drop(stdin);

        let status = match self.timeout {
            Some(timeout) => {
                let waited = tokio::time::timeout(timeout, child.wait()).await;
                match waited {
                    Ok(status) => status.context("failed to wait for selector")?,
                    Err(_) => {
                        if let Err(err) = child.kill().await {
                            warn!(
                                pid = child.id().unwrap_or(0),
                                "failed to kill selector: {}",
                                err
                            );
                        }
                        return Err(anyhow!(
                            "selector {} did not exit within {:?}",
                            self.program.display(),
                            timeout
                        ));
                    }
                }
            }
            None => child.wait().await.context("failed to wait for selector")?,
        };

        let mut response = String::new();
        stdout
            .read_to_string(&mut response)
            .await
            .context("failed to read selector output")?;

        let choice = parse_choice(&response);
        match (&choice, status.success()) {
            (None, false) => debug!(code = ?status.code(), "selector exited without a choice"),
            (Some(_), false) => warn!(code = ?status.code(), "selector exited with failure"),
            _ => {}
        }
        Ok(choice)
    }
}

/// Joins names into newline-terminated menu lines.
pub fn render_menu<S: AsRef<str>>(names: &[S]) -> String {
    let mut menu = String::with_capacity(names.iter().map(|n| n.as_ref().len() + 1).sum());
    for name in names {
        menu.push_str(name.as_ref());
        menu.push('\n');
    }
    menu
}

fn parse_choice(response: &str) -> Option<String> {
    let line = response.lines().next()?;
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}
