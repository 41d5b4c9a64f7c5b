use camino::{Utf8Path, Utf8PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Launch argument parsing error")]
    ParseError,
}

/// Result of a launch attempt that did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    Spawned { pid: u32 },
    /// Nothing exists at the configured path. Callers report this as a warning.
    Missing(Utf8PathBuf),
}

pub struct Launcher {
    exe_path: Utf8PathBuf,
    args: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedLaunchCommand {
    pub program: Utf8PathBuf,
    pub args: Vec<String>,
    pub working_dir: Utf8PathBuf,
}

#[cfg(target_os = "windows")]
fn split_args(cmd: &str) -> Option<Vec<String>> {
    // POSIX shlex treats `\` as an escape, which mangles paths like `C:\data`.
    // Only double-quote grouping and whitespace splitting are needed here.
    let mut parts = Vec::<String>::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in cmd.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }

    if in_quotes {
        return None;
    }

    if !current.is_empty() {
        parts.push(current);
    }

    Some(parts)
}

#[cfg(not(target_os = "windows"))]
fn split_args(cmd: &str) -> Option<Vec<String>> {
    shlex::split(cmd)
}

impl Launcher {
    pub fn new(exe_path: impl Into<Utf8PathBuf>, args: impl Into<String>) -> Self {
        Self {
            exe_path: exe_path.into(),
            args: args.into(),
        }
    }

    pub(crate) fn resolve_command(&self) -> Result<ResolvedLaunchCommand, LaunchError> {
        let args = if self.args.trim().is_empty() {
            Vec::new()
        } else {
            split_args(&self.args).ok_or(LaunchError::ParseError)?
        };

        let working_dir = self
            .exe_path
            .parent()
            .filter(|p| !p.as_str().is_empty())
            .map(Utf8Path::to_path_buf)
            .unwrap_or_else(|| Utf8PathBuf::from("."));

        Ok(ResolvedLaunchCommand {
            program: self.exe_path.clone(),
            args,
            working_dir,
        })
    }

    /// Start the executable detached from the updater. The child is not awaited.
    pub fn launch(&self) -> Result<LaunchOutcome, LaunchError> {
        if !self.exe_path.is_file() {
            return Ok(LaunchOutcome::Missing(self.exe_path.clone()));
        }

        let cmd = self.resolve_command()?;
        info!(
            "Launching program: {}, args: {:?}, cwd: {}",
            cmd.program, cmd.args, cmd.working_dir
        );

        let child = std::process::Command::new(cmd.program.as_std_path())
            .args(&cmd.args)
            .current_dir(cmd.working_dir.as_std_path())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()?;

        Ok(LaunchOutcome::Spawned { pid: child.id() })
    }
}
