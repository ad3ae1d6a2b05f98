// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Bounded child-process execution

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Captured result of one tool invocation
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    /// None if the process was killed
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub elapsed: Duration,
}

impl ToolOutput {
    /// stdout followed by stderr, for status scraping
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Locate an executable on PATH, or accept an existing explicit path
pub fn resolve_executable(executable: &Path) -> Option<PathBuf> {
    if executable.as_os_str().is_empty() {
        return None;
    }
    if executable.components().count() > 1 {
        return executable.is_file().then(|| executable.to_path_buf());
    }
    which::which(executable).ok()
}

/// Run `program args...`, feed `stdin_data`, and wait at most `time_limit`
pub async fn run_tool(
    program: &Path,
    args: &[String],
    stdin_data: Option<&str>,
    time_limit: Duration,
) -> Result<ToolOutput> {
    let started = Instant::now();
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(program = %program.display(), ?args, "Spawning external tool");
    let mut child = cmd
        .spawn()
        .with_context(|| format!("Failed to spawn {}", program.display()))?;

    if let Some(mut stdin) = child.stdin.take() {
        if let Some(data) = stdin_data {
            stdin
                .write_all(data.as_bytes())
                .await
                .context("Failed to write tool input")?;
            stdin.flush().await?;
        }
        drop(stdin);
    }

    tokio::select! {
        output = child.wait_with_output() => {
            let output = output.context("External tool execution failed")?;
            Ok(ToolOutput {
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                exit_code: output.status.code(),
                timed_out: false,
                elapsed: started.elapsed(),
            })
        }
        _ = tokio::time::sleep(time_limit) => {
            // Dropping the wait future drops the child, which kills it
            warn!(program = %program.display(), limit_secs = time_limit.as_secs_f64(), "External tool timed out");
            Ok(ToolOutput {
                stdout: String::new(),
                stderr: String::new(),
                exit_code: None,
                timed_out: true,
                elapsed: started.elapsed(),
            })
        }
    }
}
