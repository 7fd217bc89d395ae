//! External command execution
//!
//! `run_command_safe` is the only place the installer spawns processes.
//! It guarantees:
//!
//! - Process group isolation, so an interrupted install can stop children
//! - PID registration with the global `ChildRegistry` while the child runs
//! - Arguments come from a `CommandArgs` implementation, never raw strings
//!
//! A non-zero exit is not an error at this layer: callers inspect
//! `CommandOutput::success` and decide which `ProvisionError` it becomes.

use crate::command_traits::CommandArgs;
use crate::process_guard::{ChildRegistry, CommandProcessGroup};
use anyhow::{Context, Result};
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;
use tracing::{debug, info};

/// Execute a typed command and collect its result.
///
/// # Returns
///
/// - `Ok(output)` when the program ran, whatever its exit status
/// - `Err` when it could not be spawned, fed, or waited on
pub fn run_command_safe<T: CommandArgs>(args: &T) -> Result<CommandOutput> {
    let description = args.describe();
    info!("Running: {}", description);

    let mut cmd = Command::new(args.program());
    cmd.args(args.to_cli_args()).in_new_process_group();

    for (key, value) in args.get_env_vars() {
        cmd.env(key, value);
    }

    let stdin = args.stdin();
    cmd.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });

    if args.passthrough() {
        cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
    } else {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    }

    let mut child = cmd
        .spawn()
        .with_context(|| format!("Failed to spawn {}", args.program()))?;
    let pid = child.id();
    track(pid, true);

    // stdin is fed from its own thread while stdout/stderr are drained here,
    // so a child that writes before it finishes reading cannot stall.
    let (waited, fed) = thread::scope(|scope| {
        let writer = match (stdin, child.stdin.take()) {
            // The pipe drops when the writer returns, closing the child's stdin.
            (Some(input), Some(mut pipe)) => Some(scope.spawn(move || pipe.write_all(input))),
            _ => None,
        };
        let waited = child.wait_with_output();
        let fed = match writer {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked"))),
            None => Ok(()),
        };
        (waited, fed)
    });
    track(pid, false);

    let output = waited.with_context(|| format!("Failed waiting for {}", args.program()))?;
    fed.with_context(|| format!("Failed writing stdin of {}", description))?;

    let result = CommandOutput {
        stdout: output.stdout,
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code(),
        success: output.status.success(),
    };

    debug!(
        "{} exited with {:?} (success={})",
        args.program(),
        result.exit_code,
        result.success
    );

    Ok(result)
}

fn track(pid: u32, running: bool) {
    // A poisoned registry only loses interrupt cleanup for this child.
    if let Ok(mut registry) = ChildRegistry::global().lock() {
        if running {
            registry.register(pid);
        } else {
            registry.unregister(pid);
        }
    }
}

/// Output from a command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Raw standard output (may be binary, e.g. a dearmored key).
    pub stdout: Vec<u8>,
    /// Standard error, lossily decoded.
    pub stderr: String,
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    /// Whether the command exited with code 0.
    pub success: bool,
}

impl CommandOutput {
    /// Standard output as text.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Return an error describing the failure unless the command succeeded.
    pub fn ensure_success(&self, context: &str) -> Result<()> {
        if self.success {
            return Ok(());
        }
        let code = self
            .exit_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            anyhow::bail!("{} failed (exit code {})", context, code)
        } else {
            anyhow::bail!("{} failed (exit code {}): {}", context, code, stderr)
        }
    }
}
