//! Command executor port and its process-backed implementations.
//!
//! Handlers only decide *what* to run. Running it goes through the
//! [`CommandExecutor`] port so synthesis can be tested without spawning
//! processes and hosts can route commands through their own tool registry.

use crate::error::{OpsError, Result};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info};

/// Tool name under which command strings are executed.
pub const SHELL_TOOL: &str = "shell";

/// Default cap on captured output kept in a [`CommandResult`].
pub const DEFAULT_MAX_OUTPUT_CHARS: usize = 4096;

/// Maximum number of trailing output lines kept in a [`CommandResult`].
pub const MAX_OUTPUT_LINES: usize = 200;

/// Outcome of one executed command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
}

impl CommandResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    pub fn failed(output: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
            error: Some(error.into()),
        }
    }
}

/// Port for running synthesized commands.
///
/// `Ok` carries the command's own outcome, successful or not. `Err` means the
/// command could not be run at all; handlers convert it into a failed node
/// result instead of propagating it.
pub trait CommandExecutor {
    fn execute(&self, tool: &str, command: &str) -> Result<CommandResult>;
}

/// Runs commands as child processes, without a shell.
///
/// Command strings are split with shell-words, so quoting works but pipes,
/// redirects and variable expansion do not.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    working_dir: Option<PathBuf>,
    max_output_chars: usize,
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self {
            working_dir: None,
            max_output_chars: DEFAULT_MAX_OUTPUT_CHARS,
        }
    }
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_max_output_chars(mut self, max_output_chars: usize) -> Self {
        self.max_output_chars = max_output_chars;
        self
    }
}

impl CommandExecutor for ShellExecutor {
    fn execute(&self, tool: &str, command: &str) -> Result<CommandResult> {
        if tool != SHELL_TOOL {
            return Err(OpsError::Execution(format!(
                "unsupported tool '{}': only '{}' commands can be executed",
                tool, SHELL_TOOL
            )));
        }

        let args = shell_words::split(command.trim()).map_err(|e| {
            OpsError::Execution(format!(
                "failed to parse command: {}\nCommand: {}\nFix: check for unmatched quotes or invalid escape sequences.",
                e, command
            ))
        })?;

        let Some((program, program_args)) = args.split_first() else {
            return Err(OpsError::Execution("command is empty".to_string()));
        };

        let mut process = Command::new(program);
        process.args(program_args);
        if let Some(dir) = &self.working_dir {
            process.current_dir(dir);
        }

        info!("executing: {}", command);
        let output = process.output().map_err(|e| {
            OpsError::Execution(format!(
                "failed to execute command: {}\nCommand: {}\nFix: ensure '{}' is installed and in PATH.",
                e, command, program
            ))
        })?;

        let stdout = truncate_output(
            &String::from_utf8_lossy(&output.stdout),
            MAX_OUTPUT_LINES,
            self.max_output_chars,
        );

        if output.status.success() {
            return Ok(CommandResult::ok(stdout));
        }

        let stderr = truncate_output(
            &String::from_utf8_lossy(&output.stderr),
            MAX_OUTPUT_LINES,
            self.max_output_chars,
        );
        let exit_code = output.status.code().unwrap_or(-1);
        debug!("command exited with code {}: {}", exit_code, command);

        let error = if stderr.trim().is_empty() {
            format!("command failed with exit code {}", exit_code)
        } else {
            stderr
        };

        Ok(CommandResult::failed(stdout, error))
    }
}

/// Records commands and reports success without running anything.
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    commands: RefCell<Vec<String>>,
}

impl DryRunExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands seen so far, in execution order.
    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }
}

impl CommandExecutor for DryRunExecutor {
    fn execute(&self, _tool: &str, command: &str) -> Result<CommandResult> {
        self.commands.borrow_mut().push(command.to_string());
        Ok(CommandResult::ok(format!("[dry-run] {}", command)))
    }
}

/// Keep the tail of `output`: at most `max_lines` lines and `max_chars` chars.
pub fn truncate_output(output: &str, max_lines: usize, max_chars: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    let result = lines[start..].join("\n");

    let char_count = result.chars().count();
    if char_count <= max_chars {
        return result;
    }

    let skip = char_count - max_chars;
    let tail: String = result.chars().skip(skip).collect();
    format!("...(truncated)...\n{}", tail)
}
