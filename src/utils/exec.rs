//! External command execution utilities.
//!
//! Provides a Builder-based API for running the external editors as blocking
//! subprocesses with captured output.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! // Fails on non-zero exit
//! Cmd::new("fontforge").args(["-script", "gen.py"]).run()?;
//!
//! // Caller inspects the status (tools that signal failure another way)
//! let out = Cmd::new(&config.tools.inkscape).arg(src).output()?;
//! ```

use anyhow::{Context, Result, bail};
use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
};

/// Command builder for external process execution.
///
/// Every invocation blocks until the child exits; nothing is cancelled
/// mid-flight. Output is always captured, never inherited.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            let arg = arg.as_ref();
            if !arg.is_empty() {
                self.args.push(arg.to_owned());
            }
        }
        self
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Get the program name for error messages.
    fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Execute and return the captured output regardless of exit status.
    ///
    /// Only errors if the process could not be spawned at all. Use this for
    /// tools that signal failure through their output files rather than the
    /// exit code.
    pub fn output(self) -> Result<Output> {
        let name = self.program_name();
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        cmd.output()
            .with_context(|| format!("Failed to execute `{name}`"))
    }

    /// Execute and fail with formatted stderr/stdout on non-zero exit.
    pub fn run(self) -> Result<Output> {
        let name = self.program_name();
        let output = self.output()?;
        if !output.status.success() {
            bail!(format_error(&name, &output));
        }
        Ok(output)
    }
}

/// Format error message for a failed command.
fn format_error(name: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let mut msg = format!("Command `{name}` failed with {}", output.status);
    let stderr_trimmed = stderr.trim();
    if !stderr_trimmed.is_empty() {
        msg.push('\n');
        msg.push_str(stderr_trimmed);
    }
    let stdout_trimmed = stdout.trim();
    if !stdout_trimmed.is_empty() {
        msg.push_str("\nStdout:\n");
        msg.push_str(stdout_trimmed);
    }
    msg
}
