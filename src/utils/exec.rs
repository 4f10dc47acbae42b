//! External command execution.
//!
//! The front-end build runs through the [`BuildTool`] trait so the pipeline
//! never spawns processes directly. [`SystemBuildTool`] is the real
//! implementation; tests substitute their own.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! let exit = Cmd::from_slice(&["pnpm", "run", "build"]).cwd("gui").status()?;
//! ```

use std::{
    ffi::{OsStr, OsString},
    io,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};

// ============================================================================
// Exit Status
// ============================================================================

/// Outcome of an external command.
///
/// `None` means the process ended without an exit code (killed by a signal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolExit(Option<i32>);

impl ToolExit {
    pub const SUCCESS: Self = Self(Some(0));

    /// Exit with the given code.
    pub const fn code(code: i32) -> Self {
        Self(Some(code))
    }

    /// Process terminated without an exit code.
    pub const fn signaled() -> Self {
        Self(None)
    }

    pub const fn success(self) -> bool {
        matches!(self.0, Some(0))
    }

    pub const fn exit_code(self) -> Option<i32> {
        self.0
    }
}

impl From<ExitStatus> for ToolExit {
    fn from(status: ExitStatus) -> Self {
        match status.code() {
            Some(0) => Self::SUCCESS,
            Some(code) => Self::code(code),
            None => Self::signaled(),
        }
    }
}

// ============================================================================
// Build Tool
// ============================================================================

/// Runs the external front-end build.
pub trait BuildTool {
    /// Run `command` (program followed by arguments) in `cwd` and wait for it.
    ///
    /// Returns `ErrorKind::NotFound` when the program cannot be located.
    fn execute(&self, command: &[String], cwd: &Path) -> io::Result<ToolExit>;
}

/// Spawns the build as a real subprocess with inherited stdout/stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBuildTool;

impl BuildTool for SystemBuildTool {
    fn execute(&self, command: &[String], cwd: &Path) -> io::Result<ToolExit> {
        Cmd::from_slice(command).cwd(cwd).status()
    }
}

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Debug, Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
}

impl Cmd {
    /// Create from a command array (e.g., `["pnpm", "run", "build"]`).
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter();
        let program = iter
            .next()
            .map(|s| s.as_ref().to_owned())
            .unwrap_or_default();
        let args = iter
            .map(|s| s.as_ref().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
        Self {
            program,
            args,
            ..Default::default()
        }
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Run with inherited stdio and wait for completion.
    ///
    /// Bare names are searched on `PATH` (this also finds `pnpm.cmd` style
    /// shims on Windows). Relative paths like `./build.sh` resolve against
    /// the working directory the command runs in.
    pub fn status(self) -> io::Result<ToolExit> {
        let dir = match self.cwd {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let program =
            which::which_in(&self.program, std::env::var_os("PATH"), &dir).map_err(|err| {
                let name = self.program.to_string_lossy();
                io::Error::new(io::ErrorKind::NotFound, format!("`{name}`: {err}"))
            })?;

        Command::new(program)
            .args(&self.args)
            .current_dir(&dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map(ToolExit::from)
    }
}

// ============================================================================
// Tests
// ============================================================================
