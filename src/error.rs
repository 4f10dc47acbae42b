//! Generation error types.
//!
//! Every variant is terminal: the run aborts and no output file is written.

use std::error::Error as _;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while building the front-end or generating the module.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("frontend folder `{0}` not found")]
    FrontendDirMissing(PathBuf),

    #[error("`{0}` not found in PATH")]
    BuildToolMissing(String),

    #[error("`{program}` failed with exit code {code}")]
    BuildToolFailed { program: String, code: i32 },

    #[error("`{0}` not found after build, aborting")]
    OutputMissing(PathBuf),

    #[error("duplicate generated identifier `{name}` for `{first}` and `{second}`")]
    DuplicateIdentifier {
        name: String,
        first: String,
        second: String,
    },

    #[error("IO error on `{0}`")]
    Io(PathBuf, #[source] io::Error),
}

impl GenerateError {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: impl AsRef<Path>, err: io::Error) -> Self {
        Self::Io(path.as_ref().to_path_buf(), err)
    }

    /// Stage name used as the log prefix when reporting this error.
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::FrontendDirMissing(_) | Self::BuildToolMissing(_) | Self::BuildToolFailed { .. } => {
                "frontend"
            }
            Self::OutputMissing(_) => "dist",
            Self::DuplicateIdentifier { .. } => "embed",
            Self::Io(..) => "io",
        }
    }

    /// Process exit code for this failure.
    ///
    /// A failed build tool propagates its own exit code.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::BuildToolFailed { code, .. } if *code != 0 => *code,
            _ => 1,
        }
    }

    /// Render the error with its full source chain on one line.
    pub fn report(&self) -> String {
        let mut msg = format!("{}: {self}", self.stage());
        let mut source = self.source();
        while let Some(err) = source {
            msg.push_str(": ");
            msg.push_str(&err.to_string());
            source = err.source();
        }
        msg
    }
}
