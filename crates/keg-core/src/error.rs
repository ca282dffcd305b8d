//! Install pipeline errors.
//!
//! Every variant is terminal for the install attempt; nothing is retried.

use crate::descriptor::DescriptorError;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification used for reporting and process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Integrity,
    Build,
    TestFailure,
    Other,
}

impl ErrorKind {
    /// Process exit code for this kind of failure (never 0).
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Network => 3,
            ErrorKind::Integrity => 4,
            ErrorKind::Build => 5,
            ErrorKind::TestFailure => 6,
            ErrorKind::Other => 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum InstallError {
    /// Archive unreachable: transport failure or non-2xx response.
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// Fetched bytes do not hash to the declared digest.
    #[error("integrity error: expected sha256 {expected}, got {actual}")]
    Integrity { expected: String, actual: String },

    /// Toolchain could not run, exited non-zero, or produced no binary.
    /// `output` is the toolchain's own stdout/stderr, unmodified.
    #[error("build failed: {reason}{}", format_output(.output))]
    Build { reason: String, output: String },

    /// Smoke test did not exit 0.
    #[error("smoke test failed: {} {}: {reason}{}", .binary.display(), .args.join(" "), format_output(.output))]
    TestFailure {
        binary: PathBuf,
        args: Vec<String>,
        reason: String,
        output: String,
    },

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

fn format_output(output: &str) -> String {
    let trimmed = output.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n{}", trimmed)
    }
}

impl InstallError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InstallError::Network { .. } => ErrorKind::Network,
            InstallError::Integrity { .. } => ErrorKind::Integrity,
            InstallError::Build { .. } => ErrorKind::Build,
            InstallError::TestFailure { .. } => ErrorKind::TestFailure,
            InstallError::Descriptor(_) | InstallError::Archive(_) | InstallError::Io { .. } => {
                ErrorKind::Other
            }
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        InstallError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, InstallError>;
