use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("failed to read descriptor file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("descriptor TOML is malformed: {0}")]
    Toml(String),

    #[error("descriptor file declares no [[formula]] entries")]
    Empty,

    #[error("invalid formula name {0:?}: use lowercase letters, digits, '.', '_', '+', '-'")]
    InvalidName(String),

    #[error("formula {name}: invalid url {url:?}: {reason}")]
    InvalidUrl {
        name: String,
        url: String,
        reason: String,
    },

    #[error("formula {name}: invalid sha256 {value:?}: expected 64 hex characters")]
    InvalidSha256 { name: String, value: String },

    #[error("formula {name}: invalid build output {output:?}: {reason}")]
    InvalidOutput {
        name: String,
        output: String,
        reason: String,
    },

    #[error("formula {name}: toolchain {toolchain} is not declared as a build dependency")]
    MissingBuildDependency { name: String, toolchain: String },

    #[error("formula {name}: smoke test needs at least one argument")]
    EmptySmokeTest { name: String },

    /// Same name declared more than once. Neither entry is trusted.
    #[error("formula {name} is declared {} times (sha256: {}); keep exactly one entry", .hashes.len(), .hashes.join(", "))]
    Duplicate { name: String, hashes: Vec<String> },

    #[error("no formula named {0:?}")]
    NotFound(String),
}
