use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StdJsonError>;

#[derive(Error, Debug)]
pub enum StdJsonError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not find {contract} artifact at {}", path.display())]
    ArtifactNotFound { contract: String, path: PathBuf },

    #[error("Could not resolve source {source_path} (contracts directory: {})", contracts_dir.display())]
    Resolution {
        source_path: String,
        contracts_dir: PathBuf,
    },

    #[error("Invalid metadata for {contract}: {message}")]
    Metadata { contract: String, message: String },

    #[error("Compiler error: {0}")]
    Compiler(String),

    #[error("Compiler output has no contract {contract} in {path}")]
    MissingCompilerOutput { path: String, contract: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl StdJsonError {
    /// Pre-flight errors abort the whole run; everything else is scoped to
    /// a single contract.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Toml(_))
    }

    /// 2 for a malformed invocation, 1 for anything that failed later.
    pub fn exit_code(&self) -> i32 {
        if self.is_fatal() {
            2
        } else {
            1
        }
    }
}
