pub mod args;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use args::{ConstructorArgsOverride, ContractId};

/// Top-level configuration from `.stdjsonin.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub compiler: CompilerConfig,
}

/// Project directories. Relative entries resolve against the working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_build_directory")]
    pub build_directory: PathBuf,
    #[serde(default = "default_contracts_directory")]
    pub contracts_directory: PathBuf,
    /// Unset means the process's current directory.
    #[serde(default)]
    pub output_directory: Option<PathBuf>,
}

fn default_build_directory() -> PathBuf {
    PathBuf::from("build/contracts")
}

fn default_contracts_directory() -> PathBuf {
    PathBuf::from("contracts")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            build_directory: default_build_directory(),
            contracts_directory: default_contracts_directory(),
            output_directory: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Path or name of the `solc` binary.
    #[serde(default = "default_solc")]
    pub solc: PathBuf,
}

fn default_solc() -> PathBuf {
    PathBuf::from("solc")
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            solc: default_solc(),
        }
    }
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# stdjsonin configuration

[paths]
# Directory holding <Contract>.json build artifacts.
build_directory = "build/contracts"

# Directory holding the project's Solidity sources.
contracts_directory = "contracts"

# Where <Contract>-input.json files are written, relative to the working
# directory. Defaults to the directory stdjsonin is run from.
# output_directory = "build/inputs"

[compiler]
# solc binary used to verify the reconstructed input.
solc = "solc"
"#
    }
}
