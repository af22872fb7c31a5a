//! Build artifacts (`<Contract>.json`) and the metadata embedded in them.
//!
//! An artifact's `metadata` field is itself a JSON document serialized to a
//! string. It is kept verbatim so verification can compare it byte-for-byte,
//! and parsed on demand into [`Metadata`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StdJsonError};

/// A compiled-contract record produced by an earlier compiler run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(default)]
    pub contract_name: Option<String>,
    /// Serialized compiler metadata.
    pub metadata: String,
    /// Hex creation bytecode, optionally `0x`-prefixed.
    pub bytecode: String,
}

/// Parsed view of [`Artifact::metadata`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Metadata {
    pub language: String,
    #[serde(default)]
    pub compiler: Option<CompilerInfo>,
    pub sources: BTreeMap<String, serde_json::Value>,
    pub settings: MetadataSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompilerInfo {
    pub version: String,
}

/// Compiler settings recorded in metadata. Only the fields the input
/// document carries are typed; the rest are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataSettings {
    #[serde(default)]
    pub remappings: Option<serde_json::Value>,
    #[serde(default)]
    pub optimizer: Option<serde_json::Value>,
    #[serde(default)]
    pub evm_version: Option<serde_json::Value>,
    #[serde(default)]
    pub compilation_target: BTreeMap<String, String>,
}

/// The file-path/contract-name pair an artifact was compiled for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilationTarget {
    pub path: String,
    pub contract: String,
}

impl Artifact {
    /// Read `<contract>.json` from the build directory.
    ///
    /// Every call parses the file afresh, so the returned value owns its whole
    /// graph and shares nothing with other loads of the same artifact.
    pub fn load(contract: &str, build_dir: &Path) -> Result<Self> {
        let path = artifact_path(contract, build_dir);
        tracing::debug!(path = %path.display(), "reading artifact file");
        if !path.is_file() {
            return Err(StdJsonError::ArtifactNotFound {
                contract: contract.to_string(),
                path,
            });
        }
        let content = std::fs::read_to_string(&path)?;
        let artifact: Artifact = serde_json::from_str(&content)?;
        Ok(artifact)
    }

    /// Parse the embedded metadata document.
    pub fn parse_metadata(&self) -> Result<Metadata> {
        serde_json::from_str(&self.metadata).map_err(|e| StdJsonError::Metadata {
            contract: self.display_name(),
            message: e.to_string(),
        })
    }

    /// Bytecode without its `0x` prefix.
    pub fn bytecode_hex(&self) -> &str {
        strip_hex_prefix(&self.bytecode)
    }

    /// Contract name for messages, `artifact` when the record has none.
    pub fn display_name(&self) -> String {
        self.contract_name
            .clone()
            .unwrap_or_else(|| "artifact".into())
    }
}

impl Metadata {
    /// The single `settings.compilationTarget` entry. `artifact_name` is used
    /// in the error.
    pub fn compilation_target(&self, artifact_name: &str) -> Result<CompilationTarget> {
        let mut entries = self.settings.compilation_target.iter();
        match (entries.next(), entries.next()) {
            (Some((path, contract)), None) => Ok(CompilationTarget {
                path: path.clone(),
                contract: contract.clone(),
            }),
            _ => Err(StdJsonError::Metadata {
                contract: artifact_name.to_string(),
                message: format!(
                    "expected exactly one compilation target, found {}",
                    self.settings.compilation_target.len()
                ),
            }),
        }
    }

    pub fn compiler_version(&self) -> Option<&str> {
        self.compiler.as_ref().map(|c| c.version.as_str())
    }
}

pub fn artifact_path(contract: &str, build_dir: &Path) -> PathBuf {
    build_dir.join(format!("{contract}.json"))
}

pub fn strip_hex_prefix(hex: &str) -> &str {
    hex.strip_prefix("0x").unwrap_or(hex)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) const FOO_METADATA: &str = r#"{"compiler":{"version":"0.8.19+commit.7dd6d404"},"language":"Solidity","output":{},"settings":{"compilationTarget":{"project:/contracts/Foo.sol":"Foo"},"evmVersion":"paris","libraries":{},"metadata":{"bytecodeHash":"ipfs"},"optimizer":{"enabled":true,"runs":200},"remappings":[]},"sources":{"project:/contracts/Foo.sol":{"keccak256":"0x01","license":"MIT","urls":[]}},"version":1}"#;

    pub(crate) fn foo_artifact() -> Artifact {
        Artifact {
            contract_name: Some("Foo".into()),
            metadata: FOO_METADATA.into(),
            bytecode: "0x6001".into(),
        }
    }

    #[test]
    fn missing_artifact_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = Artifact::load("Missing", dir.path()).unwrap_err();
        assert!(matches!(err, StdJsonError::ArtifactNotFound { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn load_ignores_unrelated_fields() {
        let dir = tempfile::tempdir().unwrap();
        let record = serde_json::json!({
            "contractName": "Foo",
            "abi": [],
            "metadata": FOO_METADATA,
            "bytecode": "0x6001",
            "deployedBytecode": "0x00",
            "networks": {}
        });
        std::fs::write(dir.path().join("Foo.json"), record.to_string()).unwrap();

        let artifact = Artifact::load("Foo", dir.path()).unwrap();
        assert_eq!(artifact, foo_artifact());
    }

    #[test]
    fn loads_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Foo.json"),
            serde_json::to_string(&foo_artifact()).unwrap(),
        )
        .unwrap();

        let mut first = Artifact::load("Foo", dir.path()).unwrap();
        first.metadata.clear();
        let second = Artifact::load("Foo", dir.path()).unwrap();
        assert_eq!(second.metadata, FOO_METADATA);
    }

    #[test]
    fn metadata_settings_are_typed() {
        let metadata = foo_artifact().parse_metadata().unwrap();
        assert_eq!(metadata.language, "Solidity");
        assert_eq!(metadata.compiler_version(), Some("0.8.19+commit.7dd6d404"));
        assert_eq!(
            metadata.settings.evm_version,
            Some(serde_json::json!("paris"))
        );
        assert_eq!(
            metadata.compilation_target("Foo").unwrap(),
            CompilationTarget {
                path: "project:/contracts/Foo.sol".into(),
                contract: "Foo".into(),
            }
        );
    }

    #[test]
    fn malformed_metadata_is_reported() {
        let mut artifact = foo_artifact();
        artifact.metadata = "{not json".into();
        let err = artifact.parse_metadata().unwrap_err();
        assert!(matches!(err, StdJsonError::Metadata { .. }));
        assert!(err.to_string().contains("Foo"));
    }

    #[test]
    fn empty_compilation_target_is_rejected() {
        let mut metadata = foo_artifact().parse_metadata().unwrap();
        metadata.settings.compilation_target.clear();
        let err = metadata.compilation_target("Foo").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid metadata for Foo: expected exactly one compilation target, found 0"
        );
    }

    #[test]
    fn bytecode_prefix_is_optional() {
        assert_eq!(foo_artifact().bytecode_hex(), "6001");
        assert_eq!(strip_hex_prefix("6001"), "6001");
    }
}
