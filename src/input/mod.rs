//! Standard JSON Input reconstruction.
//!
//! Source keys are copied from the artifact metadata unchanged, since the
//! compiler embeds them in the metadata it emits. Only the file contents are
//! read fresh from disk.

pub mod path;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::artifact::Artifact;
use crate::error::Result;

pub use path::{normalize_source_path, PathStyle, SourceResolver};

/// Compiler input document, as persisted to `<Contract>-input.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardJsonInput {
    pub language: String,
    pub sources: BTreeMap<String, SourceContent>,
    pub settings: InputSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceContent {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remappings: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimizer: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evm_version: Option<serde_json::Value>,
    /// Only set on the in-memory copy handed to the compiler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_selection: Option<serde_json::Value>,
}

impl StandardJsonInput {
    /// Rebuild the input that produced `artifact`.
    pub fn reconstruct(artifact: &Artifact, resolver: &SourceResolver<'_>) -> Result<Self> {
        let metadata = artifact.parse_metadata()?;

        let mut sources = BTreeMap::new();
        for key in metadata.sources.keys() {
            let file = resolver.resolve(key)?;
            let content = std::fs::read_to_string(&file)?;
            sources.insert(key.clone(), SourceContent { content });
        }

        Ok(Self {
            language: metadata.language,
            sources,
            settings: InputSettings {
                remappings: metadata.settings.remappings,
                optimizer: metadata.settings.optimizer,
                evm_version: metadata.settings.evm_version,
                output_selection: None,
            },
        })
    }

    /// Copy of this input requesting every output for every contract.
    pub fn with_full_output_selection(&self) -> Self {
        let mut input = self.clone();
        input.settings.output_selection = Some(serde_json::json!({ "*": { "*": ["*", "*"] } }));
        input
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}
