pub mod solc;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::artifact::CompilationTarget;
use crate::error::{Result, StdJsonError};
use crate::input::StandardJsonInput;

pub use solc::SolcCompiler;

/// A compiler that accepts Standard JSON Input.
pub trait Compiler {
    /// Compile the input and return the parsed output document.
    fn compile(&self, input: &StandardJsonInput) -> Result<CompilerOutput>;

    /// Version of this compiler, if it can be determined.
    fn version(&self) -> Result<Option<semver::Version>> {
        Ok(None)
    }
}

/// The parts of Standard JSON Output this tool reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilerOutput {
    /// File path -> contract name -> contract output.
    #[serde(default)]
    pub contracts: BTreeMap<String, BTreeMap<String, ContractOutput>>,
    #[serde(default)]
    pub errors: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractOutput {
    #[serde(default)]
    pub metadata: Option<String>,
    #[serde(default)]
    pub evm: Option<EvmOutput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvmOutput {
    #[serde(default)]
    pub bytecode: Option<BytecodeOutput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BytecodeOutput {
    pub object: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: String,
    pub message: String,
    #[serde(default)]
    pub formatted_message: Option<String>,
}

impl CompilerOutput {
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Fail if the compiler reported any error-severity diagnostic.
    pub fn check_errors(&self) -> Result<()> {
        let errors: Vec<&str> = self
            .errors
            .iter()
            .filter(|d| d.severity == "error")
            .map(|d| d.formatted_message.as_deref().unwrap_or(&d.message))
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(StdJsonError::Compiler(errors.join("\n")))
        }
    }

    pub fn contract(&self, target: &CompilationTarget) -> Result<&ContractOutput> {
        self.contracts
            .get(&target.path)
            .and_then(|file| file.get(&target.contract))
            .ok_or_else(|| StdJsonError::MissingCompilerOutput {
                path: target.path.clone(),
                contract: target.contract.clone(),
            })
    }
}

impl ContractOutput {
    pub fn bytecode_object(&self) -> Option<&str> {
        self.evm
            .as_ref()
            .and_then(|evm| evm.bytecode.as_ref())
            .map(|b| b.object.as_str())
    }
}

/// Parse a solc version string down to its semver core.
///
/// Accepts `0.8.19+commit.7dd6d404`, `v0.8.19`, and the
/// `0.8.19+commit.7dd6d404.Linux.g++` form `solc --version` prints.
pub fn parse_compiler_version(raw: &str) -> Option<semver::Version> {
    let raw = raw.trim();
    let raw = raw.strip_prefix('v').unwrap_or(raw);
    let core = raw.split(['+', '-']).next()?;
    semver::Version::parse(core).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = r#"{
        "contracts": {
            "project:/contracts/Foo.sol": {
                "Foo": {
                    "metadata": "{\"language\":\"Solidity\"}",
                    "evm": { "bytecode": { "object": "6001" } }
                }
            }
        },
        "errors": [
            { "severity": "warning", "message": "unused variable" }
        ],
        "sources": {}
    }"#;

    fn foo_target() -> CompilationTarget {
        CompilationTarget {
            path: "project:/contracts/Foo.sol".into(),
            contract: "Foo".into(),
        }
    }

    #[test]
    fn finds_target_contract() {
        let output = CompilerOutput::parse(OUTPUT).unwrap();
        output.check_errors().unwrap();
        let contract = output.contract(&foo_target()).unwrap();
        assert_eq!(contract.bytecode_object(), Some("6001"));
        assert_eq!(
            contract.metadata.as_deref(),
            Some(r#"{"language":"Solidity"}"#)
        );
    }

    #[test]
    fn missing_contract_is_reported() {
        let output = CompilerOutput::parse(OUTPUT).unwrap();
        let target = CompilationTarget {
            path: "project:/contracts/Foo.sol".into(),
            contract: "Bar".into(),
        };
        let err = output.contract(&target).unwrap_err();
        assert!(matches!(err, StdJsonError::MissingCompilerOutput { .. }));
    }

    #[test]
    fn error_diagnostics_fail() {
        let output = CompilerOutput::parse(
            r#"{"errors":[{"severity":"error","message":"boom","formattedMessage":"ParserError: boom"}]}"#,
        )
        .unwrap();
        let err = output.check_errors().unwrap_err();
        assert_eq!(err.to_string(), "Compiler error: ParserError: boom");
    }

    #[test]
    fn parses_solc_version_strings() {
        let expected = semver::Version::new(0, 8, 19);
        assert_eq!(parse_compiler_version("0.8.19+commit.7dd6d404"), Some(expected.clone()));
        assert_eq!(parse_compiler_version("v0.8.19"), Some(expected.clone()));
        assert_eq!(
            parse_compiler_version("0.8.19+commit.7dd6d404.Linux.g++"),
            Some(expected)
        );
        assert_eq!(parse_compiler_version("nightly"), None);
    }
}
