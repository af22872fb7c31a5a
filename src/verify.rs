//! Recompile a reconstructed input and compare against the original artifact.
//!
//! Mismatches are outcomes, not errors: only a failed compile or a missing
//! target contract produces `Err`.

use serde::Serialize;

use crate::artifact::{strip_hex_prefix, Artifact, CompilationTarget};
use crate::compiler::{parse_compiler_version, Compiler};
use crate::error::Result;
use crate::input::StandardJsonInput;

/// Result of comparing a fresh compile against the stored artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    pub target: CompilationTarget,
    pub metadata_matches: bool,
    pub bytecode_matches: bool,
}

impl Verification {
    pub fn is_exact(&self) -> bool {
        self.metadata_matches && self.bytecode_matches
    }
}

pub fn verify(
    artifact: &Artifact,
    input: &StandardJsonInput,
    compiler: &dyn Compiler,
) -> Result<Verification> {
    let metadata = artifact.parse_metadata()?;
    let target = metadata.compilation_target(&artifact.display_name())?;

    warn_on_version_drift(metadata.compiler_version(), compiler);

    let output = compiler.compile(&input.with_full_output_selection())?;
    output.check_errors()?;
    let contract = output.contract(&target)?;

    let metadata_matches = contract.metadata.as_deref() == Some(artifact.metadata.as_str());
    let bytecode_matches = contract
        .bytecode_object()
        .map(strip_hex_prefix)
        .is_some_and(|fresh| fresh == artifact.bytecode_hex());

    tracing::debug!(
        path = %target.path,
        contract = %target.contract,
        metadata_matches,
        bytecode_matches,
        "verification complete"
    );

    Ok(Verification {
        target,
        metadata_matches,
        bytecode_matches,
    })
}

fn warn_on_version_drift(recorded: Option<&str>, compiler: &dyn Compiler) {
    let Some(recorded) = recorded.and_then(parse_compiler_version) else {
        return;
    };
    match compiler.version() {
        Ok(Some(local)) if local != recorded => {
            tracing::warn!(
                recorded = %recorded,
                local = %local,
                "compiler version differs from the one recorded in metadata; output may not match"
            );
        }
        Ok(_) => {}
        Err(e) => tracing::debug!(error = %e, "could not determine compiler version"),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::artifact::tests::{foo_artifact, FOO_METADATA};
    use crate::compiler::{BytecodeOutput, CompilerOutput, ContractOutput, EvmOutput};
    use crate::error::StdJsonError;
    use crate::input::{InputSettings, SourceContent};
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    /// Returns a fixed contract output for `project:/contracts/Foo.sol:Foo`.
    pub(crate) struct FakeCompiler {
        pub metadata: String,
        pub bytecode: String,
        pub seen: RefCell<Vec<StandardJsonInput>>,
    }

    impl FakeCompiler {
        pub(crate) fn reproducing_foo() -> Self {
            Self {
                metadata: FOO_METADATA.into(),
                bytecode: "6001".into(),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Compiler for FakeCompiler {
        fn compile(&self, input: &StandardJsonInput) -> Result<CompilerOutput> {
            self.seen.borrow_mut().push(input.clone());
            let contract = ContractOutput {
                metadata: Some(self.metadata.clone()),
                evm: Some(EvmOutput {
                    bytecode: Some(BytecodeOutput {
                        object: self.bytecode.clone(),
                    }),
                }),
            };
            let mut contracts = BTreeMap::new();
            contracts.insert(
                "project:/contracts/Foo.sol".to_string(),
                BTreeMap::from([("Foo".to_string(), contract)]),
            );
            Ok(CompilerOutput {
                contracts,
                errors: vec![],
            })
        }
    }

    fn foo_input() -> StandardJsonInput {
        StandardJsonInput {
            language: "Solidity".into(),
            sources: BTreeMap::from([(
                "project:/contracts/Foo.sol".to_string(),
                SourceContent {
                    content: "contract Foo {}".into(),
                },
            )]),
            settings: InputSettings::default(),
        }
    }

    #[test]
    fn exact_reproduction_matches_both() {
        let compiler = FakeCompiler::reproducing_foo();
        let result = verify(&foo_artifact(), &foo_input(), &compiler).unwrap();
        assert!(result.metadata_matches);
        assert!(result.bytecode_matches);
        assert!(result.is_exact());
        assert_eq!(result.target.contract, "Foo");
    }

    #[test]
    fn bytecode_prefix_is_normalized_on_both_sides() {
        let mut compiler = FakeCompiler::reproducing_foo();
        compiler.bytecode = "0x6001".into();
        let mut artifact = foo_artifact();
        artifact.bytecode = "6001".into();
        assert!(verify(&artifact, &foo_input(), &compiler).unwrap().bytecode_matches);
    }

    #[test]
    fn mismatches_are_reported_independently() {
        let mut compiler = FakeCompiler::reproducing_foo();
        compiler.bytecode = "6002".into();
        let result = verify(&foo_artifact(), &foo_input(), &compiler).unwrap();
        assert!(result.metadata_matches);
        assert!(!result.bytecode_matches);

        let mut compiler = FakeCompiler::reproducing_foo();
        compiler.metadata = "{}".into();
        let result = verify(&foo_artifact(), &foo_input(), &compiler).unwrap();
        assert!(!result.metadata_matches);
        assert!(result.bytecode_matches);
    }

    #[test]
    fn compiler_receives_full_output_selection() {
        let compiler = FakeCompiler::reproducing_foo();
        verify(&foo_artifact(), &foo_input(), &compiler).unwrap();
        let seen = compiler.seen.borrow();
        assert_eq!(
            seen[0].settings.output_selection,
            Some(serde_json::json!({ "*": { "*": ["*", "*"] } }))
        );
    }

    #[test]
    fn ambiguous_target_names_the_contract() {
        let mut artifact = foo_artifact();
        artifact.metadata = FOO_METADATA.replace(
            r#""compilationTarget":{"project:/contracts/Foo.sol":"Foo"}"#,
            r#""compilationTarget":{}"#,
        );
        let compiler = FakeCompiler::reproducing_foo();
        let err = verify(&artifact, &foo_input(), &compiler).unwrap_err();
        assert!(err.to_string().starts_with("Invalid metadata for Foo:"));
        assert!(compiler.seen.borrow().is_empty());
    }

    #[test]
    fn missing_target_in_output_is_an_error() {
        let mut artifact = foo_artifact();
        artifact.metadata = FOO_METADATA.replace(
            r#""compilationTarget":{"project:/contracts/Foo.sol":"Foo"}"#,
            r#""compilationTarget":{"project:/contracts/Foo.sol":"Bar"}"#,
        );
        let compiler = FakeCompiler::reproducing_foo();
        let err = verify(&artifact, &foo_input(), &compiler).unwrap_err();
        assert!(matches!(err, StdJsonError::MissingCompilerOutput { .. }));
    }
}
