//! stdjsonin: rebuild Solidity Standard JSON Input from build artifacts.
//!
//! Reads `<Contract>.json` artifacts, recovers the compiler input described by
//! their embedded metadata, writes it to `<Contract>-input.json`, and optionally
//! recompiles it to check that metadata and bytecode reproduce exactly.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use stdjsonin::compiler::SolcCompiler;
//! use stdjsonin::config::{Config, ContractId};
//! use stdjsonin::{run, RunOptions};
//!
//! let options = RunOptions::from_config(&Config::default(), Path::new("."));
//! let contracts = ContractId::parse_all(&["MetaCoin"]).unwrap();
//! let report = run(&contracts, &options, &SolcCompiler::new("solc"));
//! println!("{} contract(s) reproduced exactly", report.exact_count());
//! ```

pub mod artifact;
pub mod compiler;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod verify;

use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};

use artifact::Artifact;
use compiler::Compiler;
use config::{Config, ConstructorArgsOverride, ContractId};
use error::{Result, StdJsonError};
use input::{SourceResolver, StandardJsonInput};
use verify::Verification;

/// Resolved settings for a run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub working_dir: PathBuf,
    /// Directory holding `<Contract>.json` artifacts.
    pub build_dir: PathBuf,
    /// Directory holding the project's sources.
    pub contracts_dir: PathBuf,
    /// Where `<Contract>-input.json` files are written. Defaults to the
    /// process's current directory, not `working_dir`.
    pub output_dir: PathBuf,
    /// Validated but not consumed by reconstruction or verification.
    pub constructor_args: Option<ConstructorArgsOverride>,
    /// Recompile and compare after writing each input file.
    pub verify: bool,
}

impl RunOptions {
    /// Build options from a loaded config, resolving relative paths against
    /// `working_dir`. Without a configured output directory, files go to the
    /// current directory.
    pub fn from_config(config: &Config, working_dir: &Path) -> Self {
        let output_dir = match &config.paths.output_directory {
            Some(dir) => working_dir.join(dir),
            None => PathBuf::from("."),
        };
        Self {
            working_dir: working_dir.to_path_buf(),
            build_dir: working_dir.join(&config.paths.build_directory),
            contracts_dir: working_dir.join(&config.paths.contracts_directory),
            output_dir,
            constructor_args: None,
            verify: true,
        }
    }
}

/// Outcome for one contract identifier.
#[derive(Debug, Clone, Serialize)]
pub struct ContractReport {
    pub contract: ContractId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,
    /// SHA-256 of the written input file, hex encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<Verification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ContractReport {
    fn new(contract: ContractId) -> Self {
        Self {
            contract,
            output_file: None,
            input_sha256: None,
            verification: None,
            error: None,
        }
    }
}

/// Complete run report.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub verify: bool,
    pub contracts: Vec<ContractReport>,
}

impl RunReport {
    pub fn exact_count(&self) -> usize {
        self.contracts
            .iter()
            .filter(|c| c.verification.as_ref().is_some_and(Verification::is_exact))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.contracts.iter().filter(|c| c.error.is_some()).count()
    }
}

/// A step in one contract's pipeline, reported as it happens.
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    /// The input file was written.
    Saved {
        contract: &'a ContractId,
        file: &'a Path,
    },
    /// About to hand the input to the compiler.
    Verifying { contract: &'a ContractId },
    Verified {
        contract: &'a ContractId,
        verification: &'a Verification,
    },
    Failed {
        contract: &'a ContractId,
        error: &'a StdJsonError,
    },
}

/// Process each contract in turn: load, reconstruct, write, verify.
///
/// A failure is recorded on that contract's report and the loop moves on.
pub fn run(contracts: &[ContractId], options: &RunOptions, compiler: &dyn Compiler) -> RunReport {
    run_with_progress(contracts, options, compiler, &mut |_| {})
}

/// Like [`run`], calling `on_progress` after each pipeline step.
pub fn run_with_progress(
    contracts: &[ContractId],
    options: &RunOptions,
    compiler: &dyn Compiler,
    on_progress: &mut dyn FnMut(Progress<'_>),
) -> RunReport {
    let mut reports = Vec::with_capacity(contracts.len());

    for id in contracts {
        tracing::info!("Generating Standard JSON Input {id}");
        let mut report = ContractReport::new(id.clone());
        if let Err(e) = process_contract(id, options, compiler, &mut report, on_progress) {
            tracing::error!(contract = %id.name, "{e}");
            on_progress(Progress::Failed {
                contract: id,
                error: &e,
            });
            report.error = Some(e.to_string());
        }
        reports.push(report);
    }

    RunReport {
        verify: options.verify,
        contracts: reports,
    }
}

fn process_contract(
    id: &ContractId,
    options: &RunOptions,
    compiler: &dyn Compiler,
    report: &mut ContractReport,
    on_progress: &mut dyn FnMut(Progress<'_>),
) -> Result<()> {
    let artifact = Artifact::load(&id.name, &options.build_dir)?;
    let resolver = SourceResolver::new(&options.contracts_dir, &options.working_dir);
    let input = StandardJsonInput::reconstruct(&artifact, &resolver)?;

    let bytes = input.to_json_bytes()?;
    let path = options.output_dir.join(format!("{}-input.json", id.name));
    std::fs::write(&path, &bytes)?;
    report.input_sha256 = Some(hex::encode(Sha256::digest(&bytes)));
    on_progress(Progress::Saved {
        contract: id,
        file: &path,
    });
    report.output_file = Some(path);

    if options.verify {
        on_progress(Progress::Verifying { contract: id });
        let verification = verify::verify(&artifact, &input, compiler)?;
        on_progress(Progress::Verified {
            contract: id,
            verification: &verification,
        });
        report.verification = Some(verification);
    }
    Ok(())
}
