use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::{parse_compiler_version, Compiler, CompilerOutput};
use crate::error::{Result, StdJsonError};
use crate::input::StandardJsonInput;

/// Runs a local `solc` binary in `--standard-json` mode.
#[derive(Debug, Clone)]
pub struct SolcCompiler {
    binary: PathBuf,
}

impl SolcCompiler {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn run(&self, args: &[&str], stdin: Option<&[u8]>) -> Result<String> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            StdJsonError::Compiler(format!(
                "failed to start {}: {}",
                self.binary.display(),
                e
            ))
        })?;
        if let (Some(bytes), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(bytes)?;
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StdJsonError::Compiler(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Compiler for SolcCompiler {
    fn compile(&self, input: &StandardJsonInput) -> Result<CompilerOutput> {
        let payload = input.to_json_bytes()?;
        tracing::debug!(
            solc = %self.binary.display(),
            bytes = payload.len(),
            "invoking solc --standard-json"
        );
        let raw = self.run(&["--standard-json"], Some(&payload))?;
        CompilerOutput::parse(&raw)
    }

    fn version(&self) -> Result<Option<semver::Version>> {
        let raw = self.run(&["--version"], None)?;
        Ok(raw
            .lines()
            .find_map(|line| line.trim().strip_prefix("Version:"))
            .and_then(parse_compiler_version))
    }
}
