use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, StdJsonError};

/// Prefix Truffle (since v5.3.14) puts in front of project-local source keys.
pub const PROJECT_PREFIX: &str = "project:";

/// `/C/Users/...`: a Windows path written with Unix separators.
static UNIXIFIED_DRIVE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/([A-Za-z])/").unwrap());

/// Separator convention of the filesystem being resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    Unix,
    Windows,
}

impl PathStyle {
    pub fn host() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }
}

/// Turn a metadata source key into a filesystem path string.
///
/// Project-prefixed keys come back relative to the project root. Unixified
/// drive paths are rebuilt as `X:\...` under [`PathStyle::Windows`]. No
/// filesystem access happens here.
pub fn normalize_source_path(key: &str, style: PathStyle) -> String {
    let (path, project_relative) = match key.strip_prefix(PROJECT_PREFIX) {
        Some(rest) => (rest.trim_start_matches('/'), true),
        None => (key, false),
    };

    match style {
        PathStyle::Unix => path.to_string(),
        PathStyle::Windows => {
            if !project_relative {
                if let Some(caps) = UNIXIFIED_DRIVE_RE.captures(path) {
                    let drive = caps[1].to_uppercase();
                    let rest = &path[caps[0].len()..];
                    return format!("{drive}:\\{}", rest.replace('/', "\\"));
                }
            }
            path.replace('/', "\\")
        }
    }
}

/// Resolves metadata source keys to files on disk.
///
/// Project-prefixed keys resolve only against the project root: the working
/// directory, then the contracts directory's parent. Other keys try, first
/// existing file wins, the path itself when absolute, then the contracts
/// directory, its parent, the working directory, and `node_modules` in the
/// working directory and each ancestor.
#[derive(Debug, Clone)]
pub struct SourceResolver<'a> {
    contracts_dir: &'a Path,
    working_dir: &'a Path,
    style: PathStyle,
}

impl<'a> SourceResolver<'a> {
    pub fn new(contracts_dir: &'a Path, working_dir: &'a Path) -> Self {
        Self {
            contracts_dir,
            working_dir,
            style: PathStyle::host(),
        }
    }

    pub fn resolve(&self, key: &str) -> Result<PathBuf> {
        let normalized = normalize_source_path(key, self.style);
        let candidates = if key.starts_with(PROJECT_PREFIX) {
            self.project_candidates(Path::new(&normalized))
        } else {
            self.candidates(Path::new(&normalized))
        };

        match candidates.into_iter().find(|c| c.is_file()) {
            Some(found) => {
                tracing::debug!(source = key, resolved = %found.display(), "resolved source");
                Ok(found)
            }
            None => Err(StdJsonError::Resolution {
                source_path: key.to_string(),
                contracts_dir: self.contracts_dir.to_path_buf(),
            }),
        }
    }

    fn project_candidates(&self, path: &Path) -> Vec<PathBuf> {
        let mut out = vec![self.working_dir.join(path)];
        if let Some(project_root) = self.contracts_dir.parent() {
            out.push(project_root.join(path));
        }
        out
    }

    fn candidates(&self, path: &Path) -> Vec<PathBuf> {
        if path.is_absolute() {
            return vec![path.to_path_buf()];
        }

        let mut out = vec![self.contracts_dir.join(path)];
        if let Some(project_root) = self.contracts_dir.parent() {
            out.push(project_root.join(path));
        }
        out.push(self.working_dir.join(path));
        out.extend(
            self.working_dir
                .ancestors()
                .map(|dir| dir.join("node_modules").join(path)),
        );
        out
    }
}
