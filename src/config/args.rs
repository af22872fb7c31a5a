use std::fmt;

use serde::Serialize;

use crate::error::{Result, StdJsonError};

/// A `<contractName>[@<address>]` token from the command line.
///
/// The address is kept for reporting only; reconstruction never reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractId {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ContractId {
    pub fn parse(token: &str) -> Self {
        match token.split_once('@') {
            Some((name, address)) => Self {
                name: name.to_string(),
                address: Some(address.to_string()),
            },
            None => Self {
                name: token.to_string(),
                address: None,
            },
        }
    }

    /// Parse every token, failing if none were given.
    pub fn parse_all<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Self>> {
        if tokens.is_empty() {
            return Err(StdJsonError::Config("No contract name(s) specified".into()));
        }
        Ok(tokens.iter().map(|t| Self::parse(t.as_ref())).collect())
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.address {
            Some(address) => write!(f, "{}@{}", self.name, address),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Constructor-argument override given as `<type>:<hexvalue>`.
///
/// Only `string` is accepted. The value is validated and logged but does not
/// feed reconstruction or verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstructorArgsOverride {
    pub value: String,
}

impl ConstructorArgsOverride {
    pub fn parse(raw: &str) -> Result<Self> {
        let (kind, value) = raw.split_once(':').unwrap_or((raw, ""));
        if kind != "string" {
            return Err(StdJsonError::Config(
                "Force constructor args must be string type".into(),
            ));
        }
        let value = value.strip_prefix("0x").unwrap_or(value).to_string();
        tracing::debug!(args = %format!("0x{value}"), "force constructor args provided");
        Ok(Self { value })
    }

    /// Parse an optional override; an empty string counts as absent.
    pub fn parse_optional(raw: Option<&str>) -> Result<Option<Self>> {
        raw.filter(|r| !r.is_empty()).map(Self::parse).transpose()
    }
}
