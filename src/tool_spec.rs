use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Github,
    Hashicorp,
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "github" | "gh" => Ok(ProviderKind::Github),
            "hashicorp" | "hashi" => Ok(ProviderKind::Hashicorp),
            other => Err(Error::UnknownProvider(other.to_string())),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Github => f.write_str("github"),
            ProviderKind::Hashicorp => f.write_str("hashicorp"),
        }
    }
}

/// What to install: `provider:source[:version]`, e.g. `github:ivanfetch/prme:0.0.6`
/// or `hashicorp:terraform`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub provider: ProviderKind,
    /// GitHub `owner/repo` or HashiCorp product name.
    pub source: String,
    /// Empty means the latest release.
    pub version: String,
}

impl ToolSpec {
    pub fn parse(spec: &str) -> Result<Self> {
        let fields: Vec<&str> = spec.split(':').collect();
        if fields.len() > 3 {
            return Err(Error::InvalidToolSpec {
                spec: spec.to_string(),
                reason: "has too many components",
            });
        }
        if fields.len() < 2 {
            return Err(Error::InvalidToolSpec {
                spec: spec.to_string(),
                reason: "does not have enough components",
            });
        }
        let provider = fields[0].parse()?;
        let source = fields[1].trim();
        if source.is_empty() {
            return Err(Error::InvalidToolSpec {
                spec: spec.to_string(),
                reason: "has an empty source",
            });
        }
        Ok(ToolSpec {
            provider,
            source: source.to_string(),
            version: fields.get(2).map(|v| v.trim().to_string()).unwrap_or_default(),
        })
    }
}

impl FromStr for ToolSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ToolSpec::parse(s)
    }
}
