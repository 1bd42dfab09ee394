use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no release found matching version {requested:?}{}", .hint.as_deref().map(|h| format!(" ({h})")).unwrap_or_default())]
    VersionNotFound {
        requested: String,
        hint: Option<String>,
    },

    #[error("no asset found matching {repo}, release {release}, OS {os}, and architecture {arch}")]
    AssetNotFound {
        repo: String,
        release: String,
        os: String,
        arch: String,
    },

    #[error("no builds of {product} version {version} match OS {os:?} and architecture {arch:?}")]
    BuildNotFound {
        product: String,
        version: String,
        os: String,
        arch: String,
    },

    #[error("aborting extraction, unsupported entry type {kind} for {name:?} in tar archive")]
    UnsupportedEntry { name: String, kind: String },

    #[error("the tool specification {spec:?} {reason} - please supply a colon-separated provider, source, and optional version")]
    InvalidToolSpec { spec: String, reason: &'static str },

    #[error("unknown tool provider {0:?}")]
    UnknownProvider(String),

    #[error("no such {kind} {name:?}")]
    NoSuchSource { kind: &'static str, name: String },

    #[error("{0}")]
    Catalog(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("HTTP {status} for {url}")]
    Http { status: u16, url: String },

    #[error("did not find the {tool} binary in {}", .dir.display())]
    BinaryNotFound { tool: String, dir: PathBuf },

    #[error("shim {}: {reason}", .path.display())]
    Shim { path: PathBuf, reason: String },

    #[error("version {version} of {tool} is not installed by jkl, please see the `jkl install` command to install it")]
    NotInstalled { tool: String, version: String },

    #[error("please specify which version of {tool} you would like to run, by setting the {env_var} environment variable to a valid version, or to \"latest\" to use the latest installed version")]
    AmbiguousVersion { tool: String, env_var: String },

    #[error("please specify a tool to uninstall as <tool>[:<version>], got {0:?}")]
    InvalidToolName(String),

    #[error("uninstalling {tool}: {}", .failures.join("; "))]
    Uninstall { tool: String, failures: Vec<String> },

    #[error(transparent)]
    Extract(Box<ExtractError>),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    Which(#[from] which::Error),
}

/// A failed extraction, along with whatever was written before the failure.
///
/// Extraction is not atomic: archive members written before a decode error stay
/// on disk. `written` lists them so callers can decide how to clean up.
#[derive(Debug, Error)]
#[error("extracting {}: {source}", .path.display())]
pub struct ExtractError {
    pub path: PathBuf,
    pub written: Vec<PathBuf>,
    #[source]
    pub source: Error,
}

impl ExtractError {
    pub fn was_extracted(&self) -> bool {
        !self.written.is_empty()
    }
}

impl From<ExtractError> for Error {
    fn from(e: ExtractError) -> Self {
        Error::Extract(Box::new(e))
    }
}
