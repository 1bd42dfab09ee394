//! Release catalogs that tools are installed from.

pub mod github;
pub mod hashicorp;

pub use github::GithubRepo;
pub use hashicorp::HashicorpProduct;

use crate::config::JklConfig;
use crate::error::{Error, Result};
use crate::tool_spec::{ProviderKind, ToolSpec};
use fs_err as fs;
use log::debug;
use reqwest::blocking::{Client, Response};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// A downloaded release artifact. The temporary directory holding it is removed
/// when this is dropped.
#[derive(Debug)]
pub struct Download {
    pub dir: TempDir,
    pub path: PathBuf,
    /// The version as the catalog names it, e.g. a GitHub tag.
    pub version: String,
    /// Name to install the tool binary and its shim under.
    pub tool_name: String,
}

pub trait Provider {
    /// Resolves `version` (empty or `latest` for the newest release), picks the
    /// artifact for `os`/`arch` and downloads it.
    fn download_release(&self, version: &str, os: &str, arch: &str) -> Result<Download>;
}

pub fn provider_for(spec: &ToolSpec, config: &JklConfig) -> Result<Box<dyn Provider>> {
    Ok(match spec.provider {
        ProviderKind::Github => Box::new(GithubRepo::new(&spec.source, &config.github)?),
        ProviderKind::Hashicorp => Box::new(HashicorpProduct::new(&spec.source, &config.hashicorp)?),
    })
}

pub(crate) fn http_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .user_agent(concat!("jkl/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()?)
}

/// Maps non-2xx responses to [`Error::Http`].
pub(crate) fn ensure_success(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(Error::Http {
            status: status.as_u16(),
            url: resp.url().to_string(),
        })
    }
}

pub(crate) fn download_dir() -> Result<TempDir> {
    Ok(tempfile::Builder::new().prefix("jkl-").tempdir()?)
}

/// Streams a response body to `dir/file_name`.
pub(crate) fn save_response(mut resp: Response, dir: &Path, file_name: &str) -> Result<PathBuf> {
    let path = dir.join(file_name);
    debug!("saving {} to {}", resp.url(), path.display());
    let mut file = fs::File::create(&path)?;
    let written = resp.copy_to(&mut file)?;
    debug!("wrote {written} bytes to {}", path.display());
    Ok(path)
}
