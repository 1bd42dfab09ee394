use super::{download_dir, ensure_success, http_client, save_response, Download, Provider};
use crate::asset_match::{match_build, BuildRecord};
use crate::config::HashicorpConfig;
use crate::error::{Error, Result};
use crate::release_match::{is_latest, match_partial_version, ReleaseRecord};
use log::debug;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct ApiBuild {
    #[serde(default)]
    arch: String,
    #[serde(default)]
    os: String,
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiRelease {
    #[serde(default)]
    version: String,
    #[serde(default)]
    builds: Vec<ApiBuild>,
    #[serde(default)]
    timestamp_created: String,
    #[serde(default)]
    is_prerelease: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashicorpRelease {
    pub version: String,
    pub builds: Vec<BuildRecord>,
    pub timestamp_created: String,
    pub is_prerelease: bool,
}

impl From<ApiRelease> for HashicorpRelease {
    fn from(r: ApiRelease) -> Self {
        HashicorpRelease {
            version: r.version,
            builds: r.builds.into_iter().map(|b| BuildRecord::new(b.os, b.arch, b.url)).collect(),
            timestamp_created: r.timestamp_created,
            is_prerelease: r.is_prerelease,
        }
    }
}

/// One page of releases, newest first.
#[derive(Debug, Clone, Default)]
pub struct ReleasePage {
    pub releases: Vec<HashicorpRelease>,
    /// Pass to the next `fetch_releases` call for older releases. `None` on the last page.
    pub next_cursor: Option<String>,
}

/// A product published on the HashiCorp releases API, e.g. `terraform`.
pub struct HashicorpProduct {
    name: String,
    config: HashicorpConfig,
    client: Client,
}

impl HashicorpProduct {
    pub fn new(name: &str, config: &HashicorpConfig) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Catalog("the product name cannot be empty".to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            config: config.clone(),
            client: http_client(config.timeout)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn api_url(&self, uri: &str) -> String {
        format!("{}{uri}", self.config.api_host.trim_end_matches('/'))
    }

    pub fn exists(&self) -> Result<bool> {
        let url = self.api_url("/v1/products");
        debug!("GET {url}");
        let products: Vec<String> = ensure_success(self.client.get(&url).send()?)?.json()?;
        if products.is_empty() {
            return Err(Error::Catalog("the HashiCorp API did not return any products".to_string()));
        }
        Ok(products.iter().any(|p| p.eq_ignore_ascii_case(&self.name)))
    }

    /// Fetches one page of releases older than `cursor`, or the newest page when
    /// `cursor` is `None`.
    pub fn fetch_releases(&self, cursor: Option<&str>) -> Result<ReleasePage> {
        let url = self.api_url(&format!("/v1/releases/{}", self.name));
        let mut query = vec![("limit", self.config.page_size.to_string())];
        if let Some(after) = cursor {
            query.push(("after", after.to_string()));
        }
        debug!("fetching HashiCorp {} releases from {url} with {query:?}", self.name);
        let resp = ensure_success(self.client.get(&url).query(&query).send()?)?;
        let releases: Vec<HashicorpRelease> = resp
            .json::<Vec<ApiRelease>>()?
            .into_iter()
            .map(HashicorpRelease::from)
            .collect();
        debug!("fetched {} releases", releases.len());
        // The API returns releases newest first.
        let next_cursor = releases
            .last()
            .map(|r| r.timestamp_created.clone())
            .filter(|ts| !ts.is_empty() && Some(ts.as_str()) != cursor);
        Ok(ReleasePage { releases, next_cursor })
    }

    /// Fetches `version` exactly, falling back to a partial-version search when the
    /// API has no such release. Empty or `latest` selects the latest release.
    pub fn release_for_version(&self, version: &str) -> Result<HashicorpRelease> {
        debug!("getting HashiCorp {} release for version {version:?}", self.name);
        let version = if is_latest(version) { "latest" } else { version.trim() };
        let url = self.api_url(&format!("/v1/releases/{}/{version}", self.name));
        debug!("GET {url}");
        let resp = self.client.get(&url).send()?;
        if resp.status() == StatusCode::NOT_FOUND && version != "latest" {
            debug!("HashiCorp {} version {version:?} not found", self.name);
            return self.release_for_partial_version(version);
        }
        let release = HashicorpRelease::from(ensure_success(resp)?.json::<ApiRelease>()?);
        if release.builds.is_empty() || release.version.is_empty() {
            debug!("received incomplete HashiCorp release {release:?}");
            return Err(Error::Catalog(
                "the HashiCorp API did not return the expected release fields".to_string(),
            ));
        }
        Ok(release)
    }

    /// Walks release pages newest first until one holds a non-prerelease
    /// release matching `version`, returning the newest match on that page.
    pub fn release_for_partial_version(&self, version: &str) -> Result<HashicorpRelease> {
        debug!("finding HashiCorp {} release matching partial version {version:?}", self.name);
        if is_latest(version) {
            return self.release_for_version("latest");
        }
        let mut page = self.fetch_releases(None)?;
        if page.releases.is_empty() {
            return Err(Error::Catalog(format!("{} has no releases", self.name)));
        }
        loop {
            if let Some(release) = Self::match_on_page(version, &page.releases) {
                return Ok(release);
            }
            let Some(cursor) = page.next_cursor.take() else {
                break;
            };
            page = self.fetch_releases(Some(&cursor))?;
            if page.releases.is_empty() {
                break;
            }
        }
        debug!("no partial releases matched");
        Err(Error::VersionNotFound {
            requested: version.to_string(),
            hint: None,
        })
    }

    fn match_on_page(version: &str, releases: &[HashicorpRelease]) -> Option<HashicorpRelease> {
        let records: Vec<ReleaseRecord> = releases
            .iter()
            .map(|r| ReleaseRecord::new(r.version.clone(), r.version.clone(), r.is_prerelease))
            .collect();
        let matched = match_partial_version(version, &records)?;
        releases.iter().find(|r| r.version == matched).cloned()
    }

    /// Downloads a build into `dir`, named after the last segment of its URL.
    pub fn download(&self, build: &BuildRecord, dir: &Path) -> Result<PathBuf> {
        debug!("downloading HashiCorp build from {}", build.locator);
        let file_name = build
            .locator
            .rsplit('/')
            .next()
            .filter(|n| !n.is_empty())
            .unwrap_or(self.name.as_str())
            .to_string();
        let resp = ensure_success(
            self.client
                .get(&build.locator)
                .header(reqwest::header::ACCEPT, "application/octet-stream")
                .send()?,
        )?;
        save_response(resp, dir, &file_name)
    }
}

impl Provider for HashicorpProduct {
    fn download_release(&self, version: &str, os: &str, arch: &str) -> Result<Download> {
        if !self.exists()? {
            return Err(Error::NoSuchSource {
                kind: "HashiCorp product",
                name: self.name.clone(),
            });
        }
        let release = self.release_for_version(version)?;
        debug!("downloading HashiCorp release for {} version {:?}", self.name, release.version);
        let build = match_build(&release.builds, os, arch).ok_or_else(|| Error::BuildNotFound {
            product: self.name.clone(),
            version: release.version.clone(),
            os: os.to_string(),
            arch: arch.to_string(),
        })?;
        let dir = download_dir()?;
        let path = self.download(build, dir.path())?;
        Ok(Download {
            dir,
            path,
            version: release.version,
            tool_name: self.name.clone(),
        })
    }
}
