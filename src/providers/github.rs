use super::{download_dir, ensure_success, http_client, save_response, Download, Provider};
use crate::asset_match::{derived_base_name, match_asset, AssetRecord};
use crate::config::GithubConfig;
use crate::error::{Error, Result};
use crate::release_match::{is_latest, match_version, unversioned_tags_hint, ReleaseRecord};
use log::debug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct ApiRelease {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    tag_name: Option<String>,
    #[serde(default)]
    prerelease: bool,
}

impl From<ApiRelease> for ReleaseRecord {
    fn from(r: ApiRelease) -> Self {
        ReleaseRecord::new(r.name.unwrap_or_default(), r.tag_name.unwrap_or_default(), r.prerelease)
    }
}

#[derive(Debug, Deserialize)]
struct ApiAsset {
    name: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiReleaseAssets {
    #[serde(default)]
    assets: Vec<ApiAsset>,
}

#[derive(Debug, Deserialize)]
struct ApiLatestRelease {
    tag_name: Option<String>,
}

/// A GitHub repository publishing tool binaries as release assets.
pub struct GithubRepo {
    owner_and_repo: String,
    config: GithubConfig,
    client: Client,
}

impl GithubRepo {
    /// Accepts `owner/repo`, optionally prefixed with `github.com/`.
    pub fn new(owner_and_repo: &str, config: &GithubConfig) -> Result<Self> {
        let trimmed = owner_and_repo
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("github.com/")
            .trim_matches('/');
        let valid = matches!(trimmed.split_once('/'), Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/'));
        if !valid {
            return Err(Error::Catalog(format!(
                "{owner_and_repo:?} is not a GitHub repository, please specify it as <owner>/<repository>"
            )));
        }
        Ok(Self {
            owner_and_repo: trimmed.to_string(),
            config: config.clone(),
            client: http_client(config.timeout)?,
        })
    }

    pub fn owner_and_repo(&self) -> &str {
        &self.owner_and_repo
    }

    fn api_url(&self, uri: &str) -> String {
        format!("{}/repos/{}{uri}", self.config.api_host.trim_end_matches('/'), self.owner_and_repo)
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let req = self.client.get(url).header(ACCEPT, "application/vnd.github+json");
        match &self.config.token {
            Some(token) => req.header(AUTHORIZATION, format!("token {token}")),
            None => req,
        }
    }

    fn get_ok(&self, url: &str) -> Result<Response> {
        debug!("GET {url}");
        ensure_success(self.get(url).send()?)
    }

    pub fn exists(&self) -> Result<bool> {
        let url = self.api_url("");
        let resp = self.get(&url).send()?;
        match resp.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => ensure_success(resp).map(|_| true),
        }
    }

    /// The tag GitHub designates as the latest, which is never a pre-release.
    pub fn latest_release_tag(&self) -> Result<String> {
        let latest: ApiLatestRelease = self.get_ok(&self.api_url("/releases/latest"))?.json()?;
        latest
            .tag_name
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Catalog("the GitHub API did not return tag_name for the latest release".to_string()))
    }

    fn release_page(&self, page: u32) -> Result<Vec<ReleaseRecord>> {
        let url = self.api_url(&format!("/releases?per_page={}&page={page}", self.config.page_size));
        let releases: Vec<ApiRelease> = self.get_ok(&url)?.json()?;
        debug!("fetched {} releases on page {page}", releases.len());
        Ok(releases.into_iter().map(ReleaseRecord::from).collect())
    }

    /// All releases, newest first, up to the configured page limit.
    pub fn list_releases(&self) -> Result<Vec<ReleaseRecord>> {
        let mut releases = Vec::new();
        for page in 1..=self.config.max_pages.max(1) {
            let batch = self.release_page(page)?;
            let last_page = (batch.len() as u32) < self.config.page_size;
            releases.extend(batch);
            if last_page {
                break;
            }
        }
        Ok(releases)
    }

    pub fn assets_for_tag(&self, tag: &str) -> Result<Vec<AssetRecord>> {
        let release: ApiReleaseAssets = self.get_ok(&self.api_url(&format!("/releases/tags/{tag}")))?.json()?;
        if release.assets.is_empty() {
            return Err(Error::Catalog(format!(
                "release {tag} of {} has no assets",
                self.owner_and_repo
            )));
        }
        Ok(release.assets.into_iter().map(|a| AssetRecord::new(a.name, a.url)).collect())
    }

    /// Resolves a requested version to a release tag.
    pub fn tag_for_version(&self, version: &str) -> Result<String> {
        debug!("finding GitHub tag matching version {version:?} of {}", self.owner_and_repo);
        if is_latest(version) {
            return self.latest_release_tag();
        }
        let releases = self.list_releases()?;
        if releases.is_empty() {
            return Err(Error::Catalog(format!("{} has no releases", self.owner_and_repo)));
        }
        match_version(version, &releases).ok_or_else(|| Error::VersionNotFound {
            requested: version.to_string(),
            hint: unversioned_tags_hint(&releases),
        })
    }

    /// Downloads an asset into `dir`, keeping its published file name.
    pub fn download(&self, asset: &AssetRecord, dir: &Path) -> Result<PathBuf> {
        debug!("downloading GitHub asset {} from {}", asset.name, asset.locator);
        let mut req = self.client.get(&asset.locator).header(ACCEPT, "application/octet-stream");
        if let Some(token) = &self.config.token {
            req = req.header(AUTHORIZATION, format!("token {token}"));
        }
        let resp = ensure_success(req.send()?)?;
        save_response(resp, dir, &asset.name)
    }
}

impl Provider for GithubRepo {
    fn download_release(&self, version: &str, os: &str, arch: &str) -> Result<Download> {
        if !self.exists()? {
            return Err(Error::NoSuchSource {
                kind: "GitHub repository",
                name: self.owner_and_repo.clone(),
            });
        }
        let tag = self.tag_for_version(version)?;
        debug!("installing GitHub release {tag:?} of {}", self.owner_and_repo);
        let assets = self.assets_for_tag(&tag)?;
        let matched = match_asset(&assets, os, arch).ok_or_else(|| Error::AssetNotFound {
            repo: self.owner_and_repo.clone(),
            release: tag.clone(),
            os: os.to_string(),
            arch: arch.to_string(),
        })?;
        let tool_name = derived_base_name(
            &matched.asset.name,
            &[matched.matched_os.as_str(), matched.matched_arch.as_str(), tag.as_str()],
        );
        let dir = download_dir()?;
        let path = self.download(matched.asset, dir.path())?;
        Ok(Download {
            dir,
            path,
            version: tag,
            tool_name,
        })
    }
}
