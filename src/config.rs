use crate::error::{Error, Result};
use crate::platform::platform;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_INSTALLS_DIR: &str = "~/.jkl/installs";
pub const DEFAULT_SHIMS_DIR: &str = "~/.jkl/bin";

#[derive(Debug, Clone)]
pub struct JklConfig {
    /// Root of installed tools, laid out as `<tool>/<version>/<tool>`.
    pub installs_dir: PathBuf,
    /// Where shim symlinks are created. Should be on `PATH`.
    pub shims_dir: PathBuf,
    /// The jkl binary that shims point to.
    pub executable: PathBuf,
    pub github: GithubConfig,
    pub hashicorp: HashicorpConfig,
}

#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub api_host: String,
    /// Sent as `Authorization: token ...`. Raises the API rate limit.
    pub token: Option<String>,
    pub timeout: Duration,
    /// Releases requested per page when listing releases.
    pub page_size: u32,
    /// Upper bound on release pages fetched while matching a version.
    pub max_pages: u32,
}

#[derive(Debug, Clone)]
pub struct HashicorpConfig {
    pub api_host: String,
    pub timeout: Duration,
    /// Releases requested per page while searching for a partial version.
    pub page_size: u32,
}

impl Default for GithubConfig {
    fn default() -> Self {
        let token = ["GH_TOKEN", "GITHUB_TOKEN"]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.is_empty());
        Self {
            api_host: "https://api.github.com".to_string(),
            token,
            timeout: Duration::from_secs(30),
            page_size: 100,
            max_pages: 10,
        }
    }
}

impl Default for HashicorpConfig {
    fn default() -> Self {
        Self {
            api_host: "https://api.releases.hashicorp.com".to_string(),
            timeout: Duration::from_secs(30),
            page_size: 20,
        }
    }
}

impl JklConfig {
    /// Default locations under the home directory, with the running binary as the
    /// shim target.
    pub fn load() -> Result<Self> {
        let executable = std::env::current_exe()
            .map_err(|e| Error::Config(format!("cannot get executable to determine its parent directory: {e}")))?;
        Ok(Self {
            installs_dir: expand_dir(DEFAULT_INSTALLS_DIR, "installs")?,
            shims_dir: expand_dir(DEFAULT_SHIMS_DIR, "shims")?,
            executable,
            github: GithubConfig::default(),
            hashicorp: HashicorpConfig::default(),
        })
    }

    pub fn with_installs_dir(mut self, dir: &str) -> Result<Self> {
        self.installs_dir = expand_dir(dir, "installs")?;
        Ok(self)
    }

    pub fn with_shims_dir(mut self, dir: &str) -> Result<Self> {
        self.shims_dir = expand_dir(dir, "shims")?;
        Ok(self)
    }

    pub fn tool_dir(&self, tool: &str) -> PathBuf {
        self.installs_dir.join(tool)
    }

    /// Where `version` of `tool` is (or would be) installed.
    pub fn installed_binary(&self, tool: &str, version: &str) -> PathBuf {
        self.tool_dir(tool).join(version).join(platform().final_binary_name(tool))
    }

    pub fn shim_path(&self, tool: &str) -> PathBuf {
        self.shims_dir.join(platform().final_binary_name(tool))
    }
}

fn expand_dir(dir: &str, what: &str) -> Result<PathBuf> {
    if dir.trim().is_empty() {
        return Err(Error::Config(format!("the {what} directory cannot be empty")));
    }
    expand_tilde(dir)
}

/// Expands a leading `~` to the home directory.
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    let rest = match path.strip_prefix('~') {
        None => return Ok(PathBuf::from(path)),
        Some(rest) if rest.is_empty() || rest.starts_with(['/', '\\']) => rest.trim_start_matches(['/', '\\']),
        // `~user` is not supported.
        Some(_) => return Ok(PathBuf::from(path)),
    };
    let home = platform()
        .home_dir()
        .ok_or_else(|| Error::Config(format!("cannot expand {path:?}, the home directory is unknown")))?;
    Ok(if rest.is_empty() { home } else { home.join(Path::new(rest)) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_home_prefix() {
        let home = platform().home_dir().unwrap();
        assert_eq!(expand_tilde("~/.jkl/bin").unwrap(), home.join(".jkl/bin"));
        assert_eq!(expand_tilde("~").unwrap(), home);
        assert_eq!(expand_tilde("/opt/jkl").unwrap(), PathBuf::from("/opt/jkl"));
        assert_eq!(expand_tilde("~other/x").unwrap(), PathBuf::from("~other/x"));
    }

    #[test]
    fn rejects_empty_directories() {
        let config = JklConfig::load().unwrap();
        assert!(matches!(config.clone().with_installs_dir(""), Err(Error::Config(_))));
        assert!(matches!(config.with_shims_dir("  "), Err(Error::Config(_))));
    }

    #[test]
    fn lays_out_installs_by_tool_and_version() {
        let config = JklConfig::load().unwrap().with_installs_dir("/tmp/installs").unwrap();
        let want = PathBuf::from("/tmp/installs/prme/v0.0.6").join(platform().final_binary_name("prme"));
        assert_eq!(config.installed_binary("prme", "v0.0.6"), want);
    }

    #[test]
    fn catalog_defaults() {
        let github = GithubConfig::default();
        assert_eq!(github.api_host, "https://api.github.com");
        assert_eq!(github.timeout, Duration::from_secs(30));
        let hashicorp = HashicorpConfig::default();
        assert_eq!(hashicorp.api_host, "https://api.releases.hashicorp.com");
        assert_eq!(hashicorp.page_size, 20);
    }
}
