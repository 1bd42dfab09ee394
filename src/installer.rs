use crate::archive::extract_file;
use crate::config::JklConfig;
use crate::error::{Error, Result};
use crate::managed_tool::ManagedTool;
use crate::platform::{arch_name, os_name, platform};
use crate::providers::{provider_for, Download};
use crate::tool_spec::ToolSpec;
use fs_err as fs;
use indicatif::ProgressBar;
use log::debug;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

/// A tool binary placed under the installs directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installed {
    pub tool: String,
    pub version: String,
    pub path: PathBuf,
}

/// Installs, lists and removes jkl-managed tools.
pub struct Jkl {
    config: JklConfig,
}

impl Jkl {
    pub fn new(config: JklConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &JklConfig {
        &self.config
    }

    pub fn managed_tool(&self, name: &str) -> ManagedTool<'_> {
        ManagedTool::new(name, &self.config)
    }

    /// Installs the tool described by `spec`, e.g. `github:ivanfetch/prme:0.0.6`.
    pub fn install(&self, spec: &str, pb: Option<&ProgressBar>) -> Result<Installed> {
        let spec = ToolSpec::parse(spec)?;
        let provider = provider_for(&spec, &self.config)?;
        if let Some(p) = pb {
            p.set_message(format!("Downloading {} from {}", spec.source, spec.provider));
        }
        let download = provider.download_release(&spec.version, os_name(), arch_name())?;
        if let Some(p) = pb {
            p.set_message(format!("Installing {} {}", download.tool_name, download.version));
        }
        let path = self.install_download(&download)?;
        Ok(Installed {
            tool: download.tool_name.clone(),
            version: download.version.clone(),
            path,
        })
    }

    /// Extracts a downloaded artifact if needed, copies the tool binary into the
    /// installs directory and creates its shim.
    pub fn install_download(&self, download: &Download) -> Result<PathBuf> {
        let extraction = extract_file(&download.path)?;
        let source = if extraction.extracted {
            pick_binary(&download.tool_name, &extraction.files).ok_or_else(|| Error::BinaryNotFound {
                tool: download.tool_name.clone(),
                dir: download.dir.path().to_path_buf(),
            })?
        } else {
            download.path.clone()
        };
        let dest = self.config.installed_binary(&download.tool_name, &download.version);
        if let Some(version_dir) = dest.parent() {
            platform().create_private_dir_all(version_dir)?;
        }
        debug!("copying {} to {}", source.display(), dest.display());
        fs::copy(&source, &dest)?;
        platform().make_executable(&dest)?;
        self.create_shim(&download.tool_name)?;
        Ok(dest)
    }

    /// Links `shims_dir/<tool>` to the jkl executable.
    pub fn create_shim(&self, tool: &str) -> Result<()> {
        platform().create_private_dir_all(&self.config.shims_dir)?;
        let shim = self.config.shim_path(tool);
        let meta = match fs::symlink_metadata(&shim) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("creating shim {} -> {}", shim.display(), self.config.executable.display());
                platform().symlink(&self.config.executable, &shim)?;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        if !meta.file_type().is_symlink() {
            return Err(Error::Shim {
                path: shim,
                reason: "already exists and is not a symlink".to_string(),
            });
        }
        let target = fs::canonicalize(&shim)?;
        let executable = fs::canonicalize(&self.config.executable)?;
        if target != executable {
            return Err(Error::Shim {
                reason: format!(
                    "already exists but points to {}, not {}",
                    target.display(),
                    executable.display()
                ),
                path: shim,
            });
        }
        debug!("shim {} already exists", shim.display());
        Ok(())
    }

    /// Uninstalls `tool:version`, or every version of `tool`.
    pub fn uninstall(&self, tool_and_version: &str) -> Result<()> {
        let (name, version) = match tool_and_version.split_once(':') {
            Some((name, version)) => (name.trim(), Some(version.trim())),
            None => (tool_and_version.trim(), None),
        };
        if name.is_empty() {
            return Err(Error::InvalidToolName(tool_and_version.to_string()));
        }
        let tool = self.managed_tool(name);
        match version.filter(|v| !v.is_empty()) {
            Some(version) => tool.uninstall_version(version),
            None => tool.uninstall_all(),
        }
    }

    /// Tools with at least one installed version, sorted by name.
    pub fn list_installed_tools(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.config.installs_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut tools = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.managed_tool(&name).installed_versions()?.is_empty() {
                debug!("ignoring {name}, it has no installed versions");
                continue;
            }
            tools.push(name);
        }
        tools.sort();
        Ok(tools)
    }

    /// Installed versions of `tool`, oldest first.
    pub fn list_installed_versions(&self, tool: &str) -> Result<Vec<String>> {
        self.managed_tool(tool).installed_versions()
    }
}

/// The extracted file named after the tool, or the only extracted file.
fn pick_binary(tool: &str, files: &[PathBuf]) -> Option<PathBuf> {
    let wanted = [platform().final_binary_name(tool), tool.to_string()];
    let named = files.iter().find(|f| {
        f.file_name()
            .map(|n| wanted.iter().any(|w| OsStr::new(w) == n))
            .unwrap_or(false)
    });
    match (named, files) {
        (Some(found), _) => Some(found.clone()),
        (None, [only]) => {
            debug!("using the only extracted file {} as {tool}", only.display());
            Some(only.clone())
        }
        _ => None,
    }
}

/// Whether `dir` is one of the entries of a `PATH`-style variable.
pub fn dir_in_path(dir: &Path, path_var: &OsStr) -> bool {
    let wanted = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
    std::env::split_paths(path_var).any(|entry| {
        entry.as_path() == dir || fs::canonicalize(&entry).map(|e| e == wanted).unwrap_or(false)
    })
}
