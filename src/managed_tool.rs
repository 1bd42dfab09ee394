use crate::asdf::{find_tool_version, SearchBounds};
use crate::config::JklConfig;
use crate::error::{Error, Result};
use crate::platform::platform;
use crate::versioning::{sort_versions, toggle_v_prefix};
use fs_err as fs;
use log::debug;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

/// A tool that jkl has installed, possibly in several versions.
pub struct ManagedTool<'a> {
    name: String,
    config: &'a JklConfig,
}

impl<'a> ManagedTool<'a> {
    pub fn new(name: &str, config: &'a JklConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `JKL_<NAME>`, upper-cased with dashes replaced by underscores.
    pub fn env_var_name(&self) -> String {
        format!("JKL_{}", self.name.replace('-', "_").to_uppercase())
    }

    /// The version requested through the environment or a `.tool-versions` file.
    /// `latest` resolves to the newest installed version.
    pub fn desired_version(&self, bounds: &SearchBounds) -> Result<Option<String>> {
        let env_var = self.env_var_name();
        let desired = match std::env::var(&env_var).ok().filter(|v| !v.is_empty()) {
            Some(v) => v,
            None => {
                debug!("environment variable {env_var:?} is not set, looking in config files for the desired {} version", self.name);
                match find_tool_version(&self.name, bounds)? {
                    Some(v) => v,
                    None => {
                        debug!("no desired version specified for {:?}", self.name);
                        return Ok(None);
                    }
                }
            }
        };
        debug!("desired version {desired:?} specified for {}", self.name);
        if desired.eq_ignore_ascii_case("latest") {
            return self.latest_installed_version();
        }
        Ok(Some(desired))
    }

    /// Installed versions, oldest first. A tool that was never installed has none.
    pub fn installed_versions(&self) -> Result<Vec<String>> {
        let tool_dir = self.config.tool_dir(&self.name);
        let entries = match fs::read_dir(&tool_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                versions.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(sort_versions(&versions))
    }

    pub fn latest_installed_version(&self) -> Result<Option<String>> {
        let latest = self.installed_versions()?.pop();
        match &latest {
            Some(v) => debug!("the latest installed version of {} is {v}", self.name),
            None => debug!("no versions found for {:?} while looking for the latest installed version", self.name),
        }
        Ok(latest)
    }

    /// The installed binary for `version`, also trying the version with its `v`
    /// prefix toggled.
    pub fn path(&self, version: &str) -> Result<Option<PathBuf>> {
        for candidate in [version.to_string(), toggle_v_prefix(version)] {
            let installed = self.config.installed_binary(&self.name, &candidate);
            match fs::metadata(&installed) {
                Ok(_) => {
                    debug!("found installed path for {} {version}: {}", self.name, installed.display());
                    return Ok(Some(installed));
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        debug!(
            "version {version:?} of tool {:?} is not installed, with or without a leading v",
            self.name
        );
        Ok(None)
    }

    /// Picks the binary to run: the desired version, or the only installed one.
    pub fn resolve(&self, bounds: &SearchBounds) -> Result<PathBuf> {
        let version = match self.desired_version(bounds)? {
            Some(v) => v,
            None => {
                let mut available = self.installed_versions()?;
                if available.len() > 1 {
                    return Err(Error::AmbiguousVersion {
                        tool: self.name.clone(),
                        env_var: self.env_var_name(),
                    });
                }
                match available.pop() {
                    Some(only) => {
                        debug!("selecting the only available version {only} for tool {}", self.name);
                        only
                    }
                    None => "latest".to_string(),
                }
            }
        };
        self.path(&version)?.ok_or_else(|| Error::NotInstalled {
            tool: self.name.clone(),
            version,
        })
    }

    /// Runs the selected version with `args`. On Unix this only returns on failure.
    pub fn run(&self, args: &[OsString]) -> Result<i32> {
        let binary = self.resolve(&SearchBounds::default())?;
        run_command(&binary, args)
    }

    /// Removes one version. A version that is not installed is not an error.
    pub fn uninstall_version(&self, version: &str) -> Result<()> {
        let Some(binary) = self.path(version)? else {
            debug!("version {version} of {} is not found and cannot be uninstalled", self.name);
            return Ok(());
        };
        debug!("removing tool binary {}", binary.display());
        fs::remove_file(&binary)?;
        if let Some(version_dir) = binary.parent() {
            debug!("removing the versioned directory {}", version_dir.display());
            fs::remove_dir(version_dir)?;
        }
        Ok(())
    }

    /// Removes every version, then the tool directory and its shim.
    pub fn uninstall_all(&self) -> Result<()> {
        let versions = self.installed_versions()?;
        if versions.is_empty() {
            debug!("no versions of {} are installed, nothing to uninstall", self.name);
            return Ok(());
        }
        let failures: Vec<String> = versions
            .iter()
            .filter_map(|v| {
                self.uninstall_version(v).err().map(|e| {
                    debug!("error uninstalling {} version {v}: {e}", self.name);
                    format!("{v}: {e}")
                })
            })
            .collect();
        if !failures.is_empty() {
            return Err(Error::Uninstall {
                tool: self.name.clone(),
                failures,
            });
        }
        let tool_dir = self.config.tool_dir(&self.name);
        debug!("removing top-level directory {}", tool_dir.display());
        if let Err(e) = fs::remove_dir(&tool_dir) {
            // Files jkl did not create may remain.
            debug!("cannot remove directory {} after having removed {}: {e}", tool_dir.display(), self.name);
        }
        let shim = self.config.shim_path(&self.name);
        debug!("removing shim {}", shim.display());
        match fs::remove_file(&shim) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Shim {
                path: shim,
                reason: format!("unable to remove it while uninstalling all versions of {}: {e}", self.name),
            }),
        }
    }
}

/// Runs `program`, looking it up on `PATH` when it is not an absolute path.
pub fn run_command(program: &Path, args: &[OsString]) -> Result<i32> {
    let resolved = if program.is_absolute() {
        program.to_path_buf()
    } else {
        which::which(program)?
    };
    debug!("going to exec {} for command {}", resolved.display(), program.display());
    Ok(platform().exec(&resolved, args)?)
}
