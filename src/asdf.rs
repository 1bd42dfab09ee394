//! Desired tool versions from ASDF `.tool-versions` files.

use crate::error::Result;
use fs_err as fs;
use log::debug;
use std::path::{Path, PathBuf};

pub const TOOL_VERSIONS_FILE: &str = ".tool-versions";

/// Directories to consult, from `start_dir` up to and including `root_dir`.
#[derive(Debug, Clone, Default)]
pub struct SearchBounds {
    /// Defaults to the current directory.
    pub start_dir: Option<PathBuf>,
    /// Defaults to the filesystem root.
    pub root_dir: Option<PathBuf>,
}

/// Returns the version of `tool` from the nearest `.tool-versions` file that names it.
pub fn find_tool_version(tool: &str, bounds: &SearchBounds) -> Result<Option<String>> {
    let start_dir = match &bounds.start_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let root_dir = bounds.root_dir.clone().unwrap_or_else(|| PathBuf::from("/"));
    for dir in dirs_containing(TOOL_VERSIONS_FILE, &start_dir, &root_dir)? {
        if let Some(version) = version_from_file(&dir.join(TOOL_VERSIONS_FILE), tool)? {
            return Ok(Some(version));
        }
    }
    Ok(None)
}

/// Directories holding `file_name`, nearest first, walking from `start_dir` through
/// its parents and stopping after `root_dir`.
fn dirs_containing(file_name: &str, start_dir: &Path, root_dir: &Path) -> Result<Vec<PathBuf>> {
    debug!(
        "listing paths where {file_name:?} is found from {} to {}, by parent",
        start_dir.display(),
        root_dir.display()
    );
    // Canonical forms so a symlinked working directory still reaches the root.
    let start_dir = fs::canonicalize(start_dir).unwrap_or_else(|_| start_dir.to_path_buf());
    let root_dir = fs::canonicalize(root_dir).unwrap_or_else(|_| root_dir.to_path_buf());
    let mut found = Vec::new();
    for dir in start_dir.ancestors() {
        if dir.join(file_name).is_file() {
            found.push(dir.to_path_buf());
        }
        if dir == root_dir {
            debug!("done listing paths for {file_name:?}, reached {}", root_dir.display());
            break;
        }
    }
    debug!("{file_name} was found in: {found:?}");
    Ok(found)
}

fn version_from_file(path: &Path, tool: &str) -> Result<Option<String>> {
    debug!("reading ASDF config file {} for the {tool} version", path.display());
    let contents = fs::read_to_string(path)?;
    Ok(parse_tool_version(&contents, tool))
}

/// Finds `tool` in `.tool-versions` content. Lines are `name version`; comments,
/// blank lines and lines with any other number of fields are ignored.
pub fn parse_tool_version(contents: &str, tool: &str) -> Option<String> {
    for line in contents.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [] => continue,
            [first, ..] if first.starts_with('#') => continue,
            [name, version] if *name == tool => {
                debug!("found version {version} for {tool}");
                return Some(version.to_string());
            }
            [_, _] => continue,
            _ => debug!("ignoring line {line:?}, expected a tool name and one version"),
        }
    }
    None
}
