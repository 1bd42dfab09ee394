use anyhow::{Context, Result};
use jkl::Jkl;
use std::io::Write;

/// Prints managed tools, or the installed versions of `tool`.
pub fn run_list(jkl: &Jkl, tool: Option<&str>, out: &mut dyn Write) -> Result<()> {
    let Some(tool) = tool else {
        for name in jkl.list_installed_tools().context("listing installed tools")? {
            writeln!(out, "{name}")?;
        }
        return Ok(());
    };
    let versions = jkl
        .list_installed_versions(tool)
        .with_context(|| format!("cannot list installed versions of {tool}"))?;
    if versions.is_empty() {
        writeln!(out, "{tool} is not installed")?;
    }
    for version in versions {
        writeln!(out, "{version}")?;
    }
    Ok(())
}
