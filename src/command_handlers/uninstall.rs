use anyhow::{Context, Result};
use jkl::Jkl;

pub fn run_uninstall(jkl: &Jkl, spec: &str) -> Result<()> {
    jkl.uninstall(spec).with_context(|| format!("uninstalling {spec}"))?;
    println!("Uninstalled {spec}");
    Ok(())
}
