use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use jkl::Jkl;
use std::time::Duration;

pub fn run_install(jkl: &Jkl, spec: &str) -> Result<()> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    pb.set_message(format!("Installing {spec}"));
    pb.enable_steady_tick(Duration::from_millis(120));
    let res = jkl.install(spec, Some(&pb));
    pb.finish_and_clear();
    let installed = res.with_context(|| format!("installing {spec}"))?;
    println!("Installed {} {}", installed.tool, installed.version);
    Ok(())
}
