mod cli;
mod command_handlers;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use std::ffi::OsString;
use std::path::Path;

use crate::cli::Cli;
use jkl::{Jkl, JklConfig, ManagedTool};

fn main() -> Result<()> {
    let args: Vec<OsString> = std::env::args_os().collect();
    if let Some(tool) = args.first().and_then(|arg0| shim_name(Path::new(arg0))) {
        init_logging(debug_from_env());
        let config = JklConfig::load()?;
        let code = ManagedTool::new(&tool, &config)
            .run(&args[1..])
            .with_context(|| format!("running {tool}"))?;
        std::process::exit(code);
    }

    let cli = Cli::parse();
    init_logging(cli.debug || debug_from_env());
    let jkl = Jkl::new(JklConfig::load()?);
    command_handlers::dispatch::dispatch(cli.command, &jkl)?;
    Ok(())
}

/// The tool a shim was invoked as, or `None` when invoked as jkl itself.
fn shim_name(arg0: &Path) -> Option<String> {
    let file_name = arg0.file_name()?.to_string_lossy();
    let name: &str = &file_name;
    let name = name.strip_suffix(".exe").unwrap_or(name);
    (name != "jkl").then(|| name.to_string())
}

fn debug_from_env() -> bool {
    std::env::var_os("JKL_DEBUG").is_some_and(|v| !v.is_empty())
}

fn init_logging(debug: bool) {
    let level = if debug { LevelFilter::Debug } else { LevelFilter::Warn };
    env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module("jkl", level)
        .format_timestamp(None)
        .init();
}
