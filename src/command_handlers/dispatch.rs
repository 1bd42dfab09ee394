use crate::cli::Commands;
use crate::command_handlers::{install, list, setup, uninstall, version};
use anyhow::Result;
use jkl::Jkl;
use std::io;

pub fn dispatch(cmd: Option<Commands>, jkl: &Jkl) -> Result<()> {
    let mut out = io::stdout();
    setup::preflight_check(jkl, std::env::var_os("PATH"), &mut out)?;
    match cmd {
        None => setup::getting_started(jkl, &mut out),
        Some(Commands::Install { spec }) => install::run_install(jkl, &spec),
        Some(Commands::Uninstall { spec }) => uninstall::run_uninstall(jkl, &spec),
        Some(Commands::List { tool }) => list::run_list(jkl, tool.as_deref(), &mut out),
        Some(Commands::Version(args)) => version::print_version(&args, &mut out),
    }
}
