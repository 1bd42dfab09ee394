use anyhow::{Context, Result};
use jkl::installer::dir_in_path;
use jkl::Jkl;
use std::ffi::OsString;
use std::io::Write;

// Shown before every command when the shims directory is missing from PATH.
pub fn preflight_check(jkl: &Jkl, path_var: Option<OsString>, out: &mut dyn Write) -> Result<()> {
    log::debug!("starting pre-flight check");
    let shims_dir = &jkl.config().shims_dir;
    let in_path = path_var.map(|p| dir_in_path(shims_dir, &p)).unwrap_or(false);
    if !in_path {
        let shown = format!("{:?}", shims_dir.display().to_string());
        write!(
            out,
            "WARNING: Please add the directory {shown} to your PATH environment variable, so that jkl-managed tools can be run automatically.\n\
             Be sure the updated path takes effect by restarting your shell or sourcing the shell initialization file.\n\
             For example, you might add the following line to one of your shell initialization files:\n\
             PATH={shown}:$PATH\n\
             export PATH\n\n"
        )?;
        return Ok(());
    }
    log::debug!("pre-flight check done");
    Ok(())
}

pub fn getting_started(jkl: &Jkl, out: &mut dyn Write) -> Result<()> {
    let tools = jkl.list_installed_tools().context("listing jkl-managed tools")?;
    let managing = match tools.len() {
        0 => "not yet managing any tools".to_string(),
        1 => "already managing one tool".to_string(),
        n => format!("already managing {n} tools"),
    };
    write!(
        out,
        "jkl is {managing}.\n\
         To install more tools, run: jkl install github:<Github user>/<Github repository>\n\
         To list jkl-managed tools, run: jkl list\n\
         To list installed versions of a tool, run: jkl list <ToolName>\n\
         For additional help, run: jkl help\n"
    )?;
    Ok(())
}
