use crate::cli::VersionArgs;
use anyhow::Result;
use std::io::Write;

pub fn print_version(args: &VersionArgs, out: &mut dyn Write) -> Result<()> {
    if args.version_only {
        writeln!(out, "{}", jkl::VERSION)?;
    } else if args.commit_only {
        writeln!(out, "{}", jkl::GIT_COMMIT)?;
    } else {
        writeln!(out, "jkl version {}, git commit {}", jkl::VERSION, jkl::GIT_COMMIT)?;
    }
    Ok(())
}
