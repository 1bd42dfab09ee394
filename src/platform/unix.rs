use crate::platform::PlatformOps;
use fs_err as fs;
use std::ffi::OsString;
use std::io;
use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::Command;

pub static UNIX_PLATFORM: Unix = Unix;

pub struct Unix;

impl PlatformOps for Unix {
    fn home_dir(&self) -> Option<PathBuf> {
        std::env::var_os("HOME").map(PathBuf::from).or_else(dirs::home_dir)
    }
    fn final_binary_name(&self, base: &str) -> String {
        base.to_string()
    }
    fn make_executable(&self, path: &Path) -> io::Result<()> {
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)
    }
    fn create_private_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(path)
            .map_err(|e| io::Error::new(e.kind(), format!("creating directory {}: {e}", path.display())))
    }
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        std::os::unix::fs::symlink(target, link).map_err(|e| {
            io::Error::new(e.kind(), format!("linking {} to {}: {e}", link.display(), target.display()))
        })
    }
    fn exec(&self, program: &Path, args: &[OsString]) -> io::Result<i32> {
        // Only returns on failure.
        Err(Command::new(program).args(args).exec())
    }
}
