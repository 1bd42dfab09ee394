use crate::platform::PlatformOps;
use fs_err as fs;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

pub static WINDOWS_PLATFORM: Windows = Windows;

pub struct Windows;

impl PlatformOps for Windows {
    fn home_dir(&self) -> Option<PathBuf> { std::env::var_os("USERPROFILE").map(PathBuf::from).or_else(dirs::home_dir) }
    fn final_binary_name(&self, base: &str) -> String { if base.ends_with(".exe") { base.to_string() } else { format!("{base}.exe") } }
    fn make_executable(&self, _path: &Path) -> io::Result<()> { Ok(()) }
    fn create_private_dir_all(&self, path: &Path) -> io::Result<()> { fs::create_dir_all(path) }
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> { std::os::windows::fs::symlink_file(target, link) }
    fn exec(&self, program: &Path, args: &[OsString]) -> io::Result<i32> {
        let status = Command::new(program).args(args).status()?;
        Ok(status.code().unwrap_or(1))
    }
}
