use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

pub fn platform() -> &'static dyn PlatformOps {
    &ConcretePlatform
}

/// Filesystem and process operations whose behaviour differs between Unix and Windows.
pub trait PlatformOps: Sync + Send {
    fn home_dir(&self) -> Option<PathBuf>;
    /// File name of an installed tool binary.
    fn final_binary_name(&self, base: &str) -> String;
    fn make_executable(&self, path: &Path) -> io::Result<()>;
    /// Like `create_dir_all`, but new directories are only accessible by their owner.
    fn create_private_dir_all(&self, path: &Path) -> io::Result<()>;
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()>;
    /// Runs `program` in place of the current process. Returns the exit code on
    /// platforms that cannot replace the process image.
    fn exec(&self, program: &Path, args: &[OsString]) -> io::Result<i32>;
}

/// The running OS as catalogs name it (`darwin` rather than `macos`).
pub fn os_name() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// The running architecture as catalogs name it.
pub fn arch_name() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        other => other,
    }
}

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::UNIX_PLATFORM as ConcretePlatform;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WINDOWS_PLATFORM as ConcretePlatform;
