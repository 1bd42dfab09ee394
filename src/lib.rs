//! Install command-line tools from GitHub releases and the HashiCorp releases
//! API, and run the version each project asks for through shims.

pub mod archive;
pub mod asdf;
pub mod asset_match;
pub mod config;
pub mod error;
pub mod installer;
pub mod managed_tool;
pub mod platform;
pub mod providers;
pub mod release_match;
pub mod tool_spec;
pub mod versioning;

pub use config::JklConfig;
pub use error::{Error, ExtractError, Result};
pub use installer::{Installed, Jkl};
pub use managed_tool::ManagedTool;
pub use tool_spec::{ProviderKind, ToolSpec};

/// Release version of this build.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit this build was made from, when provided at build time through
/// `JKL_GIT_COMMIT`.
pub const GIT_COMMIT: &str = match option_env!("JKL_GIT_COMMIT") {
    Some(commit) => commit,
    None => "unknown",
};
