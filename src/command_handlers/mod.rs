pub mod dispatch;
pub mod install;
pub mod list;
pub mod setup;
pub mod uninstall;
pub mod version;
