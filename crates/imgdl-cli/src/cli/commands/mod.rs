//! CLI command handlers, one file per command.

mod check;
mod config;
mod download;

pub use check::run_check;
pub use config::run_config;
pub use download::run_download;
