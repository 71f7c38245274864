//! `imgdl config` – show where config and log live and what is in effect.

use anyhow::Result;
use imgdl_core::config::{self, DownloaderConfig};
use imgdl_core::logging;

pub fn run_config(cfg: &DownloaderConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    println!("# log: {}", logging::log_path()?.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    let policy = cfg.retry_policy();
    println!(
        "# effective retry: {} retries, {:?} apart",
        policy.max_failures, policy.delay
    );
    Ok(())
}
