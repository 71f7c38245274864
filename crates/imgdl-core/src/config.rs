use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::{RetryPolicy, DOWNLOAD_FAIL_MAX, DOWNLOAD_FAIL_RETRY_DELAY};

/// Retry budget (optional `[retry]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Failed attempts retried before a download is marked as failed.
    pub max_failures: u32,
    /// Fixed delay in seconds between attempts (e.g. 0.5 = 500ms).
    pub retry_delay_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_failures: DOWNLOAD_FAIL_MAX,
            retry_delay_secs: DOWNLOAD_FAIL_RETRY_DELAY.as_secs_f64(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        let delay = Duration::try_from_secs_f64(self.retry_delay_secs)
            .unwrap_or(DOWNLOAD_FAIL_RETRY_DELAY);
        RetryPolicy::fixed(self.max_failures, delay)
    }
}

/// Global configuration loaded from `~/.config/imgdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloaderConfig {
    /// Number of worker threads running downloads at the same time.
    pub threads_max: usize,
    /// Per-attempt connect timeout, also used as the stalled-read timeout.
    pub request_timeout_secs: u64,
    /// Optional receive buffer size in bytes (None = curl default).
    #[serde(default)]
    pub chunk_size_bytes: Option<usize>,
    /// Optional retry budget; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            threads_max: 8,
            request_timeout_secs: 10,
            chunk_size_bytes: None,
            retry: None,
        }
    }
}

impl DownloaderConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryConfig::policy)
            .unwrap_or_default()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("imgdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<DownloaderConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = DownloaderConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let cfg: DownloaderConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = DownloaderConfig::default();
        assert_eq!(cfg.threads_max, 8);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = DownloaderConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: DownloaderConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.threads_max, cfg.threads_max);
        assert_eq!(parsed.request_timeout_secs, cfg.request_timeout_secs);
        assert!(parsed.retry.is_none());
    }

    #[test]
    fn config_toml_with_retry_section() {
        let toml = r#"
            threads_max = 2
            request_timeout_secs = 3
            chunk_size_bytes = 4096

            [retry]
            max_failures = 4
            retry_delay_secs = 0.25
        "#;
        let cfg: DownloaderConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.threads_max, 2);
        assert_eq!(cfg.chunk_size_bytes, Some(4096));
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_failures, 4);
        assert_eq!(policy.delay, Duration::from_millis(250));
    }

    #[test]
    fn negative_delay_falls_back_to_default() {
        let retry = RetryConfig {
            max_failures: 1,
            retry_delay_secs: -1.0,
        };
        assert_eq!(retry.policy().delay, DOWNLOAD_FAIL_RETRY_DELAY);
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let cfg = DownloaderConfig {
            request_timeout_secs: 0,
            ..DownloaderConfig::default()
        };
        assert_eq!(cfg.request_timeout(), Duration::from_secs(1));
    }
}
