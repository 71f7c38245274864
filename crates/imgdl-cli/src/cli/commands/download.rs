//! `imgdl download` – fetch every URL of a list and report each result.

use anyhow::{bail, Context, Result};
use imgdl_core::config::DownloaderConfig;
use imgdl_core::{checksum, url_list, DownloadInfo, DownloadState, Downloader};
use serde::Serialize;

use crate::cli::DownloadArgs;

/// One completed download, as printed with `--json`.
#[derive(Debug, Serialize)]
struct Report {
    url: String,
    path: Option<String>,
    state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha256: Option<String>,
}

impl Report {
    fn new(info: &DownloadInfo, with_sha256: bool) -> Self {
        let sha256 = match (&info.path, info.state) {
            (Some(path), DownloadState::Finished) if with_sha256 => {
                match checksum::sha256_file(path) {
                    Ok(digest) => Some(digest),
                    Err(e) => {
                        tracing::warn!(url = %info.url, "checksum failed: {:#}", e);
                        None
                    }
                }
            }
            _ => None,
        };
        Self {
            url: info.url.clone(),
            path: info.path.as_ref().map(|p| p.display().to_string()),
            state: info.state.as_str(),
            error: info.error.as_ref().map(|e| e.to_string()),
            sha256,
        }
    }

    fn print(&self, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string(self)?);
            return Ok(());
        }
        let mut line = format!(
            "{:<16} {} {}",
            self.state,
            self.path.as_deref().unwrap_or("-"),
            self.url
        );
        if let Some(digest) = &self.sha256 {
            line.push_str(&format!(" sha256={}", digest));
        }
        if let Some(error) = &self.error {
            line.push_str(&format!(" ({})", error));
        }
        println!("{}", line);
        Ok(())
    }
}

pub fn run_download(cfg: &DownloaderConfig, args: &DownloadArgs) -> Result<()> {
    let list = url_list::read_urls(&args.urls_file)?;
    if !list.rejected_lines.is_empty() {
        eprintln!(
            "skipped {} invalid line(s) in {}",
            list.rejected_lines.len(),
            args.urls_file.display()
        );
    }
    if list.urls.is_empty() {
        println!("No URLs to download.");
        return Ok(());
    }

    let mut cfg = cfg.clone();
    if let Some(threads) = args.threads {
        cfg.threads_max = threads;
    }
    let downloader = Downloader::from_config(&cfg).context("failed to start downloader")?;
    tracing::info!(
        urls = list.urls.len(),
        dir = %args.output_dir.display(),
        "starting batch download"
    );
    downloader.submit(&args.output_dir, args.rewrite, list.urls);

    let mut print_err = None;
    downloader.wait_all_with(|info| {
        if print_err.is_none() {
            print_err = Report::new(&info, args.sha256).print(args.json).err();
        }
    });
    if let Some(e) = print_err {
        return Err(e);
    }

    let total = downloader.count_total();
    let failed = downloader
        .infos_by_state(&[DownloadState::CancelledError])
        .len();
    println!("{}/{} done", downloader.count_done(), total);
    if failed > 0 {
        bail!("{} of {} downloads failed", failed, total);
    }
    Ok(())
}
