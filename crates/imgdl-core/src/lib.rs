pub mod config;
pub mod error;
pub mod logging;

pub mod checksum;
pub mod downloader;
pub mod retry;
pub mod storage;
pub mod task;
pub mod transport;
pub mod url_list;
pub mod url_model;

pub use downloader::Downloader;
pub use error::{Error, Result};
pub use task::{DownloadInfo, DownloadState, TaskFailure};
