//! HTTP client and concurrent downloader for fetching Minecraft mod
//! packages and their metadata.

pub mod client;
pub mod downloader;
pub mod error;

pub use client::{NetClient, NetClientCfg};
pub use downloader::{DlResult, DownloadFuture, Downloader, DownloaderCfg};
pub use error::NetError;
