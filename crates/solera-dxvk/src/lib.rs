//! DXVK patch archive engine.
//!
//! Fetches a versioned tar+gzip bundle of replacement graphics DLLs, extracts
//! it into a Wine prefix's system directories, marks the DLL names as native
//! in the spawn environment, and removes the whole set again on uninstall.

pub mod archive;
pub mod download;
pub mod mock;
pub mod overrides;

pub use archive::{extract, fetch};
pub use download::{Downloader, HttpDownloader};
pub use overrides::{override_directive, remove, set_overrides, OVERRIDE_DLLS};

use thiserror::Error;

/// DXVK release tags map to a well-known GitHub asset URL.
pub fn release_url(version: &str) -> String {
    format!("https://github.com/doitsujin/dxvk/releases/download/v{version}/dxvk-{version}.tar.gz")
}

#[derive(Debug, Error)]
pub enum DxvkError {
    #[error("failed to get filename from url: {url}")]
    EmptyFilename { url: String },
    #[error("failed to download DXVK from {url}: {reason}")]
    Download { url: String, reason: String },
    #[error("dxvk I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Prefix(#[from] solera_prefix::PrefixError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_url_embeds_version_twice() {
        let url = release_url("2.3");
        assert!(url.ends_with("/v2.3/dxvk-2.3.tar.gz"));
    }
}
