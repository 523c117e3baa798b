//! Test double for the download collaborator.

use crate::download::Downloader;
use crate::DxvkError;
use std::sync::{Mutex, PoisonError};

/// Recording `Downloader` that serves a canned body or a transport error.
#[derive(Debug, Default)]
pub struct MockDownloader {
    body: Option<Vec<u8>>,
    calls: Mutex<Vec<String>>,
}

impl MockDownloader {
    pub fn serving(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: Some(body.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every request fails with a transport error.
    pub fn failing() -> Self {
        Self::default()
    }

    /// URLs requested, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Downloader for MockDownloader {
    fn get(&self, url: &str) -> Result<Vec<u8>, DxvkError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_owned());
        match &self.body {
            Some(body) => Ok(body.clone()),
            None => Err(DxvkError::Download {
                url: url.to_owned(),
                reason: "connection refused".to_owned(),
            }),
        }
    }
}
