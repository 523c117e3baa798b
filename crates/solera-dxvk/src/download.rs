use crate::DxvkError;
use std::io::Read;

/// Opaque download collaborator: `get(url) -> bytes`.
///
/// The wire format is not this crate's concern; implementations only promise
/// the full response body or a transport error.
pub trait Downloader: Send + Sync {
    fn get(&self, url: &str) -> Result<Vec<u8>, DxvkError>;
}

/// `Downloader` over a plain HTTP(S) GET. No authentication, no resume.
pub struct HttpDownloader {
    agent: ureq::Agent,
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
        }
    }
}

impl HttpDownloader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Downloader for HttpDownloader {
    fn get(&self, url: &str) -> Result<Vec<u8>, DxvkError> {
        tracing::debug!("GET {url}");
        let resp = match self.agent.get(url).call() {
            Ok(r) => r,
            Err(ureq::Error::StatusCode(code)) => {
                return Err(DxvkError::Download {
                    url: url.to_owned(),
                    reason: format!("HTTP {code}"),
                });
            }
            Err(e) => {
                return Err(DxvkError::Download {
                    url: url.to_owned(),
                    reason: e.to_string(),
                });
            }
        };

        let mut body = Vec::new();
        resp.into_body()
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|e| DxvkError::Download {
                url: url.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(body)
    }
}
