//! Remote file retrieval.
//!
//! One blocking libcurl GET per call, after alias expansion. No retries and no
//! timeout beyond libcurl defaults; a transport failure or a non-2xx status is
//! reported as `FetchFailed`.

mod alias;

pub use alias::{AliasTable, BUILTIN_ALIASES};

use crate::error::{GrablibError, Result};

/// Source of raw bytes for a URL.
pub trait Fetch {
    /// Expands aliases in `key` and returns the URL that would be fetched.
    fn expand(&self, key: &str) -> String;

    /// Fetches an already expanded URL.
    fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/// libcurl-backed fetcher.
#[derive(Debug, Clone, Default)]
pub struct CurlFetcher {
    aliases: AliasTable,
}

impl CurlFetcher {
    pub fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }
}

impl Fetch for CurlFetcher {
    fn expand(&self, key: &str) -> String {
        self.aliases.expand(key)
    }

    fn get(&self, url: &str) -> Result<Vec<u8>> {
        let failed = |cause: String| GrablibError::FetchFailed {
            url: url.to_string(),
            cause,
        };

        url::Url::parse(url).map_err(|e| failed(format!("invalid URL: {}", e)))?;

        let mut body = Vec::new();
        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(|e| failed(e.to_string()))?;
        easy.follow_location(true)
            .and_then(|_| easy.max_redirections(10))
            .and_then(|_| easy.useragent(concat!("grablib/", env!("CARGO_PKG_VERSION"))))
            .map_err(|e| failed(e.to_string()))?;

        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(|e| failed(e.to_string()))?;
            transfer.perform().map_err(|e| {
                tracing::error!(url, error = %e, "problem occurred during download");
                failed(e.to_string())
            })?;
        }

        let code = easy.response_code().map_err(|e| failed(e.to_string()))?;
        if !(200..300).contains(&code) {
            tracing::error!(url, code, "wrong status code");
            return Err(failed(format!("HTTP {}", code)));
        }
        tracing::debug!(url, bytes = body.len(), "fetched");
        Ok(body)
    }
}
