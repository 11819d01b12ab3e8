//! HTTP fetcher for stylesheets, images and fonts
//!
//! Downloads stream through a size check (before and during download), carry
//! browser-like headers, and land in an in-memory LRU cache keyed by resolved
//! URL. `file://` URLs are read from disk so locally saved pages can be inlined
//! without a server.

use futures::StreamExt;
use lru::LruCache;
use parking_lot::Mutex;
use reqwest::Client;
use std::num::NonZeroUsize;
use url::Url;

use super::{FetchError, FetchOptions, FetchedResource, ResourceFetcher};
use crate::config::FetchConfig;
use crate::utils::resolve_url;

/// reqwest-backed [`ResourceFetcher`]
pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
    /// `None` when the configured capacity is zero
    responses: Option<Mutex<LruCache<String, FetchedResource>>>,
}

impl HttpFetcher {
    /// Create a fetcher with the default `FetchConfig`
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(FetchConfig::default())
    }

    #[must_use]
    pub fn with_config(config: FetchConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Create a fetcher around an existing client
    ///
    /// Client already uses Arc internally, so sharing one between fetchers is
    /// cheap.
    #[must_use]
    pub fn with_client(client: Client, config: FetchConfig) -> Self {
        let responses =
            NonZeroUsize::new(config.cache_capacity()).map(|capacity| Mutex::new(LruCache::new(capacity)));

        Self {
            client,
            config,
            responses,
        }
    }

    #[must_use]
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Number of responses currently held in the LRU cache
    #[must_use]
    pub fn cached_responses(&self) -> usize {
        self.responses.as_ref().map_or(0, |cache| cache.lock().len())
    }

    fn cached(&self, url: &str) -> Option<FetchedResource> {
        self.responses.as_ref()?.lock().get(url).cloned()
    }

    fn remember(&self, resource: &FetchedResource) {
        if let Some(cache) = &self.responses {
            cache.lock().put(resource.url.clone(), resource.clone());
        }
    }

    async fn download(&self, url: &Url, bypass_cache: bool) -> Result<FetchedResource, FetchError> {
        let limit = self.config.resource_size_limit();

        let mut request = self
            .client
            .get(url.as_str())
            .timeout(self.config.request_timeout())
            .header("User-Agent", self.config.user_agent_header())
            .header("Accept", "text/css,image/*,font/*,*/*;q=0.1");

        if bypass_cache {
            request = request
                .header("Cache-Control", "no-cache")
                .header("Pragma", "no-cache");
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // Enforce limit BEFORE downloading
        let expected_size = response.content_length().unwrap_or(0);
        if expected_size > limit as u64 {
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                size: expected_size,
                limit,
            });
        }

        let mut buffer = if expected_size > 0 {
            Vec::with_capacity(expected_size as usize)
        } else {
            Vec::new()
        };

        // Stream response with size checking (second line of defense)
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;

            let new_total = buffer.len() + chunk.len();
            if new_total > limit {
                return Err(FetchError::TooLarge {
                    url: url.to_string(),
                    size: new_total as u64,
                    limit,
                });
            }

            buffer.extend_from_slice(&chunk);
        }

        Ok(FetchedResource::new(url.as_str(), buffer, content_type))
    }

    async fn read_file(&self, url: &Url) -> Result<FetchedResource, FetchError> {
        let limit = self.config.resource_size_limit();
        let path = url
            .to_file_path()
            .map_err(|()| FetchError::InvalidUrl(url.to_string()))?;

        let size = tokio::fs::metadata(&path).await?.len();
        if size > limit as u64 {
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                size,
                limit,
            });
        }

        let body = tokio::fs::read(&path).await?;
        Ok(FetchedResource::new(url.as_str(), body, None))
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<FetchedResource, FetchError> {
        let resolved = resolve_url(url, options.base_url.as_deref());
        let parsed = Url::parse(&resolved).map_err(|_| FetchError::InvalidUrl(resolved.clone()))?;

        if !options.bypass_cache
            && let Some(hit) = self.cached(parsed.as_str())
        {
            log::debug!("Serving {resolved} from response cache");
            return Ok(hit);
        }

        let resource = match parsed.scheme() {
            "http" | "https" => self.download(&parsed, options.bypass_cache).await?,
            "file" => self.read_file(&parsed).await?,
            scheme => {
                return Err(FetchError::UnsupportedScheme {
                    url: resolved.clone(),
                    scheme: scheme.to_string(),
                });
            }
        };

        log::debug!("Fetched {} ({} bytes)", resource.url, resource.body.len());

        if !options.bypass_cache {
            self.remember(&resource);
        }

        Ok(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_relative_url_without_base() {
        let fetcher = HttpFetcher::new();

        let result = fetcher.fetch("some.css", &FetchOptions::default()).await;

        assert!(matches!(result, Err(FetchError::InvalidUrl(url)) if url == "some.css"));
    }

    #[tokio::test]
    async fn test_rejects_unsupported_scheme() {
        let fetcher = HttpFetcher::new();

        let result = fetcher
            .fetch("ftp://example.com/a.css", &FetchOptions::default())
            .await;

        assert!(matches!(result, Err(FetchError::UnsupportedScheme { scheme, .. }) if scheme == "ftp"));
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let fetcher = HttpFetcher::with_config(FetchConfig::default().response_cache_capacity(0));

        assert!(fetcher.responses.is_none());
        assert_eq!(fetcher.cached_responses(), 0);
    }
}
