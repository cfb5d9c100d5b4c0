//! Page fetching for link discovery.
//!
//! One GET per call, no retries. Redirects follow the transport default.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::CrawlError;

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: 30, user_agent: "Mozilla/5.0 (compatible; Scribe/0.1)".to_string() }
    }
}

/// A fetched HTML page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL the body was served from, after redirects.
    pub url: Url,
    /// Response body as text.
    pub body: String,
}

/// Parses `input` as an absolute URL that carries both a scheme and a host.
pub fn parse_absolute_url(input: &str) -> Result<Url, CrawlError> {
    let url = Url::parse(input.trim()).map_err(|e| CrawlError::InvalidUrl(format!("{}: {}", input, e)))?;

    if url.host_str().is_none_or(str::is_empty) {
        return Err(CrawlError::InvalidUrl(format!("{} has no host", input)));
    }

    Ok(url)
}

/// Fetches HTML content from a URL.
///
/// Performs a single HTTP GET and returns the body. Any non-2xx response is
/// reported as [`CrawlError::Status`].
pub async fn fetch_page(url: &Url, config: &FetchConfig) -> Result<FetchedPage, CrawlError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(CrawlError::Http)?;

    let response = client
        .get(url.clone())
        .header("User-Agent", &config.user_agent)
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                CrawlError::Timeout { timeout: config.timeout }
            } else {
                CrawlError::Http(e)
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(CrawlError::Status { status: status.as_u16(), url: url.to_string() });
    }

    let final_url = response.url().clone();
    let body = response.text().await?;

    Ok(FetchedPage { url: final_url, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, 30);
        assert!(config.user_agent.contains("Scribe"));
    }

    #[test]
    fn test_parse_absolute_url() {
        assert!(parse_absolute_url("https://example.com").is_ok());
        assert!(parse_absolute_url("  http://example.com/page  ").is_ok());
        assert!(matches!(parse_absolute_url("example.com"), Err(CrawlError::InvalidUrl(_))));
        assert!(matches!(parse_absolute_url("/relative/path"), Err(CrawlError::InvalidUrl(_))));
    }

    #[test]
    fn test_parse_absolute_url_requires_host() {
        assert!(matches!(parse_absolute_url("mailto:someone@example.com"), Err(CrawlError::InvalidUrl(_))));
        assert!(matches!(parse_absolute_url("file:///etc/hosts"), Err(CrawlError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_page_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>ok</body></html>"))
            .mount(&server)
            .await;

        let url = parse_absolute_url(&server.uri()).unwrap();
        let page = fetch_page(&url, &FetchConfig::default()).await.unwrap();
        assert!(page.body.contains("ok"));
        assert_eq!(page.url.host_str(), url.host_str());
    }

    #[tokio::test]
    async fn test_fetch_page_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = parse_absolute_url(&format!("{}/missing", server.uri())).unwrap();
        let result = fetch_page(&url, &FetchConfig::default()).await;
        assert!(matches!(result, Err(CrawlError::Status { status: 404, .. })));
    }
}
