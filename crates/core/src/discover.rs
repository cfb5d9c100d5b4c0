//! Same-origin link discovery.
//!
//! Expands a single target page into candidate reference pages: the page is
//! fetched once, every `a[href]` target is resolved against the page URL and
//! kept only if it shares scheme and host with the input URL and does not point
//! at a non-document file. Discovered links are never followed.
//!
//! # Example
//!
//! ```rust
//! use scribe_core::discover::{DiscoverConfig, extract_links};
//! use url::Url;
//!
//! let page = Url::parse("https://example.com/").unwrap();
//! let html = r#"<a href="/about">About</a><a href="https://other.com/x">Other</a>"#;
//! let links = extract_links(html, &page, &page, &DiscoverConfig::default().denied_extensions);
//! assert_eq!(links.len(), 1);
//! assert!(links.contains("https://example.com/about"));
//! ```

use std::collections::BTreeSet;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

#[cfg(feature = "fetch")]
use crate::error::CrawlError;
#[cfg(feature = "fetch")]
use crate::fetch::{FetchConfig, fetch_page, parse_absolute_url};

/// Extensions excluded from discovery unless configured otherwise.
pub const DEFAULT_DENIED_EXTENSIONS: [&str; 1] = [".pdf"];

/// Configuration for [`LinkDiscoverer`].
#[derive(Debug, Clone)]
pub struct DiscoverConfig {
    /// HTTP settings for the single page fetch.
    #[cfg(feature = "fetch")]
    pub fetch: FetchConfig,

    /// Path suffixes (compared case-insensitively) that mark non-document targets.
    pub denied_extensions: Vec<String>,
}

impl Default for DiscoverConfig {
    fn default() -> Self {
        Self {
            #[cfg(feature = "fetch")]
            fetch: FetchConfig::default(),
            denied_extensions: DEFAULT_DENIED_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

/// A set of absolute, same-origin document URLs.
///
/// Members are unique by exact string equality. Iteration order is sorted,
/// which callers must not rely on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkSet(BTreeSet<String>);

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a link, returning `false` if it was already present.
    pub fn insert(&mut self, link: String) -> bool {
        self.0.insert(link)
    }

    pub fn contains(&self, link: &str) -> bool {
        self.0.contains(link)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Merges another set into this one.
    pub fn extend(&mut self, other: LinkSet) {
        self.0.extend(other.0);
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0.into_iter().collect()
    }
}

impl FromIterator<String> for LinkSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for LinkSet {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Fetches a page and collects its same-origin links.
#[cfg(feature = "fetch")]
#[derive(Debug, Clone, Default)]
pub struct LinkDiscoverer {
    config: DiscoverConfig,
}

#[cfg(feature = "fetch")]
impl LinkDiscoverer {
    pub fn new(config: DiscoverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DiscoverConfig {
        &self.config
    }

    /// Discovers the same-origin document links of the page at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError`] if `url` is not an absolute URL with a host, the
    /// request fails, or the server answers with a non-2xx status.
    pub async fn discover(&self, url: &str) -> Result<LinkSet, CrawlError> {
        let origin = parse_absolute_url(url)?;
        let page = fetch_page(&origin, &self.config.fetch).await?;
        let links = extract_links(&page.body, &page.url, &origin, &self.config.denied_extensions);

        tracing::debug!(origin = %origin_of(&origin), found = links.len(), "discovered same-origin links");
        Ok(links)
    }
}

/// Extracts same-origin document links from `html`.
///
/// Relative targets are resolved against `page_url`; membership is decided
/// against the scheme and host of `origin`. Targets are kept as resolved,
/// fragments included, and deduplicated by exact string.
pub fn extract_links(html: &str, page_url: &Url, origin: &Url, denied_extensions: &[String]) -> LinkSet {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return LinkSet::new();
    };

    let denied: Vec<String> = denied_extensions
        .iter()
        .map(|ext| ext.trim().to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect();

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .filter_map(|href| page_url.join(href).ok())
        .filter(|target| same_origin(target, origin))
        .filter(|target| !has_denied_extension(target, &denied))
        .map(String::from)
        .collect()
}

/// Returns `scheme://host` for a URL, the origin used for same-site checks.
pub fn origin_of(url: &Url) -> String {
    format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default())
}

fn same_origin(target: &Url, origin: &Url) -> bool {
    target.scheme() == origin.scheme() && target.host_str().is_some() && target.host_str() == origin.host_str()
}

fn has_denied_extension(target: &Url, denied: &[String]) -> bool {
    let path = target.path().to_lowercase();
    denied.iter().any(|ext| path.ends_with(ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn denied() -> Vec<String> {
        DiscoverConfig::default().denied_extensions
    }

    #[test]
    fn test_scenario_dedup_offsite_and_pdf() {
        let html = r#"
            <html><body>
                <a href="https://example.com/about">About</a>
                <a href="https://example.com/about">About again</a>
                <a href="https://other.com/x">Elsewhere</a>
                <a href="https://example.com/brochure.pdf">Brochure</a>
            </body></html>
        "#;
        let origin = url("https://example.com");
        let links = extract_links(html, &origin, &origin, &denied());

        assert_eq!(links.into_vec(), vec!["https://example.com/about".to_string()]);
    }

    #[test]
    fn test_relative_links_resolve_against_page() {
        let html = r#"<a href="team">Team</a><a href="/contact">Contact</a><a href="../up">Up</a>"#;
        let page = url("https://example.com/company/index.html");
        let links = extract_links(html, &page, &page, &denied());

        assert!(links.contains("https://example.com/company/team"));
        assert!(links.contains("https://example.com/contact"));
        assert!(links.contains("https://example.com/up"));
    }

    #[test]
    fn test_denied_extension_is_case_insensitive() {
        let html = r#"<a href="/Price-List.PDF">Prices</a><a href="/pdf-guide">Guide</a>"#;
        let origin = url("https://example.com/");
        let links = extract_links(html, &origin, &origin, &denied());

        assert_eq!(links.into_vec(), vec!["https://example.com/pdf-guide".to_string()]);
    }

    #[test]
    fn test_query_strings_stay_distinct() {
        let html = r#"<a href="/p?a=1&b=2">One</a><a href="/p?b=2&a=1">Two</a>"#;
        let origin = url("https://example.com/");
        let links = extract_links(html, &origin, &origin, &denied());
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_fragments_are_distinct_links() {
        let html = r##"<a href="/faq#a">A</a><a href="/faq#b">B</a><a href="#top">Top</a><a href="/faq#a">A again</a>"##;
        let page = url("https://example.com/about");
        let links = extract_links(html, &page, &page, &denied());

        assert_eq!(
            links.into_vec(),
            vec![
                "https://example.com/about#top".to_string(),
                "https://example.com/faq#a".to_string(),
                "https://example.com/faq#b".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_denied_extension_is_ignored() {
        let html = r#"<a href="/a">A</a><a href="/b.pdf">B</a>"#;
        let origin = url("https://example.com/");
        let denied = vec![String::new(), "  ".to_string(), ".pdf".to_string()];
        let links = extract_links(html, &origin, &origin, &denied);

        assert_eq!(links.into_vec(), vec!["https://example.com/a".to_string()]);
    }

    #[test]
    fn test_non_http_schemes_and_lookalike_hosts_rejected() {
        let html = r#"
            <a href="mailto:info@example.com">Mail</a>
            <a href="javascript:void(0)">Script</a>
            <a href="http://example.com/plain">Plain http</a>
            <a href="https://example.com.evil.org/x">Lookalike</a>
            <a href="https://sub.example.com/x">Subdomain</a>
            <a href="">Empty</a>
        "#;
        let origin = url("https://example.com/");
        let links = extract_links(html, &origin, &origin, &denied());
        assert!(links.is_empty());
    }

    #[test]
    fn test_custom_denied_extensions() {
        let html = r#"<a href="/a.docx">Doc</a><a href="/b.pdf">Pdf</a><a href="/c">Page</a>"#;
        let origin = url("https://example.com/");
        let denied = vec![".docx".to_string()];
        let links = extract_links(html, &origin, &origin, &denied);

        assert!(links.contains("https://example.com/b.pdf"));
        assert!(links.contains("https://example.com/c"));
        assert!(!links.contains("https://example.com/a.docx"));
    }

    #[test]
    fn test_origin_of() {
        assert_eq!(origin_of(&url("https://example.com/a/b?c")), "https://example.com");
        assert_eq!(origin_of(&url("http://shop.example.dk:8080/")), "http://shop.example.dk");
    }

    #[test]
    fn test_link_set_extend_deduplicates() {
        let mut a: LinkSet = ["https://example.com/a".to_string()].into_iter().collect();
        let b: LinkSet = ["https://example.com/a".to_string(), "https://example.com/b".to_string()]
            .into_iter()
            .collect();
        a.extend(b);
        assert_eq!(a.len(), 2);
    }

    #[cfg(feature = "fetch")]
    mod remote {
        use super::super::*;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        #[tokio::test]
        async fn test_discover_fetches_and_filters() {
            let server = MockServer::start().await;
            let base = server.uri();
            let body = format!(
                r#"<a href="/about">About</a><a href="{base}/about">Dup</a><a href="https://other.com/x">x</a><a href="/brochure.pdf">b</a>"#
            );
            Mock::given(method("GET"))
                .and(path("/"))
                .respond_with(ResponseTemplate::new(200).set_body_string(body))
                .mount(&server)
                .await;

            let discoverer = LinkDiscoverer::default();
            let links = discoverer.discover(&base).await.unwrap();
            assert_eq!(links.into_vec(), vec![format!("{base}/about")]);
        }

        #[tokio::test]
        async fn test_discover_reports_failure() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(500))
                .mount(&server)
                .await;

            let discoverer = LinkDiscoverer::default();
            let result = discoverer.discover(&server.uri()).await;
            assert!(matches!(result, Err(CrawlError::Status { status: 500, .. })));
        }

        #[tokio::test]
        async fn test_discover_rejects_relative_input() {
            let discoverer = LinkDiscoverer::default();
            let result = discoverer.discover("example.com/about").await;
            assert!(matches!(result, Err(CrawlError::InvalidUrl(_))));
        }
    }
}
