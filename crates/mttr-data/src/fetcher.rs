//! Paginated Jira search client.
//!
//! [`IssueFetcher`] wraps one search URL (JQL included) and hands out
//! [`TicketPages`] cursors that request one page at a time, so callers can
//! aggregate a page before the next one is downloaded.

use std::time::Duration;

use mttr_core::error::{MttrError, Result};
use mttr_core::models::{SearchPage, Ticket};
use reqwest::Client;
use tracing::{debug, warn};

/// Page size used by the Jira search API when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Client for one Jira search query.
#[derive(Clone)]
pub struct IssueFetcher {
    client: Client,
    url: String,
    page_size: u32,
    credentials: Option<(String, String)>,
}

impl IssueFetcher {
    /// Create a fetcher for `url`, requesting `page_size` issues per page.
    pub fn new(url: impl Into<String>, page_size: u32, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| MttrError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            page_size: page_size.max(1),
            credentials: None,
        })
    }

    /// Send basic-auth credentials with every request.
    pub fn with_credentials(mut self, user: impl Into<String>, token: impl Into<String>) -> Self {
        self.credentials = Some((user.into(), token.into()));
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Cursor over every page of the query, starting at the first issue.
    pub fn pages(&self) -> TicketPages<'_> {
        TicketPages {
            fetcher: self,
            next_start_at: Some(0),
        }
    }

    /// Fetch the page beginning at issue `start_at`.
    pub async fn fetch_page(&self, start_at: u64) -> Result<SearchPage> {
        let mut request = self.client.get(&self.url).query(&[
            ("startAt", start_at.to_string()),
            ("maxResults", self.page_size.to_string()),
        ]);
        if let Some((user, token)) = &self.credentials {
            request = request.basic_auth(user, Some(token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| MttrError::Fetch(format!("request to {} failed: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MttrError::Fetch(format!(
                "{} returned HTTP {}",
                self.url, status
            )));
        }

        let page: SearchPage = response
            .json()
            .await
            .map_err(|e| MttrError::Fetch(format!("invalid search response: {}", e)))?;

        debug!(
            start_at,
            issues = page.issues.len(),
            total = page.total,
            "fetched search page"
        );
        Ok(page)
    }
}

/// Lazy, page-at-a-time cursor over a search query.
pub struct TicketPages<'a> {
    fetcher: &'a IssueFetcher,
    next_start_at: Option<u64>,
}

impl TicketPages<'_> {
    /// Fetch the next page, `Ok(None)` once the query is exhausted.
    ///
    /// A page that reports a different `startAt` than the one requested is
    /// rejected with [`MttrError::Fetch`] so no ticket is yielded twice. An
    /// error ends the cursor.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Ticket>>> {
        let Some(start_at) = self.next_start_at.take() else {
            return Ok(None);
        };

        let page = self.fetcher.fetch_page(start_at).await?;

        if !page.starts_at(start_at) {
            warn!(
                requested = start_at,
                "search endpoint returned a page at a different offset"
            );
            return Err(MttrError::Fetch(format!(
                "{} answered startAt={} for requested startAt={}",
                self.fetcher.url,
                page.start_at.unwrap_or_default(),
                start_at
            )));
        }

        self.next_start_at = page.next_start_at(start_at);

        Ok(Some(page.issues.into_iter().map(Ticket::from).collect()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn page_body(start_at: u64, total: u64, keys: &[&str]) -> String {
        let issues: Vec<serde_json::Value> = keys
            .iter()
            .map(|key| {
                serde_json::json!({
                    "id": format!("id-{}", key),
                    "key": key,
                    "fields": {
                        "created": "2018-08-01T00:00:00.000+0000",
                        "resolutiondate": "2018-08-02T00:00:00.000+0000",
                        "labels": ["teamA"]
                    }
                })
            })
            .collect();
        serde_json::json!({
            "startAt": start_at,
            "maxResults": keys.len(),
            "total": total,
            "issues": issues,
        })
        .to_string()
    }

    fn page_query(start_at: &str, max_results: &str) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("jql".into(), "project=OPS".into()),
            Matcher::UrlEncoded("startAt".into(), start_at.into()),
            Matcher::UrlEncoded("maxResults".into(), max_results.into()),
        ])
    }

    async fn collect_keys(fetcher: &IssueFetcher) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut pages = fetcher.pages();
        while let Some(page) = pages.next_page().await? {
            keys.extend(page.into_iter().map(|t| t.key));
        }
        Ok(keys)
    }

    #[tokio::test]
    async fn test_walks_every_page() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", "/rest/api/2/search")
            .match_query(page_query("0", "2"))
            .with_header("content-type", "application/json")
            .with_body(page_body(0, 3, &["OPS-1", "OPS-2"]))
            .create_async()
            .await;
        let second = server
            .mock("GET", "/rest/api/2/search")
            .match_query(page_query("2", "2"))
            .with_header("content-type", "application/json")
            .with_body(page_body(2, 3, &["OPS-3"]))
            .create_async()
            .await;

        let url = format!("{}/rest/api/2/search?jql=project%3DOPS", server.url());
        let fetcher = IssueFetcher::new(url, 2, 5).unwrap();

        let keys = collect_keys(&fetcher).await.unwrap();

        assert_eq!(keys, vec!["OPS-1", "OPS-2", "OPS-3"]);
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_result() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/2/search")
            .match_query(page_query("0", "500"))
            .with_body(page_body(0, 0, &[]))
            .create_async()
            .await;

        let url = format!("{}/rest/api/2/search?jql=project%3DOPS", server.url());
        let fetcher = IssueFetcher::new(url, DEFAULT_PAGE_SIZE, 5).unwrap();

        assert!(collect_keys(&fetcher).await.unwrap().is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejects_page_at_wrong_offset() {
        let mut server = mockito::Server::new_async().await;
        // Always answers with the first page, whatever startAt says.
        let mock = server
            .mock("GET", "/rest/api/2/search")
            .match_query(Matcher::Any)
            .with_body(page_body(0, 10, &["OPS-1", "OPS-2"]))
            .expect(2)
            .create_async()
            .await;

        let url = format!("{}/rest/api/2/search?jql=project%3DOPS", server.url());
        let fetcher = IssueFetcher::new(url, 2, 5).unwrap();
        let mut pages = fetcher.pages();

        let first = pages.next_page().await.unwrap().unwrap();
        assert_eq!(first.len(), 2);

        match pages.next_page().await.unwrap_err() {
            MttrError::Fetch(msg) => assert!(msg.contains("startAt=2"), "message: {msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(pages.next_page().await.unwrap().is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_next_offset_follows_requested_offset() {
        let mut server = mockito::Server::new_async().await;
        // No startAt in the body: the cursor advances by the issues received.
        let first = server
            .mock("GET", "/rest/api/2/search")
            .match_query(page_query("0", "2"))
            .with_body(r#"{"total": 3, "issues": [{"id": "1", "key": "OPS-1"}, {"id": "2", "key": "OPS-2"}]}"#)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/rest/api/2/search")
            .match_query(page_query("2", "2"))
            .with_body(r#"{"total": 3, "issues": [{"id": "3", "key": "OPS-3"}]}"#)
            .create_async()
            .await;

        let url = format!("{}/rest/api/2/search?jql=project%3DOPS", server.url());
        let fetcher = IssueFetcher::new(url, 2, 5).unwrap();

        let keys = collect_keys(&fetcher).await.unwrap();
        assert_eq!(keys, vec!["OPS-1", "OPS-2", "OPS-3"]);
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_error_is_fetch_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/api/2/search")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let url = format!("{}/rest/api/2/search?jql=project%3DOPS", server.url());
        let fetcher = IssueFetcher::new(url, 2, 5).unwrap();

        let err = collect_keys(&fetcher).await.unwrap_err();
        match err {
            MttrError::Fetch(msg) => assert!(msg.contains("401"), "message: {msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_undecodable_body_is_fetch_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/api/2/search")
            .match_query(Matcher::Any)
            .with_body("<html>login</html>")
            .create_async()
            .await;

        let url = format!("{}/rest/api/2/search?jql=project%3DOPS", server.url());
        let fetcher = IssueFetcher::new(url, 2, 5).unwrap();

        assert!(matches!(
            fetcher.fetch_page(0).await.unwrap_err(),
            MttrError::Fetch(_)
        ));
    }

    #[tokio::test]
    async fn test_sends_basic_auth() {
        let mut server = mockito::Server::new_async().await;
        // "ops:secret" in base64.
        let mock = server
            .mock("GET", "/rest/api/2/search")
            .match_query(Matcher::Any)
            .match_header("authorization", "Basic b3BzOnNlY3JldA==")
            .with_body(page_body(0, 1, &["OPS-1"]))
            .create_async()
            .await;

        let url = format!("{}/rest/api/2/search?jql=project%3DOPS", server.url());
        let fetcher = IssueFetcher::new(url, 2, 5)
            .unwrap()
            .with_credentials("ops", "secret");

        assert_eq!(collect_keys(&fetcher).await.unwrap(), vec!["OPS-1"]);
        mock.assert_async().await;
    }
}
