// src/services/search.rs

//! Search service adapter.
//!
//! Talks to an Elasticsearch-style release index: count queries, scrolled
//! retrieval with a server-side cursor, and a range filter on `date`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{IndexConfig, RawRelease};
use crate::utils::http::create_async_client;

/// Query over the release index, optionally bounded below by date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    from_date: Option<String>,
}

impl Query {
    /// Match every release.
    pub fn match_all() -> Self {
        Self::default()
    }

    /// Match releases with `date >= from_date`, or everything when absent.
    pub fn from_date(from_date: Option<&str>) -> Self {
        Self {
            from_date: from_date.map(str::to_string),
        }
    }

    /// Inclusive lower bound, if any.
    pub fn lower_bound(&self) -> Option<&str> {
        self.from_date.as_deref()
    }

    /// Query DSL body for the search service.
    pub fn to_json(&self) -> Value {
        match &self.from_date {
            None => json!({ "match_all": {} }),
            Some(from) => json!({
                "bool": {
                    "must": { "match_all": {} },
                    "filter": { "range": { "date": { "gte": from } } }
                }
            }),
        }
    }
}

/// One page of a scrolled search.
#[derive(Debug, Clone, Default)]
pub struct ScrollPage {
    /// Cursor for the next page, if the service handed one out
    pub scroll_id: Option<String>,
    pub records: Vec<RawRelease>,
}

/// Raw operations against the search service.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Number of releases matching the query.
    async fn count(&self, query: &Query) -> Result<u64>;

    /// Start a scrolled search and return its first page.
    async fn open_scroll(
        &self,
        query: &Query,
        page_size: usize,
        fields: &[&str],
    ) -> Result<ScrollPage>;

    /// Fetch the page following `scroll_id`.
    async fn next_scroll(&self, scroll_id: &str) -> Result<ScrollPage>;

    /// Release the server-side cursor.
    async fn clear_scroll(&self, scroll_id: &str) -> Result<()>;
}

/// Lazy page sequence over a scrolled search.
///
/// Every fetch after the first waits `page_delay` to go easy on the service.
pub struct Scroll<'a> {
    backend: &'a dyn SearchBackend,
    query: Query,
    page_size: usize,
    fields: &'a [&'a str],
    page_delay: Duration,
    scroll_id: Option<String>,
    started: bool,
    exhausted: bool,
}

impl<'a> Scroll<'a> {
    pub fn new(
        backend: &'a dyn SearchBackend,
        query: Query,
        page_size: usize,
        fields: &'a [&'a str],
        page_delay: Duration,
    ) -> Self {
        Self {
            backend,
            query,
            page_size,
            fields,
            page_delay,
            scroll_id: None,
            started: false,
            exhausted: false,
        }
    }

    /// Fetch the next page; `None` once a page comes back empty.
    pub async fn next_page(&mut self) -> Result<Option<Vec<RawRelease>>> {
        if self.exhausted {
            return Ok(None);
        }

        let page = if !self.started {
            self.started = true;
            self.backend
                .open_scroll(&self.query, self.page_size, self.fields)
                .await?
        } else {
            let Some(scroll_id) = self.scroll_id.clone() else {
                self.exhausted = true;
                return Ok(None);
            };
            if !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
            self.backend.next_scroll(&scroll_id).await?
        };

        if page.scroll_id.is_some() {
            self.scroll_id = page.scroll_id;
        }
        if page.records.is_empty() {
            self.exhausted = true;
            return Ok(None);
        }
        Ok(Some(page.records))
    }

    /// Release the cursor. Failures are only logged.
    pub async fn finish(self) {
        if let Some(scroll_id) = self.scroll_id {
            if let Err(e) = self.backend.clear_scroll(&scroll_id).await {
                log::warn!("Failed to clear scroll cursor: {}", e);
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "_scroll_id", default)]
    scroll_id: Option<String>,
    hits: HitList,
}

#[derive(Debug, Deserialize)]
struct HitList {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source", default)]
    source: RawRelease,
}

impl From<SearchResponse> for ScrollPage {
    fn from(response: SearchResponse) -> Self {
        Self {
            scroll_id: response.scroll_id,
            records: response.hits.hits.into_iter().map(|h| h.source).collect(),
        }
    }
}

/// HTTP backend for an Elasticsearch-style release index.
#[derive(Debug, Clone)]
pub struct HttpSearchBackend {
    client: Client,
    base_url: Url,
    scroll_ttl: String,
}

impl HttpSearchBackend {
    /// Build a backend from the index configuration.
    pub fn new(config: &IndexConfig) -> Result<Self> {
        let client = create_async_client(config)?;
        Ok(Self::with_client(
            client,
            config.base_url()?,
            config.scroll_ttl.clone(),
        ))
    }

    pub fn with_client(client: Client, base_url: Url, scroll_ttl: impl Into<String>) -> Self {
        Self {
            client,
            base_url,
            scroll_ttl: scroll_ttl.into(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Send a JSON body and decode a JSON reply, mapping non-2xx to a remote error.
    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        method: Method,
        url: Url,
        body: &Value,
    ) -> Result<T> {
        log::debug!("{} {} {}", operation, method, url);
        let response = self.client.request(method, url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::remote(operation, format!("{status}: {text}")));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn count(&self, query: &Query) -> Result<u64> {
        let url = self.endpoint("release/_count")?;
        let body = json!({ "query": query.to_json() });
        let response: CountResponse = self.send_json("count", Method::POST, url, &body).await?;
        Ok(response.count)
    }

    async fn open_scroll(
        &self,
        query: &Query,
        page_size: usize,
        fields: &[&str],
    ) -> Result<ScrollPage> {
        let mut url = self.endpoint("release/_search")?;
        url.query_pairs_mut()
            .append_pair("scroll", &self.scroll_ttl)
            .append_pair("size", &page_size.to_string());

        let body = json!({
            "query": query.to_json(),
            "_source": fields,
        });
        let response: SearchResponse = self.send_json("scroll", Method::POST, url, &body).await?;
        Ok(response.into())
    }

    async fn next_scroll(&self, scroll_id: &str) -> Result<ScrollPage> {
        let url = self.endpoint("_search/scroll")?;
        let body = json!({
            "scroll": self.scroll_ttl,
            "scroll_id": scroll_id,
        });
        let response: SearchResponse = self.send_json("scroll", Method::POST, url, &body).await?;
        Ok(response.into())
    }

    async fn clear_scroll(&self, scroll_id: &str) -> Result<()> {
        let url = self.endpoint("_search/scroll")?;
        let body = json!({ "scroll_id": [scroll_id] });
        let _: Value = self
            .send_json("clear scroll", Method::DELETE, url, &body)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RELEASE_FIELDS;
    use crate::services::fake::{FakeBackend, release};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer) -> HttpSearchBackend {
        let mut config = IndexConfig::default();
        config.base_url = format!("{}/v1", server.uri());
        HttpSearchBackend::new(&config).unwrap()
    }

    #[test]
    fn test_match_all_query() {
        assert_eq!(Query::match_all().to_json(), json!({ "match_all": {} }));
        assert_eq!(Query::from_date(None), Query::match_all());
    }

    #[test]
    fn test_date_range_query() {
        let query = Query::from_date(Some("2014-05-13T16:53:20"));
        assert_eq!(query.lower_bound(), Some("2014-05-13T16:53:20"));
        assert_eq!(
            query.to_json()["bool"]["filter"]["range"]["date"]["gte"],
            json!("2014-05-13T16:53:20")
        );
        assert_eq!(query.to_json()["bool"]["must"], json!({ "match_all": {} }));
    }

    #[tokio::test]
    async fn test_count_posts_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/release/_count"))
            .and(body_json(json!({ "query": { "match_all": {} } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 42 })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        assert_eq!(backend.count(&Query::match_all()).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_scroll_round() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/release/_search"))
            .and(query_param("scroll", "5m"))
            .and(query_param("size", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_scroll_id": "cursor-1",
                "hits": { "total": 1, "hits": [
                    { "_source": {
                        "author": "X",
                        "distribution": "Foo-Bar",
                        "archive": "Foo-Bar-1.1.tar.gz",
                        "date": "2014-06-01T00:00:00"
                    } }
                ] }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/_search/scroll"))
            .and(body_json(json!({ "scroll": "5m", "scroll_id": "cursor-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_scroll_id": "cursor-1",
                "hits": { "total": 1, "hits": [] }
            })))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let first = backend
            .open_scroll(&Query::match_all(), 2, &RELEASE_FIELDS)
            .await
            .unwrap();
        assert_eq!(first.scroll_id.as_deref(), Some("cursor-1"));
        assert_eq!(first.records.len(), 1);
        assert_eq!(first.records[0].archive.as_deref(), Some("Foo-Bar-1.1.tar.gz"));

        let second = backend.next_scroll("cursor-1").await.unwrap();
        assert!(second.records.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/release/_count"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let err = backend.count(&Query::match_all()).await.unwrap_err();
        match err {
            AppError::Remote { operation, message } => {
                assert_eq!(operation, "count");
                assert!(message.contains("503"));
                assert!(message.contains("overloaded"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_scroll_walks_pages_then_clears() {
        let backend = FakeBackend::new(vec![
            release("A", "One", "One-1.tar.gz", "2014-01-01T00:00:00"),
            release("A", "One", "One-2.tar.gz", "2014-01-02T00:00:00"),
            release("B", "Two", "Two-1.tar.gz", "2014-01-03T00:00:00"),
        ]);

        let mut scroll = Scroll::new(
            &backend,
            Query::match_all(),
            2,
            &RELEASE_FIELDS,
            Duration::ZERO,
        );
        assert_eq!(scroll.next_page().await.unwrap().unwrap().len(), 2);
        assert_eq!(scroll.next_page().await.unwrap().unwrap().len(), 1);
        assert!(scroll.next_page().await.unwrap().is_none());
        assert!(scroll.next_page().await.unwrap().is_none());
        scroll.finish().await;

        assert_eq!(backend.pages_served(), 3);
        assert_eq!(backend.clears(), 1);
    }
}
