//! Notion database-query client
//!
//! Drives the paginated query endpoint and yields raw record batches. The
//! fetch loop is fail-fast: a request timeout is retried in place a bounded
//! number of times, any other transport error aborts the run for this
//! source with no partial results.

use super::types::{QueryResponse, RawPage};
use reqwest::{header, Client, StatusCode};
use serde_json::json;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};
use wbs_common::{Error, Result};

/// Notion API base URL
const NOTION_API_URL: &str = "https://api.notion.com/v1";

/// Pinned Notion API version header value
const NOTION_VERSION: &str = "2022-06-28";

/// Records requested per query page (the API maximum)
const PAGE_SIZE: u32 = 100;

/// Default timeout for query requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Minimum spacing between requests (Notion allows ~3 req/s)
const RATE_LIMIT_INTERVAL: Duration = Duration::from_millis(340);

/// Timed-out requests retried in place before giving up
const TIMEOUT_RETRIES: u32 = 2;

/// Paginated database-query client
///
/// Holds the integration credential in its default headers and spaces
/// requests to stay under the source's rate limit.
pub struct NotionClient {
    http_client: Client,
    base_url: String,
    /// Rate limiter (last request time)
    rate_limiter: Mutex<Option<Instant>>,
}

impl NotionClient {
    /// Create a client against the production API
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_base_url(api_key, NOTION_API_URL)
    }

    /// Create a client against an alternate base URL (test servers)
    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| Error::Config("API key contains non-header characters".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::HeaderName::from_static("notion-version"),
            header::HeaderValue::from_static(NOTION_VERSION),
        );

        let http_client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter: Mutex::new(None),
        })
    }

    /// Enforce minimum spacing between requests
    async fn enforce_rate_limit(&self) {
        let mut last_request = self.rate_limiter.lock().await;

        if let Some(last_time) = *last_request {
            let elapsed = last_time.elapsed();
            if elapsed < RATE_LIMIT_INTERVAL {
                let sleep_duration = RATE_LIMIT_INTERVAL - elapsed;
                debug!(
                    sleep_ms = sleep_duration.as_millis(),
                    "Rate limiting: sleeping before Notion request"
                );
                sleep(sleep_duration).await;
            }
        }

        *last_request = Some(Instant::now());
    }

    /// Query one page of database records
    ///
    /// # Arguments
    /// * `database_id` - Source database id
    /// * `cursor` - Continuation cursor from the previous page, if any
    ///
    /// # Errors
    /// 401/403/404 map to `Error::Access` with remediation text; other
    /// failed responses and exhausted timeouts map to `Error::Transport`.
    pub async fn query(
        &self,
        database_id: &str,
        cursor: Option<&str>,
    ) -> Result<QueryResponse> {
        let url = format!("{}/databases/{}/query", self.base_url, database_id);
        let mut payload = json!({ "page_size": PAGE_SIZE });
        if let Some(cursor) = cursor {
            payload["start_cursor"] = json!(cursor);
        }

        let mut attempt = 0;
        let response = loop {
            self.enforce_rate_limit().await;
            debug!(database_id, cursor = ?cursor, attempt, "Querying database page");

            match self.http_client.post(&url).json(&payload).send().await {
                Ok(response) => break response,
                Err(e) if e.is_timeout() && attempt < TIMEOUT_RETRIES => {
                    attempt += 1;
                    warn!(attempt, "Notion query timed out, retrying");
                }
                Err(e) => return Err(Error::Transport(e)),
            }
        };

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(Error::Access {
                    database_id: database_id.to_string(),
                    message: "the integration is not authorized. Verify the API key \
                              and share the database with the integration \
                              (Database -> Connections)"
                        .to_string(),
                });
            }
            StatusCode::NOT_FOUND => {
                return Err(Error::Access {
                    database_id: database_id.to_string(),
                    message: "database not found. Check the configured database id \
                              and that the integration can see it"
                        .to_string(),
                });
            }
            _ => {}
        }
        let response = response.error_for_status()?;

        Ok(response.json::<QueryResponse>().await?)
    }

    /// Fetch every record of a database, following continuation cursors
    /// until the source reports no more pages
    pub async fn fetch_all(&self, database_id: &str) -> Result<Vec<RawPage>> {
        let mut pages: Vec<RawPage> = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let batch = self.query(database_id, cursor.as_deref()).await?;
            pages.extend(batch.results);
            info!(fetched = pages.len(), "Retrieved records from source");

            if !batch.has_more {
                break;
            }
            match batch.next_cursor {
                Some(next) => cursor = Some(next),
                // has_more without a cursor ends the loop
                None => break,
            }
        }

        Ok(pages)
    }
}
