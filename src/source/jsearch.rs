//! HTTP client for the JSearch job search API.

use crate::error::FetchError;
use crate::models::{JobRecord, SearchQuery};
use crate::source::JobSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Header carrying the API access key.
const KEY_HEADER: &str = "X-RapidAPI-Key";
/// Header carrying the API host identifier.
const HOST_HEADER: &str = "X-RapidAPI-Host";

/// Configuration for the search client.
#[derive(Debug, Clone)]
pub struct SearchClientConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_host: String,
    pub timeout_seconds: u64,
    /// JSON key holding the list of records.
    pub results_key: String,
}

impl Default for SearchClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://jsearch.p.rapidapi.com/search".to_string(),
            api_key: String::new(),
            api_host: "jsearch.p.rapidapi.com".to_string(),
            timeout_seconds: 30,
            results_key: "data".to_string(),
        }
    }
}

/// Client for the paginated search endpoint.
pub struct JSearchClient {
    config: SearchClientConfig,
    http_client: reqwest::Client,
}

impl JSearchClient {
    /// Create a new client.
    pub fn new(config: SearchClientConfig) -> Result<Self> {
        info!("Initializing search client for {}", config.endpoint);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Build the GET request for a query page.
    fn build_request(&self, query: &SearchQuery) -> reqwest::Result<reqwest::Request> {
        self.http_client
            .get(&self.config.endpoint)
            .query(&[
                ("query", query.text()),
                ("page", query.page.to_string()),
            ])
            .header(KEY_HEADER, &self.config.api_key)
            .header(HOST_HEADER, &self.config.api_host)
            .build()
    }
}

#[async_trait]
impl JobSource for JSearchClient {
    async fn fetch_page(&self, query: &SearchQuery) -> Result<Vec<JobRecord>, FetchError> {
        let request = self.build_request(query)?;
        debug!("GET {}", request.url());

        let response = self.http_client.execute(request).await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    seconds: self.config.timeout_seconds,
                }
            } else {
                FetchError::Http(e)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let body = response.text().await?;
        let records = parse_records(&body, &self.config.results_key)?;
        debug!("{} returned {} records", query, records.len());

        Ok(records)
    }
}

/// Parse a search response body into job records.
///
/// A missing results key is an empty page; a results value that is not a
/// list is a parse error.
pub fn parse_records(body: &str, results_key: &str) -> Result<Vec<JobRecord>, FetchError> {
    let json: Value = serde_json::from_str(body)?;

    match json.get(results_key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.iter().map(JobRecord::from_value).collect()),
        Some(other) => Err(FetchError::Parse(format!(
            "expected a list under '{}', found {}",
            results_key,
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Region, RegionFilter, Role};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn test_client() -> JSearchClient {
        JSearchClient::new(SearchClientConfig {
            api_key: "secret".to_string(),
            ..SearchClientConfig::default()
        })
        .unwrap()
    }

    fn local_client(endpoint: String, timeout_seconds: u64) -> JSearchClient {
        JSearchClient::new(SearchClientConfig {
            endpoint,
            api_key: "secret".to_string(),
            timeout_seconds,
            ..SearchClientConfig::default()
        })
        .unwrap()
    }

    fn test_query() -> SearchQuery {
        SearchQuery {
            role: Role::SoftwareEngineer,
            region: RegionFilter::All,
            page: 1,
        }
    }

    fn http_response(status_line: &str, content_type: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            content_type,
            body.len(),
            body
        )
    }

    /// Serve one connection on a local port. With no response the
    /// connection is held open without answering. The handle yields the
    /// raw request head.
    async fn serve_once(response: Option<String>) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/search", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).into_owned();

            match response {
                Some(response) => {
                    socket.write_all(response.as_bytes()).await.unwrap();
                    let _ = socket.shutdown().await;
                }
                None => tokio::time::sleep(Duration::from_secs(30)).await,
            }
            request
        });

        (endpoint, handle)
    }

    #[tokio::test]
    async fn test_fetch_page_success() {
        let body = r#"{"data": [{"job_title": "Dev", "job_description": "Rust", "job_location": "Leeds"}]}"#;
        let (endpoint, server) =
            serve_once(Some(http_response("200 OK", "application/json", body))).await;

        let records = local_client(endpoint, 5)
            .fetch_page(&test_query())
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].location, "Leeds");

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /search?"));
        assert!(request.contains("page=1"));
        assert!(request.contains("x-rapidapi-key: secret"));
    }

    #[tokio::test]
    async fn test_fetch_page_error_status() {
        let (endpoint, _server) = serve_once(Some(http_response(
            "503 Service Unavailable",
            "text/plain",
            "rate limit!",
        )))
        .await;

        let err = local_client(endpoint, 5)
            .fetch_page(&test_query())
            .await
            .unwrap_err();
        match &err {
            FetchError::Status { status, body } => {
                assert_eq!(*status, 503);
                assert_eq!(body, "rate limit!");
            }
            other => panic!("expected status error, got {:?}", other),
        }
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn test_fetch_page_non_json_body() {
        let (endpoint, _server) = serve_once(Some(http_response(
            "200 OK",
            "text/html",
            "<html></html>",
        )))
        .await;

        let err = local_client(endpoint, 5)
            .fetch_page(&test_query())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn test_fetch_page_timeout() {
        let (endpoint, server) = serve_once(None).await;

        let err = local_client(endpoint, 1)
            .fetch_page(&test_query())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Timeout { seconds: 1 }));
        assert!(err.is_timeout());

        server.abort();
    }

    #[test]
    fn test_build_request() {
        let client = test_client();
        let query = SearchQuery {
            role: Role::SoftwareEngineer,
            region: RegionFilter::Only(Region::Scotland),
            page: 3,
        };

        let request = client.build_request(&query).unwrap();
        let url = request.url();

        assert_eq!(url.host_str(), Some("jsearch.p.rapidapi.com"));
        assert_eq!(url.path(), "/search");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("query".to_string(), "software engineer in Scotland".to_string())));
        assert!(pairs.contains(&("page".to_string(), "3".to_string())));

        assert_eq!(request.headers()[KEY_HEADER], "secret");
        assert_eq!(request.headers()[HOST_HEADER], "jsearch.p.rapidapi.com");
    }

    #[test]
    fn test_parse_records() {
        let body = r#"{"status": "OK", "data": [
            {"job_title": "Backend Engineer", "job_description": "Rust and Go", "job_city": "London"},
            {"title": "Analyst", "description": "SQL"}
        ]}"#;

        let records = parse_records(body, "data").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Backend Engineer");
        assert_eq!(records[0].location, "London");
        assert_eq!(records[1].description, "SQL");
    }

    #[test]
    fn test_parse_records_missing_key() {
        let records = parse_records(r#"{"status": "OK"}"#, "data").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_parse_records_wrong_shape() {
        let err = parse_records(r#"{"data": {"oops": true}}"#, "data").unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
        assert!(err.to_string().contains("an object"));
    }

    #[test]
    fn test_parse_records_not_json() {
        let err = parse_records("<html>rate limited</html>", "data").unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }
}
