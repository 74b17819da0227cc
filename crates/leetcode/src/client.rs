//! HTTP client for the LeetCode GraphQL endpoint.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use leetboard_core::counts::SolvedCounts;
use leetboard_core::fetch::{FetchError, SolvedCountSource};
use leetboard_core::metrics::{Metrics, CODE_ERROR, CODE_TIMEOUT};

use crate::payload::{parse_solved_counts, GraphQlRequest};

/// Public GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://leetcode.com/graphql";

/// Default HTTP request timeout for a single fetch.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches solved-problem counts from LeetCode.
///
/// Cheap to share: the inner [`reqwest::Client`] pools connections.
/// Every request is recorded into the shared [`Metrics`].
#[derive(Debug, Clone)]
pub struct LeetCodeClient {
    client: reqwest::Client,
    endpoint: String,
    request_timeout: Duration,
    metrics: Metrics,
}

impl LeetCodeClient {
    /// Build a client for `endpoint` with a per-request timeout.
    pub fn new(
        endpoint: impl Into<String>,
        request_timeout: Duration,
        metrics: Metrics,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self::with_client(client, endpoint, request_timeout, metrics))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        request_timeout: Duration,
        metrics: Metrics,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            request_timeout,
            metrics,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_request_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.request_timeout)
        } else {
            FetchError::Request(err.to_string())
        }
    }

    async fn request(&self, user_id: &str) -> Result<SolvedCounts, FetchError> {
        let started = Instant::now();

        let sent = self
            .client
            .post(&self.endpoint)
            .json(&GraphQlRequest::solved_counts(user_id))
            .send()
            .await;
        self.metrics.observe_api_latency(started.elapsed());

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                let code = if e.is_timeout() { CODE_TIMEOUT } else { CODE_ERROR };
                self.metrics.record_api_response(code);
                return Err(self.map_request_error(e));
            }
        };

        let status = response.status();
        self.metrics.record_api_response(status.as_str());
        tracing::debug!(
            user_id,
            status = status.as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "LeetCode GraphQL response"
        );

        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            if e.is_decode() {
                FetchError::Malformed(e.to_string())
            } else {
                self.map_request_error(e)
            }
        })?;

        parse_solved_counts(user_id, body)
    }
}

#[async_trait]
impl SolvedCountSource for LeetCodeClient {
    async fn fetch_solved_counts(&self, user_id: &str) -> Result<SolvedCounts, FetchError> {
        let result = self.request(user_id).await;
        match &result {
            Ok(_) => self.metrics.set_api_error(false),
            // The API answered; the user just does not exist.
            Err(FetchError::UserNotFound(_)) => {
                self.metrics.record_null_user(user_id);
                self.metrics.set_api_error(false);
            }
            Err(_) => self.metrics.set_api_error(true),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str, timeout: Duration) -> (LeetCodeClient, Metrics) {
        let metrics = Metrics::new().unwrap();
        let client = LeetCodeClient::new(endpoint, timeout, metrics.clone()).unwrap();
        (client, metrics)
    }

    /// Serve one canned HTTP response on a local port and return its URL.
    async fn serve_once(status: &str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/graphql", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\n\
             content-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 8192];
            let _ = socket.read(&mut request).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        url
    }

    #[test]
    fn new_keeps_endpoint() {
        let (client, _) = client(DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(client.endpoint(), DEFAULT_ENDPOINT);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_request_error() {
        // Port 9 (discard) on localhost is not expected to speak HTTP.
        let (client, metrics) = client("http://127.0.0.1:9/graphql", Duration::from_secs(2));
        let result = client.fetch_solved_counts("alice").await;
        assert!(matches!(
            result,
            Err(FetchError::Request(_)) | Err(FetchError::Timeout(_))
        ));

        assert!(metrics.api_error());
        assert_eq!(
            metrics.api_responses(CODE_ERROR) + metrics.api_responses(CODE_TIMEOUT),
            1
        );
        assert_eq!(metrics.null_users("alice"), 0);
        assert!(metrics.encode().unwrap().contains("leetboard_api_latency_seconds_count 1"));
    }

    #[tokio::test]
    async fn null_user_is_counted_without_api_error() {
        let url = serve_once(
            "200 OK",
            r#"{"data": {"userProfileUserQuestionProgressV2": null}}"#,
        )
        .await;
        let (client, metrics) = client(&url, Duration::from_secs(5));
        metrics.set_api_error(true);

        let result = client.fetch_solved_counts("ghost").await;
        assert_eq!(result, Err(FetchError::UserNotFound("ghost".to_string())));
        assert_eq!(metrics.api_responses("200"), 1);
        assert_eq!(metrics.null_users("ghost"), 1);
        assert!(!metrics.api_error());
    }

    #[tokio::test]
    async fn error_status_is_counted_by_code() {
        let url = serve_once("503 Service Unavailable", "{}").await;
        let (client, metrics) = client(&url, Duration::from_secs(5));

        let result = client.fetch_solved_counts("alice").await;
        assert_eq!(result, Err(FetchError::HttpStatus(503)));
        assert_eq!(metrics.api_responses("503"), 1);
        assert!(metrics.api_error());
    }
}
