use log::{debug, warn};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use super::BitbucketClient;
use crate::error::{Result, TrackerError};

/// Retry schedule for rate-limited (HTTP 429) responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per request, including the first one
    pub max_attempts: u32,
    /// Wait before the first retry; doubled for every further retry
    pub backoff_factor: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_factor: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Wait after the rate-limited attempt number `attempt` (0-based):
    /// `backoff_factor * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_factor
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Classification of a single GET attempt.
pub(super) enum FetchOutcome {
    Success(Response),
    RateLimited,
    Fatal(TrackerError),
}

impl BitbucketClient {
    async fn attempt(&self, url: &Url) -> FetchOutcome {
        let request = self.auth_request(self.client.get(url.clone()));

        let response = match request.send().await {
            Ok(resp) => resp,
            Err(e) => return FetchOutcome::Fatal(e.into()),
        };

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return FetchOutcome::RateLimited;
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return FetchOutcome::Fatal(TrackerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        FetchOutcome::Success(response)
    }

    /// Authenticated GET, retrying with exponential backoff while rate limited.
    ///
    /// # Errors
    ///
    /// - `Api` on any non-2xx status other than 429 (never retried)
    /// - `RetriesExhausted` when every attempt was rate limited
    /// - `Network` on connection-level failures
    pub(super) async fn fetch(&self, url: &Url) -> Result<Response> {
        let max_attempts = self.retry.max_attempts;

        for attempt in 0..max_attempts {
            debug!("GET {url} (attempt {}/{max_attempts})", attempt + 1);

            match self.attempt(url).await {
                FetchOutcome::Success(response) => return Ok(response),
                FetchOutcome::Fatal(e) => return Err(e),
                FetchOutcome::RateLimited => {
                    if attempt + 1 == max_attempts {
                        break;
                    }

                    let wait = self.retry.delay_for(attempt);
                    warn!(
                        "Rate limit exceeded. Retrying in {} seconds ({}/{})...",
                        wait.as_secs_f64(),
                        attempt + 1,
                        max_attempts - 1
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }

        Err(TrackerError::RetriesExhausted {
            attempts: max_attempts,
        })
    }

    pub(super) async fn get_json<T>(&self, url: &Url) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.fetch(url).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_client;
    use super::*;

    const PATH: &str = "/rest/api/1.0/projects/CORE/repos/api";

    #[test]
    fn test_default_backoff_schedule() {
        let policy = RetryPolicy::default();
        let delays: Vec<_> = (0..4).map(|attempt| policy.delay_for(attempt)).collect();

        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
            ]
        );
    }

    #[test]
    fn test_backoff_scales_with_factor() {
        let policy = RetryPolicy {
            max_attempts: 5,
            backoff_factor: Duration::from_millis(250),
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(250));
        assert_eq!(policy.delay_for(3), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_recovers_after_rate_limiting() {
        let mut server = mockito::Server::new_async().await;
        let limited = server
            .mock("GET", PATH)
            .with_status(429)
            .expect(3)
            .create_async()
            .await;
        let ok = server
            .mock("GET", PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"archived":true}"#)
            .expect(1)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let url = client.endpoint(&["projects", "CORE", "repos", "api"]);
        let body: serde_json::Value = client.get_json(&url).await.unwrap();

        assert_eq!(body["archived"], true);
        limited.assert_async().await;
        ok.assert_async().await;
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let mut server = mockito::Server::new_async().await;
        let limited = server
            .mock("GET", PATH)
            .with_status(429)
            .expect(5)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let url = client.endpoint(&["projects", "CORE", "repos", "api"]);
        let err = client.fetch(&url).await.unwrap_err();

        assert!(matches!(err, TrackerError::RetriesExhausted { attempts: 5 }));
        limited.assert_async().await;
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let missing = server
            .mock("GET", PATH)
            .with_status(404)
            .with_body("Repository CORE/api does not exist")
            .expect(1)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let url = client.endpoint(&["projects", "CORE", "repos", "api"]);
        let err = client.fetch(&url).await.unwrap_err();

        match err {
            TrackerError::Api { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("does not exist"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        missing.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_errors_are_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let failing = server
            .mock("GET", PATH)
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let url = client.endpoint(&["projects", "CORE", "repos", "api"]);
        let err = client.fetch(&url).await.unwrap_err();

        assert!(matches!(err, TrackerError::Api { status: 503, .. }));
        failing.assert_async().await;
    }

    #[tokio::test]
    async fn test_undecodable_body_is_a_network_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", PATH)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = test_client(&server.url());
        let url = client.endpoint(&["projects", "CORE", "repos", "api"]);
        let err = client
            .get_json::<serde_json::Value>(&url)
            .await
            .unwrap_err();

        assert!(matches!(err, TrackerError::Network(_)));
    }

    #[tokio::test]
    async fn test_sends_basic_auth() {
        let mut server = mockito::Server::new_async().await;
        // base64("user:pass")
        let authed = server
            .mock("GET", PATH)
            .match_header("authorization", "Basic dXNlcjpwYXNz")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = test_client(&server.url());
        let url = client.endpoint(&["projects", "CORE", "repos", "api"]);
        client.fetch(&url).await.unwrap();

        authed.assert_async().await;
    }
}
