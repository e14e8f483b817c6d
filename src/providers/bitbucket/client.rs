use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::auth::Credentials;
use crate::error::{Result, TrackerError};

mod fetcher;
mod repos;

pub use fetcher::RetryPolicy;

/// Tunables for a [`BitbucketClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
    /// Case-insensitive substring that marks a label as a migration label
    pub migration_label: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(30),
            migration_label: "gitlab".to_string(),
        }
    }
}

/// Read-only client for the Bitbucket Server REST API 1.0.
pub struct BitbucketClient {
    client: Client,
    api_url: Url,
    credentials: Credentials,
    retry: RetryPolicy,
    migration_label: String,
}

impl BitbucketClient {
    pub fn new(base_url: &str, credentials: Credentials, settings: ClientSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("archive-tally/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| TrackerError::Config(format!("Failed to create HTTP client: {e}")))?;

        // Keep any path prefix of the base URL (e.g. `https://host/bitbucket`).
        let base = format!("{}/", base_url.trim_end_matches('/'));
        let api_url = Url::parse(&base)
            .map_err(|e| TrackerError::Config(format!("Invalid base URL: {e}")))?
            .join("rest/api/1.0/")
            .map_err(|e| TrackerError::Config(format!("Invalid API base URL: {e}")))?;

        if api_url.cannot_be_a_base() {
            return Err(TrackerError::Config(format!(
                "Base URL cannot carry a path: {base_url}"
            )));
        }

        Ok(Self {
            client,
            api_url,
            credentials,
            retry: settings.retry,
            migration_label: settings.migration_label,
        })
    }

    /// Helper to build authenticated requests
    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.basic_auth(
            self.credentials.username(),
            Some(self.credentials.password()),
        )
    }

    /// Build an API URL from raw path segments; each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn migration_label(&self) -> &str {
        &self.migration_label
    }
}

#[cfg(test)]
pub(crate) fn test_client(base_url: &str) -> BitbucketClient {
    let settings = ClientSettings {
        retry: RetryPolicy {
            max_attempts: 5,
            backoff_factor: Duration::from_millis(1),
        },
        ..ClientSettings::default()
    };
    BitbucketClient::new(base_url, Credentials::new("user", "pass"), settings).unwrap()
}
