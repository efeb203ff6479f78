//! Watermark logo retrieval.
//!
//! Logos live in an external object store keyed by user email, one PNG per
//! account at `<base>/<user_email>.png`. The trait seam keeps route handlers
//! testable with an in-memory store.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Logo retrieval failure.
#[derive(Debug, Error)]
pub enum LogoError {
    /// The store has no logo for this account
    #[error("no logo stored for {0}")]
    NotFound(String),

    /// The store could not be reached or returned a failure
    #[error("logo fetch failed: {0}")]
    Upstream(String),
}

/// Trait for logo storage backends
#[async_trait]
pub trait LogoStore: Send + Sync {
    /// Fetch the PNG logo bytes for an account.
    async fn fetch(&self, user_email: &str) -> Result<Vec<u8>, LogoError>;
}

/// Logo store backed by an HTTP object store (e.g. a public bucket).
pub struct HttpLogoStore {
    client: Client,
    base_url: String,
}

impl HttpLogoStore {
    /// Create a store fetching from the given base URL.
    ///
    /// # Panics
    /// Panics if the HTTP client cannot be created, which should only happen
    /// in extreme circumstances (e.g., TLS backend unavailable on the system).
    #[allow(clippy::expect_used)]
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn logo_url(&self, user_email: &str) -> String {
        format!("{}/{}.png", self.base_url.trim_end_matches('/'), user_email)
    }
}

#[async_trait]
impl LogoStore for HttpLogoStore {
    async fn fetch(&self, user_email: &str) -> Result<Vec<u8>, LogoError> {
        let url = self.logo_url(user_email);
        debug!("Fetching logo from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LogoError::Upstream(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(LogoError::NotFound(user_email.to_string()));
        }
        if !response.status().is_success() {
            return Err(LogoError::Upstream(format!("HTTP {}", response.status())));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| LogoError::Upstream(e.to_string()))
    }
}
