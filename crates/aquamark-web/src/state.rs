use anyhow::Result;
use std::sync::Arc;

use aquamark_core::{AppConfig, Watermarker};

use crate::logo_store::LogoStore;

/// Global application state
pub struct AppState {
    /// The watermark engine, shared across all requests
    watermarker: Watermarker,
    /// Logo storage backend
    logo_store: Arc<dyn LogoStore>,
    /// Static bearer token; `None` disables authentication
    api_token: Option<String>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        logo_store: Arc<dyn LogoStore>,
        api_token: Option<String>,
    ) -> Result<Self> {
        let watermarker = Watermarker::new(config)
            .map_err(|e| anyhow::anyhow!("Failed to create watermarker: {e}"))?;

        Ok(Self {
            watermarker,
            logo_store,
            api_token,
        })
    }

    pub const fn watermarker(&self) -> &Watermarker {
        &self.watermarker
    }

    pub fn logo_store(&self) -> &dyn LogoStore {
        self.logo_store.as_ref()
    }

    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }
}
