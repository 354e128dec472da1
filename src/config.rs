use anyhow::{Context, Result};
use std::env;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,

    // Catalog ingestion
    pub catalog_dir: String,

    // Embedding service
    pub embedding_service_url: Url,
    pub embedding_service_token: String,
    pub embedding_timeout_seconds: u64,

    // AI advisor
    pub advisor_api_url: Url,
    pub advisor_api_key: String,
    pub advisor_model: String,
    pub advisor_timeout_seconds: u64,
    pub advisor_retry_backoff_seconds: u64,

    // Vendor webhook
    pub vendor_webhook_url: Option<Url>,
    pub vendor_webhook_timeout_seconds: u64,

    // Retrieval defaults
    pub vendors_per_category: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));

        // Catalog ingestion
        let catalog_dir = env::var("CATALOG_DIR").unwrap_or_else(|_| "json".to_string());

        // Embedding service
        let embedding_service_url = env::var("EMBEDDING_SERVICE_URL")
            .unwrap_or_else(|_| "http://embedding-service:8000".to_string())
            .parse()
            .context("EMBEDDING_SERVICE_URL must be a valid URL")?;
        let embedding_service_token =
            env::var("EMBEDDING_SERVICE_TOKEN").context("EMBEDDING_SERVICE_TOKEN must be set")?;
        let embedding_timeout_seconds = env::var("EMBEDDING_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        // AI advisor
        let advisor_api_url = env::var("ADVISOR_API_URL")
            .unwrap_or_else(|_| "https://api.groq.com/openai".to_string())
            .parse()
            .context("ADVISOR_API_URL must be a valid URL")?;
        let advisor_api_key = env::var("ADVISOR_API_KEY").context("ADVISOR_API_KEY must be set")?;
        let advisor_model =
            env::var("ADVISOR_MODEL").unwrap_or_else(|_| "llama-3.1-8b-instant".to_string());
        let advisor_timeout_seconds = env::var("ADVISOR_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(120); // 2 minutes default for LLM calls
        let advisor_retry_backoff_seconds = env::var("ADVISOR_RETRY_BACKOFF_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        // Vendor webhook (optional; the retrieval index is the primary source)
        let vendor_webhook_url = match env::var("VENDOR_WEBHOOK_URL") {
            Ok(raw) if !raw.trim().is_empty() => {
                Some(raw.parse().context("VENDOR_WEBHOOK_URL must be a valid URL")?)
            }
            _ => None,
        };
        let vendor_webhook_timeout_seconds = env::var("VENDOR_WEBHOOK_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        // Retrieval defaults
        let vendors_per_category = env::var("VENDORS_PER_CATEGORY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Settings {
            env,
            catalog_dir,
            embedding_service_url,
            embedding_service_token,
            embedding_timeout_seconds,
            advisor_api_url,
            advisor_api_key,
            advisor_model,
            advisor_timeout_seconds,
            advisor_retry_backoff_seconds,
            vendor_webhook_url,
            vendor_webhook_timeout_seconds,
            vendors_per_category,
        })
    }
}
