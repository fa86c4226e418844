use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Context, Result};
use url::Url;
use crate::utils::identity::ProviderCredentials;

pub const DEFAULT_CATALOG_URL: &str = "https://fakestoreapi.com";
pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_STORAGE_PATH: &str = "course-catalog.json";
pub const DEFAULT_ENROLL_DELAY_MS: u64 = 1000;

// Settings read from the environment (and `.env`, loaded by main).
#[derive(Debug, Clone)]
pub struct Config {
    pub catalog_url: Url,
    pub identity_url: Url,
    pub storage_path: PathBuf,
    pub firebase_api_key: Option<String>,
    pub credentials: ProviderCredentials,
    pub enroll_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Unset and blank are the same thing.
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let catalog_url = var("CATALOG_URL").unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string());
        let catalog_url = Url::parse(&catalog_url)
            .with_context(|| format!("CATALOG_URL is not a valid URL: {catalog_url}"))?;

        let identity_url = var("IDENTITY_URL").unwrap_or_else(|| DEFAULT_IDENTITY_URL.to_string());
        let identity_url = Url::parse(&identity_url)
            .with_context(|| format!("IDENTITY_URL is not a valid URL: {identity_url}"))?;

        let enroll_delay = match var("ENROLL_DELAY_MS") {
            Some(ms) => ms
                .parse::<u64>()
                .with_context(|| format!("ENROLL_DELAY_MS must be a number of milliseconds, got {ms}"))?,
            None => DEFAULT_ENROLL_DELAY_MS,
        };

        Ok(Self {
            catalog_url,
            identity_url,
            storage_path: var("STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH)),
            firebase_api_key: var("FIREBASE_API_KEY"),
            credentials: ProviderCredentials {
                google_id_token: var("GOOGLE_ID_TOKEN"),
                github_access_token: var("GITHUB_ACCESS_TOKEN"),
            },
            enroll_delay: Duration::from_millis(enroll_delay),
        })
    }
}
