use std::sync::Arc;

use route66_commerce::catalog::{load_catalog, Product};
use route66_commerce::checkout::TransactionLog;
use route66_commerce::CatalogError;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::ServerConfig;

#[derive(Error, Debug)]
pub enum StateError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Shared handler state. The catalog is read-only; log appends are
/// serialised through the mutex.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Vec<Product>>,
    pub transaction_log: Arc<Mutex<TransactionLog>>,
    pub secure_cookies: bool,
    pub webhook_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn new(catalog: Vec<Product>, transaction_log: TransactionLog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            transaction_log: Arc::new(Mutex::new(transaction_log)),
            secure_cookies: false,
            webhook_secret: None,
        }
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    pub fn with_webhook_secret(mut self, secret: Option<String>) -> Self {
        self.webhook_secret = secret.filter(|s| !s.is_empty()).map(Arc::from);
        self
    }

    /// Validate and load the catalog named in the config.
    pub fn load(config: &ServerConfig) -> Result<Self, StateError> {
        let catalog = load_catalog(&config.catalog_path)?;
        let secure = config
            .public_base_url
            .as_deref()
            .is_some_and(|url| url.starts_with("https://"));

        Ok(Self::new(catalog, TransactionLog::new(&config.transaction_log))
            .with_secure_cookies(secure)
            .with_webhook_secret(config.webhook_secret.clone()))
    }
}
