use async_trait::async_trait;

use crate::flight::OfferSnapshot;
use crate::search::OfferSearch;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider authentication failed: {0}")]
    Authentication(String),
    #[error("invalid search parameters: {0}")]
    InvalidRequest(String),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("provider timed out")]
    Timeout,
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// Third-party flight search. May return zero offers or fail; callers
/// are expected to fall back to local inventory.
#[async_trait]
pub trait ExternalOfferProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(&self, query: &OfferSearch) -> Result<Vec<OfferSnapshot>, ProviderError>;
}
