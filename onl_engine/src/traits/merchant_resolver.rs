use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerchantId(pub String);

impl Display for MerchantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MerchantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Resolves a human-facing identifier (slug or raw merchant id) to a canonical merchant
/// id. A failed lookup is terminal for the catalog page.
#[allow(async_fn_in_trait)]
pub trait MerchantResolver: Clone {
    async fn resolve(&self, slug_or_id: &str) -> Result<MerchantId, ResolveError>;
}

#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("No merchant found for identifier '{0}'")]
    NotFound(String),
    #[error("Merchant lookup failed. {0}")]
    Backend(String),
}
