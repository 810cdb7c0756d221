//! Search result handles cached per query string.

use serde::{Deserialize, Serialize};

/// Opaque identifier of one search hit, as issued by the metadata provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultHandle(pub String);

impl ResultHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResultHandle {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Search hits in provider rank order.
pub type SearchResults = Vec<ResultHandle>;
