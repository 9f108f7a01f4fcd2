//! Search backends
//!
//! An executor runs a [`CompiledQuery`] and answers with the backend's raw,
//! nested response. Mapping that response to typed results is left to
//! [`ResultMapper`](crate::query::ResultMapper).

mod memory;

pub use memory::InMemoryExecutor;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::query::CompiledQuery;
use crate::Result;

/// Raw backend response
///
/// ```json
/// {
///   "results": [{ "id": "1", "type": "product", "source": { ... } }],
///   "total_hits": 42,
///   "aggregations": { "all": { "doc_count": 50, "all_products": { ... } } }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawResponse(Value);

impl RawResponse {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl From<Value> for RawResponse {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Backend able to run compiled queries
#[async_trait]
pub trait SearchExecutor: Send + Sync {
    /// Run `query`, returning the `size` hits starting at `from`
    ///
    /// Failures surface as [`FacetError::Execution`](crate::FacetError::Execution).
    async fn execute(&self, query: &CompiledQuery, from: usize, size: usize) -> Result<RawResponse>;
}
