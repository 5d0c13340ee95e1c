use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::filter::Filter;

/// Row-level storage the typed [`crate::Store`] sits on.
///
/// Rows are JSON objects; the store handles typing and validation.
#[async_trait]
pub trait Backend: Send + Sync {
    /// All rows of `table` matching `filter`, in storage order.
    async fn fetch(&self, table: &str, filter: &Filter) -> Result<Vec<Value>, StoreError>;

    /// Up to `count` rows matching `filter`, sampled uniformly.
    async fn fetch_random(
        &self,
        table: &str,
        count: usize,
        filter: &Filter,
    ) -> Result<Vec<Value>, StoreError>;

    /// Insert or replace rows, each paired with its identity key.
    async fn upsert(&self, table: &str, rows: Vec<(String, Value)>) -> Result<(), StoreError>;

    /// Merge `patch` into every row matching `filter`.
    async fn patch(
        &self,
        table: &str,
        filter: &Filter,
        patch: &Map<String, Value>,
    ) -> Result<(), StoreError>;

    /// The `count` rows whose `field` vector is most similar to `query`,
    /// best first.
    async fn nearest(
        &self,
        table: &str,
        field: &str,
        query: &[f32],
        count: usize,
    ) -> Result<Vec<Value>, StoreError>;
}
