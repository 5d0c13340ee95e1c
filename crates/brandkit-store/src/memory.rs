//! In-process backend used by tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::backend::Backend;
use crate::error::StoreError;
use crate::filter::Filter;
use crate::similarity::{as_vector, cosine_similarity};

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Value>,
    index: HashMap<String, usize>,
}

/// Map-of-maps behind a single readers-writer lock.
///
/// Rows keep insertion order; re-storing a key replaces the row in place.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn fetch(&self, table: &str, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .map(|t| {
                t.rows
                    .iter()
                    .filter(|row| filter.matches(row))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_random(
        &self,
        table: &str,
        count: usize,
        filter: &Filter,
    ) -> Result<Vec<Value>, StoreError> {
        let mut rows = self.fetch(table, filter).await?;
        rows.shuffle(&mut rand::rng());
        rows.truncate(count);
        Ok(rows)
    }

    async fn upsert(&self, table: &str, rows: Vec<(String, Value)>) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let table = tables.entry(table.to_string()).or_default();
        for (key, row) in rows {
            if let Some(&pos) = table.index.get(&key) {
                table.rows[pos] = row;
            } else {
                table.index.insert(key, table.rows.len());
                table.rows.push(row);
            }
        }
        Ok(())
    }

    async fn patch(
        &self,
        table: &str,
        filter: &Filter,
        patch: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let Some(table) = tables.get_mut(table) else {
            return Ok(());
        };
        for row in table.rows.iter_mut().filter(|row| filter.matches(row)) {
            if let Value::Object(fields) = row {
                for (name, value) in patch {
                    fields.insert(name.clone(), value.clone());
                }
            }
        }
        Ok(())
    }

    async fn nearest(
        &self,
        table: &str,
        field: &str,
        query: &[f32],
        count: usize,
    ) -> Result<Vec<Value>, StoreError> {
        let tables = self.tables.read().await;
        let Some(table) = tables.get(table) else {
            return Ok(Vec::new());
        };
        let mut scored: Vec<(f32, &Value)> = table
            .rows
            .iter()
            .filter_map(|row| {
                let vector = as_vector(row.get(field)?)?;
                Some((cosine_similarity(query, &vector), row))
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        Ok(scored
            .into_iter()
            .take(count)
            .map(|(_, row)| row.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn upsert_replaces_in_place_and_keeps_order() {
        let backend = MemoryBackend::new();
        backend
            .upsert(
                "t",
                vec![
                    ("a".into(), json!({"id": "a", "n": 1})),
                    ("b".into(), json!({"id": "b", "n": 2})),
                ],
            )
            .await
            .unwrap();
        backend
            .upsert("t", vec![("a".into(), json!({"id": "a", "n": 3}))])
            .await
            .unwrap();
        let rows = backend.fetch("t", &Filter::new()).await.unwrap();
        assert_eq!(rows, vec![json!({"id": "a", "n": 3}), json!({"id": "b", "n": 2})]);
    }

    #[tokio::test]
    async fn fetch_random_caps_count_and_honours_filter() {
        let backend = MemoryBackend::new();
        let rows = (0..10)
            .map(|i| {
                let owner = if i % 2 == 0 { "even" } else { "odd" };
                (format!("k{i}"), json!({"id": owner, "i": i}))
            })
            .collect();
        backend.upsert("t", rows).await.unwrap();
        let sample = backend
            .fetch_random("t", 3, &Filter::eq("id", "even"))
            .await
            .unwrap();
        assert_eq!(sample.len(), 3);
        assert!(sample.iter().all(|r| r["id"] == "even"));
    }

    #[tokio::test]
    async fn missing_table_reads_empty() {
        let backend = MemoryBackend::new();
        assert!(backend.fetch("nope", &Filter::new()).await.unwrap().is_empty());
        assert!(backend
            .nearest("nope", "embedding", &[1.0], 3)
            .await
            .unwrap()
            .is_empty());
    }
}
