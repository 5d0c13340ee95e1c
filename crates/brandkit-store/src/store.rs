use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::backend::Backend;
use crate::entity::Entity;
use crate::error::StoreError;
use crate::filter::Filter;

/// Typed view of one entity's table.
pub struct Store<T: Entity> {
    backend: Arc<dyn Backend>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> std::fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("table", &T::TABLE).finish()
    }
}

impl<T: Entity> Store<T> {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            _entity: PhantomData,
        }
    }

    /// First row whose id field equals `id`.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when no row matches; backend errors otherwise.
    pub async fn get(&self, id: &str) -> Result<T, StoreError> {
        let rows = self
            .backend
            .fetch(T::TABLE, &Filter::eq(T::ID_FIELD, id))
            .await?;
        let row = rows.into_iter().next().ok_or_else(|| StoreError::NotFound {
            table: T::TABLE,
            id: id.to_string(),
        })?;
        decode(row)
    }

    /// Up to `count` rows sampled at random, optionally filtered.
    ///
    /// # Errors
    ///
    /// Backend or decode errors.
    pub async fn get_random(
        &self,
        count: usize,
        filter: Option<&Filter>,
    ) -> Result<Vec<T>, StoreError> {
        let all = Filter::new();
        let rows = self
            .backend
            .fetch_random(T::TABLE, count, filter.unwrap_or(&all))
            .await?;
        rows.into_iter().map(decode).collect()
    }

    /// # Errors
    ///
    /// Backend or decode errors.
    pub async fn get_all(&self, filter: &Filter) -> Result<Vec<T>, StoreError> {
        let rows = self.backend.fetch(T::TABLE, filter).await?;
        rows.into_iter().map(decode).collect()
    }

    /// # Errors
    ///
    /// [`StoreError::InvalidInput`] when the entity has no identity.
    pub async fn store(&self, entity: &T) -> Result<(), StoreError> {
        self.store_all(std::slice::from_ref(entity)).await
    }

    /// Persist every entity in one backend call. Nothing is written if any
    /// entity lacks an identity.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidInput`] when an entity has no identity.
    pub async fn store_all(&self, entities: &[T]) -> Result<(), StoreError> {
        let rows = entities
            .iter()
            .map(|entity| {
                let key = entity.key().ok_or_else(|| {
                    StoreError::InvalidInput(format!(
                        "{} row is missing its '{}' identity",
                        T::TABLE,
                        T::ID_FIELD
                    ))
                })?;
                Ok((key, encode(entity)?))
            })
            .collect::<Result<Vec<_>, StoreError>>()?;
        self.backend.upsert(T::TABLE, rows).await
    }

    /// Apply a partial update to the row identified by `id` and return the
    /// merged entity.
    ///
    /// Every patch field must already exist on the row with the same JSON
    /// type. `null` is accepted as long as the merged row still decodes, and
    /// a field that is currently `null` may take any type.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the row is absent,
    /// [`StoreError::InvalidInput`] for unknown fields, type mismatches, an
    /// attempt to change the id, or a merged row that no longer decodes.
    pub async fn update(&self, id: &str, patch: Map<String, Value>) -> Result<T, StoreError> {
        let by_id = Filter::eq(T::ID_FIELD, id);
        let current = self
            .backend
            .fetch(T::TABLE, &by_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound {
                table: T::TABLE,
                id: id.to_string(),
            })?;

        let Value::Object(mut merged) = current else {
            return Err(StoreError::Decode {
                table: T::TABLE,
                source: serde::de::Error::custom("stored row is not an object"),
            });
        };

        for (field, value) in &patch {
            if field == T::ID_FIELD {
                return Err(StoreError::InvalidInput(format!(
                    "'{field}' identifies the row and cannot be updated"
                )));
            }
            let existing = merged.get(field).ok_or_else(|| {
                StoreError::InvalidInput(format!("unknown field '{field}' for {}", T::TABLE))
            })?;
            if !same_json_type(existing, value) {
                return Err(StoreError::InvalidInput(format!(
                    "field '{field}' expects {}, got {}",
                    type_name(existing),
                    type_name(value)
                )));
            }
        }

        for (field, value) in &patch {
            merged.insert(field.clone(), value.clone());
        }
        let entity: T = serde_json::from_value(Value::Object(merged)).map_err(|e| {
            StoreError::InvalidInput(format!("update leaves {} row invalid: {e}", T::TABLE))
        })?;

        self.backend.patch(T::TABLE, &by_id, &patch).await?;
        tracing::debug!(table = T::TABLE, id, fields = patch.len(), "row updated");
        Ok(entity)
    }

    /// The `count` entities whose embedding is closest to `embedding` by
    /// cosine similarity, best first.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidInput`] if the entity type has no embedding.
    pub async fn get_closest(&self, embedding: &[f32], count: usize) -> Result<Vec<T>, StoreError> {
        let field = T::EMBEDDING_FIELD.ok_or_else(|| {
            StoreError::InvalidInput(format!("{} rows carry no embedding", T::TABLE))
        })?;
        let rows = self
            .backend
            .nearest(T::TABLE, field, embedding, count)
            .await?;
        rows.into_iter().map(decode).collect()
    }
}

fn decode<T: Entity>(row: Value) -> Result<T, StoreError> {
    serde_json::from_value(row).map_err(|source| StoreError::Decode {
        table: T::TABLE,
        source,
    })
}

fn encode<T: Entity>(entity: &T) -> Result<Value, StoreError> {
    serde_json::to_value(entity).map_err(|source| StoreError::Decode {
        table: T::TABLE,
        source,
    })
}

fn same_json_type(existing: &Value, incoming: &Value) -> bool {
    existing.is_null() || incoming.is_null() || type_name(existing) == type_name(incoming)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
