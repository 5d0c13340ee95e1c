//! HTTP client for a PostgREST-style row store.
//!
//! Plain CRUD goes through `/rest/v1/{table}`; random sampling and vector
//! search go through two RPC functions the store exposes under
//! `/rest/v1/rpc/`.

use std::time::Duration;

use async_trait::async_trait;
use brandkit_core::truncated_body;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::backend::Backend;
use crate::error::StoreError;
use crate::filter::Filter;

const MERGE_DUPLICATES: &str = "resolution=merge-duplicates";

#[derive(Serialize)]
struct RandomRowsRequest<'a> {
    table_name: &'a str,
    row_count: usize,
    filters: Value,
}

#[derive(Serialize)]
struct MatchRowsRequest<'a> {
    table_name: &'a str,
    query_embedding: &'a [f32],
    match_count: usize,
}

/// Row store reachable over HTTP, authenticated with a service key.
pub struct RowStoreBackend {
    client: Client,
    base_url: String,
    service_key: String,
}

impl RowStoreBackend {
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(base_url: &str, service_key: &str) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{function}", self.base_url)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn send(request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Upstream {
                status: status.as_u16(),
                body: truncated_body(&body),
            });
        }
        Ok(response)
    }

    async fn rows(request: RequestBuilder) -> Result<Vec<Value>, StoreError> {
        Ok(Self::send(request).await?.json::<Vec<Value>>().await?)
    }
}

#[async_trait]
impl Backend for RowStoreBackend {
    async fn fetch(&self, table: &str, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        let mut query = vec![("select".to_string(), "*".to_string())];
        query.extend(filter.to_query());
        let request = self.authed(self.client.get(self.table_url(table)).query(&query));
        Self::rows(request).await
    }

    async fn fetch_random(
        &self,
        table: &str,
        count: usize,
        filter: &Filter,
    ) -> Result<Vec<Value>, StoreError> {
        let body = RandomRowsRequest {
            table_name: table,
            row_count: count,
            filters: filter.to_json(),
        };
        let request = self.authed(self.client.post(self.rpc_url("random_rows")).json(&body));
        Self::rows(request).await
    }

    async fn upsert(&self, table: &str, rows: Vec<(String, Value)>) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let body: Vec<Value> = rows.into_iter().map(|(_, row)| row).collect();
        let request = self.authed(
            self.client
                .post(self.table_url(table))
                .header("Prefer", MERGE_DUPLICATES)
                .json(&body),
        );
        Self::send(request).await?;
        Ok(())
    }

    async fn patch(
        &self,
        table: &str,
        filter: &Filter,
        patch: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        let request = self.authed(
            self.client
                .patch(self.table_url(table))
                .query(&filter.to_query())
                .json(patch),
        );
        Self::send(request).await?;
        Ok(())
    }

    async fn nearest(
        &self,
        table: &str,
        _field: &str,
        query: &[f32],
        count: usize,
    ) -> Result<Vec<Value>, StoreError> {
        let body = MatchRowsRequest {
            table_name: table,
            query_embedding: query,
            match_count: count,
        };
        let request = self.authed(self.client.post(self.rpc_url("match_rows")).json(&body));
        Self::rows(request).await
    }
}
