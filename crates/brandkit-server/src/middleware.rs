use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use brandkit_core::{ApiKeyEntry, CancelToken, ErrorKind};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::api::ApiError;

pub const OWNER_HEADER: &str = "x-owner-id";

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// The owner a request acts for, injected by [`resolve_owner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner(pub String);

impl<S: Send + Sync> FromRequestParts<S> for Owner {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Owner>()
            .cloned()
            .ok_or_else(|| ApiError::new(ErrorKind::Unauthorized, "no owner on request"))
    }
}

/// API key auth settings used by middleware.
#[derive(Clone)]
pub struct AuthState {
    keys: Arc<Vec<ApiKeyEntry>>,
}

impl AuthState {
    /// Builds auth from the configured `key=owner` pairs.
    ///
    /// In development, no keys means the owner is taken from the
    /// `x-owner-id` header. Elsewhere, no keys fails startup.
    pub fn new(keys: Vec<ApiKeyEntry>, is_development: bool) -> anyhow::Result<Self> {
        if keys.is_empty() {
            if !is_development {
                anyhow::bail!(
                    "BRANDKIT_API_KEYS is required outside development; provide key=owner pairs"
                );
            }
            tracing::warn!(
                "BRANDKIT_API_KEYS not set; owner is read from the {OWNER_HEADER} header"
            );
        }
        Ok(Self {
            keys: Arc::new(keys),
        })
    }

    fn uses_owner_header(&self) -> bool {
        self.keys.is_empty()
    }

    /// Owner for `token`. Every key is compared so timing does not reveal
    /// which one matched.
    fn owner_for(&self, token: &str) -> Option<String> {
        let mut owner = None;
        for entry in self.keys.iter() {
            if bool::from(entry.key.as_bytes().ct_eq(token.as_bytes())) {
                owner = Some(entry.owner.clone());
            }
        }
        owner
    }
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Gives each request a [`CancelToken`] that trips if the request future
/// is dropped before completing, which is what happens when the client
/// disconnects.
pub async fn cancel_on_disconnect(mut req: Request, next: Next) -> Response {
    let cancel = CancelToken::new();
    let guard = cancel.drop_guard();
    req.extensions_mut().insert(cancel);

    let res = next.run(req).await;
    guard.disarm();
    res
}

/// Middleware resolving the request's [`Owner`].
pub async fn resolve_owner(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    if auth.uses_owner_header() {
        let owner = req
            .headers()
            .get(OWNER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned);
        if let Some(owner) = owner {
            req.extensions_mut().insert(Owner(owner));
        }
        return next.run(req).await;
    }

    let owner =
        extract_bearer_token(req.headers().get(AUTHORIZATION)).and_then(|t| auth.owner_for(t));
    match owner {
        Some(owner) => {
            req.extensions_mut().insert(Owner(owner));
            next.run(req).await
        }
        None => (StatusCode::UNAUTHORIZED, "missing or invalid bearer token").into_response(),
    }
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}
