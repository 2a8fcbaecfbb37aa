//! Identity Middleware
//!
//! Middleware for requiring a valid access credential on protected
//! routes. The resolved identity is stored in request extensions for
//! downstream handlers.

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::ResolveIdentityUseCase;
use crate::application::resolve::ResolvedIdentity;
use crate::domain::repository::{RevocationStore, UserRepository};
use crate::error::IdentityError;
use crate::presentation::handlers::extract_bearer;
use crate::token::TokenCodec;

/// Middleware state
pub struct IdentityMiddlewareState<R, S>
where
    R: UserRepository + Send + Sync + 'static,
    S: RevocationStore + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub store: Arc<S>,
    pub codec: Arc<TokenCodec>,
}

impl<R, S> Clone for IdentityMiddlewareState<R, S>
where
    R: UserRepository + Send + Sync + 'static,
    S: RevocationStore + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            store: self.store.clone(),
            codec: self.codec.clone(),
        }
    }
}

/// The identity resolved for the current request
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub ResolvedIdentity);

/// Middleware that requires a valid, unrevoked access credential
pub async fn require_identity<R, S>(
    state: IdentityMiddlewareState<R, S>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    R: UserRepository + Send + Sync + 'static,
    S: RevocationStore + Send + Sync + 'static,
{
    let token = extract_bearer(req.headers())
        .ok_or_else(|| IdentityError::Unauthenticated.into_response())?;

    let use_case =
        ResolveIdentityUseCase::new(state.repo.clone(), state.store.clone(), state.codec.clone());

    let resolved = use_case
        .execute(&token)
        .await
        .map_err(|e| e.into_response())?;

    req.extensions_mut().insert(CurrentIdentity(resolved));

    Ok(next.run(req).await)
}
