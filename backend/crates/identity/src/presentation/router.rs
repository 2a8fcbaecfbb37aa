//! Identity Router

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::{Next, from_fn},
    routing::{delete, get, post},
};
use std::sync::Arc;

use crate::application::config::IdentityConfig;
use crate::domain::repository::{ContentStore, RevocationStore, UserRepository};
use crate::infra::postgres::PgIdentityRepository;
use crate::infra::redis::RedisRevocationStore;
use crate::presentation::handlers::{self, IdentityAppState};
use crate::presentation::middleware::{IdentityMiddlewareState, require_identity};
use crate::token::TokenCodec;

/// Create the identity router with PostgreSQL and Redis backends
pub fn identity_router(
    repo: PgIdentityRepository,
    store: RedisRevocationStore,
    config: IdentityConfig,
) -> Router {
    identity_router_generic(repo, store, config)
}

/// Create a generic identity router for any backend implementations
pub fn identity_router_generic<R, S>(repo: R, store: S, config: IdentityConfig) -> Router
where
    R: UserRepository + ContentStore + Send + Sync + 'static,
    S: RevocationStore + Send + Sync + 'static,
{
    let codec = Arc::new(TokenCodec::new(
        &config.token_secret,
        config.access_ttl,
        config.renewal_ttl,
    ));

    let state = IdentityAppState {
        repo: Arc::new(repo),
        store: Arc::new(store),
        codec,
        config: Arc::new(config),
    };

    let mw_state = IdentityMiddlewareState {
        repo: state.repo.clone(),
        store: state.store.clone(),
        codec: state.codec.clone(),
    };

    // Admin lookup requires a valid caller before the handler runs
    let guarded = Router::new()
        .route("/identities/{user_id}", get(handlers::get_identity::<R, S>))
        .route_layer(from_fn(move |req: Request<Body>, next: Next| {
            require_identity(mw_state.clone(), req, next)
        }))
        .with_state(state.clone());

    Router::new()
        .route("/register", post(handlers::register::<R, S>))
        .route("/login", post(handlers::login::<R, S>))
        .route("/logout", post(handlers::logout::<R, S>))
        .route("/renew", post(handlers::renew::<R, S>))
        .route("/deactivate", delete(handlers::deactivate::<R, S>))
        .route("/me", get(handlers::me::<R, S>))
        .with_state(state)
        .merge(guarded)
}
