//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::config::IdentityConfig;
use crate::application::{
    DeactivateUseCase, LoginInput, LoginUseCase, LogoutUseCase, LookupIdentityUseCase,
    RegisterInput, RegisterUseCase, RenewUseCase, ResolveIdentityUseCase,
};
use crate::domain::repository::{ContentStore, RevocationStore, UserRepository};
use crate::domain::value_object::user_id::UserId;
use crate::error::{IdentityError, IdentityResult};
use crate::presentation::dto::{
    CredentialPairResponse, LoginRequest, MeResponse, RegisterRequest, RegisterResponse,
    RenewRequest,
};
use crate::token::TokenCodec;

/// Shared state for identity handlers
pub struct IdentityAppState<R, S>
where
    R: UserRepository + ContentStore + Send + Sync + 'static,
    S: RevocationStore + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub store: Arc<S>,
    pub codec: Arc<TokenCodec>,
    pub config: Arc<IdentityConfig>,
}

impl<R, S> Clone for IdentityAppState<R, S>
where
    R: UserRepository + ContentStore + Send + Sync + 'static,
    S: RevocationStore + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            store: self.store.clone(),
            codec: self.codec.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/identity/register
pub async fn register<R, S>(
    State(state): State<IdentityAppState<R, S>>,
    Json(req): Json<RegisterRequest>,
) -> IdentityResult<impl IntoResponse>
where
    R: UserRepository + ContentStore + Send + Sync + 'static,
    S: RevocationStore + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(state.repo.clone());

    let input = RegisterInput {
        email: req.email,
        password: req.password,
        nickname: req.nickname,
    };

    let output = use_case.execute(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: output.user_id.to_string(),
            email: output.email.into_db(),
        }),
    ))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/identity/login
pub async fn login<R, S>(
    State(state): State<IdentityAppState<R, S>>,
    Json(req): Json<LoginRequest>,
) -> IdentityResult<Json<CredentialPairResponse>>
where
    R: UserRepository + ContentStore + Send + Sync + 'static,
    S: RevocationStore + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(state.repo.clone(), state.store.clone(), state.codec.clone());

    let input = LoginInput {
        email: req.email,
        password: req.password,
    };

    let output = use_case.execute(input).await?;

    Ok(Json(CredentialPairResponse {
        access_token: output.access.token,
        access_expires_at_ms: output.access.expires_at.timestamp_millis(),
        renewal_token: output.renewal.token,
        renewal_expires_at_ms: output.renewal.expires_at.timestamp_millis(),
    }))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/identity/logout
pub async fn logout<R, S>(
    State(state): State<IdentityAppState<R, S>>,
    headers: HeaderMap,
) -> IdentityResult<StatusCode>
where
    R: UserRepository + ContentStore + Send + Sync + 'static,
    S: RevocationStore + Send + Sync + 'static,
{
    let token = extract_bearer(&headers).ok_or(IdentityError::Unauthenticated)?;

    let use_case = LogoutUseCase::new(state.repo.clone(), state.store.clone(), state.codec.clone());

    use_case.execute(&token).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Renew
// ============================================================================

/// POST /api/identity/renew
pub async fn renew<R, S>(
    State(state): State<IdentityAppState<R, S>>,
    Json(req): Json<RenewRequest>,
) -> IdentityResult<Json<CredentialPairResponse>>
where
    R: UserRepository + ContentStore + Send + Sync + 'static,
    S: RevocationStore + Send + Sync + 'static,
{
    let use_case = RenewUseCase::new(state.repo.clone(), state.store.clone(), state.codec.clone());

    let output = use_case.execute(&req.renewal_token).await?;

    Ok(Json(CredentialPairResponse {
        access_token: output.access.token,
        access_expires_at_ms: output.access.expires_at.timestamp_millis(),
        renewal_token: output.renewal.token,
        renewal_expires_at_ms: output.renewal.expires_at.timestamp_millis(),
    }))
}

// ============================================================================
// Deactivate
// ============================================================================

/// DELETE /api/identity/deactivate
pub async fn deactivate<R, S>(
    State(state): State<IdentityAppState<R, S>>,
    headers: HeaderMap,
) -> IdentityResult<StatusCode>
where
    R: UserRepository + ContentStore + Send + Sync + 'static,
    S: RevocationStore + Send + Sync + 'static,
{
    let token = extract_bearer(&headers).ok_or(IdentityError::Unauthenticated)?;

    let use_case =
        DeactivateUseCase::new(state.repo.clone(), state.store.clone(), state.codec.clone());

    use_case.execute(&token).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Current Identity
// ============================================================================

/// GET /api/identity/me
pub async fn me<R, S>(
    State(state): State<IdentityAppState<R, S>>,
    headers: HeaderMap,
) -> IdentityResult<Json<MeResponse>>
where
    R: UserRepository + ContentStore + Send + Sync + 'static,
    S: RevocationStore + Send + Sync + 'static,
{
    let token = extract_bearer(&headers).ok_or(IdentityError::Unauthenticated)?;

    let use_case =
        ResolveIdentityUseCase::new(state.repo.clone(), state.store.clone(), state.codec.clone());

    let resolved = use_case.execute(&token).await?;

    Ok(Json(MeResponse {
        user_id: resolved.user.user_id.to_string(),
        email: resolved.user.email.as_str().to_string(),
        nickname: resolved.user.nickname,
        created_at_ms: resolved.user.created_at.timestamp_millis(),
    }))
}

// ============================================================================
// Admin Lookup
// ============================================================================

/// GET /api/identity/identities/{user_id}
///
/// Mounted behind `require_identity`; resolution failures are rejected
/// before this handler runs.
pub async fn get_identity<R, S>(
    State(state): State<IdentityAppState<R, S>>,
    Path(user_id): Path<Uuid>,
) -> IdentityResult<Json<MeResponse>>
where
    R: UserRepository + ContentStore + Send + Sync + 'static,
    S: RevocationStore + Send + Sync + 'static,
{
    let use_case = LookupIdentityUseCase::new(state.repo.clone());

    let user = use_case.execute(&UserId::from_uuid(user_id)).await?;

    Ok(Json(MeResponse {
        user_id: user.user_id.to_string(),
        email: user.email.as_str().to_string(),
        nickname: user.nickname,
        created_at_ms: user.created_at.timestamp_millis(),
    }))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Pull the raw credential out of an `Authorization: Bearer ...` header
pub fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
