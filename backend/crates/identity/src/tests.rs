//! Scenario tests for the identity crate
//!
//! Runs the full use-case stack against the in-memory backends: no
//! PostgreSQL or Redis required.

use std::sync::Arc;
use std::time::Duration;

use crate::application::{
    DeactivateUseCase, LoginInput, LoginOutput, LoginUseCase, LogoutUseCase, RegisterInput,
    RegisterUseCase, RenewUseCase, ResolveIdentityUseCase,
};
use crate::domain::repository::{RevocationStore, UserRepository, denylist_key, renewal_key};
use crate::domain::value_object::email::Email;
use crate::error::IdentityError;
use crate::infra::memory::{MemoryIdentityRepository, MemoryRevocationStore};
use crate::token::{TokenCodec, TokenKind};

/// In-memory test harness with one registered user
struct Harness {
    repo: Arc<MemoryIdentityRepository>,
    store: Arc<MemoryRevocationStore>,
    codec: Arc<TokenCodec>,
}

const ALICE: &str = "alice@example.com";
const ALICE_PASSWORD: &str = "CorrectHorse9!";

impl Harness {
    fn new() -> Self {
        Self {
            repo: Arc::new(MemoryIdentityRepository::new()),
            store: Arc::new(MemoryRevocationStore::new()),
            codec: Arc::new(TokenCodec::new(
                b"scenario-test-secret-0123456789ab",
                Duration::from_secs(30 * 60),
                Duration::from_secs(14 * 24 * 3600),
            )),
        }
    }

    async fn with_alice() -> Self {
        let harness = Self::new();
        harness.register(ALICE, ALICE_PASSWORD, "alice").await;
        harness
    }

    async fn register(&self, email: &str, password: &str, nickname: &str) {
        RegisterUseCase::new(self.repo.clone())
            .execute(RegisterInput {
                email: email.to_string(),
                password: password.to_string(),
                nickname: nickname.to_string(),
            })
            .await
            .unwrap();
    }

    async fn login(&self, email: &str, password: &str) -> LoginOutput {
        self.try_login(email, password).await.unwrap()
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<LoginOutput, IdentityError> {
        LoginUseCase::new(self.repo.clone(), self.store.clone(), self.codec.clone())
            .execute(LoginInput {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
    }

    fn resolve(&self) -> ResolveIdentityUseCase<MemoryIdentityRepository, MemoryRevocationStore> {
        ResolveIdentityUseCase::new(self.repo.clone(), self.store.clone(), self.codec.clone())
    }

    fn logout(&self) -> LogoutUseCase<MemoryIdentityRepository, MemoryRevocationStore> {
        LogoutUseCase::new(self.repo.clone(), self.store.clone(), self.codec.clone())
    }

    fn renew(&self) -> RenewUseCase<MemoryIdentityRepository, MemoryRevocationStore> {
        RenewUseCase::new(self.repo.clone(), self.store.clone(), self.codec.clone())
    }

    fn deactivate(&self) -> DeactivateUseCase<MemoryIdentityRepository, MemoryRevocationStore> {
        DeactivateUseCase::new(self.repo.clone(), self.store.clone(), self.codec.clone())
    }
}

mod lifecycle_tests {
    use super::*;

    /// The whole session lifecycle against one identity: login, logout,
    /// login again with fresh credentials.
    #[tokio::test]
    async fn test_full_session_lifecycle() {
        let harness = Harness::with_alice().await;
        let email = Email::new(ALICE).unwrap();

        let first = harness.login(ALICE, ALICE_PASSWORD).await;
        assert!(harness.resolve().execute(&first.access.token).await.is_ok());

        harness.logout().execute(&first.access.token).await.unwrap();
        assert!(harness.resolve().execute(&first.access.token).await.is_err());
        assert_eq!(harness.store.get(&renewal_key(&email)).await.unwrap(), None);

        // A fresh login issues distinct credentials that resolve again
        let second = harness.login(ALICE, ALICE_PASSWORD).await;
        assert_ne!(second.access.token, first.access.token);
        assert_ne!(second.renewal.token, first.renewal.token);
        assert!(harness.resolve().execute(&second.access.token).await.is_ok());
    }
}

mod registration_tests {
    use super::*;

    #[tokio::test]
    async fn test_register_then_login() {
        let harness = Harness::with_alice().await;

        let output = harness.login(ALICE, ALICE_PASSWORD).await;
        assert_eq!(output.access.kind, TokenKind::Access);
        assert_eq!(output.renewal.kind, TokenKind::Renewal);

        // The canonical renewal copy lives under the identity's RT: key
        let email = Email::new(ALICE).unwrap();
        let canonical = harness.store.get(&renewal_key(&email)).await.unwrap();
        assert_eq!(canonical, Some(output.renewal.token));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let harness = Harness::with_alice().await;

        let err = RegisterUseCase::new(harness.repo.clone())
            .execute(RegisterInput {
                email: ALICE.to_string(),
                password: "AnotherPass77!".to_string(),
                nickname: "alice2".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, IdentityError::EmailTaken));
    }

    #[tokio::test]
    async fn test_register_validation_errors_surface() {
        let harness = Harness::new();

        let err = RegisterUseCase::new(harness.repo.clone())
            .execute(RegisterInput {
                email: "not-an-email".to_string(),
                password: ALICE_PASSWORD.to_string(),
                nickname: "x".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::EmailValidation(_)));

        let err = RegisterUseCase::new(harness.repo.clone())
            .execute(RegisterInput {
                email: ALICE.to_string(),
                password: "short".to_string(),
                nickname: "x".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::PasswordValidation(_)));
    }
}

mod login_tests {
    use super::*;

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_are_indistinguishable() {
        let harness = Harness::with_alice().await;

        let wrong_password = harness.try_login(ALICE, "WrongPassword1!").await.unwrap_err();
        let unknown_email = harness
            .try_login("nobody@example.com", ALICE_PASSWORD)
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, IdentityError::InvalidCredentials));
        assert!(matches!(unknown_email, IdentityError::InvalidCredentials));

        // Failed logins leave no store entries behind
        assert_eq!(harness.store.live_entries().await, 0);
    }

    #[tokio::test]
    async fn test_second_login_overwrites_renewal_but_keeps_old_access() {
        let harness = Harness::with_alice().await;

        let first = harness.login(ALICE, ALICE_PASSWORD).await;
        let second = harness.login(ALICE, ALICE_PASSWORD).await;

        // Last writer wins: only the second renewal credential is live
        let email = Email::new(ALICE).unwrap();
        let canonical = harness.store.get(&renewal_key(&email)).await.unwrap();
        assert_eq!(canonical, Some(second.renewal.token.clone()));

        let err = harness.renew().execute(&first.renewal.token).await.unwrap_err();
        assert!(matches!(err, IdentityError::Unauthenticated));

        // The first access credential stays valid until expiry
        let resolved = harness.resolve().execute(&first.access.token).await.unwrap();
        assert_eq!(resolved.user.email.as_str(), ALICE);
    }
}

mod resolution_tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_valid_access_credential() {
        let harness = Harness::with_alice().await;
        let login = harness.login(ALICE, ALICE_PASSWORD).await;

        let resolved = harness.resolve().execute(&login.access.token).await.unwrap();
        assert_eq!(resolved.user.email.as_str(), ALICE);
        assert_eq!(resolved.user.nickname, "alice");
        assert_eq!(resolved.raw_token, login.access.token);
    }

    #[tokio::test]
    async fn test_renewal_credential_does_not_authenticate() {
        let harness = Harness::with_alice().await;
        let login = harness.login(ALICE, ALICE_PASSWORD).await;

        let err = harness.resolve().execute(&login.renewal.token).await.unwrap_err();
        assert!(matches!(err, IdentityError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_garbage_and_foreign_credentials_rejected() {
        let harness = Harness::with_alice().await;

        let err = harness.resolve().execute("not-a-token").await.unwrap_err();
        assert!(matches!(err, IdentityError::Unauthenticated));

        // Signed with a different secret
        let foreign = TokenCodec::new(
            b"some-other-secret-0123456789abcd",
            Duration::from_secs(30 * 60),
            Duration::from_secs(14 * 24 * 3600),
        )
        .issue_access(ALICE)
        .unwrap();

        let err = harness.resolve().execute(&foreign.token).await.unwrap_err();
        assert!(matches!(err, IdentityError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_valid_credential_for_deleted_identity_rejected() {
        let harness = Harness::with_alice().await;
        let login = harness.login(ALICE, ALICE_PASSWORD).await;

        // Mint a credential for a subject that was never registered
        let ghost = harness.codec.issue_access("ghost@example.com").unwrap();

        let err = harness.resolve().execute(&ghost.token).await.unwrap_err();
        assert!(matches!(err, IdentityError::Unauthenticated));

        // The real identity still resolves
        assert!(harness.resolve().execute(&login.access.token).await.is_ok());
    }
}

mod logout_tests {
    use super::*;

    #[tokio::test]
    async fn test_logout_revokes_access_and_renewal() {
        let harness = Harness::with_alice().await;
        let login = harness.login(ALICE, ALICE_PASSWORD).await;

        harness.logout().execute(&login.access.token).await.unwrap();

        // Access credential is denylisted for its remaining lifetime
        let entry = harness
            .store
            .get(&denylist_key(&login.access.token))
            .await
            .unwrap();
        assert_eq!(entry, Some("revoked".to_string()));

        // The canonical renewal copy is gone, so renewal fails
        let email = Email::new(ALICE).unwrap();
        assert_eq!(harness.store.get(&renewal_key(&email)).await.unwrap(), None);
        let err = harness.renew().execute(&login.renewal.token).await.unwrap_err();
        assert!(matches!(err, IdentityError::Unauthenticated));

        // The revoked access credential no longer resolves
        let err = harness.resolve().execute(&login.access.token).await.unwrap_err();
        assert!(matches!(err, IdentityError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_second_logout_fails_resolution() {
        let harness = Harness::with_alice().await;
        let login = harness.login(ALICE, ALICE_PASSWORD).await;

        harness.logout().execute(&login.access.token).await.unwrap();

        // The credential is already denylisted, so the second logout is
        // rejected at the gate
        let err = harness.logout().execute(&login.access.token).await.unwrap_err();
        assert!(matches!(err, IdentityError::Unauthenticated));
    }
}

mod renewal_tests {
    use super::*;

    #[tokio::test]
    async fn test_renew_issues_fresh_pair_and_rotates_canonical_copy() {
        let harness = Harness::with_alice().await;
        let login = harness.login(ALICE, ALICE_PASSWORD).await;

        let renewed = harness.renew().execute(&login.renewal.token).await.unwrap();
        assert_eq!(renewed.access.kind, TokenKind::Access);
        assert_eq!(renewed.renewal.kind, TokenKind::Renewal);

        // The fresh renewal credential is now canonical
        let email = Email::new(ALICE).unwrap();
        let canonical = harness.store.get(&renewal_key(&email)).await.unwrap();
        assert_eq!(canonical, Some(renewed.renewal.token.clone()));

        // The fresh access credential authenticates
        assert!(harness.resolve().execute(&renewed.access.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_access_credential_cannot_renew() {
        let harness = Harness::with_alice().await;
        let login = harness.login(ALICE, ALICE_PASSWORD).await;

        let err = harness.renew().execute(&login.access.token).await.unwrap_err();
        assert!(matches!(err, IdentityError::Unauthenticated));
    }
}

mod deactivation_tests {
    use super::*;

    #[tokio::test]
    async fn test_deactivation_purges_content_and_identity() {
        let harness = Harness::with_alice().await;
        let login = harness.login(ALICE, ALICE_PASSWORD).await;

        let email = Email::new(ALICE).unwrap();
        let user = harness.repo.find_by_email(&email).await.unwrap().unwrap();
        harness.repo.seed_content(&user.user_id, "posts", 3).await;
        harness.repo.seed_content(&user.user_id, "comments", 7).await;
        harness.repo.seed_content(&user.user_id, "reviews", 1).await;

        harness.deactivate().execute(&login.access.token).await.unwrap();

        assert_eq!(harness.repo.user_count().await, 0);
        assert_eq!(harness.repo.content_count(&user.user_id, "posts").await, 0);
        assert_eq!(harness.repo.content_count(&user.user_id, "comments").await, 0);
        assert_eq!(harness.repo.content_count(&user.user_id, "reviews").await, 0);

        // Session state is revoked too
        assert_eq!(harness.store.get(&renewal_key(&email)).await.unwrap(), None);
        let err = harness.resolve().execute(&login.access.token).await.unwrap_err();
        assert!(matches!(err, IdentityError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_purge_failure_aborts_cascade_and_keeps_identity() {
        let harness = Harness::with_alice().await;
        let login = harness.login(ALICE, ALICE_PASSWORD).await;

        let email = Email::new(ALICE).unwrap();
        let user = harness.repo.find_by_email(&email).await.unwrap().unwrap();
        harness.repo.seed_content(&user.user_id, "posts", 2).await;
        harness.repo.seed_content(&user.user_id, "scraps", 5).await;
        harness.repo.fail_purges_of("bookings").await;

        let err = harness.deactivate().execute(&login.access.token).await.unwrap_err();
        assert!(matches!(err, IdentityError::DeactivationIncomplete(_)));

        // Identity row is intact, so the operation can be retried
        assert_eq!(harness.repo.user_count().await, 1);

        // Kinds before the failure were purged, kinds after it were not
        assert_eq!(harness.repo.content_count(&user.user_id, "posts").await, 0);
        assert_eq!(harness.repo.content_count(&user.user_id, "scraps").await, 5);
    }

    #[tokio::test]
    async fn test_deactivation_requires_valid_credential() {
        let harness = Harness::with_alice().await;
        let login = harness.login(ALICE, ALICE_PASSWORD).await;

        harness.logout().execute(&login.access.token).await.unwrap();

        // A revoked credential cannot deactivate the account
        let err = harness.deactivate().execute(&login.access.token).await.unwrap_err();
        assert!(matches!(err, IdentityError::Unauthenticated));
        assert_eq!(harness.repo.user_count().await, 1);
    }
}

mod middleware_tests {
    use super::*;
    use axum::Router;
    use axum::body::{self, Body};
    use axum::extract::Extension;
    use axum::http::{Request, StatusCode, header};
    use axum::middleware::{Next, from_fn};
    use axum::routing::get;
    use tower::ServiceExt;

    use crate::presentation::middleware::{
        CurrentIdentity, IdentityMiddlewareState, require_identity,
    };

    async fn whoami(Extension(identity): Extension<CurrentIdentity>) -> String {
        identity.0.user.email.as_str().to_string()
    }

    fn protected_app(harness: &Harness) -> Router {
        let state = IdentityMiddlewareState {
            repo: harness.repo.clone(),
            store: harness.store.clone(),
            codec: harness.codec.clone(),
        };

        Router::new()
            .route("/whoami", get(whoami))
            .route_layer(from_fn(move |req: Request<Body>, next: Next| {
                require_identity(state.clone(), req, next)
            }))
    }

    async fn send(app: Router, bearer: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_gate_passes_valid_credential_to_handler() {
        let harness = Harness::with_alice().await;
        let login = harness.login(ALICE, ALICE_PASSWORD).await;

        let (status, body) = send(protected_app(&harness), Some(&login.access.token)).await;
        assert_eq!(status, StatusCode::OK);
        // The handler reads the resolved identity from request extensions
        assert_eq!(body, ALICE);
    }

    #[tokio::test]
    async fn test_gate_rejects_missing_credential() {
        let harness = Harness::with_alice().await;

        let (status, _) = send(protected_app(&harness), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_gate_rejects_revoked_credential() {
        let harness = Harness::with_alice().await;
        let login = harness.login(ALICE, ALICE_PASSWORD).await;
        harness.logout().execute(&login.access.token).await.unwrap();

        let (status, _) = send(protected_app(&harness), Some(&login.access.token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

mod lookup_tests {
    use super::*;
    use crate::application::LookupIdentityUseCase;
    use crate::domain::value_object::user_id::UserId;

    #[tokio::test]
    async fn test_lookup_finds_registered_identity() {
        let harness = Harness::with_alice().await;
        let email = Email::new(ALICE).unwrap();
        let user = harness.repo.find_by_email(&email).await.unwrap().unwrap();

        let found = LookupIdentityUseCase::new(harness.repo.clone())
            .execute(&user.user_id)
            .await
            .unwrap();
        assert_eq!(found.user_id, user.user_id);
        assert_eq!(found.email, user.email);
    }

    #[tokio::test]
    async fn test_lookup_unknown_id_is_not_found() {
        let harness = Harness::with_alice().await;

        let err = LookupIdentityUseCase::new(harness.repo.clone())
            .execute(&UserId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::IdentityNotFound));
    }
}
