//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod deactivate;
pub mod login;
pub mod logout;
pub mod lookup;
pub mod register;
pub mod renew;
pub mod resolve;

// Re-exports
pub use config::IdentityConfig;
pub use deactivate::DeactivateUseCase;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use lookup::LookupIdentityUseCase;
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use renew::{RenewOutput, RenewUseCase};
pub use resolve::{ResolveIdentityUseCase, ResolvedIdentity};
