//! Session and identity-verification lifecycle.
//!
//! This module owns how a client establishes, persists, rehydrates, and
//! tears down an authenticated session:
//!
//! - [`SessionService`] is the single process-wide session authority.
//! - [`RegistrationFlow`] sequences the two-channel OTP signup.
//! - [`gate`] decides access to protected and public-only views.
//!
//! ## Example
//!
//! ```no_run
//! use fitgym::auth::{SessionCore, SessionService};
//! use fitgym::credentials::CredentialStore;
//! use fitgym::net::ApiClient;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = CredentialStore::new("/tmp/fitgym/session.json");
//!     let core = Arc::new(SessionCore::new(store));
//!     let api = Arc::new(ApiClient::new("http://localhost:8000".to_string(), core.clone()));
//!     let sessions = SessionService::new(core, api);
//!     sessions.rehydrate().await;
//!     println!("authenticated: {}", sessions.snapshot().is_authenticated());
//! }
//! ```

pub mod errors;
pub mod gate;
pub mod models;
pub mod registration;
pub mod session;

pub use errors::{AuthError, AuthResult};
pub use gate::{AccessGate, GateDecision, Route, role_home};
pub use models::{
    AuthSession, MIN_PASSWORD_LEN, OTP_CODE_LEN, OTP_RESEND_COOLDOWN, OtpChallenge,
    RegistrationDraft, Role, StoredCredentials, UserId, UserProfile,
};
pub use registration::{RegistrationFlow, RegistrationState};
pub use session::{SessionCore, SessionService, SessionSnapshot};
