//! # FitGym
//!
//! Client library for a gym-management service: session lifecycle,
//! OTP-verified registration, role-based access gating, and a typed
//! HTTP API client.
//!
//! ## Architecture
//!
//! The session subsystem is built from five collaborators with one
//! direction of data flow:
//!
//! - **CredentialStore**: two-tier persistence (durable file vs
//!   process-scoped memory) with at most one live copy at a time
//! - **SessionCore / SessionService**: the process-wide session
//!   authority for login, signup, startup rehydration, teardown
//! - **RegistrationFlow**: the time-boxed two-channel OTP state machine
//! - **AccessGate**: allow/redirect decisions for protected views
//! - **AuthFailureInterceptor**: global teardown on rejected
//!   authenticated calls
//!
//! The store is written only through the session core; gates read only
//! the session snapshot; the interceptor writes only the invalidation
//! path.
//!
//! ## Core Modules
//!
//! - [`auth`]: session state, registration flow, gating, errors
//! - [`credentials`]: two-tier credential persistence
//! - [`net`]: API client, wire messages, auth-failure interceptor
//!
//! ## Example
//!
//! ```
//! use fitgym::auth::{Role, gate};
//!
//! // Every role has a defined landing view.
//! let home = gate::role_home(Role::Trainer);
//! assert_eq!(home.to_string(), "/dashboard/trainer");
//! ```

/// Session, registration, and access-gating logic.
pub mod auth;
pub use auth::{
    AccessGate, AuthError, AuthResult, AuthSession, GateDecision, RegistrationFlow,
    RegistrationState, Role, Route, SessionCore, SessionService, SessionSnapshot, UserProfile,
};

/// Two-tier credential persistence.
pub mod credentials;
pub use credentials::{CredentialSlot, CredentialStore, FileSlot, MemorySlot};

/// Networking components (API client, messages, interceptor).
pub mod net;
pub use net::{ApiClient, AuthApi, AuthFailureInterceptor, Navigator};
