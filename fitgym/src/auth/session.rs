//! Session lifecycle management.
//!
//! [`SessionCore`] holds the process-wide session state and owns the
//! credential store; it is the single invalidation authority shared by
//! the session service and the auth-failure interceptor. [`SessionService`]
//! layers the remote operations (login, signup, rehydration) on top of an
//! injected [`AuthApi`] implementation.

use super::{
    errors::AuthResult,
    models::{AuthSession, StoredCredentials, UserProfile},
    registration::RegistrationFlow,
};
use crate::credentials::CredentialStore;
use crate::net::client::AuthApi;
use crate::net::messages::{LoginRequest, ProfileUpdateRequest, SignupRequest};
use log::{debug, info, warn};
use std::sync::{Arc, Mutex};

/// Point-in-time view of the session, handed to gates and views.
///
/// `token` and `user` are present together or absent together; the only
/// exception is the transient window while startup rehydration is still
/// in flight (`loading` is `true`), during which consumers must defer
/// any decision rather than treat the session as unauthenticated.
#[derive(Clone, Debug)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
    pub remember: bool,
    pub loading: bool,
}

impl SessionSnapshot {
    /// Whether a fully established session is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }
}

#[derive(Debug)]
struct SessionState {
    token: Option<String>,
    user: Option<UserProfile>,
    remember: bool,
    loading: bool,
    // Bumped by every state transition; an in-flight rehydration result
    // is applied only if the generation it captured is still current.
    generation: u64,
}

/// Process-wide session state and its persistence.
pub struct SessionCore {
    store: CredentialStore,
    state: Mutex<SessionState>,
}

impl SessionCore {
    /// Create a core in the loading state, before the first rehydration
    /// attempt has resolved.
    #[must_use]
    pub fn new(store: CredentialStore) -> Self {
        Self {
            store,
            state: Mutex::new(SessionState {
                token: None,
                user: None,
                remember: false,
                loading: true,
                generation: 0,
            }),
        }
    }

    /// Current session state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().expect("session lock poisoned");
        SessionSnapshot {
            token: state.token.clone(),
            user: state.user.clone(),
            remember: state.remember,
            loading: state.loading,
        }
    }

    /// Bearer credential for outbound authenticated calls.
    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        self.state.lock().expect("session lock poisoned").token.clone()
    }

    /// Tear the session down: both storage tiers and the in-memory state
    /// are cleared synchronously. Safe to call when already logged out.
    ///
    /// Returns whether a token was live, so callers reacting to rejected
    /// responses can act exactly once even when several rejections arrive
    /// for the same session.
    pub fn invalidate(&self) -> bool {
        self.store.clear();
        let mut state = self.state.lock().expect("session lock poisoned");
        state.generation += 1;
        let had_token = state.token.take().is_some();
        state.user = None;
        state.remember = false;
        had_token
    }

    /// Install a freshly authenticated session and persist it to the
    /// tier selected by `remember`.
    pub(crate) fn establish(&self, session: AuthSession, remember: bool) {
        self.store.save(&StoredCredentials {
            token: session.token.clone(),
            user: session.user.clone(),
            remember,
        });
        let mut state = self.state.lock().expect("session lock poisoned");
        state.generation += 1;
        state.token = Some(session.token);
        state.user = Some(session.user);
        state.remember = remember;
    }

    fn persisted(&self) -> Option<StoredCredentials> {
        self.store.load()
    }

    /// Stage a stored token while its profile is being refetched, and
    /// capture the generation the in-flight fetch belongs to.
    fn begin_rehydrate(&self, token: &str) -> u64 {
        let mut state = self.state.lock().expect("session lock poisoned");
        state.generation += 1;
        state.token = Some(token.to_string());
        state.user = None;
        state.generation
    }

    /// Apply a rehydration result, unless the session moved on while the
    /// fetch was in flight. Resolves `loading` either way.
    fn apply_rehydrated(&self, generation: u64, user: UserProfile, remember: bool) -> bool {
        let mut state = self.state.lock().expect("session lock poisoned");
        let current = state.generation == generation;
        if current {
            state.user = Some(user);
            state.remember = remember;
        }
        state.loading = false;
        current
    }

    /// Handle a failed rehydration: drop the staged token and wipe
    /// storage, unless the session moved on. Resolves `loading`.
    fn reject_rehydrated(&self, generation: u64) {
        let mut state = self.state.lock().expect("session lock poisoned");
        if state.generation == generation {
            state.token = None;
            state.user = None;
            state.remember = false;
            state.loading = false;
            drop(state);
            self.store.clear();
        } else {
            state.loading = false;
        }
    }

    fn resolve_loading(&self) {
        self.state.lock().expect("session lock poisoned").loading = false;
    }

    /// Merge a profile patch into the in-memory user and hand back the
    /// credentials to re-persist. `None` when no session is live.
    fn merge_profile(&self, patch: &ProfileUpdateRequest) -> Option<StoredCredentials> {
        let mut state = self.state.lock().expect("session lock poisoned");
        let state = &mut *state;
        let token = state.token.as_ref()?;
        let user = state.user.as_mut()?;
        if let Some(name) = &patch.name {
            user.name = name.clone();
        }
        if let Some(phone_number) = &patch.phone_number {
            user.phone_number = phone_number.clone();
        }
        if let Some(gender) = &patch.gender {
            user.gender = Some(gender.clone());
        }
        if let Some(date_of_birth) = &patch.date_of_birth {
            user.date_of_birth = Some(date_of_birth.clone());
        }
        if let Some(photo) = &patch.profile_photo_url {
            user.profile_photo_url = Some(photo.clone());
        }
        Some(StoredCredentials {
            token: token.clone(),
            user: user.clone(),
            remember: state.remember,
        })
    }
}

/// The session authority: login, signup, rehydration, and teardown.
///
/// Constructed once at startup with its collaborators injected, then
/// shared by reference with every consumer.
pub struct SessionService {
    core: Arc<SessionCore>,
    api: Arc<dyn AuthApi>,
}

impl SessionService {
    /// Create a session service over a shared core and remote API.
    #[must_use]
    pub fn new(core: Arc<SessionCore>, api: Arc<dyn AuthApi>) -> Self {
        Self { core, api }
    }

    /// Shared handle to the session core.
    #[must_use]
    pub fn core(&self) -> Arc<SessionCore> {
        Arc::clone(&self.core)
    }

    /// Current session state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.core.snapshot()
    }

    /// Reconstruct the session from persisted credentials, invoked once
    /// at process start.
    ///
    /// The profile is always refetched from the service rather than
    /// trusted from storage, so server-side role changes take effect on
    /// the next start. Any failure clears both storage tiers. If the
    /// session is torn down while the fetch is in flight, the late
    /// result is discarded instead of resurrecting the session.
    pub async fn rehydrate(&self) {
        let Some(creds) = self.core.persisted() else {
            debug!("no persisted session");
            self.core.resolve_loading();
            return;
        };
        let generation = self.core.begin_rehydrate(&creds.token);
        match self.api.me().await {
            Ok(user) => {
                if self.core.apply_rehydrated(generation, user, creds.remember) {
                    info!("session rehydrated for {}", creds.user.member_id);
                } else {
                    debug!("discarding stale rehydration result");
                }
            }
            Err(error) => {
                warn!("session rehydration failed: {error}");
                self.core.reject_rehydrated(generation);
            }
        }
    }

    /// Authenticate with an email-or-phone identifier and password.
    ///
    /// On success the session is persisted to the tier selected by
    /// `remember`. A rejection surfaces as
    /// [`AuthError::InvalidCredentials`](super::errors::AuthError::InvalidCredentials),
    /// unmodified.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
        remember: bool,
    ) -> AuthResult<UserProfile> {
        let session = self
            .api
            .login(&LoginRequest {
                email_or_phone: identifier.to_string(),
                password: password.to_string(),
            })
            .await?;
        let user = session.user.clone();
        self.core.establish(session, remember);
        info!("logged in as {} ({})", user.member_id, user.role);
        Ok(user)
    }

    /// Direct signup without OTP (legacy form path). Always persists a
    /// durable session.
    pub async fn signup(&self, request: SignupRequest) -> AuthResult<UserProfile> {
        let session = self.api.signup(&request).await?;
        let user = session.user.clone();
        self.core.establish(session, true);
        info!("account created for {}", user.member_id);
        Ok(user)
    }

    /// Submit the shared one-time code through a registration flow and,
    /// on completion, establish the resulting session.
    ///
    /// Registration always persists a durable session regardless of any
    /// prior "remember" choice.
    pub async fn signup_with_otp(
        &self,
        flow: &mut RegistrationFlow,
        code: &str,
    ) -> AuthResult<UserProfile> {
        flow.set_code(code);
        let session = flow.submit_code().await?;
        let user = session.user.clone();
        self.core.establish(session, true);
        info!("account created for {}", user.member_id);
        Ok(user)
    }

    /// Clear the session synchronously. Idempotent.
    pub fn logout(&self) {
        if self.core.invalidate() {
            info!("logged out");
        }
    }

    /// Merge a patch into the in-memory profile and re-persist it to
    /// whichever tier currently holds the token. The tier is probed by
    /// presence, not read from the `remember` flag, which may be stale.
    ///
    /// Returns the updated profile, or `None` when no session is live.
    pub fn update_profile(&self, patch: &ProfileUpdateRequest) -> Option<UserProfile> {
        let creds = self.core.merge_profile(patch)?;
        self.core.store.update_active(&creds);
        Some(creds.user)
    }
}
