//! Role-based access decisions for protected and public-only views.

use super::models::Role;
use super::session::{SessionCore, SessionSnapshot};
use std::fmt;
use std::sync::Arc;

/// Navigation target for gate redirects.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Route {
    Login,
    AdminHome,
    MemberHome,
    TrainerHome,
    ReceptionistHome,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Login => "/login",
            Self::AdminHome => "/dashboard/admin",
            Self::MemberHome => "/dashboard/member",
            Self::TrainerHome => "/dashboard/trainer",
            Self::ReceptionistHome => "/dashboard/receptionist",
        };
        write!(f, "{repr}")
    }
}

/// Canonical landing view for a role.
///
/// Total over every role value, including ones this client does not
/// recognize, which land on the member home.
#[must_use]
pub fn role_home(role: Role) -> Route {
    match role {
        Role::Admin => Route::AdminHome,
        Role::Trainer => Route::TrainerHome,
        Role::Receptionist => Route::ReceptionistHome,
        Role::Member | Role::Unknown => Route::MemberHome,
    }
}

/// Outcome of a gate check.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GateDecision {
    /// Render the view. While rehydration is unresolved `show_loading`
    /// is set and a neutral loading state is rendered instead of the
    /// view body; redirecting during that window would bounce an
    /// already-authenticated user to the login screen on every start.
    Allow { show_loading: bool },
    /// Navigate away instead of rendering.
    Redirect(Route),
}

/// Decide access to a protected view.
#[must_use]
pub fn decide(session: &SessionSnapshot, required_roles: Option<&[Role]>) -> GateDecision {
    if session.loading {
        return GateDecision::Allow { show_loading: true };
    }
    match (&session.token, &session.user) {
        (Some(_), Some(user)) => {
            if let Some(required) = required_roles {
                if !required.contains(&user.role) {
                    return GateDecision::Redirect(role_home(user.role));
                }
            }
            GateDecision::Allow { show_loading: false }
        }
        _ => GateDecision::Redirect(Route::Login),
    }
}

/// Decide access to a public-only view (login, signup): authenticated
/// users are sent to their role home instead.
#[must_use]
pub fn decide_public(session: &SessionSnapshot) -> GateDecision {
    if session.loading {
        return GateDecision::Allow { show_loading: true };
    }
    match (&session.token, &session.user) {
        (Some(_), Some(user)) => GateDecision::Redirect(role_home(user.role)),
        _ => GateDecision::Allow { show_loading: false },
    }
}

/// Gate bound to the live session state.
///
/// Receives its [`SessionCore`] explicitly at construction; it reads the
/// session snapshot and never touches storage.
pub struct AccessGate {
    core: Arc<SessionCore>,
}

impl AccessGate {
    #[must_use]
    pub fn new(core: Arc<SessionCore>) -> Self {
        Self { core }
    }

    /// Check a protected view against the current session.
    #[must_use]
    pub fn decide(&self, required_roles: Option<&[Role]>) -> GateDecision {
        decide(&self.core.snapshot(), required_roles)
    }

    /// Check a public-only view against the current session.
    #[must_use]
    pub fn decide_public(&self) -> GateDecision {
        decide_public(&self.core.snapshot())
    }
}
