//! Global handling of authentication-rejected responses.

use crate::auth::gate::Route;
use crate::auth::session::SessionCore;
use log::warn;
use std::sync::Arc;

/// Navigation sink for forced redirects. The client shell and any UI
/// host implement this to switch views.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Observer invoked whenever an authenticated call comes back rejected,
/// regardless of which endpoint was called.
///
/// It tears the session down through [`SessionCore::invalidate`] and
/// forces navigation to the login view, then lets the original error
/// propagate to the caller. `invalidate` reports whether a token was
/// still live, so when several in-flight calls are rejected for the same
/// session, teardown and navigation happen exactly once; later
/// rejections find no token and do nothing. The navigation itself
/// cannot re-trigger this path, since no further call carries a stale
/// credential.
pub struct AuthFailureInterceptor {
    core: Arc<SessionCore>,
    navigator: Arc<dyn Navigator>,
}

impl AuthFailureInterceptor {
    #[must_use]
    pub fn new(core: Arc<SessionCore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { core, navigator }
    }

    /// React to one rejected response.
    pub fn on_auth_rejected(&self) {
        if self.core.invalidate() {
            warn!("authenticated call rejected; session cleared");
            self.navigator.navigate(Route::Login);
        }
    }
}
