//! Session and registration data models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// User ID type (opaque server-assigned identifier)
pub type UserId = String;

/// Length of a one-time code, in digits
pub const OTP_CODE_LEN: usize = 6;

/// Cooldown between one-time code issuances
pub const OTP_RESEND_COOLDOWN: Duration = Duration::from_secs(60);

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Account role, driving access gating and the landing view.
///
/// Roles the client does not recognize deserialize to [`Role::Unknown`]
/// so gating stays total when the service grows new roles.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
    Trainer,
    Receptionist,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Admin => "admin",
            Self::Member => "member",
            Self::Trainer => "trainer",
            Self::Receptionist => "receptionist",
            Self::Unknown => "unknown",
        };
        write!(f, "{repr}")
    }
}

/// User profile as returned by the identity service.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub member_id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub role: Role,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub profile_photo_url: Option<String>,
    #[serde(default)]
    pub trainer_id: Option<String>,
}

/// An established session: bearer token plus the profile it belongs to.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

/// Credential payload persisted by the credential store.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StoredCredentials {
    pub token: String,
    pub user: UserProfile,
    pub remember: bool,
}

/// Registration details collected before the OTP step.
///
/// Never persisted; a draft lives only for the duration of one
/// registration attempt.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegistrationDraft {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub country_code: String,
    pub password: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// One outstanding OTP issuance.
///
/// Issuing a new challenge (resend) supersedes the prior one; only one
/// challenge exists at a time per registration attempt.
#[derive(Clone, Debug)]
pub struct OtpChallenge {
    issued_at: Instant,
    cooldown: Duration,
}

impl OtpChallenge {
    /// Issue a fresh challenge, starting the resend cooldown.
    #[must_use]
    pub fn issue() -> Self {
        Self {
            issued_at: Instant::now(),
            cooldown: OTP_RESEND_COOLDOWN,
        }
    }

    /// Time left until a resend is permitted.
    #[must_use]
    pub fn remaining_cooldown(&self) -> Duration {
        self.cooldown.saturating_sub(self.issued_at.elapsed())
    }

    /// Whether the cooldown has fully elapsed.
    #[must_use]
    pub fn resend_available(&self) -> bool {
        self.remaining_cooldown().is_zero()
    }
}
