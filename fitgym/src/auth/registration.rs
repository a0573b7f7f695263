//! Two-step, time-boxed OTP registration flow.
//!
//! The flow collects a [`RegistrationDraft`], issues one challenge on
//! both the phone and email channels, and verifies a single shared
//! 6-digit code before finalizing account creation. One challenge is
//! outstanding at a time; a resend supersedes the prior challenge.
//! Nothing here is persisted; an interrupted registration starts over.

use super::{
    errors::{AuthError, AuthResult},
    models::{AuthSession, MIN_PASSWORD_LEN, OTP_CODE_LEN, OtpChallenge, RegistrationDraft},
};
use crate::net::client::AuthApi;
use crate::net::messages::{OtpSendRequest, OtpVerifyRequest, SignupRequest, SignupWithOtpRequest};
use log::{debug, warn};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Phase of one registration attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RegistrationState {
    /// Draft fields are being edited.
    Collecting,
    /// The dual-channel challenge request is in flight.
    SendingOtp,
    /// A challenge is outstanding and the code can be entered.
    AwaitingOtp,
    /// A superseding challenge request is in flight.
    Resending,
    /// Verify (and on success, account creation) is in flight.
    Verifying,
    /// Terminal: the account exists and a session can be established.
    Completed,
    /// Terminal for this attempt; restart to try again.
    Failed,
}

impl fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Collecting => "collecting",
            Self::SendingOtp => "sending code",
            Self::AwaitingOtp => "awaiting code",
            Self::Resending => "resending code",
            Self::Verifying => "verifying",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        write!(f, "{repr}")
    }
}

/// Driver for one registration attempt.
pub struct RegistrationFlow {
    api: Arc<dyn AuthApi>,
    state: RegistrationState,
    draft: RegistrationDraft,
    challenge: Option<OtpChallenge>,
    code: String,
}

impl RegistrationFlow {
    /// Start a fresh attempt in the collecting phase.
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>) -> Self {
        Self {
            api,
            state: RegistrationState::Collecting,
            draft: RegistrationDraft::default(),
            challenge: None,
            code: String::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> RegistrationState {
        self.state
    }

    #[must_use]
    pub fn draft(&self) -> &RegistrationDraft {
        &self.draft
    }

    /// Mutable access to the draft for the collecting phase.
    pub fn draft_mut(&mut self) -> &mut RegistrationDraft {
        &mut self.draft
    }

    /// Currently entered code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Replace the entered code. Non-digits are stripped and the result
    /// is truncated to 6 digits, never padded.
    pub fn set_code(&mut self, input: &str) {
        self.code = sanitize_code(input);
    }

    /// Time left until a resend is permitted.
    #[must_use]
    pub fn cooldown_remaining(&self) -> Duration {
        self.challenge
            .as_ref()
            .map_or(Duration::ZERO, OtpChallenge::remaining_cooldown)
    }

    /// Whether a resend would be accepted right now.
    #[must_use]
    pub fn resend_available(&self) -> bool {
        self.state == RegistrationState::AwaitingOtp && self.cooldown_remaining().is_zero()
    }

    /// Submit the draft: validate locally, then issue the dual-channel
    /// challenge. On success the flow awaits the code with a fresh
    /// cooldown; on a send failure it returns to collecting with the
    /// error surfaced.
    pub async fn submit_details(&mut self) -> AuthResult<()> {
        if self.state != RegistrationState::Collecting {
            return Err(AuthError::Validation(
                "registration is already past the details step".to_string(),
            ));
        }
        validate_draft(&self.draft)?;
        self.state = RegistrationState::SendingOtp;
        match self.api.send_otp(&self.send_request()).await {
            Ok(()) => {
                self.challenge = Some(OtpChallenge::issue());
                self.code.clear();
                self.state = RegistrationState::AwaitingOtp;
                debug!("challenge issued for {}", self.draft.email);
                Ok(())
            }
            Err(error) => {
                warn!("challenge issuance failed: {error}");
                self.state = RegistrationState::Collecting;
                Err(error)
            }
        }
    }

    /// Request a superseding challenge.
    ///
    /// Rejected locally, with no network call, while the cooldown is
    /// still running. On success the prior challenge is superseded and
    /// the cooldown restarts; on failure the prior challenge stays
    /// active and the flow remains awaiting the code.
    pub async fn resend(&mut self) -> AuthResult<()> {
        if self.state != RegistrationState::AwaitingOtp {
            return Err(AuthError::Validation("no code is being awaited".to_string()));
        }
        let remaining = self.cooldown_remaining();
        if !remaining.is_zero() {
            return Err(AuthError::OtpResendTooSoon {
                remaining: remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0),
            });
        }
        self.state = RegistrationState::Resending;
        match self.api.send_otp(&self.send_request()).await {
            Ok(()) => {
                self.challenge = Some(OtpChallenge::issue());
                self.state = RegistrationState::AwaitingOtp;
                debug!("challenge reissued for {}", self.draft.email);
                Ok(())
            }
            Err(error) => {
                warn!("challenge reissue failed: {error}");
                self.state = RegistrationState::AwaitingOtp;
                Err(error)
            }
        }
    }

    /// Verify the entered code against both channels and, only on
    /// verify success, finalize account creation.
    ///
    /// An incomplete code is rejected locally without a network call. A
    /// failed verify returns to awaiting with the code field cleared. A
    /// failed signup after a successful verify (for example a duplicate
    /// account created concurrently) is terminal for this attempt and is
    /// never retried here; the caller restarts from a fresh draft.
    pub async fn submit_code(&mut self) -> AuthResult<AuthSession> {
        if self.state != RegistrationState::AwaitingOtp {
            return Err(AuthError::Validation("no code is being awaited".to_string()));
        }
        if self.code.len() != OTP_CODE_LEN {
            return Err(AuthError::Validation(format!(
                "enter the {OTP_CODE_LEN}-digit code"
            )));
        }
        self.state = RegistrationState::Verifying;
        let verify = OtpVerifyRequest {
            phone_number: self.draft.phone_number.clone(),
            country_code: self.draft.country_code.clone(),
            phone_otp: self.code.clone(),
            email: self.draft.email.clone(),
            email_otp: self.code.clone(),
        };
        if let Err(error) = self.api.verify_otp(&verify).await {
            warn!("code verification failed: {error}");
            self.code.clear();
            self.state = RegistrationState::AwaitingOtp;
            return Err(error);
        }
        let request = SignupWithOtpRequest {
            details: SignupRequest::from(&self.draft),
            phone_otp: self.code.clone(),
            email_otp: self.code.clone(),
        };
        match self.api.signup_with_otp(&request).await {
            Ok(session) => {
                self.state = RegistrationState::Completed;
                Ok(session)
            }
            Err(error) => {
                warn!("signup failed after verify: {error}");
                self.state = RegistrationState::Failed;
                Err(error)
            }
        }
    }

    /// Abandon the attempt and start over with a fresh draft.
    pub fn restart(&mut self) {
        self.draft = RegistrationDraft::default();
        self.challenge = None;
        self.code.clear();
        self.state = RegistrationState::Collecting;
    }

    fn send_request(&self) -> OtpSendRequest {
        OtpSendRequest {
            phone_number: self.draft.phone_number.clone(),
            country_code: self.draft.country_code.clone(),
            email: self.draft.email.clone(),
        }
    }
}

fn sanitize_code(input: &str) -> String {
    input
        .chars()
        .filter(char::is_ascii_digit)
        .take(OTP_CODE_LEN)
        .collect()
}

fn validate_draft(draft: &RegistrationDraft) -> AuthResult<()> {
    if draft.name.trim().is_empty()
        || draft.email.trim().is_empty()
        || draft.phone_number.is_empty()
        || draft.password.is_empty()
    {
        return Err(AuthError::Validation(
            "please fill all required fields".to_string(),
        ));
    }
    if !draft.email.contains('@') {
        return Err(AuthError::Validation("enter a valid email address".to_string()));
    }
    if !draft.phone_number.chars().all(|c| c.is_ascii_digit()) {
        return Err(AuthError::Validation(
            "phone number must contain only digits".to_string(),
        ));
    }
    if draft.country_code.is_empty() {
        return Err(AuthError::Validation("select a country code".to_string()));
    }
    if draft.password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
