//! Integration tests for the OTP registration flow.
//!
//! Drives the two-step state machine against a scripted identity
//! service that issues a fresh expected code on every send, so
//! challenge supersession is observable.

use async_trait::async_trait;
use fitgym::auth::{
    AuthError, AuthResult, AuthSession, RegistrationFlow, RegistrationState, Role, SessionCore,
    SessionService, UserProfile,
};
use fitgym::credentials::{CredentialSlot, CredentialStore};
use fitgym::net::AuthApi;
use fitgym::net::messages::{
    LoginRequest, OtpSendRequest, OtpVerifyRequest, SignupRequest, SignupWithOtpRequest,
};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Storage slot whose contents stay observable after the store takes
/// ownership.
#[derive(Clone, Default)]
struct SharedSlot(Arc<Mutex<Option<String>>>);

impl CredentialSlot for SharedSlot {
    fn read(&self) -> Option<String> {
        self.0.lock().unwrap().clone()
    }

    fn write(&self, payload: &str) -> io::Result<()> {
        *self.0.lock().unwrap() = Some(payload.to_string());
        Ok(())
    }

    fn remove(&self) {
        *self.0.lock().unwrap() = None;
    }
}

/// Scripted OTP service. Every send issues a fresh expected code
/// (`111111`, then `222222`, ...), superseding the previous challenge.
#[derive(Default)]
struct MockOtpApi {
    send_calls: AtomicUsize,
    verify_calls: AtomicUsize,
    signup_calls: AtomicUsize,
    fail_next_send: AtomicBool,
    fail_signup: AtomicBool,
    expected_code: Mutex<Option<String>>,
}

impl MockOtpApi {
    fn sends(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    fn verifies(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthApi for MockOtpApi {
    async fn login(&self, _request: &LoginRequest) -> AuthResult<AuthSession> {
        Err(AuthError::Server("not scripted".to_string()))
    }

    async fn signup(&self, _request: &SignupRequest) -> AuthResult<AuthSession> {
        Err(AuthError::Server("not scripted".to_string()))
    }

    async fn send_otp(&self, _request: &OtpSendRequest) -> AuthResult<()> {
        if self.fail_next_send.swap(false, Ordering::SeqCst) {
            return Err(AuthError::Server("delivery failed".to_string()));
        }
        let issued = self.send_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let digit = char::from_digit(u32::try_from(issued % 10).unwrap(), 10).unwrap();
        *self.expected_code.lock().unwrap() = Some(digit.to_string().repeat(6));
        Ok(())
    }

    async fn verify_otp(&self, request: &OtpVerifyRequest) -> AuthResult<()> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        let expected = self.expected_code.lock().unwrap().clone();
        match expected {
            Some(code) if request.phone_otp == code && request.email_otp == code => Ok(()),
            _ => Err(AuthError::OtpExpiredOrInvalid),
        }
    }

    async fn signup_with_otp(&self, request: &SignupWithOtpRequest) -> AuthResult<AuthSession> {
        self.signup_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_signup.load(Ordering::SeqCst) {
            return Err(AuthError::Conflict(
                "Email or phone number already registered".to_string(),
            ));
        }
        Ok(AuthSession {
            token: "tok-new".to_string(),
            user: UserProfile {
                id: "u-new".to_string(),
                member_id: "F3-0042".to_string(),
                name: request.details.name.clone(),
                email: request.details.email.clone(),
                phone_number: request.details.phone_number.clone(),
                role: Role::Member,
                gender: None,
                date_of_birth: None,
                profile_photo_url: None,
                trainer_id: None,
            },
        })
    }

    async fn me(&self) -> AuthResult<UserProfile> {
        Err(AuthError::Server("not scripted".to_string()))
    }
}

fn flow_with(api: &Arc<MockOtpApi>) -> RegistrationFlow {
    let mut flow = RegistrationFlow::new(Arc::clone(api) as Arc<dyn AuthApi>);
    let draft = flow.draft_mut();
    draft.name = "A".to_string();
    draft.email = "a@x.com".to_string();
    draft.phone_number = "9000000000".to_string();
    draft.country_code = "+91".to_string();
    draft.password = "abcdef".to_string();
    flow
}

// ============================================================================
// Details step
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_submitting_details_issues_challenge_and_starts_cooldown() {
    let api = Arc::new(MockOtpApi::default());
    let mut flow = flow_with(&api);
    assert_eq!(flow.state(), RegistrationState::Collecting);

    flow.submit_details().await.unwrap();

    assert_eq!(flow.state(), RegistrationState::AwaitingOtp);
    assert_eq!(flow.cooldown_remaining(), Duration::from_secs(60));
    assert!(!flow.resend_available());
    assert_eq!(api.sends(), 1);
}

#[tokio::test]
async fn test_incomplete_draft_fails_locally_without_network() {
    let api = Arc::new(MockOtpApi::default());
    let mut flow = RegistrationFlow::new(Arc::clone(&api) as Arc<dyn AuthApi>);
    flow.draft_mut().name = "A".to_string();

    let result = flow.submit_details().await;

    assert!(matches!(result, Err(AuthError::Validation(_))));
    assert_eq!(flow.state(), RegistrationState::Collecting);
    assert_eq!(api.sends(), 0);
}

#[tokio::test]
async fn test_weak_password_fails_locally_without_network() {
    let api = Arc::new(MockOtpApi::default());
    let mut flow = flow_with(&api);
    flow.draft_mut().password = "abc".to_string();

    let result = flow.submit_details().await;

    assert!(matches!(result, Err(AuthError::Validation(_))));
    assert_eq!(api.sends(), 0);
}

#[tokio::test]
async fn test_send_failure_returns_to_collecting() {
    let api = Arc::new(MockOtpApi::default());
    api.fail_next_send.store(true, Ordering::SeqCst);
    let mut flow = flow_with(&api);

    let result = flow.submit_details().await;

    assert!(matches!(result, Err(AuthError::Server(_))));
    assert_eq!(flow.state(), RegistrationState::Collecting);
}

// ============================================================================
// Code entry and resend
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_short_code_rejected_locally() {
    let api = Arc::new(MockOtpApi::default());
    let mut flow = flow_with(&api);
    flow.submit_details().await.unwrap();

    flow.set_code("123");
    let result = flow.submit_code().await;

    assert!(matches!(result, Err(AuthError::Validation(_))));
    assert_eq!(flow.state(), RegistrationState::AwaitingOtp);
    assert_eq!(api.verifies(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_code_input_is_sanitized() {
    let api = Arc::new(MockOtpApi::default());
    let mut flow = flow_with(&api);
    flow.submit_details().await.unwrap();

    flow.set_code(" 11-11 11x9");
    assert_eq!(flow.code(), "111111");
}

#[tokio::test(start_paused = true)]
async fn test_resend_during_cooldown_makes_no_network_call() {
    let api = Arc::new(MockOtpApi::default());
    let mut flow = flow_with(&api);
    flow.submit_details().await.unwrap();
    tokio::time::advance(Duration::from_secs(30)).await;

    let result = flow.resend().await;

    assert!(matches!(
        result,
        Err(AuthError::OtpResendTooSoon { remaining: 30 })
    ));
    assert_eq!(flow.state(), RegistrationState::AwaitingOtp);
    assert_eq!(api.sends(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_resend_after_cooldown_supersedes_challenge() {
    let api = Arc::new(MockOtpApi::default());
    let mut flow = flow_with(&api);
    flow.submit_details().await.unwrap();
    tokio::time::advance(Duration::from_secs(60)).await;
    assert!(flow.resend_available());

    flow.resend().await.unwrap();
    assert_eq!(api.sends(), 2);
    assert_eq!(flow.cooldown_remaining(), Duration::from_secs(60));

    // The first challenge's code no longer verifies.
    flow.set_code("111111");
    let result = flow.submit_code().await;
    assert!(matches!(result, Err(AuthError::OtpExpiredOrInvalid)));
    assert_eq!(flow.state(), RegistrationState::AwaitingOtp);
    assert_eq!(flow.code(), "", "rejected code is cleared");

    // The superseding challenge's code does.
    flow.set_code("222222");
    flow.submit_code().await.unwrap();
    assert_eq!(flow.state(), RegistrationState::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_resend_failure_keeps_prior_challenge_active() {
    let api = Arc::new(MockOtpApi::default());
    let mut flow = flow_with(&api);
    flow.submit_details().await.unwrap();
    tokio::time::advance(Duration::from_secs(60)).await;
    api.fail_next_send.store(true, Ordering::SeqCst);

    let result = flow.resend().await;

    assert!(matches!(result, Err(AuthError::Server(_))));
    assert_eq!(flow.state(), RegistrationState::AwaitingOtp);
    flow.set_code("111111");
    flow.submit_code().await.unwrap();
    assert_eq!(flow.state(), RegistrationState::Completed);
}

// ============================================================================
// Verification and completion
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_happy_path_establishes_durable_session() {
    let durable = SharedSlot::default();
    let ephemeral = SharedSlot::default();
    let store =
        CredentialStore::with_slots(Box::new(durable.clone()), Box::new(ephemeral.clone()));
    let core = Arc::new(SessionCore::new(store));
    let api = Arc::new(MockOtpApi::default());
    let service = SessionService::new(Arc::clone(&core), Arc::clone(&api) as Arc<dyn AuthApi>);

    let mut flow = flow_with(&api);
    flow.submit_details().await.unwrap();
    assert_eq!(flow.state(), RegistrationState::AwaitingOtp);

    let user = service.signup_with_otp(&mut flow, "111111").await.unwrap();

    assert_eq!(flow.state(), RegistrationState::Completed);
    assert_eq!(user.name, "A");
    assert_eq!(api.verifies(), 1);
    // Registration always establishes a durable session.
    let payload = durable.0.lock().unwrap().clone().unwrap();
    assert!(payload.contains("tok-new"));
    assert!(payload.contains("\"remember\":true"));
    assert!(ephemeral.0.lock().unwrap().is_none());
    let snapshot = service.snapshot();
    assert!(snapshot.is_authenticated());
    assert!(snapshot.remember);
}

#[tokio::test(start_paused = true)]
async fn test_verify_failure_returns_to_awaiting_with_code_cleared() {
    let api = Arc::new(MockOtpApi::default());
    let mut flow = flow_with(&api);
    flow.submit_details().await.unwrap();

    flow.set_code("999999");
    let result = flow.submit_code().await;

    assert!(matches!(result, Err(AuthError::OtpExpiredOrInvalid)));
    assert_eq!(flow.state(), RegistrationState::AwaitingOtp);
    assert_eq!(flow.code(), "");
    assert_eq!(api.signup_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_signup_conflict_after_verify_is_terminal() {
    let api = Arc::new(MockOtpApi::default());
    api.fail_signup.store(true, Ordering::SeqCst);
    let mut flow = flow_with(&api);
    flow.submit_details().await.unwrap();

    flow.set_code("111111");
    let result = flow.submit_code().await;

    assert!(matches!(result, Err(AuthError::Conflict(_))));
    assert_eq!(flow.state(), RegistrationState::Failed);
    assert_eq!(api.signup_calls.load(Ordering::SeqCst), 1, "no silent retry");

    // Submitting again is rejected; the caller must restart.
    flow.set_code("111111");
    assert!(flow.submit_code().await.is_err());
    assert_eq!(api.signup_calls.load(Ordering::SeqCst), 1);

    flow.restart();
    assert_eq!(flow.state(), RegistrationState::Collecting);
    assert!(flow.draft().name.is_empty(), "restart discards the draft");
}
