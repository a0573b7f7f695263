//! HTTP client for the remote gym service.

use super::interceptor::AuthFailureInterceptor;
use super::messages::{
    AnnouncementInfo, ApiDetail, AttendanceRecord, DashboardStats, LoginRequest, OtpSendRequest,
    OtpVerifyRequest, PlanInfo, ProfileUpdateRequest, SignupRequest, SignupWithOtpRequest,
    TodayAttendance,
};
use crate::auth::errors::{AuthError, AuthResult};
use crate::auth::models::{AuthSession, UserProfile};
use crate::auth::session::SessionCore;
use async_trait::async_trait;
use log::debug;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Identity operations of the remote service.
///
/// The session service and registration flow depend on this trait, not
/// on the concrete transport.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Authenticate; fails with `InvalidCredentials` on rejection.
    async fn login(&self, request: &LoginRequest) -> AuthResult<AuthSession>;

    /// Direct signup without OTP (legacy form path).
    async fn signup(&self, request: &SignupRequest) -> AuthResult<AuthSession>;

    /// Issue one challenge on both the phone and email channels.
    async fn send_otp(&self, request: &OtpSendRequest) -> AuthResult<()>;

    /// Validate the shared code against both channels.
    async fn verify_otp(&self, request: &OtpVerifyRequest) -> AuthResult<()>;

    /// Finalize account creation; only called after a successful verify.
    async fn signup_with_otp(&self, request: &SignupWithOtpRequest) -> AuthResult<AuthSession>;

    /// Fetch the profile behind the current bearer token.
    async fn me(&self) -> AuthResult<UserProfile>;
}

/// API client for communicating with the gym service.
///
/// Requests split into two paths: session-bearing calls carry the
/// bearer token and are watched by the auth-failure interceptor, while
/// the login/signup/OTP calls are sent bare: there is no session to
/// invalidate while one is being established, so they are structurally
/// exempt from the interceptor.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    core: Arc<SessionCore>,
    interceptor: Option<Arc<AuthFailureInterceptor>>,
}

impl ApiClient {
    /// Create a new API client without interceptor wiring.
    #[must_use]
    pub fn new(base_url: String, core: Arc<SessionCore>) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
            core,
            interceptor: None,
        }
    }

    /// Attach the global auth-failure interceptor.
    #[must_use]
    pub fn with_interceptor(mut self, interceptor: Arc<AuthFailureInterceptor>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url.trim_end_matches('/'))
    }

    /// Send a public (non-session-bearing) request.
    async fn send_public(&self, request: RequestBuilder) -> AuthResult<Response> {
        request
            .send()
            .await
            .map_err(|error| AuthError::Network(error.to_string()))
    }

    /// Send a session-bearing request. A 401 invalidates the session
    /// through the interceptor and surfaces as `AuthExpired`.
    async fn send_authed(&self, request: RequestBuilder) -> AuthResult<Response> {
        let request = match self.core.bearer() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request
            .send()
            .await
            .map_err(|error| AuthError::Network(error.to_string()))?;
        if response.status() == StatusCode::UNAUTHORIZED {
            if let Some(interceptor) = &self.interceptor {
                interceptor.on_auth_rejected();
            }
            return Err(AuthError::AuthExpired);
        }
        Ok(response)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> AuthResult<T> {
        response
            .json()
            .await
            .map_err(|error| AuthError::Network(format!("invalid response body: {error}")))
    }

    /// Extract the service's `detail` message from an error response.
    async fn error_detail(response: Response) -> (StatusCode, String) {
        let status = response.status();
        let detail = response
            .json::<ApiDetail>()
            .await
            .ok()
            .and_then(|body| body.detail)
            .unwrap_or_else(|| status.to_string());
        debug!("request rejected: {status} {detail}");
        (status, detail)
    }

    async fn parse_authed<T: DeserializeOwned>(response: Response) -> AuthResult<T> {
        if response.status().is_success() {
            Self::parse(response).await
        } else {
            let (_, detail) = Self::error_detail(response).await;
            Err(AuthError::Server(detail))
        }
    }

    /// Admin roster of members and trainers.
    pub async fn list_users(&self) -> AuthResult<Vec<UserProfile>> {
        let response = self.send_authed(self.client.get(self.url("/users"))).await?;
        Self::parse_authed(response).await
    }

    /// Membership plans, optionally only the active ones.
    pub async fn list_plans(&self, active_only: bool) -> AuthResult<Vec<PlanInfo>> {
        let response = self
            .send_authed(
                self.client
                    .get(self.url("/plans"))
                    .query(&[("active_only", active_only)]),
            )
            .await?;
        Self::parse_authed(response).await
    }

    /// Gym-wide announcements.
    pub async fn list_announcements(&self) -> AuthResult<Vec<AnnouncementInfo>> {
        let response = self
            .send_authed(self.client.get(self.url("/announcements")))
            .await?;
        Self::parse_authed(response).await
    }

    /// Mark a check-in by member id (accepts `F3-XXXX` or the user id).
    pub async fn mark_attendance(&self, member_id: &str) -> AuthResult<AttendanceRecord> {
        let response = self
            .send_authed(
                self.client
                    .post(self.url("/attendance"))
                    .json(&serde_json::json!({ "member_id": member_id })),
            )
            .await?;
        Self::parse_authed(response).await
    }

    /// Today's check-ins with presence counts.
    pub async fn today_attendance(&self) -> AuthResult<TodayAttendance> {
        let response = self
            .send_authed(self.client.get(self.url("/attendance/today")))
            .await?;
        Self::parse_authed(response).await
    }

    /// Admin dashboard counters.
    pub async fn dashboard_stats(&self) -> AuthResult<DashboardStats> {
        let response = self
            .send_authed(self.client.get(self.url("/dashboard/stats")))
            .await?;
        Self::parse_authed(response).await
    }

    /// Remote profile update. The caller feeds the result through the
    /// session service so the persisted copy tracks the active tier.
    pub async fn update_user(
        &self,
        user_id: &str,
        request: &ProfileUpdateRequest,
    ) -> AuthResult<UserProfile> {
        let response = self
            .send_authed(
                self.client
                    .put(self.url(&format!("/users/{user_id}")))
                    .json(request),
            )
            .await?;
        Self::parse_authed(response).await
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, request: &LoginRequest) -> AuthResult<AuthSession> {
        let response = self
            .send_public(self.client.post(self.url("/auth/login")).json(request))
            .await?;
        if response.status().is_success() {
            return Self::parse(response).await;
        }
        let (status, detail) = Self::error_detail(response).await;
        Err(match status {
            StatusCode::UNAUTHORIZED => AuthError::InvalidCredentials,
            _ => AuthError::Server(detail),
        })
    }

    async fn signup(&self, request: &SignupRequest) -> AuthResult<AuthSession> {
        let response = self
            .send_public(self.client.post(self.url("/auth/signup")).json(request))
            .await?;
        if response.status().is_success() {
            return Self::parse(response).await;
        }
        let (status, detail) = Self::error_detail(response).await;
        Err(match status {
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT => AuthError::Conflict(detail),
            _ => AuthError::Server(detail),
        })
    }

    async fn send_otp(&self, request: &OtpSendRequest) -> AuthResult<()> {
        let response = self
            .send_public(self.client.post(self.url("/otp/send")).json(request))
            .await?;
        if response.status().is_success() {
            return Ok(());
        }
        let (status, detail) = Self::error_detail(response).await;
        Err(match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                AuthError::Validation(detail)
            }
            _ => AuthError::Server(detail),
        })
    }

    async fn verify_otp(&self, request: &OtpVerifyRequest) -> AuthResult<()> {
        let response = self
            .send_public(self.client.post(self.url("/otp/verify")).json(request))
            .await?;
        if response.status().is_success() {
            return Ok(());
        }
        let (status, detail) = Self::error_detail(response).await;
        Err(match status {
            StatusCode::BAD_REQUEST => AuthError::OtpExpiredOrInvalid,
            _ => AuthError::Server(detail),
        })
    }

    async fn signup_with_otp(&self, request: &SignupWithOtpRequest) -> AuthResult<AuthSession> {
        let response = self
            .send_public(
                self.client
                    .post(self.url("/auth/signup-with-otp"))
                    .json(request),
            )
            .await?;
        if response.status().is_success() {
            return Self::parse(response).await;
        }
        let (status, detail) = Self::error_detail(response).await;
        Err(match status {
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT => AuthError::Conflict(detail),
            _ => AuthError::Server(detail),
        })
    }

    async fn me(&self) -> AuthResult<UserProfile> {
        let response = self.send_authed(self.client.get(self.url("/auth/me"))).await?;
        Self::parse_authed(response).await
    }
}
