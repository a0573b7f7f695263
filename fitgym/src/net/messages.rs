//! Request and response bodies for the remote gym service.

use crate::auth::models::RegistrationDraft;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Login request. The identifier matches either email or phone number.
#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest {
    pub email_or_phone: String,
    pub password: String,
}

/// Direct signup request (legacy form path, no OTP).
#[derive(Clone, Debug, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub country_code: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

impl From<&RegistrationDraft> for SignupRequest {
    fn from(draft: &RegistrationDraft) -> Self {
        Self {
            name: draft.name.clone(),
            email: draft.email.clone(),
            phone_number: draft.phone_number.clone(),
            country_code: draft.country_code.clone(),
            password: draft.password.clone(),
            gender: draft.gender.clone(),
            date_of_birth: draft.date_of_birth,
        }
    }
}

/// Dual-channel OTP issuance request. One call issues challenges on both
/// the phone and email channels.
#[derive(Clone, Debug, Serialize)]
pub struct OtpSendRequest {
    pub phone_number: String,
    pub country_code: String,
    pub email: String,
}

/// OTP verification request. The service validates one shared code
/// against both independently issued challenges.
#[derive(Clone, Debug, Serialize)]
pub struct OtpVerifyRequest {
    pub phone_number: String,
    pub country_code: String,
    pub phone_otp: String,
    pub email: String,
    pub email_otp: String,
}

/// Account-finalizing signup carrying the verified code for both
/// channels. Must only be sent after a successful verify.
#[derive(Clone, Debug, Serialize)]
pub struct SignupWithOtpRequest {
    #[serde(flatten)]
    pub details: SignupRequest,
    pub phone_otp: String,
    pub email_otp: String,
}

/// Partial profile update; only populated fields are sent.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ProfileUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo_url: Option<String>,
}

/// Error body returned by the service.
#[derive(Debug, Deserialize)]
pub struct ApiDetail {
    #[serde(default)]
    pub detail: Option<String>,
}

/// Membership plan summary.
#[derive(Clone, Debug, Deserialize)]
pub struct PlanInfo {
    pub id: String,
    pub name: String,
    pub duration_days: i64,
    pub price: f64,
    #[serde(default)]
    pub is_active: bool,
}

/// Gym-wide announcement.
#[derive(Clone, Debug, Deserialize)]
pub struct AnnouncementInfo {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
}

/// A single check-in.
#[derive(Clone, Debug, Deserialize)]
pub struct AttendanceRecord {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub member_id: Option<String>,
    pub check_in_time: String,
}

/// Today's check-ins with presence counts.
#[derive(Clone, Debug, Deserialize)]
pub struct TodayAttendance {
    pub present: Vec<AttendanceRecord>,
    pub present_count: i64,
    pub absent_count: i64,
}

/// Admin dashboard counters.
#[derive(Clone, Debug, Deserialize)]
pub struct DashboardStats {
    pub total_members: i64,
    pub active_memberships: i64,
    pub today_collection: f64,
    pub present_today: i64,
    pub absent_today: i64,
}
