use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Successful login/signup body: the user and an opaque access token,
/// always replaced together.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub user: UserProfile,
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub session_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub browser: String,
    pub os: String,
    pub device: String,
}

/// One live session of the account as the server tracks it. The record whose
/// `session_token` equals this tab's access token is the current device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSessionRecord {
    pub id: String,
    pub session_token: String,
    pub device_info: DeviceInfo,
    pub ip_address: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ActiveSessionRecord {
    pub fn is_current(&self, access_token: &str) -> bool {
        self.session_token == access_token
    }
}

/// Every backend response is wrapped in `{success, data?, message?, code?}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default = "none")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

fn none<T>() -> Option<T> {
    None
}

pub const CODE_SESSION_EXPIRED: &str = "SESSION_EXPIRED";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("{message}")]
    Server {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("browser storage unavailable: {0}")]
    Storage(String),
    #[error("session expired")]
    SessionExpired,
}

impl ApiError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }

    /// Message suitable for inline form display. Technical failure classes
    /// collapse to a generic line rather than leaking transport details.
    pub fn form_message(&self) -> String {
        match self {
            ApiError::Server { message, .. } => message.clone(),
            ApiError::SessionExpired => "Your session has expired. Please sign in again.".into(),
            _ => "Something went wrong. Please try again.".into(),
        }
    }
}

impl From<ApiError> for String {
    fn from(error: ApiError) -> Self {
        error.to_string()
    }
}
