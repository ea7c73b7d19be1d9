use serde::{Deserialize, Serialize};

/// `{ "message": ... }`, the body of every non-token response.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of both login and register. Missing fields read as empty and fail validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: BannerEndpoints,
    pub default_admin: DefaultAdminNotice,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerEndpoints {
    pub login: &'static str,
    pub register: &'static str,
    pub change_password: &'static str,
    pub health: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DefaultAdminNotice {
    pub username: &'static str,
    pub password: &'static str,
    pub note: &'static str,
}
