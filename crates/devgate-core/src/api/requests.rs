//! Request and response records exchanged with the backend.
//!
//! The wire shapes belong to the backend API; these mirror just the fields
//! the session manager needs.

use serde::{Deserialize, Serialize};

/// Backend paths for the developer authentication endpoints.
pub mod paths {
    pub const LOGIN: &str = "/developer/login";
    pub const CREATE_ACCOUNT: &str = "/developer/create-account";
    pub const LOGOUT: &str = "/developer/logout";
}

/// Credentials for a login attempt. The two-factor code is attached by the
/// retry path after the backend asks for one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "twoFactorCode", skip_serializing_if = "Option::is_none")]
    pub two_factor_code: Option<String>,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            two_factor_code: None,
        }
    }

    /// Attach a two-factor code, consuming the original request.
    pub fn with_two_factor_code(mut self, code: impl Into<String>) -> Self {
        self.two_factor_code = Some(code.into());
        self
    }
}

/// Fields for registering a new developer account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateAccountRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "studioName", skip_serializing_if = "Option::is_none")]
    pub studio_name: Option<String>,
}

/// Tears down the server side of the current session.
#[derive(Debug, Clone, Serialize)]
pub struct LogoutRequest {
    #[serde(rename = "developerClientToken")]
    pub token: String,
}

/// Successful login / create-account reply.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(rename = "DeveloperClientToken")]
    pub token: String,
}
