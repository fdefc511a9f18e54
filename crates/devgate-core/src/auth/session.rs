//! Authenticated identity held by the session manager.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One authenticated identity: the developer's login id and the bearer token
/// issued by the backend. Replaced wholesale on every successful
/// authentication, never merged; cleared on logout and on any
/// authentication failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
            created_at: Utc::now(),
        }
    }
}
