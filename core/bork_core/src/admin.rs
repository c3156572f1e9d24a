//! Admin sessions.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long an admin login stays valid.
pub const ADMIN_SESSION_TTL_HOURS: i64 = 24;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    pub username: String,
    pub issued_at: DateTime<Utc>,
}

impl AdminSession {
    pub fn new(username: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        Self {
            username: username.into(),
            issued_at,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + Duration::hours(ADMIN_SESSION_TTL_HOURS)
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now >= self.issued_at && now < self.expires_at()
    }
}
