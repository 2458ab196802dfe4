use std::fmt;

use chrono::{DateTime, Duration, Utc};
use entity::{identity::Identity, timestamp};
use serde::Deserialize;

/// Refresh this long before the access token actually expires.
const EXPIRY_MARGIN_SECS: i64 = 10;

#[derive(Clone, PartialEq, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    /// Unix seconds. Older GoTrue releases omit it; see [`Session::stamp`].
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub last_sign_in_at: Option<String>,
}

impl Session {
    /// Fills in `expires_at` from `expires_in` when the server left it out.
    pub fn stamp(mut self, received_at: DateTime<Utc>) -> Self {
        if self.expires_at.is_none() {
            self.expires_at =
                Some(received_at.timestamp() + self.expires_in.max(0));
        }
        self
    }

    pub fn is_expiring(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                now + Duration::seconds(EXPIRY_MARGIN_SECS)
                    >= DateTime::from_timestamp(expires_at, 0)
                        .unwrap_or(DateTime::<Utc>::MIN_UTC)
            }
            None => false,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.user.id.clone(),
            email: self.user.email.clone().unwrap_or_default(),
            last_sign_in_at: self
                .user
                .last_sign_in_at
                .as_deref()
                .and_then(timestamp::parse),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthChangeEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthEvent {
    pub kind: AuthChangeEvent,
    pub session: Option<Session>,
}

impl AuthEvent {
    pub fn new(kind: AuthChangeEvent, session: Option<Session>) -> Self {
        Self { kind, session }
    }

    pub fn identity(&self) -> Option<Identity> {
        self.session.as_ref().map(Session::identity)
    }
}
