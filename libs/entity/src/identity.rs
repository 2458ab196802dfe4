use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The signed-in operator.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}
