use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::{id::RecordId, timestamp};

#[serde_as]
#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct Friend {
    pub id: RecordId,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub content: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct FriendDraft {
    pub content: String,
    pub tags: Vec<String>,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
}
