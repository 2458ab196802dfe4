use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull, NoneAsEmptyString};

use crate::{id::RecordId, timestamp};

/// A blog post. `content` is Markdown source.
#[serde_as]
#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct Post {
    pub id: RecordId,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub title: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub content: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub categories: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub created_at: Option<DateTime<Utc>>,
}

/// The writable part of a [`Post`], sent on insert and update.
#[serde_as]
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub categories: String,
    pub tags: Vec<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub cover: Option<String>,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
}
