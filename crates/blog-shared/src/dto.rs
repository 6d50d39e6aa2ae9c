//! Data Transfer Objects - the JSON shapes served by the API.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Items expose only their id and title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResponse {
    pub id: i64,
    pub title: String,
}

/// A post with its likes and comments embedded (read-only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub likes: Vec<LikeResponse>,
    pub comments: Vec<CommentResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: i64,
    /// Id of the post this comment belongs to.
    pub post: i64,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikeResponse {
    pub id: i64,
    pub post: i64,
    pub created_at: DateTime<Utc>,
}

/// API root: resource basename to collection URL.
pub type ApiRootResponse = BTreeMap<String, String>;

/// One entry of the admin index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminModelEntry {
    pub model: String,
    pub verbose_name: String,
    pub verbose_name_plural: String,
    pub list_display: Vec<String>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminIndexResponse {
    pub site_name: String,
    pub models: Vec<AdminModelEntry>,
}

/// Admin list view: the configured columns and one object per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminChangeListResponse {
    pub model: String,
    pub columns: Vec<String>,
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
    pub count: usize,
}
