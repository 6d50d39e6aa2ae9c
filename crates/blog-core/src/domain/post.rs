use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::comment::Comment;
use super::like::Like;
use super::meta::{FieldMeta, ModelMeta};
use crate::error::DomainError;
use crate::validation::{FieldErrors, Payload, WriteMode};

/// Maximum length of a post or item title, in characters.
pub const TITLE_MAX_LENGTH: usize = 200;

/// Post entity - represents a blog post or article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub const META: ModelMeta = ModelMeta {
        name: "post",
        verbose_name: "post",
        verbose_name_plural: "posts",
        fields: &[
            FieldMeta::scalar("id"),
            FieldMeta::scalar("title"),
            FieldMeta::scalar("content"),
            FieldMeta::scalar("created_at"),
        ],
    };
}

/// A post together with the rows that reference it.
#[derive(Debug, Clone, PartialEq)]
pub struct PostDetail {
    pub post: Post,
    /// Ordered by id ascending.
    pub likes: Vec<Like>,
    /// Ordered by id ascending.
    pub comments: Vec<Comment>,
}

impl PostDetail {
    pub fn new(post: Post, mut likes: Vec<Like>, mut comments: Vec<Comment>) -> Self {
        likes.sort_by_key(|l| l.id);
        comments.sort_by_key(|c| c.id);
        Self {
            post,
            likes,
            comments,
        }
    }
}

/// Validated input for a new post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

impl NewPost {
    pub fn from_payload(value: &Value) -> Result<Self, DomainError> {
        let payload = Payload::new(value, WriteMode::Create)?;
        let mut errors = FieldErrors::new();
        let title = payload.string("title", Some(TITLE_MAX_LENGTH), &mut errors);
        let content = payload.string("content", None, &mut errors);

        match (title, content) {
            (Some(title), Some(content)) => Ok(Self { title, content }),
            _ => Err(errors.into()),
        }
    }
}

/// Validated field changes for an existing post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostChanges {
    pub fn from_payload(value: &Value, mode: WriteMode) -> Result<Self, DomainError> {
        let payload = Payload::new(value, mode)?;
        let mut errors = FieldErrors::new();
        let changes = Self {
            title: payload.string("title", Some(TITLE_MAX_LENGTH), &mut errors),
            content: payload.string("content", None, &mut errors),
        };
        errors.into_result(changes).map_err(DomainError::from)
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }

    pub fn apply(self, post: &mut Post) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(content) = self.content {
            post.content = content;
        }
    }
}
