use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::meta::{FieldMeta, ModelMeta};
use crate::error::DomainError;
use crate::validation::{FieldErrors, Payload, WriteMode};

pub const AUTHOR_MAX_LENGTH: usize = 100;

/// Comment entity - a reader's reply attached to a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub const META: ModelMeta = ModelMeta {
        name: "comment",
        verbose_name: "comment",
        verbose_name_plural: "comments",
        fields: &[
            FieldMeta::scalar("id"),
            FieldMeta::foreign_key("post_id", "post"),
            FieldMeta::scalar("author"),
            FieldMeta::scalar("content"),
            FieldMeta::scalar("created_at"),
        ],
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub post_id: i64,
    pub author: String,
    pub content: String,
}

impl NewComment {
    /// `post_exists` answers whether the referenced post is present.
    pub fn from_payload(
        value: &Value,
        post_exists: impl Fn(i64) -> bool,
    ) -> Result<Self, DomainError> {
        let payload = Payload::new(value, WriteMode::Create)?;
        let mut errors = FieldErrors::new();
        let post_id = payload.primary_key("post", post_exists, &mut errors);
        let author = payload.string("author", Some(AUTHOR_MAX_LENGTH), &mut errors);
        let content = payload.string("content", None, &mut errors);

        match (post_id, author, content) {
            (Some(post_id), Some(author), Some(content)) => Ok(Self {
                post_id,
                author,
                content,
            }),
            _ => Err(errors.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentChanges {
    pub post_id: Option<i64>,
    pub author: Option<String>,
    pub content: Option<String>,
}

impl CommentChanges {
    pub fn from_payload(
        value: &Value,
        mode: WriteMode,
        post_exists: impl Fn(i64) -> bool,
    ) -> Result<Self, DomainError> {
        let payload = Payload::new(value, mode)?;
        let mut errors = FieldErrors::new();
        let changes = Self {
            post_id: payload.primary_key("post", post_exists, &mut errors),
            author: payload.string("author", Some(AUTHOR_MAX_LENGTH), &mut errors),
            content: payload.string("content", None, &mut errors),
        };
        errors.into_result(changes).map_err(DomainError::from)
    }

    pub fn is_empty(&self) -> bool {
        self.post_id.is_none() && self.author.is_none() && self.content.is_none()
    }

    pub fn apply(self, comment: &mut Comment) {
        if let Some(post_id) = self.post_id {
            comment.post_id = post_id;
        }
        if let Some(author) = self.author {
            comment.author = author;
        }
        if let Some(content) = self.content {
            comment.content = content;
        }
    }
}
