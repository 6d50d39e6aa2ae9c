use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::meta::{FieldMeta, ModelMeta};
use crate::error::DomainError;
use crate::validation::{FieldErrors, Payload, WriteMode};

/// Like entity - one anonymous like on a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    pub id: i64,
    pub post_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub const META: ModelMeta = ModelMeta {
        name: "like",
        verbose_name: "like",
        verbose_name_plural: "likes",
        fields: &[
            FieldMeta::scalar("id"),
            FieldMeta::foreign_key("post_id", "post"),
            FieldMeta::scalar("created_at"),
        ],
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLike {
    pub post_id: i64,
}

impl NewLike {
    pub fn from_payload(
        value: &Value,
        post_exists: impl Fn(i64) -> bool,
    ) -> Result<Self, DomainError> {
        let payload = Payload::new(value, WriteMode::Create)?;
        let mut errors = FieldErrors::new();

        match payload.primary_key("post", post_exists, &mut errors) {
            Some(post_id) => Ok(Self { post_id }),
            None => Err(errors.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LikeChanges {
    pub post_id: Option<i64>,
}

impl LikeChanges {
    pub fn from_payload(
        value: &Value,
        mode: WriteMode,
        post_exists: impl Fn(i64) -> bool,
    ) -> Result<Self, DomainError> {
        let payload = Payload::new(value, mode)?;
        let mut errors = FieldErrors::new();
        let changes = Self {
            post_id: payload.primary_key("post", post_exists, &mut errors),
        };
        errors.into_result(changes).map_err(DomainError::from)
    }

    pub fn is_empty(&self) -> bool {
        self.post_id.is_none()
    }

    pub fn apply(self, like: &mut Like) {
        if let Some(post_id) = self.post_id {
            like.post_id = post_id;
        }
    }
}
