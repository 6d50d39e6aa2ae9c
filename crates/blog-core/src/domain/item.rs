use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::meta::{FieldMeta, ModelMeta};
use super::post::TITLE_MAX_LENGTH;
use crate::error::DomainError;
use crate::validation::{FieldErrors, Payload, WriteMode};

/// Item entity - a generic titled record listed by the front-end grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub const META: ModelMeta = ModelMeta {
        name: "item",
        verbose_name: "item",
        verbose_name_plural: "items",
        fields: &[
            FieldMeta::scalar("id"),
            FieldMeta::scalar("title"),
            FieldMeta::scalar("created_at"),
            FieldMeta::scalar("updated_at"),
        ],
    };
}

/// Validated input for a new item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub title: String,
}

impl NewItem {
    pub fn from_payload(value: &Value) -> Result<Self, DomainError> {
        let payload = Payload::new(value, WriteMode::Create)?;
        let mut errors = FieldErrors::new();
        let title = payload.string("title", Some(TITLE_MAX_LENGTH), &mut errors);

        match title {
            Some(title) => Ok(Self { title }),
            None => Err(errors.into()),
        }
    }
}
