//! Comments on posts.

use async_trait::async_trait;
use blog_core::WriteMode;
use blog_core::domain::{CommentChanges, NewComment};
use blog_core::error::DomainError;
use blog_core::validation::referenced_pk;
use blog_shared::dto::CommentResponse;
use serde_json::Value;

use super::{or_not_found, post_exists};
use crate::middleware::error::AppResult;
use crate::routing::{Capabilities, ResourceHandler};
use crate::serializers::IntoDto;
use crate::state::AppState;

const ENTITY: &str = "Comment";

#[derive(Default)]
pub struct CommentHandler;

#[async_trait]
impl ResourceHandler for CommentHandler {
    const BASENAME: &'static str = "comments";
    const CAPABILITIES: Capabilities = Capabilities::FULL;

    type Record = CommentResponse;

    async fn list(&self, state: &AppState) -> AppResult<Vec<CommentResponse>> {
        let comments = state.comments.list().await?;
        tracing::debug!(count = comments.len(), "Listing comments");
        Ok(comments.into_iter().map(IntoDto::into_dto).collect())
    }

    async fn create(&self, state: &AppState, payload: Value) -> AppResult<CommentResponse> {
        let post_id = referenced_pk(&payload, "post");
        let exists = post_exists(state, post_id).await?;

        let new_comment = NewComment::from_payload(&payload, |id| exists && Some(id) == post_id)?;
        let comment = state.comments.create(new_comment).await?;
        tracing::info!(comment_id = comment.id, post_id = comment.post_id, "Comment created");
        Ok(comment.into_dto())
    }

    async fn retrieve(&self, state: &AppState, id: i64) -> AppResult<CommentResponse> {
        tracing::debug!(comment_id = id, "Retrieving comment");
        let comment = state
            .comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))?;
        Ok(comment.into_dto())
    }

    async fn update(
        &self,
        state: &AppState,
        id: i64,
        payload: Value,
        mode: WriteMode,
    ) -> AppResult<CommentResponse> {
        if state.comments.find_by_id(id).await?.is_none() {
            return Err(DomainError::not_found(ENTITY, id).into());
        }

        let post_id = referenced_pk(&payload, "post");
        let exists = post_exists(state, post_id).await?;
        let changes =
            CommentChanges::from_payload(&payload, mode, |pk| exists && Some(pk) == post_id)?;

        let comment = state
            .comments
            .update(id, changes)
            .await
            .map_err(or_not_found(ENTITY, id))?;
        tracing::info!(comment_id = id, ?mode, "Comment updated");
        Ok(comment.into_dto())
    }

    async fn destroy(&self, state: &AppState, id: i64) -> AppResult<()> {
        state
            .comments
            .delete(id)
            .await
            .map_err(or_not_found(ENTITY, id))?;
        tracing::info!(comment_id = id, "Comment deleted");
        Ok(())
    }
}
