//! Likes on posts.

use async_trait::async_trait;
use blog_core::WriteMode;
use blog_core::domain::{LikeChanges, NewLike};
use blog_core::error::DomainError;
use blog_core::validation::referenced_pk;
use blog_shared::dto::LikeResponse;
use serde_json::Value;

use super::{or_not_found, post_exists};
use crate::middleware::error::AppResult;
use crate::routing::{Capabilities, ResourceHandler};
use crate::serializers::IntoDto;
use crate::state::AppState;

const ENTITY: &str = "Like";

#[derive(Default)]
pub struct LikeHandler;

#[async_trait]
impl ResourceHandler for LikeHandler {
    const BASENAME: &'static str = "likes";
    const CAPABILITIES: Capabilities = Capabilities::FULL;

    type Record = LikeResponse;

    async fn list(&self, state: &AppState) -> AppResult<Vec<LikeResponse>> {
        let likes = state.likes.list().await?;
        tracing::debug!(count = likes.len(), "Listing likes");
        Ok(likes.into_iter().map(IntoDto::into_dto).collect())
    }

    async fn create(&self, state: &AppState, payload: Value) -> AppResult<LikeResponse> {
        let post_id = referenced_pk(&payload, "post");
        let exists = post_exists(state, post_id).await?;

        let new_like = NewLike::from_payload(&payload, |id| exists && Some(id) == post_id)?;
        let like = state.likes.create(new_like).await?;
        tracing::info!(like_id = like.id, post_id = like.post_id, "Like created");
        Ok(like.into_dto())
    }

    async fn retrieve(&self, state: &AppState, id: i64) -> AppResult<LikeResponse> {
        tracing::debug!(like_id = id, "Retrieving like");
        let like = state
            .likes
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))?;
        Ok(like.into_dto())
    }

    async fn update(
        &self,
        state: &AppState,
        id: i64,
        payload: Value,
        mode: WriteMode,
    ) -> AppResult<LikeResponse> {
        if state.likes.find_by_id(id).await?.is_none() {
            return Err(DomainError::not_found(ENTITY, id).into());
        }

        let post_id = referenced_pk(&payload, "post");
        let exists = post_exists(state, post_id).await?;
        let changes =
            LikeChanges::from_payload(&payload, mode, |pk| exists && Some(pk) == post_id)?;

        let like = state
            .likes
            .update(id, changes)
            .await
            .map_err(or_not_found(ENTITY, id))?;
        tracing::info!(like_id = id, ?mode, "Like updated");
        Ok(like.into_dto())
    }

    async fn destroy(&self, state: &AppState, id: i64) -> AppResult<()> {
        state
            .likes
            .delete(id)
            .await
            .map_err(or_not_found(ENTITY, id))?;
        tracing::info!(like_id = id, "Like deleted");
        Ok(())
    }
}
