//! Posts, served with their likes and comments embedded.

use async_trait::async_trait;
use blog_core::WriteMode;
use blog_core::domain::{NewPost, PostChanges, PostDetail};
use blog_core::error::DomainError;
use blog_shared::dto::PostResponse;
use serde_json::Value;

use super::or_not_found;
use crate::middleware::error::AppResult;
use crate::routing::{Capabilities, ResourceHandler};
use crate::serializers::IntoDto;
use crate::state::AppState;

const ENTITY: &str = "Post";

#[derive(Default)]
pub struct PostHandler;

impl PostHandler {
    async fn detail(state: &AppState, id: i64) -> AppResult<PostDetail> {
        state
            .posts
            .find_detailed(id)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id).into())
    }
}

#[async_trait]
impl ResourceHandler for PostHandler {
    const BASENAME: &'static str = "posts";
    const CAPABILITIES: Capabilities = Capabilities::FULL;

    type Record = PostResponse;

    async fn list(&self, state: &AppState) -> AppResult<Vec<PostResponse>> {
        let posts = state.posts.list_detailed().await?;
        tracing::debug!(count = posts.len(), "Listing posts");
        Ok(posts.into_iter().map(IntoDto::into_dto).collect())
    }

    async fn create(&self, state: &AppState, payload: Value) -> AppResult<PostResponse> {
        let new_post = NewPost::from_payload(&payload)?;
        let post = state.posts.create(new_post).await?;
        tracing::info!(post_id = post.id, "Post created");
        Ok(PostDetail::new(post, Vec::new(), Vec::new()).into_dto())
    }

    async fn retrieve(&self, state: &AppState, id: i64) -> AppResult<PostResponse> {
        tracing::debug!(post_id = id, "Retrieving post");
        Ok(Self::detail(state, id).await?.into_dto())
    }

    async fn update(
        &self,
        state: &AppState,
        id: i64,
        payload: Value,
        mode: WriteMode,
    ) -> AppResult<PostResponse> {
        // Unknown ids are reported before the payload is looked at.
        Self::detail(state, id).await?;

        let changes = PostChanges::from_payload(&payload, mode)?;
        state
            .posts
            .update(id, changes)
            .await
            .map_err(or_not_found(ENTITY, id))?;
        tracing::info!(post_id = id, ?mode, "Post updated");

        Ok(Self::detail(state, id).await?.into_dto())
    }

    /// Likes and comments of the post are deleted with it.
    async fn destroy(&self, state: &AppState, id: i64) -> AppResult<()> {
        state
            .posts
            .delete(id)
            .await
            .map_err(or_not_found(ENTITY, id))?;
        tracing::info!(post_id = id, "Post deleted");
        Ok(())
    }
}
