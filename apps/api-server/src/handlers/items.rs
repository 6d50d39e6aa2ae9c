//! Items: list and create only.

use async_trait::async_trait;
use blog_core::domain::NewItem;
use blog_shared::dto::ItemResponse;
use serde_json::Value;

use crate::middleware::error::AppResult;
use crate::routing::{Capabilities, ResourceHandler};
use crate::serializers::IntoDto;
use crate::state::AppState;

#[derive(Default)]
pub struct ItemHandler;

#[async_trait]
impl ResourceHandler for ItemHandler {
    const BASENAME: &'static str = "items";
    const CAPABILITIES: Capabilities = Capabilities::LIST_CREATE;

    type Record = ItemResponse;

    /// GET /api/items/ - highest id first.
    async fn list(&self, state: &AppState) -> AppResult<Vec<ItemResponse>> {
        let items = state.items.list().await?;
        tracing::debug!(count = items.len(), "Listing items");
        Ok(items.into_iter().map(IntoDto::into_dto).collect())
    }

    /// POST /api/items/
    async fn create(&self, state: &AppState, payload: Value) -> AppResult<ItemResponse> {
        let new_item = NewItem::from_payload(&payload)?;
        let item = state.items.create(new_item).await?;
        tracing::info!(item_id = item.id, "Item created");
        Ok(item.into_dto())
    }
}
