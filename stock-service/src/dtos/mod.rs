use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::Item;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateItemRequest {
    /// Owning client; defaults to the caller's own scope when absent.
    pub client_id: Option<Uuid>,
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(range(min = 0))]
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    /// Client to list for; defaults to the caller's own scope.
    pub client_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub item_id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub quantity: i64,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            item_id: item.item_id,
            client_id: item.client_id,
            name: item.name,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListItemsResponse {
    pub items: Vec<ItemResponse>,
}
