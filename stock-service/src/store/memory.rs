use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::Item;
use crate::store::ItemStore;

#[derive(Default)]
pub struct InMemoryItemStore {
    items: Mutex<HashMap<Uuid, Item>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn insert_item(&self, item: &Item) -> Result<(), anyhow::Error> {
        let mut items = self.items.lock().unwrap();
        items.insert(item.item_id, item.clone());
        Ok(())
    }

    async fn list_items(&self, client_id: Uuid) -> Result<Vec<Item>, anyhow::Error> {
        let items = self.items.lock().unwrap();
        let mut result: Vec<Item> = items
            .values()
            .filter(|item| item.client_id == client_id)
            .cloned()
            .collect();
        result.sort_by_key(|item| item.created_utc);
        Ok(result)
    }
}
