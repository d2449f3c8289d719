use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inventory item, always owned by exactly one client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub item_id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub quantity: i64,
    pub created_utc: DateTime<Utc>,
}

impl Item {
    pub fn new(client_id: Uuid, name: String, quantity: i64) -> Self {
        Self {
            item_id: Uuid::new_v4(),
            client_id,
            name,
            quantity,
            created_utc: Utc::now(),
        }
    }
}
