mod directory;
mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::Item;

pub use directory::InMemoryTenantDirectory;
pub use memory::InMemoryItemStore;

/// Item persistence seam.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn insert_item(&self, item: &Item) -> Result<(), anyhow::Error>;

    /// List items belonging to one client.
    async fn list_items(&self, client_id: Uuid) -> Result<Vec<Item>, anyhow::Error>;
}
