use crate::{
    error::StoreError,
    order::{Order, id::UserId},
    store::OrderStore,
};
use fnv::FnvHashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// [`OrderStore`] backed by a shared in-memory map.
///
/// Clones share state, so a test can hand one clone to a session and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<FnvHashMap<UserId, Vec<Order>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderStore for InMemoryStore {
    async fn load(&self, user: &UserId) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .inner
            .lock()
            .await
            .get(user)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, user: &UserId, orders: &[Order]) -> Result<(), StoreError> {
        self.inner.lock().await.insert(user.clone(), orders.to_vec());
        Ok(())
    }
}
