use crate::{
    error::StoreError,
    order::{Order, id::UserId},
    store::OrderStore,
};
use std::path::PathBuf;

/// [`OrderStore`] persisting each user's order set as `<dir>/<user>.json`.
///
/// Saves write to a temporary sibling file then rename, so a crash mid-write never leaves a
/// torn order set behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, user: &UserId) -> PathBuf {
        self.dir.join(format!("{user}.json"))
    }
}

impl OrderStore for JsonFileStore {
    async fn load(&self, user: &UserId) -> Result<Vec<Order>, StoreError> {
        let bytes = match tokio::fs::read(self.path(user)).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(StoreError::from(error)),
        };

        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save(&self, user: &UserId, orders: &[Order]) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let payload = serde_json::to_vec_pretty(orders)?;

        let path = self.path(user);
        let path_tmp = path.with_extension("json.tmp");

        tokio::fs::write(&path_tmp, payload).await?;
        tokio::fs::rename(&path_tmp, &path).await?;

        Ok(())
    }
}
