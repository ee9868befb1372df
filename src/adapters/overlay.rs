use crate::domain::model::GradeDelta;
use crate::domain::ports::Storage;
use crate::utils::error::Result;

pub const DEFAULT_OVERLAY_KEY: &str = "whatIfData";

/// Saves and restores the what-if overlay under a single key.
pub struct OverlayStore<'a, S: Storage> {
    storage: &'a S,
    key: String,
}

impl<'a, S: Storage> OverlayStore<'a, S> {
    pub fn new(storage: &'a S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn path(&self) -> String {
        format!("{}.json", self.key)
    }

    pub async fn save(&self, overlay: &[GradeDelta]) -> Result<()> {
        let data = serde_json::to_vec_pretty(overlay)?;
        self.storage.write_file(&self.path(), &data).await?;
        tracing::debug!("💾 Saved {} overlay entries under '{}'", overlay.len(), self.key);
        Ok(())
    }

    /// `Ok(None)` on first run, when nothing has been saved yet.
    pub async fn load(&self) -> Result<Option<Vec<GradeDelta>>> {
        match self.storage.read_file(&self.path()).await {
            Ok(data) => {
                let overlay: Vec<GradeDelta> = serde_json::from_slice(&data)?;
                tracing::debug!("📂 Loaded {} overlay entries from '{}'", overlay.len(), self.key);
                Ok(Some(overlay))
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!("No saved overlay under '{}'", self.key);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn clear(&self) -> Result<()> {
        match self.storage.remove_file(&self.path()).await {
            Err(e) if e.is_not_found() => Ok(()),
            other => other,
        }
    }
}
