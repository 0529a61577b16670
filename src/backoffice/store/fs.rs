use super::records as collection;
use super::{ListPage, ListParams, ResourceOperations};
use crate::error::{EngineError, Result};
use crate::model::{Draft, Record, RecordId};
use crate::schema::ResourceConfig;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

/// JSON-file backend: `<root>/<resource>.json` holds the whole collection.
///
/// Every mutation re-reads the file, applies the change and writes it back
/// through a temp file + rename, so a crash never leaves half a file behind.
/// The files are small; plain blocking I/O is used.
pub struct FileResource {
    config: ResourceConfig,
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileResource {
    pub fn new(config: ResourceConfig, root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.root.join(format!("{}.json", self.config.name))
    }

    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(EngineError::Io)?;
        }
        Ok(())
    }

    fn load(&self) -> Result<Vec<Record>> {
        let path = self.path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path).map_err(EngineError::Io)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let records: Vec<Record> =
            serde_json::from_str(&content).map_err(EngineError::Serialization)?;
        Ok(records)
    }

    fn save(&self, records: &[Record]) -> Result<()> {
        self.ensure_dir(&self.root)?;
        let content = serde_json::to_string_pretty(records).map_err(EngineError::Serialization)?;

        let tmp_file = self
            .root
            .join(format!(".{}-{}.tmp", self.config.name, Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(EngineError::Io)?;
        fs::rename(&tmp_file, self.path()).map_err(EngineError::Io)?;
        Ok(())
    }

    /// Overwrites the stored collection.
    pub async fn replace_all(&self, records: &[Record]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.save(records)
    }

    async fn mutate<T>(&self, change: impl FnOnce(&mut Vec<Record>) -> Result<T>) -> Result<T> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load()?;
        let out = change(&mut records)?;
        self.save(&records)?;
        Ok(out)
    }
}

#[async_trait]
impl ResourceOperations<Record> for FileResource {
    async fn list(&self, params: ListParams) -> Result<ListPage<Record>> {
        let records = self.load()?;
        Ok(collection::list(&records, &self.config, params))
    }

    async fn get_by_id(&self, id: &RecordId) -> Result<Record> {
        let records = self.load()?;
        collection::get(&records, id)
    }

    async fn create(&self, draft: Draft) -> Result<Record> {
        self.mutate(|records| collection::insert(records, &self.config, draft))
            .await
    }

    async fn update(&self, id: &RecordId, draft: Draft) -> Result<Record> {
        self.mutate(|records| collection::update(records, &self.config, id, draft))
            .await
    }

    async fn delete(&self, id: &RecordId) -> Result<()> {
        self.mutate(|records| collection::remove(records, id)).await
    }

    async fn bulk_delete(&self, ids: &[RecordId]) -> Result<()> {
        self.mutate(|records| collection::remove_many(records, ids))
            .await
    }
}
