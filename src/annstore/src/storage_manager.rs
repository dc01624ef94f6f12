use crate::filter::FilterExpr;
use common::annotations::{EntityCreate, EntityMetadata};
use common::storage_trait::{CreateReceipt, EntityKey, EntityStore};
use common::AnnSqlError;

use std::collections::HashMap;
use std::fs;
use std::fs::OpenOptions;
use std::path::Path;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Stored form of one entity: payload bytes plus its annotations.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoredEntity {
    pub payload: Vec<u8>,
    pub metadata: EntityMetadata,
}

/// Entities in creation order. Queries walk this list so results come back
/// in insertion order.
type EntityList = Arc<RwLock<Vec<(EntityKey, StoredEntity)>>>;

/// The annstore StorageManager. An ordered list of entities, an index from
/// key to position, and where to persist on shutdown/startup.
pub struct StorageManager {
    entities: EntityList,
    key_index: Arc<RwLock<HashMap<EntityKey, usize>>>,
    persist_path: PathBuf,
}

impl Drop for StorageManager {
    fn drop(&mut self) {
        info!("Dropping Storage Manager");
    }
}

impl EntityStore for StorageManager {
    /// Create a new SM from scratch or load persisted entities.
    fn new(storage_path: String) -> Self {
        if storage_path != "" && Path::exists(Path::new(&storage_path)) {
            info!(
                "Initializing annstore::storage_manager from path: {:?}",
                &storage_path
            );
            StorageManager::load(storage_path)
        } else {
            info!(
                "Creating new annstore::storage_manager with path: {:?}",
                &storage_path
            );
            StorageManager {
                entities: Arc::new(RwLock::new(Vec::new())),
                key_index: Arc::new(RwLock::new(HashMap::new())),
                persist_path: PathBuf::from(storage_path),
            }
        }
    }

    /// Create a new SM that will not be persisted.
    fn new_test_store() -> Self {
        StorageManager::new(String::from(""))
    }

    /// Persist a batch of entities as one call.
    fn create_entities(
        &self,
        creates: Vec<EntityCreate>,
    ) -> Result<Vec<CreateReceipt>, AnnSqlError> {
        let mut entities = self.entities.write().unwrap();
        let mut key_index = self.key_index.write().unwrap();
        let mut receipts = Vec::new();
        for create in creates {
            // No deletes exist, so the next key is always the current length.
            let key = format!("e{:06}", entities.len());
            let (payload, metadata) = create.into_parts();
            debug!(
                "annstore::create_entities key: {:?} annotations: {}",
                &key,
                metadata.string_annotations.len() + metadata.numeric_annotations.len()
            );
            key_index.insert(key.clone(), entities.len());
            entities.push((key.clone(), StoredEntity { payload, metadata }));
            receipts.push(CreateReceipt { key });
        }
        Ok(receipts)
    }

    /// Return keys of entities matching the filter, in insertion order.
    fn query_entities(&self, filter: &str) -> Result<Vec<EntityKey>, AnnSqlError> {
        let parsed = FilterExpr::parse(filter)?;
        let entities = self.entities.read().unwrap();
        let mut matches = Vec::new();
        for (key, stored) in entities.iter() {
            if parsed.matches(&stored.metadata) {
                matches.push(key.clone());
            }
        }
        debug!(
            "annstore::query_entities filter: {:?} matched: {}",
            filter,
            matches.len()
        );
        Ok(matches)
    }

    /// Fetch the raw annotations of one entity.
    fn get_entity_metadata(&self, key: &EntityKey) -> Result<EntityMetadata, AnnSqlError> {
        let entities = self.entities.read().unwrap();
        let key_index = self.key_index.read().unwrap();
        match key_index.get(key) {
            Some(i) => Ok(entities[*i].1.metadata.clone()),
            None => Err(AnnSqlError::ExecutionError(format!(
                "Entity key not found {:?}",
                key
            ))),
        }
    }

    fn shutdown(&self) {
        info!("Shutting down and persisting entities");
        if self.persist_path.to_string_lossy() == String::from("") {
            info!("Test store or no path, not persisting");
            return;
        }
        fs::create_dir_all(self.persist_path.to_path_buf())
            .expect("Unable to create dir to store entities");
        let entities = self.entities.read().unwrap();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.entities_file())
            .expect("Failed to create file");
        serde_cbor::to_writer(file, &*entities).expect("Failed on persisting entities");
    }
}

impl StorageManager {
    /// Where the entity list persists under the storage path.
    fn entities_file(&self) -> PathBuf {
        let mut file_path = self.persist_path.clone();
        file_path.push("entities");
        file_path.set_extension("as");
        file_path
    }

    /// Create a SM from a storage path and populate from its file.
    fn load(path: String) -> Self {
        let mut file_path = PathBuf::from(&path);
        file_path.push("entities");
        file_path.set_extension("as");
        if !file_path.exists() {
            return StorageManager {
                entities: Arc::new(RwLock::new(Vec::new())),
                key_index: Arc::new(RwLock::new(HashMap::new())),
                persist_path: PathBuf::from(path),
            };
        }
        let file = OpenOptions::new()
            .read(true)
            .open(&file_path)
            .expect("Failed to read file");
        let entities: Vec<(EntityKey, StoredEntity)> =
            serde_cbor::from_reader(file).expect("cannot read file");
        let mut key_index = HashMap::new();
        for (i, (key, _)) in entities.iter().enumerate() {
            key_index.insert(key.clone(), i);
        }
        StorageManager {
            entities: Arc::new(RwLock::new(entities)),
            key_index: Arc::new(RwLock::new(key_index)),
            persist_path: PathBuf::from(path),
        }
    }
}
