use crate::annotations::{EntityCreate, EntityMetadata};
use crate::AnnSqlError;

/// Key assigned by the store to a persisted entity.
pub type EntityKey = String;

/// Receipt returned for each entity persisted by a creation call.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateReceipt {
    /// Key the store assigned.
    pub key: EntityKey,
}

/// Interface the translation layer drives a store through.
///
/// Implementations hold their state behind interior locks so a single handle
/// can serve every call with `&self`.
pub trait EntityStore {
    /// Create a store rooted at the given path, loading persisted state when
    /// the path already exists.
    ///
    /// # Arguments
    ///
    /// * `storage_path` - Directory to persist under; empty for ephemeral.
    fn new(storage_path: String) -> Self;

    /// Create an ephemeral store that will not be persisted.
    fn new_test_store() -> Self;

    /// Persist a batch of entities as one call, returning one receipt per
    /// entity in submission order.
    ///
    /// # Arguments
    ///
    /// * `entities` - Records to persist.
    fn create_entities(
        &self,
        entities: Vec<EntityCreate>,
    ) -> Result<Vec<CreateReceipt>, AnnSqlError>;

    /// Return keys of entities whose annotations satisfy the filter.
    ///
    /// # Arguments
    ///
    /// * `filter` - Boolean filter expression over annotations.
    fn query_entities(&self, filter: &str) -> Result<Vec<EntityKey>, AnnSqlError>;

    /// Fetch the raw annotations of one entity.
    ///
    /// # Arguments
    ///
    /// * `key` - Key of the entity to fetch.
    fn get_entity_metadata(&self, key: &EntityKey) -> Result<EntityMetadata, AnnSqlError>;

    /// Persist state for restart. A no-op for ephemeral stores.
    fn shutdown(&self);
}
