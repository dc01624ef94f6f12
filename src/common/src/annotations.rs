use crate::AnnValue;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// A single key-value annotation attached to a stored entity.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Annotation<V> {
    /// Annotation key.
    pub key: String,
    /// Annotation value.
    pub value: V,
}

impl<V> Annotation<V> {
    /// Create a new annotation with the given key and value.
    ///
    /// # Arguments
    ///
    /// * `key` - Annotation key.
    /// * `value` - Annotation value.
    pub fn new(key: &str, value: V) -> Self {
        Self {
            key: key.to_string(),
            value,
        }
    }
}

/// Raw annotations fetched back for one entity.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct EntityMetadata {
    /// String-valued annotations.
    pub string_annotations: Vec<Annotation<String>>,
    /// Numeric-valued annotations.
    pub numeric_annotations: Vec<Annotation<i64>>,
}

/// Creation request for one entity: payload bytes plus annotations.
///
/// The constructor sets the managed identity annotations (`app`, `type`,
/// `tablename`) before anything else can be layered on, so every record the
/// store receives carries them.
#[derive(Debug, PartialEq, Clone)]
pub struct EntityCreate {
    payload: Vec<u8>,
    string_annotations: Vec<Annotation<String>>,
    numeric_annotations: Vec<Annotation<i64>>,
}

impl EntityCreate {
    /// Start a record with the identity annotations set first.
    ///
    /// # Arguments
    ///
    /// * `app` - Application namespace the entity lives under.
    /// * `entity_type` - Type marker (`table` or `tabledata`).
    /// * `tablename` - Table the entity belongs to.
    pub fn new(app: &str, entity_type: &str, tablename: &str) -> Self {
        let mut entity = Self {
            payload: Vec::new(),
            string_annotations: Vec::new(),
            numeric_annotations: Vec::new(),
        };
        entity.set_string("app", app);
        entity.set_string("type", entity_type);
        entity.set_string("tablename", tablename);
        entity
    }

    /// Attach the payload bytes.
    ///
    /// # Arguments
    ///
    /// * `payload` - Opaque payload stored beside the annotations.
    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    /// Set a string annotation, replacing any previous value under the key.
    ///
    /// # Arguments
    ///
    /// * `key` - Annotation key.
    /// * `value` - Annotation value.
    pub fn set_string(&mut self, key: &str, value: &str) {
        match self.string_annotations.iter_mut().find(|a| a.key == key) {
            Some(existing) => existing.value = value.to_string(),
            None => self
                .string_annotations
                .push(Annotation::new(key, value.to_string())),
        }
    }

    /// Set a numeric annotation, replacing any previous value under the key.
    ///
    /// # Arguments
    ///
    /// * `key` - Annotation key.
    /// * `value` - Annotation value.
    pub fn set_numeric(&mut self, key: &str, value: i64) {
        match self.numeric_annotations.iter_mut().find(|a| a.key == key) {
            Some(existing) => existing.value = value,
            None => self.numeric_annotations.push(Annotation::new(key, value)),
        }
    }

    /// Look up a string annotation by key.
    ///
    /// # Arguments
    ///
    /// * `key` - Annotation key to look for.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.string_annotations
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }

    /// Look up a numeric annotation by key.
    ///
    /// # Arguments
    ///
    /// * `key` - Annotation key to look for.
    pub fn get_numeric(&self, key: &str) -> Option<i64> {
        self.numeric_annotations
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value)
    }

    /// The payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Split the record into payload and stored metadata.
    pub fn into_parts(self) -> (Vec<u8>, EntityMetadata) {
        (
            self.payload,
            EntityMetadata {
                string_annotations: self.string_annotations,
                numeric_annotations: self.numeric_annotations,
            },
        )
    }
}

/// Flat key/value view of an entity's annotations, insertion ordered.
///
/// Serializes as a JSON object whose members appear in insertion order, so
/// projected rows render deterministically.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct RowObject {
    /// Entries in first-insertion order.
    entries: Vec<(String, AnnValue)>,
    /// Mapping from key to order in the entries.
    name_map: HashMap<String, usize>,
}

impl Serialize for RowObject {
    /// Custom serialize to keep insertion order and skip name_map.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl RowObject {
    /// Create an empty row object.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            name_map: HashMap::new(),
        }
    }

    /// Insert or replace a value, keeping the key's first-insertion position.
    ///
    /// # Arguments
    ///
    /// * `key` - Key to set.
    /// * `value` - Value to store under the key.
    pub fn set(&mut self, key: &str, value: AnnValue) {
        match self.name_map.get(key) {
            Some(i) => {
                self.entries[*i].1 = value;
            }
            None => {
                self.name_map.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), value));
            }
        }
    }

    /// Get the value under a key.
    ///
    /// # Arguments
    ///
    /// * `key` - Key to look for.
    pub fn get(&self, key: &str) -> Option<&AnnValue> {
        let i = self.name_map.get(key)?;
        Some(&self.entries[*i].1)
    }

    /// Check if the key is present.
    ///
    /// # Arguments
    ///
    /// * `key` - Key to look for.
    pub fn contains(&self, key: &str) -> bool {
        self.name_map.contains_key(key)
    }

    /// Get an iterator of the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnnValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rebuild the flat object form of an entity from its fetched metadata.
///
/// Inverse of the entity encoder: string annotations first, then numeric,
/// each in stored order.
///
/// # Arguments
///
/// * `metadata` - Raw annotations fetched from the store.
pub fn annotations_to_object(metadata: &EntityMetadata) -> RowObject {
    let mut object = RowObject::new();
    for annotation in &metadata.string_annotations {
        object.set(&annotation.key, AnnValue::Text(annotation.value.clone()));
    }
    for annotation in &metadata.numeric_annotations {
        object.set(&annotation.key, AnnValue::Int(annotation.value));
    }
    object
}
