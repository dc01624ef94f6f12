use common::annotations::{annotations_to_object, RowObject};
use common::fk::ForeignKey;
use common::storage_trait::EntityStore;
use common::{AnnSqlError, AnnValue, TYPE_TABLEDATA};
use std::collections::HashMap;

/// One follow-up lookup derived from a foreign-key-valued row field.
#[derive(Debug, Clone, PartialEq)]
pub struct FkLookup {
    /// Filter selecting the referenced row.
    pub filter: String,
    /// Field of the referenced row to splice in, when declared.
    pub view_key: Option<String>,
}

/// Builds one lookup per row field that carries a declared foreign key.
///
/// The filter pins the row's own `app` namespace and the referenced table,
/// then matches the referenced column against the local value. String values
/// are quoted, numeric values are not.
///
/// # Arguments
///
/// * `row` - Projected row whose fields are checked against the map.
/// * `fk_map` - The owning table's foreign keys, keyed by local column name.
pub fn build_fk_lookups(row: &RowObject, fk_map: &HashMap<String, ForeignKey>) -> Vec<FkLookup> {
    let app = match row.get("app") {
        Some(AnnValue::Text(app)) => app.clone(),
        _ => String::new(),
    };
    let mut lookups = Vec::new();
    for (key, value) in row.iter() {
        if let Some(fk) = fk_map.get(key) {
            let filter = format!(
                "app=\"{}\" && type=\"{}\" && tablename=\"{}\" && {}={}",
                app,
                TYPE_TABLEDATA,
                fk.referenced_table,
                fk.local_key,
                value.filter_literal()
            );
            lookups.push(FkLookup {
                filter,
                view_key: fk.view_key.clone(),
            });
        }
    }
    lookups
}

/// Splices referenced view columns into a projected row.
///
/// Lookups run sequentially, one store query per foreign-key-valued field.
/// A zero-match lookup leaves the row untouched for that field. When several
/// referenced rows match, the first one the store returns is used; this layer
/// imposes no ordering among ties.
///
/// # Arguments
///
/// * `store` - Store handle for the follow-up queries.
/// * `row` - Projected row, modified in place.
/// * `fk_map` - The owning table's foreign keys, keyed by local column name.
pub fn resolve_row<S: EntityStore>(
    store: &S,
    row: &mut RowObject,
    fk_map: &HashMap<String, ForeignKey>,
) -> Result<(), AnnSqlError> {
    let lookups = build_fk_lookups(row, fk_map);
    for lookup in lookups {
        debug!("sqlbridge::resolve_row lookup: {:?}", lookup.filter);
        let keys = store.query_entities(&lookup.filter)?;
        let entity_key = match keys.first() {
            Some(entity_key) => entity_key,
            None => continue,
        };
        let metadata = store.get_entity_metadata(entity_key)?;
        let referenced = annotations_to_object(&metadata);
        if let Some(view_key) = &lookup.view_key {
            if let Some(value) = referenced.get(view_key) {
                row.set(view_key, value.clone());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use annstore::storage_manager::StorageManager;
    use common::annotations::EntityCreate;

    fn dept_fk_map(view_key: Option<&str>) -> HashMap<String, ForeignKey> {
        let mut fk_map = HashMap::new();
        fk_map.insert(
            String::from("dept_id"),
            ForeignKey::new("departments", "dept_id", view_key.map(String::from)),
        );
        fk_map
    }

    fn local_row(dept_id: AnnValue) -> RowObject {
        let mut row = RowObject::new();
        row.set("app", AnnValue::Text(String::from("hr")));
        row.set("type", AnnValue::Text(String::from("tabledata")));
        row.set("tablename", AnnValue::Text(String::from("users")));
        row.set("dept_id", dept_id);
        row
    }

    fn store_with_department() -> StorageManager {
        let store = StorageManager::new_test_store();
        let mut dept = EntityCreate::new("hr", TYPE_TABLEDATA, "departments");
        dept.set_string("dept_id", "ACCT");
        dept.set_string("department_name", "Accounting");
        store.create_entities(vec![dept]).unwrap();
        store
    }

    #[test]
    fn test_lookup_filter_quotes_strings() {
        let row = local_row(AnnValue::Text(String::from("ACCT")));
        let lookups = build_fk_lookups(&row, &dept_fk_map(Some("department_name")));
        assert_eq!(1, lookups.len());
        assert_eq!(
            "app=\"hr\" && type=\"tabledata\" && tablename=\"departments\" && dept_id=\"ACCT\"",
            lookups[0].filter
        );
        assert_eq!(Some(String::from("department_name")), lookups[0].view_key);
    }

    #[test]
    fn test_lookup_filter_numeric_unquoted() {
        let row = local_row(AnnValue::Int(7));
        let lookups = build_fk_lookups(&row, &dept_fk_map(None));
        assert_eq!(
            "app=\"hr\" && type=\"tabledata\" && tablename=\"departments\" && dept_id=7",
            lookups[0].filter
        );
    }

    #[test]
    fn test_resolve_splices_view_column() {
        let store = store_with_department();
        let mut row = local_row(AnnValue::Text(String::from("ACCT")));
        resolve_row(&store, &mut row, &dept_fk_map(Some("department_name"))).unwrap();
        assert_eq!(
            Some(&AnnValue::Text(String::from("Accounting"))),
            row.get("department_name")
        );
        // The raw key value stays alongside the spliced column.
        assert_eq!(
            Some(&AnnValue::Text(String::from("ACCT"))),
            row.get("dept_id")
        );
    }

    #[test]
    fn test_zero_match_leaves_row_unmodified() {
        let store = StorageManager::new_test_store();
        let mut row = local_row(AnnValue::Text(String::from("ACCT")));
        let before = row.clone();
        resolve_row(&store, &mut row, &dept_fk_map(Some("department_name"))).unwrap();
        assert_eq!(before, row);
    }

    #[test]
    fn test_no_view_key_splices_nothing() {
        let store = store_with_department();
        let mut row = local_row(AnnValue::Text(String::from("ACCT")));
        resolve_row(&store, &mut row, &dept_fk_map(None)).unwrap();
        assert!(!row.contains("department_name"));
    }

    #[test]
    fn test_fields_without_fk_build_no_lookup() {
        let row = local_row(AnnValue::Text(String::from("ACCT")));
        assert!(build_fk_lookups(&row, &HashMap::new()).is_empty());
    }
}
