use crate::translate::{
    encode_row, encode_schema, group_into_batches, normalize_sql, project_row, resolve_row,
};
use common::annotations::annotations_to_object;
use common::fk::ForeignKey;
use common::statement::{ExecutionBatch, ParsedStatement, RowSelection};
use common::storage_trait::EntityStore;
use common::{AnnSqlError, TYPE_TABLE};
use std::collections::HashMap;

/// Drives translated statements against the entity store.
///
/// The conductor owns the store handle; callers construct it with the store
/// implementation they run against and feed SQL through `translate`.
pub struct Conductor<S: EntityStore> {
    store: S,
}

impl<S: EntityStore> Conductor<S> {
    pub fn new(store: S) -> Self {
        Conductor { store }
    }

    /// The store handle, for lifecycle calls such as shutdown.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Translates SQL text into store operations and runs them.
    ///
    /// Returns one acknowledgement line per CREATE/INSERT and one JSON line
    /// per matched SELECT row, in statement order. The first statement that
    /// fails aborts the call; batches already submitted stay submitted.
    ///
    /// # Arguments
    ///
    /// * `app` - Application namespace all entities live under.
    /// * `sql` - One or more semicolon-delimited SQL statements.
    pub fn translate(&self, app: &str, sql: &str) -> Result<Vec<String>, AnnSqlError> {
        let statements = normalize_sql(sql)?;
        let batches = group_into_batches(statements);
        let mut output = Vec::new();
        for batch in batches {
            match batch {
                ExecutionBatch::Writes(writes) => {
                    self.run_writes(app, writes, &mut output)?;
                }
                ExecutionBatch::Query(selection) => {
                    self.run_query(app, &selection, &mut output)?;
                }
            }
        }
        Ok(output)
    }

    /// Encodes one run of writes and submits it as a single creation call.
    ///
    /// # Arguments
    ///
    /// * `app` - Application namespace.
    /// * `writes` - Schema and insertion statements, in order.
    /// * `output` - Accumulated output lines.
    fn run_writes(
        &self,
        app: &str,
        writes: Vec<ParsedStatement>,
        output: &mut Vec<String>,
    ) -> Result<(), AnnSqlError> {
        let mut creates = Vec::new();
        for statement in writes {
            match statement {
                ParsedStatement::CreateTable(schema) => {
                    info!("Processing CREATE table: {:?}", schema.tablename());
                    output.push(format!("TABLE CREATED: {}", schema.tablename()));
                    creates.push(encode_schema(app, &schema));
                }
                ParsedStatement::Insert(row) => {
                    info!("Processing INSERT into: {:?}", row.tablename());
                    output.push(format!("DATA INSERTED: {}", row.tablename()));
                    creates.push(encode_row(app, &row));
                }
                ParsedStatement::Select(_) => {
                    return Err(AnnSqlError::ExecutionError(String::from(
                        "Selection batched with writes",
                    )));
                }
            }
        }
        self.store.create_entities(creates)?;
        Ok(())
    }

    /// Resolves one selection batch into JSON lines.
    ///
    /// # Arguments
    ///
    /// * `app` - Application namespace.
    /// * `selection` - The isolated selection statement.
    /// * `output` - Accumulated output lines.
    fn run_query(
        &self,
        app: &str,
        selection: &RowSelection,
        output: &mut Vec<String>,
    ) -> Result<(), AnnSqlError> {
        info!("Processing SELECT from: {:?}", selection.tablename);
        let fk_map = self.table_foreign_keys(app, &selection.tablename)?;
        let filter = format!("app=\"{}\" && {}", app, selection.filter_expression);
        let keys = self.store.query_entities(&filter)?;
        debug!("sqlbridge::run_query matched {} entities", keys.len());
        for key in keys {
            let metadata = self.store.get_entity_metadata(&key)?;
            let mut row = project_row(
                &selection.requested_columns,
                &annotations_to_object(&metadata),
            );
            resolve_row(&self.store, &mut row, &fk_map)?;
            output.push(serde_json::to_string(&row)?);
        }
        Ok(())
    }

    /// Discovers a table's foreign keys from its stored schema entity.
    ///
    /// Every FK-suffixed column annotation on the schema entity decodes into
    /// the map, keyed by column name. A table without a schema entity
    /// resolves to an empty map.
    ///
    /// # Arguments
    ///
    /// * `app` - Application namespace.
    /// * `tablename` - Table whose schema entity is looked up.
    fn table_foreign_keys(
        &self,
        app: &str,
        tablename: &str,
    ) -> Result<HashMap<String, ForeignKey>, AnnSqlError> {
        let filter = format!(
            "app=\"{}\" && type=\"{}\" && tablename=\"{}\"",
            app, TYPE_TABLE, tablename
        );
        let keys = self.store.query_entities(&filter)?;
        let mut fk_map = HashMap::new();
        if let Some(key) = keys.first() {
            let metadata = self.store.get_entity_metadata(key)?;
            for annotation in &metadata.string_annotations {
                if let Some(fk) = ForeignKey::from_annotation(&annotation.value) {
                    fk_map.insert(annotation.key.clone(), fk);
                }
            }
        }
        Ok(fk_map)
    }
}
