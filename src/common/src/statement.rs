use crate::fk::ForeignKey;
use crate::{AnnValue, SemanticType};
use std::collections::HashMap;

/// One column of a schema definition: its semantic type plus an optional
/// foreign key.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Semantic type mapped from the SQL keyword.
    pub semantic_type: SemanticType,
    /// Foreign key attached by a constraint, if any.
    pub foreign_key: Option<ForeignKey>,
}

impl ColumnSpec {
    /// Create a column spec with no foreign key.
    ///
    /// # Arguments
    ///
    /// * `semantic_type` - Semantic type of the column.
    pub fn new(semantic_type: SemanticType) -> Self {
        Self {
            semantic_type,
            foreign_key: None,
        }
    }

    /// Render the stored type annotation, foreign-key suffix included.
    pub fn type_annotation(&self) -> String {
        match &self.foreign_key {
            Some(fk) => format!("{}{}", self.semantic_type, fk.suffix()),
            None => self.semantic_type.to_string(),
        }
    }
}

/// Canonical record for one CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDefinition {
    /// Table being defined.
    tablename: String,
    /// Columns in declaration order.
    columns: Vec<(String, ColumnSpec)>,
    /// Mapping from column name to order in the definition.
    name_map: HashMap<String, usize>,
    /// Columns declared indexed via inline index clauses, in order, deduped.
    indexed_columns: Vec<String>,
}

impl SchemaDefinition {
    /// Create an empty definition for the given table.
    ///
    /// # Arguments
    ///
    /// * `tablename` - Table being defined.
    pub fn new(tablename: &str) -> Self {
        Self {
            tablename: tablename.to_string(),
            columns: Vec::new(),
            name_map: HashMap::new(),
            indexed_columns: Vec::new(),
        }
    }

    /// Table being defined.
    pub fn tablename(&self) -> &str {
        &self.tablename
    }

    /// Record a column. A repeated name replaces the earlier spec in place.
    ///
    /// # Arguments
    ///
    /// * `name` - Column name.
    /// * `spec` - Column type and foreign key.
    pub fn add_column(&mut self, name: &str, spec: ColumnSpec) {
        match self.name_map.get(name) {
            Some(i) => {
                self.columns[*i].1 = spec;
            }
            None => {
                self.name_map.insert(name.to_string(), self.columns.len());
                self.columns.push((name.to_string(), spec));
            }
        }
    }

    /// Check if the column name is in the definition.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the column to look for.
    pub fn contains(&self, name: &str) -> bool {
        self.name_map.contains_key(name)
    }

    /// Mutable access to a recorded column's spec.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the column to look for.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut ColumnSpec> {
        let i = *self.name_map.get(name)?;
        Some(&mut self.columns[i].1)
    }

    /// Get an iterator of the columns in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &(String, ColumnSpec)> {
        self.columns.iter()
    }

    /// Record an indexed column. Repeats are kept once.
    ///
    /// # Arguments
    ///
    /// * `name` - Indexed column name.
    pub fn add_indexed_column(&mut self, name: &str) {
        if !self.indexed_columns.iter().any(|c| c == name) {
            self.indexed_columns.push(name.to_string());
        }
    }

    /// Indexed columns in declaration order.
    pub fn indexed_columns(&self) -> &[String] {
        &self.indexed_columns
    }

    /// The derived `indexes` field: comma-joined indexed columns, or nothing
    /// when no index clauses were declared.
    pub fn indexes_value(&self) -> Option<String> {
        if self.indexed_columns.is_empty() {
            None
        } else {
            Some(self.indexed_columns.join(","))
        }
    }

    /// Returns the number of columns.
    pub fn size(&self) -> usize {
        self.columns.len()
    }
}

/// Canonical record for one INSERT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct RowInsertion {
    /// Table receiving the row.
    tablename: String,
    /// Column to literal value, in column-list order.
    values: Vec<(String, AnnValue)>,
}

impl RowInsertion {
    /// Create a row insertion with the given data.
    ///
    /// # Arguments
    ///
    /// * `tablename` - Table receiving the row.
    /// * `values` - Column names paired with literal values.
    pub fn new(tablename: &str, values: Vec<(String, AnnValue)>) -> Self {
        Self {
            tablename: tablename.to_string(),
            values,
        }
    }

    /// Table receiving the row.
    pub fn tablename(&self) -> &str {
        &self.tablename
    }

    /// Get an iterator of the column/value pairs.
    pub fn values(&self) -> impl Iterator<Item = &(String, AnnValue)> {
        self.values.iter()
    }

    /// Returns the number of values.
    pub fn size(&self) -> usize {
        self.values.len()
    }
}

/// Canonical record for one SELECT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSelection {
    /// Table selected from.
    pub tablename: String,
    /// Requested columns in order; may include a `*` wildcard entry.
    pub requested_columns: Vec<String>,
    /// Complete filter in the store's query syntax, implicit type/table
    /// predicates included.
    pub filter_expression: String,
}

/// Canonical statement records produced by the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedStatement {
    CreateTable(SchemaDefinition),
    Insert(RowInsertion),
    Select(RowSelection),
}

impl ParsedStatement {
    /// True for statements that persist entities.
    pub fn is_write(&self) -> bool {
        !matches!(self, ParsedStatement::Select(_))
    }

    /// Table the statement addresses.
    pub fn tablename(&self) -> &str {
        match self {
            ParsedStatement::CreateTable(schema) => schema.tablename(),
            ParsedStatement::Insert(row) => row.tablename(),
            ParsedStatement::Select(selection) => &selection.tablename,
        }
    }
}

/// One execution unit: a run of writes submitted together, or a single
/// selection resolved on its own.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionBatch {
    /// Consecutive schema/insertion statements, submitted as one creation call.
    Writes(Vec<ParsedStatement>),
    /// One isolated selection.
    Query(RowSelection),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> SchemaDefinition {
        let mut schema = SchemaDefinition::new("departments");
        schema.add_column("dept_id", ColumnSpec::new(SemanticType::String));
        schema.add_column("department_name", ColumnSpec::new(SemanticType::String));
        schema
    }

    #[test]
    fn test_column_order_and_lookup() {
        let schema = sample_schema();
        assert_eq!(2, schema.size());
        assert!(schema.contains("dept_id"));
        assert!(!schema.contains("missing"));
        let names: Vec<&str> = schema.columns().map(|(n, _)| n.as_str()).collect();
        assert_eq!(vec!["dept_id", "department_name"], names);
    }

    #[test]
    fn test_column_mut_attaches_fk() {
        use crate::fk::ForeignKey;
        let mut schema = sample_schema();
        let spec = schema.column_mut("dept_id").unwrap();
        spec.foreign_key = Some(ForeignKey::new(
            "departments",
            "dept_id",
            Some(String::from("department_name")),
        ));
        let (_, spec) = schema.columns().next().unwrap();
        assert_eq!(
            "string|FK:departments:dept_id:department_name",
            spec.type_annotation()
        );
    }

    #[test]
    fn test_indexes_value() {
        let mut schema = sample_schema();
        assert_eq!(None, schema.indexes_value());
        schema.add_indexed_column("dept_id");
        schema.add_indexed_column("department_name");
        schema.add_indexed_column("dept_id");
        assert_eq!(
            Some(String::from("dept_id,department_name")),
            schema.indexes_value()
        );
        assert_eq!(2, schema.indexed_columns().len());
    }

    #[test]
    fn test_is_write() {
        let create = ParsedStatement::CreateTable(sample_schema());
        let select = ParsedStatement::Select(RowSelection {
            tablename: String::from("departments"),
            requested_columns: vec![String::from("*")],
            filter_expression: String::new(),
        });
        assert!(create.is_write());
        assert!(!select.is_write());
        assert_eq!("departments", create.tablename());
        assert_eq!("departments", select.tablename());
    }
}
