use common::annotations::EntityCreate;
use common::statement::{RowInsertion, SchemaDefinition};
use common::{AnnValue, TYPE_TABLE, TYPE_TABLEDATA};

/// Encodes a schema definition as the annotation record persisted for it.
///
/// Identity fields come first, then one annotation per column holding its
/// type string (foreign-key suffix included), then an empty `index_<column>`
/// placeholder per indexed column, then the derived `indexes` list. The
/// payload is `"table <tablename>"`.
///
/// # Arguments
///
/// * `app` - Application namespace.
/// * `schema` - Schema definition to encode.
pub fn encode_schema(app: &str, schema: &SchemaDefinition) -> EntityCreate {
    let mut entity = EntityCreate::new(app, TYPE_TABLE, schema.tablename())
        .with_payload(format!("{} {}", TYPE_TABLE, schema.tablename()).into_bytes());
    for (name, spec) in schema.columns() {
        entity.set_string(name, &spec.type_annotation());
    }
    for indexed in schema.indexed_columns() {
        entity.set_string(&format!("index_{}", indexed), "");
    }
    if let Some(indexes) = schema.indexes_value() {
        entity.set_string("indexes", &indexes);
    }
    entity
}

/// Encodes a row insertion as the annotation record persisted for it.
///
/// String values become string annotations and numbers numeric annotations,
/// in column-list order. The payload is `"tabledata <tablename>"`.
///
/// # Arguments
///
/// * `app` - Application namespace.
/// * `row` - Row insertion to encode.
pub fn encode_row(app: &str, row: &RowInsertion) -> EntityCreate {
    let mut entity = EntityCreate::new(app, TYPE_TABLEDATA, row.tablename())
        .with_payload(format!("{} {}", TYPE_TABLEDATA, row.tablename()).into_bytes());
    for (column, value) in row.values() {
        match value {
            AnnValue::Text(s) => entity.set_string(column, s),
            AnnValue::Int(i) => entity.set_numeric(column, *i),
        }
    }
    entity
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::statement::ColumnSpec;
    use common::SemanticType;

    #[test]
    fn test_encode_schema_with_indexes() {
        let mut schema = SchemaDefinition::new("departments");
        schema.add_column("dept_id", ColumnSpec::new(SemanticType::String));
        schema.add_column("department_name", ColumnSpec::new(SemanticType::String));
        schema.add_indexed_column("dept_id");
        let entity = encode_schema("hr", &schema);
        assert_eq!(Some("hr"), entity.get_string("app"));
        assert_eq!(Some("table"), entity.get_string("type"));
        assert_eq!(Some("departments"), entity.get_string("tablename"));
        assert_eq!(Some("string"), entity.get_string("dept_id"));
        assert_eq!(Some(""), entity.get_string("index_dept_id"));
        assert_eq!(Some("dept_id"), entity.get_string("indexes"));
        assert_eq!(b"table departments".to_vec(), entity.payload().to_vec());
    }

    #[test]
    fn test_encode_schema_without_indexes_omits_the_field() {
        let mut schema = SchemaDefinition::new("users");
        schema.add_column("username", ColumnSpec::new(SemanticType::String));
        let entity = encode_schema("hr", &schema);
        assert_eq!(None, entity.get_string("indexes"));
    }

    #[test]
    fn test_encode_row_splits_string_and_numeric() {
        let row = RowInsertion::new(
            "users",
            vec![
                (String::from("username"), AnnValue::Text(String::from("kim"))),
                (String::from("age"), AnnValue::Int(30)),
            ],
        );
        let entity = encode_row("hr", &row);
        assert_eq!(Some("tabledata"), entity.get_string("type"));
        assert_eq!(Some("kim"), entity.get_string("username"));
        assert_eq!(Some(30), entity.get_numeric("age"));
        assert_eq!(b"tabledata users".to_vec(), entity.payload().to_vec());
    }
}
