use common::annotations::RowObject;

/// Fields every projected row carries regardless of the selection list.
const IDENTITY_FIELDS: [&str; 3] = ["app", "type", "tablename"];

/// Filters a reconstituted row down to the requested columns.
///
/// Identity fields always come first. A `*` entry expands to every field of
/// the source row; requested keys absent from the source are omitted, not
/// defaulted.
///
/// # Arguments
///
/// * `requested` - Requested column names, possibly including `*`.
/// * `row` - Reconstituted row object to project.
pub fn project_row(requested: &[String], row: &RowObject) -> RowObject {
    let mut projected = RowObject::new();
    for field in &IDENTITY_FIELDS {
        if let Some(value) = row.get(field) {
            projected.set(field, value.clone());
        }
    }
    for column in requested {
        if column == "*" {
            for (key, value) in row.iter() {
                projected.set(key, value.clone());
            }
        } else if let Some(value) = row.get(column) {
            projected.set(column, value.clone());
        }
    }
    projected
}
