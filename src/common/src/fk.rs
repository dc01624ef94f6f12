use std::fmt;

/// Marker that introduces the foreign-key suffix inside a type annotation.
const FK_MARKER: &str = "|FK:";
/// Marker inside a constraint name that designates a view-as column.
const VIEW_AS_MARKER: &str = "__view_as__";

/// Foreign-key descriptor for one column.
///
/// A foreign key rides on the column's type annotation as a trailing suffix,
/// `|FK:<referenced_table>:<referenced_column>[:<view_column>]`, because the
/// store's annotation model is flat strings and numbers. This type is the
/// only place that composes or picks apart that suffix.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    /// Table the key points into.
    pub referenced_table: String,
    /// Column looked up in the referenced table.
    pub local_key: String,
    /// Column of the referenced row to splice into results, when declared.
    pub view_key: Option<String>,
}

impl ForeignKey {
    /// Create a new descriptor.
    ///
    /// # Arguments
    ///
    /// * `referenced_table` - Table the key points into.
    /// * `local_key` - Column looked up in the referenced table.
    /// * `view_key` - Optional view-as column.
    pub fn new(referenced_table: &str, local_key: &str, view_key: Option<String>) -> Self {
        Self {
            referenced_table: referenced_table.to_string(),
            local_key: local_key.to_string(),
            view_key,
        }
    }

    /// Render the descriptor as the suffix appended to a type annotation.
    pub fn suffix(&self) -> String {
        match &self.view_key {
            Some(view) => format!(
                "{}{}:{}:{}",
                FK_MARKER, self.referenced_table, self.local_key, view
            ),
            None => format!("{}{}:{}", FK_MARKER, self.referenced_table, self.local_key),
        }
    }

    /// Extract a descriptor from an annotation string, if one is attached.
    ///
    /// The annotation is free form and may legitimately carry no suffix;
    /// malformed but FK-shaped strings also decode to `None`, never an error.
    /// When several suffixes were appended the trailing one wins.
    pub fn from_annotation(annotation: &str) -> Option<ForeignKey> {
        let start = annotation.rfind(FK_MARKER)?;
        let segments: Vec<&str> = annotation[start + FK_MARKER.len()..].split(':').collect();
        match segments.as_slice() {
            [table, key] if !table.is_empty() && !key.is_empty() => {
                Some(ForeignKey::new(table, key, None))
            }
            [table, key, view] if !table.is_empty() && !key.is_empty() && !view.is_empty() => {
                Some(ForeignKey::new(table, key, Some((*view).to_string())))
            }
            _ => None,
        }
    }

    /// Derive the view-as column from a constraint name.
    ///
    /// Constraint names following the `fk__view_as__<column>` convention
    /// designate a column; any other name yields `None`.
    ///
    /// # Argument
    ///
    /// * `constraint_name` - Name attached to the FOREIGN KEY constraint.
    pub fn view_key_from_constraint(constraint_name: &str) -> Option<String> {
        let start = constraint_name.find(VIEW_AS_MARKER)?;
        let tail = &constraint_name[start + VIEW_AS_MARKER.len()..];
        if tail.is_empty() {
            None
        } else {
            Some(tail.to_string())
        }
    }
}

impl fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}
