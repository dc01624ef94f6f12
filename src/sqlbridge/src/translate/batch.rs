use common::statement::{ExecutionBatch, ParsedStatement};

/// Partitions normalized statements into execution units.
///
/// Consecutive schema and insertion statements merge into one `Writes` batch
/// submitted as a single creation call; every selection closes the open run
/// and goes into its own `Query` batch. Batch order equals statement order
/// and every batch is non-empty.
///
/// # Arguments
///
/// * `statements` - Normalized statements in source order.
pub fn group_into_batches(statements: Vec<ParsedStatement>) -> Vec<ExecutionBatch> {
    let mut batches = Vec::new();
    let mut open: Vec<ParsedStatement> = Vec::new();
    for statement in statements {
        match statement {
            ParsedStatement::Select(selection) => {
                if !open.is_empty() {
                    batches.push(ExecutionBatch::Writes(std::mem::take(&mut open)));
                }
                batches.push(ExecutionBatch::Query(selection));
            }
            write => open.push(write),
        }
    }
    if !open.is_empty() {
        batches.push(ExecutionBatch::Writes(open));
    }
    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::statement::{RowInsertion, RowSelection, SchemaDefinition};

    fn create(table: &str) -> ParsedStatement {
        ParsedStatement::CreateTable(SchemaDefinition::new(table))
    }

    fn insert(table: &str) -> ParsedStatement {
        ParsedStatement::Insert(RowInsertion::new(table, Vec::new()))
    }

    fn select(table: &str) -> ParsedStatement {
        ParsedStatement::Select(RowSelection {
            tablename: table.to_string(),
            requested_columns: vec![String::from("*")],
            filter_expression: format!("type = \"tabledata\" && tablename = \"{}\"", table),
        })
    }

    #[test]
    fn test_writes_merge_and_selects_isolate() {
        let batches = group_into_batches(vec![
            create("departments"),
            insert("departments"),
            select("departments"),
            insert("departments"),
        ]);
        assert_eq!(3, batches.len());
        match &batches[0] {
            ExecutionBatch::Writes(writes) => assert_eq!(2, writes.len()),
            other => panic!("expected writes, got {:?}", other),
        }
        match &batches[1] {
            ExecutionBatch::Query(selection) => assert_eq!("departments", selection.tablename),
            other => panic!("expected a query, got {:?}", other),
        }
        match &batches[2] {
            ExecutionBatch::Writes(writes) => assert_eq!(1, writes.len()),
            other => panic!("expected writes, got {:?}", other),
        }
    }

    #[test]
    fn test_concatenated_batches_reproduce_input() {
        let input = vec![
            create("a"),
            select("a"),
            select("a"),
            insert("a"),
            insert("a"),
            select("a"),
        ];
        let batches = group_into_batches(input.clone());
        let mut flattened = Vec::new();
        for batch in batches {
            match batch {
                ExecutionBatch::Writes(writes) => flattened.extend(writes),
                ExecutionBatch::Query(selection) => {
                    flattened.push(ParsedStatement::Select(selection))
                }
            }
        }
        assert_eq!(input, flattened);
    }

    #[test]
    fn test_consecutive_selects_each_get_a_batch() {
        let batches = group_into_batches(vec![select("a"), select("b")]);
        assert_eq!(2, batches.len());
        for batch in &batches {
            assert!(matches!(batch, ExecutionBatch::Query(_)));
        }
    }

    #[test]
    fn test_trailing_writes_flush() {
        let batches = group_into_batches(vec![select("a"), create("b"), insert("b")]);
        assert_eq!(2, batches.len());
        assert!(matches!(&batches[1], ExecutionBatch::Writes(w) if w.len() == 2));
    }

    #[test]
    fn test_empty_input_yields_no_batches() {
        assert!(group_into_batches(Vec::new()).is_empty());
    }
}
