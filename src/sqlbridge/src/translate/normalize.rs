use super::predicate::selection_filter;
use common::fk::ForeignKey;
use common::statement::{ColumnSpec, ParsedStatement, RowInsertion, RowSelection, SchemaDefinition};
use common::{get_name, map_semantic_type, AnnSqlError, AnnValue};
use sqlparser::ast::{
    ColumnDef, CreateTable, Expr, GroupByExpr, Ident, Insert, ObjectName, Query, SelectItem,
    SetExpr, Statement, TableConstraint, TableFactor, UnaryOperator, Value,
};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

/// Parses SQL text and normalizes every statement in it, in order.
///
/// The parser splits on semicolons and drops empty fragments, so trailing
/// semicolons and blank statements never reach the normalizer. The first
/// statement that fails to normalize aborts the whole call.
///
/// # Arguments
///
/// * `sql` - One or more semicolon-delimited SQL statements.
pub fn normalize_sql(sql: &str) -> Result<Vec<ParsedStatement>, AnnSqlError> {
    let dialect = GenericDialect {};
    let statements = Parser::parse_sql(&dialect, sql)?;
    let mut normalized = Vec::new();
    for statement in &statements {
        normalized.push(normalize_statement(statement)?);
    }
    Ok(normalized)
}

/// Normalizes one parsed statement into its canonical record.
///
/// Statement kinds outside CREATE TABLE, INSERT and SELECT are rejected with
/// the offending statement in the error.
///
/// # Arguments
///
/// * `statement` - AST of the statement to normalize.
pub fn normalize_statement(statement: &Statement) -> Result<ParsedStatement, AnnSqlError> {
    match statement {
        Statement::CreateTable(CreateTable {
            name,
            columns,
            constraints,
            ..
        }) => Ok(ParsedStatement::CreateTable(process_create_table(
            name,
            columns,
            constraints,
        )?)),
        Statement::Insert(Insert {
            table_name,
            columns,
            source,
            ..
        }) => Ok(ParsedStatement::Insert(process_insert(
            table_name,
            columns,
            source.as_deref(),
        )?)),
        Statement::Query(query) => Ok(ParsedStatement::Select(process_query(query)?)),
        other => Err(AnnSqlError::UnsupportedStatement(other.to_string())),
    }
}

/// Builds a schema definition from the pieces of a CREATE TABLE statement.
///
/// # Arguments
///
/// * `name` - Table name.
/// * `columns` - Column definitions in declaration order.
/// * `constraints` - Table constraints (foreign keys, inline indexes).
fn process_create_table(
    name: &ObjectName,
    columns: &[ColumnDef],
    constraints: &[TableConstraint],
) -> Result<SchemaDefinition, AnnSqlError> {
    let tablename = get_name(name)?;
    let mut schema = SchemaDefinition::new(&tablename);
    for column in columns {
        let column_name = &column.name.value;
        if column_name.eq_ignore_ascii_case("tablename")
            || column_name.eq_ignore_ascii_case("indexes")
        {
            return Err(AnnSqlError::ReservedIdentifier(format!(
                "Column name {} collides with a managed field",
                column_name
            )));
        }
        schema.add_column(
            column_name,
            ColumnSpec::new(map_semantic_type(&column.data_type)),
        );
    }
    for constraint in constraints {
        match constraint {
            TableConstraint::ForeignKey {
                name,
                columns,
                foreign_table,
                referred_columns,
                ..
            } => {
                let local = match columns.first() {
                    Some(ident) => &ident.value,
                    None => continue,
                };
                let referenced_column = match referred_columns.first() {
                    Some(ident) => &ident.value,
                    None => continue,
                };
                let referenced_table = get_name(foreign_table)?;
                let view_key = name
                    .as_ref()
                    .and_then(|n| ForeignKey::view_key_from_constraint(&n.value));
                // A key on an undeclared column is skipped.
                if let Some(spec) = schema.column_mut(local) {
                    spec.foreign_key = Some(ForeignKey::new(
                        &referenced_table,
                        referenced_column,
                        view_key,
                    ));
                }
            }
            TableConstraint::Index { columns, .. } => {
                for column in columns {
                    schema.add_indexed_column(&column.value);
                }
            }
            _ => {}
        }
    }
    Ok(schema)
}

/// Builds a row insertion from the pieces of an INSERT statement.
///
/// # Arguments
///
/// * `table_name` - Table receiving the row.
/// * `columns` - Target column list.
/// * `source` - The statement's VALUES clause.
fn process_insert(
    table_name: &ObjectName,
    columns: &[Ident],
    source: Option<&Query>,
) -> Result<RowInsertion, AnnSqlError> {
    let tablename = get_name(table_name)?;
    let source = match source {
        Some(query) => query,
        None => {
            return Err(AnnSqlError::UnsupportedStatement(String::from(
                "INSERT without a VALUES list",
            )))
        }
    };
    let rows = match &*source.body {
        SetExpr::Values(values) => &values.rows,
        _ => {
            return Err(AnnSqlError::UnsupportedStatement(String::from(
                "INSERT from SELECT",
            )))
        }
    };
    if rows.len() != 1 {
        return Err(AnnSqlError::UnsupportedStatement(String::from(
            "INSERT of multiple rows",
        )));
    }
    let row = &rows[0];
    if columns.len() != row.len() {
        return Err(AnnSqlError::ColumnValueCountMismatch(format!(
            "Table {} insert has {} columns and {} values",
            tablename,
            columns.len(),
            row.len()
        )));
    }
    let mut values = Vec::new();
    for (column, expr) in columns.iter().zip(row.iter()) {
        values.push((column.value.clone(), value_from_expr(expr)?));
    }
    Ok(RowInsertion::new(&tablename, values))
}

/// Takes the literal out of one VALUES expression.
fn value_from_expr(expr: &Expr) -> Result<AnnValue, AnnSqlError> {
    match expr {
        Expr::Value(Value::Number(s, _)) => {
            let i = s
                .parse::<i64>()
                .map_err(|_| AnnSqlError::ValidationError(format!("Unsupported literal {}", s)))?;
            Ok(AnnValue::Int(i))
        }
        Expr::Value(Value::SingleQuotedString(s)) | Expr::Value(Value::DoubleQuotedString(s)) => {
            Ok(AnnValue::Text(s.to_string()))
        }
        Expr::UnaryOp {
            op: UnaryOperator::Minus,
            expr,
        } => match value_from_expr(expr)? {
            AnnValue::Int(i) => Ok(AnnValue::Int(-i)),
            AnnValue::Text(s) => Err(AnnSqlError::ValidationError(format!(
                "Unsupported literal -{}",
                s
            ))),
        },
        other => Err(AnnSqlError::ValidationError(format!(
            "Unsupported literal in values {}",
            other
        ))),
    }
}

/// Builds a row selection from a SELECT query, validating its shape.
///
/// # Arguments
///
/// * `query` - AST of the query to process.
fn process_query(query: &Query) -> Result<RowSelection, AnnSqlError> {
    let select = match &*query.body {
        SetExpr::Select(select) => select,
        _ => {
            return Err(AnnSqlError::UnsupportedStatement(String::from(
                "Only plain SELECT queries are supported",
            )))
        }
    };
    if select.distinct.is_some() {
        return Err(AnnSqlError::ValidationError(String::from(
            "Distinct not supported",
        )));
    }
    if select.having.is_some() {
        return Err(AnnSqlError::ValidationError(String::from(
            "Having not supported",
        )));
    }
    match &select.group_by {
        GroupByExpr::Expressions(exprs, _) if exprs.is_empty() => {}
        _ => {
            return Err(AnnSqlError::ValidationError(String::from(
                "Group by not supported",
            )))
        }
    }
    if select.from.len() > 1 {
        return Err(AnnSqlError::ValidationError(String::from(
            "Cross product not supported",
        )));
    }
    let from = match select.from.first() {
        Some(from) => from,
        None => {
            return Err(AnnSqlError::ValidationError(String::from(
                "Query must read from one table",
            )))
        }
    };
    if !from.joins.is_empty() {
        return Err(AnnSqlError::ValidationError(String::from(
            "Joins not supported",
        )));
    }
    let tablename = match &from.relation {
        TableFactor::Table { name, .. } => get_name(name)?,
        _ => {
            return Err(AnnSqlError::ValidationError(String::from(
                "Nested joins and derived tables not supported",
            )))
        }
    };
    let mut requested_columns = Vec::new();
    for item in &select.projection {
        match item {
            SelectItem::UnnamedExpr(Expr::Identifier(ident)) => {
                requested_columns.push(ident.value.clone());
            }
            SelectItem::Wildcard(_) => {
                requested_columns.push(String::from("*"));
            }
            _ => {
                return Err(AnnSqlError::ValidationError(String::from(
                    "Select unsupported expression",
                )))
            }
        }
    }
    let filter_expression = selection_filter(&tablename, select.selection.as_ref());
    Ok(RowSelection {
        tablename,
        requested_columns,
        filter_expression,
    })
}
