use common::TYPE_TABLEDATA;
use sqlparser::ast::{BinaryOperator, Expr, Value};

/// Maps a SQL binary operator onto the store's filter syntax. Operators the
/// filter language has no spelling for pass through unchanged.
///
/// # Arguments
///
/// * `op` - Binary operator to map.
fn filter_operator(op: &BinaryOperator) -> String {
    match op {
        BinaryOperator::And => String::from("&&"),
        BinaryOperator::Or => String::from("||"),
        BinaryOperator::Eq => String::from("="),
        other => other.to_string(),
    }
}

/// Recursively renders a WHERE expression tree in the store's filter syntax.
///
/// String literals come out double quoted without further escaping, numbers
/// unquoted, column references bare, and parenthesized sub-expressions keep
/// their parentheses.
///
/// # Arguments
///
/// * `expr` - Expression tree to render.
pub fn render_expr(expr: &Expr) -> String {
    match expr {
        Expr::Identifier(ident) => ident.value.clone(),
        Expr::CompoundIdentifier(idents) => idents
            .iter()
            .map(|ident| ident.value.clone())
            .collect::<Vec<String>>()
            .join("."),
        Expr::Value(Value::SingleQuotedString(s)) | Expr::Value(Value::DoubleQuotedString(s)) => {
            format!("\"{}\"", s)
        }
        Expr::Value(Value::Number(n, _)) => n.clone(),
        Expr::BinaryOp { left, op, right } => format!(
            "{} {} {}",
            render_expr(left),
            filter_operator(op),
            render_expr(right)
        ),
        Expr::Nested(inner) => format!("({})", render_expr(inner)),
        other => other.to_string(),
    }
}

/// Builds the complete filter for one SELECT: the implicit type and table
/// predicates, then the rendered WHERE clause when one is present.
///
/// # Arguments
///
/// * `tablename` - Table the selection reads from.
/// * `selection` - Optional WHERE expression tree.
pub fn selection_filter(tablename: &str, selection: Option<&Expr>) -> String {
    let base = format!(
        "type = \"{}\" && tablename = \"{}\"",
        TYPE_TABLEDATA, tablename
    );
    match selection {
        Some(expr) => {
            let rendered = render_expr(expr);
            if rendered.is_empty() {
                base
            } else {
                format!("{} && {}", base, rendered)
            }
        }
        None => base,
    }
}
