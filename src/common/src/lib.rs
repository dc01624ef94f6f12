#[macro_use]
extern crate serde;
extern crate log;

use sqlparser::ast;
use sqlparser::parser::ParserError;
use std::error::Error;
use std::fmt;
use std::io;

pub mod annotations;
pub mod fk;
pub mod statement;
pub mod storage_trait;
pub mod testutil;

/// Marker value on entities holding a table schema.
pub const TYPE_TABLE: &str = "table";
/// Marker value on entities holding one row of table data.
pub const TYPE_TABLEDATA: &str = "tabledata";

/// Custom error type.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnSqlError {
    /// IO Errors.
    IOError(String),
    /// Custom errors.
    AnnSqlError(String),
    /// Underlying SQL grammar failure.
    MalformedSql(String),
    /// Statement kind outside create table / insert / select.
    UnsupportedStatement(String),
    /// Column named after a managed annotation key.
    ReservedIdentifier(String),
    /// INSERT column list and value list disagree in length.
    ColumnValueCountMismatch(String),
    /// Validation errors.
    ValidationError(String),
    /// Execution errors.
    ExecutionError(String),
}

impl fmt::Display for AnnSqlError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                AnnSqlError::MalformedSql(s) => format!("Malformed SQL: {}", s),
                AnnSqlError::UnsupportedStatement(s) => format!("Unsupported Statement: {}", s),
                AnnSqlError::ReservedIdentifier(s) => format!("Reserved Identifier: {}", s),
                AnnSqlError::ColumnValueCountMismatch(s) =>
                    format!("Column Value Count Mismatch: {}", s),
                AnnSqlError::ValidationError(s) => format!("Validation Error: {}", s),
                AnnSqlError::ExecutionError(s) => format!("Execution Error: {}", s),
                AnnSqlError::AnnSqlError(s) => format!("AnnSql Error: {}", s),
                AnnSqlError::IOError(s) => s.to_string(),
            }
        )
    }
}

// Implement std::convert::From for AnnSqlError; from io::Error
impl From<io::Error> for AnnSqlError {
    fn from(error: io::Error) -> Self {
        AnnSqlError::IOError(error.to_string())
    }
}

// The grammar's failures surface with the parser's own message.
impl From<ParserError> for AnnSqlError {
    fn from(error: ParserError) -> Self {
        AnnSqlError::MalformedSql(error.to_string())
    }
}

impl From<serde_json::Error> for AnnSqlError {
    fn from(error: serde_json::Error) -> Self {
        AnnSqlError::ExecutionError(error.to_string())
    }
}

impl Error for AnnSqlError {}

/// A literal value carried by an annotation: the store knows strings and numbers.
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, PartialOrd, Ord, Clone, Hash)]
#[serde(untagged)]
pub enum AnnValue {
    Int(i64),
    Text(String),
}

impl AnnValue {
    /// Render the value as a filter-expression literal.
    ///
    /// Strings are double quoted, numbers stay bare.
    pub fn filter_literal(&self) -> String {
        match self {
            AnnValue::Int(i) => i.to_string(),
            AnnValue::Text(s) => format!("\"{}\"", s),
        }
    }

    /// Unwraps integer values.
    pub fn unwrap_int(&self) -> i64 {
        match self {
            AnnValue::Int(i) => *i,
            _ => panic!("Expected i64"),
        }
    }

    /// Unwraps string values.
    pub fn unwrap_text(&self) -> &str {
        match self {
            AnnValue::Text(s) => s,
            _ => panic!("Expected String"),
        }
    }
}

impl fmt::Display for AnnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnValue::Int(i) => write!(f, "{}", i),
            AnnValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Semantic type a SQL column keyword maps to.
#[derive(PartialEq, Serialize, Deserialize, Clone, Debug)]
pub enum SemanticType {
    Number,
    String,
    Unknown,
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::Number => write!(f, "number"),
            SemanticType::String => write!(f, "string"),
            SemanticType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Retrieve the name from the command parser object.
///
/// # Argument
///
/// * `name` - Name object from the command parser.
pub fn get_name(name: &ast::ObjectName) -> Result<String, AnnSqlError> {
    if name.0.len() > 1 {
        Err(AnnSqlError::AnnSqlError(String::from(
            "Error no . names supported",
        )))
    } else {
        Ok(name.0[0].value.clone())
    }
}

/// Map a SQL data type keyword onto its semantic type.
///
/// Unrecognized keywords map to the unknown sentinel, never an error.
///
/// # Argument
///
/// * `dtype` - Data type object from the command parser.
pub fn map_semantic_type(dtype: &ast::DataType) -> SemanticType {
    match dtype {
        ast::DataType::Int(_)
        | ast::DataType::Integer(_)
        | ast::DataType::SmallInt(_)
        | ast::DataType::BigInt(_)
        | ast::DataType::Real
        | ast::DataType::Float(_)
        | ast::DataType::Double
        | ast::DataType::DoublePrecision => SemanticType::Number,
        ast::DataType::Text
        | ast::DataType::Varchar(_)
        | ast::DataType::Char(_)
        | ast::DataType::Character(_) => SemanticType::String,
        _ => SemanticType::Unknown,
    }
}
