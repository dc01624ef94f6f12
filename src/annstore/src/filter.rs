use common::annotations::EntityMetadata;
use common::AnnSqlError;
use std::iter::Peekable;

/// Comparison operators the filter language supports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompareOp {
    Eq,
    Lt,
    Gt,
    Le,
    Ge,
}

/// Literal on the right hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Str(String),
    Num(i64),
}

/// Parsed form of a boolean annotation filter.
///
/// Grammar, loosest binding first: `or := and ("||" and)*`,
/// `and := primary ("&&" primary)*`, `primary := "(" or ")" | key op value`.
/// Values are double-quoted strings (no escapes) or signed integers;
/// whitespace is insignificant throughout.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    And(Box<FilterExpr>, Box<FilterExpr>),
    Or(Box<FilterExpr>, Box<FilterExpr>),
    Compare {
        key: String,
        op: CompareOp,
        value: FilterValue,
    },
}

impl FilterExpr {
    /// Parse a filter expression.
    ///
    /// # Arguments
    ///
    /// * `input` - Filter text in the store's query syntax.
    pub fn parse(input: &str) -> Result<FilterExpr, AnnSqlError> {
        let tokens = lex(input)?;
        let mut parser = FilterParser {
            tokens: tokens.into_iter().peekable(),
        };
        let expr = parser.parse_or()?;
        if parser.tokens.next().is_some() {
            return Err(AnnSqlError::ExecutionError(format!(
                "malformed filter, trailing input: {}",
                input
            )));
        }
        Ok(expr)
    }

    /// Evaluate the filter against one entity's annotations.
    ///
    /// String annotations support equality only; numeric annotations support
    /// the full ordering. A key absent from the entity fails its comparison.
    ///
    /// # Arguments
    ///
    /// * `metadata` - Annotations of the entity under test.
    pub fn matches(&self, metadata: &EntityMetadata) -> bool {
        match self {
            FilterExpr::And(left, right) => left.matches(metadata) && right.matches(metadata),
            FilterExpr::Or(left, right) => left.matches(metadata) || right.matches(metadata),
            FilterExpr::Compare { key, op, value } => match value {
                FilterValue::Str(expected) => metadata
                    .string_annotations
                    .iter()
                    .any(|a| a.key == *key && *op == CompareOp::Eq && a.value == *expected),
                FilterValue::Num(expected) => metadata
                    .numeric_annotations
                    .iter()
                    .any(|a| a.key == *key && compare_num(a.value, *op, *expected)),
            },
        }
    }
}

fn compare_num(actual: i64, op: CompareOp, expected: i64) -> bool {
    match op {
        CompareOp::Eq => actual == expected,
        CompareOp::Lt => actual < expected,
        CompareOp::Gt => actual > expected,
        CompareOp::Le => actual <= expected,
        CompareOp::Ge => actual >= expected,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Key(String),
    Str(String),
    Num(i64),
    Op(CompareOp),
    And,
    Or,
    LParen,
    RParen,
}

fn malformed(detail: &str) -> AnnSqlError {
    AnnSqlError::ExecutionError(format!("malformed filter: {}", detail))
}

fn lex(input: &str) -> Result<Vec<Token>, AnnSqlError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '=' => {
                chars.next();
                tokens.push(Token::Op(CompareOp::Eq));
            }
            '<' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Op(CompareOp::Le));
                } else {
                    tokens.push(Token::Op(CompareOp::Lt));
                }
            }
            '>' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Op(CompareOp::Ge));
                } else {
                    tokens.push(Token::Op(CompareOp::Gt));
                }
            }
            '&' => {
                chars.next();
                if chars.next() != Some('&') {
                    return Err(malformed("expected &&"));
                }
                tokens.push(Token::And);
            }
            '|' => {
                chars.next();
                if chars.next() != Some('|') {
                    return Err(malformed("expected ||"));
                }
                tokens.push(Token::Or);
            }
            '"' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some(ch) => value.push(ch),
                        None => return Err(malformed("unterminated string")),
                    }
                }
                tokens.push(Token::Str(value));
            }
            '-' => {
                chars.next();
                let digits = lex_digits(&mut chars)?;
                let n = format!("-{}", digits)
                    .parse::<i64>()
                    .map_err(|_| malformed("numeric literal out of range"))?;
                tokens.push(Token::Num(n));
            }
            _ if c.is_ascii_digit() => {
                let digits = lex_digits(&mut chars)?;
                let n = digits
                    .parse::<i64>()
                    .map_err(|_| malformed("numeric literal out of range"))?;
                tokens.push(Token::Num(n));
            }
            _ if c.is_alphanumeric() || c == '_' => {
                let mut key = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' || ch == '.' {
                        key.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Key(key));
            }
            other => {
                return Err(malformed(&format!("unexpected character {:?}", other)));
            }
        }
    }
    Ok(tokens)
}

fn lex_digits(chars: &mut Peekable<std::str::Chars>) -> Result<String, AnnSqlError> {
    let mut digits = String::new();
    while let Some(&ch) = chars.peek() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            chars.next();
        } else {
            break;
        }
    }
    if digits.is_empty() {
        Err(malformed("expected digits"))
    } else {
        Ok(digits)
    }
}

struct FilterParser {
    tokens: Peekable<std::vec::IntoIter<Token>>,
}

impl FilterParser {
    fn parse_or(&mut self) -> Result<FilterExpr, AnnSqlError> {
        let mut left = self.parse_and()?;
        while self.tokens.peek() == Some(&Token::Or) {
            self.tokens.next();
            let right = self.parse_and()?;
            left = FilterExpr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<FilterExpr, AnnSqlError> {
        let mut left = self.parse_primary()?;
        while self.tokens.peek() == Some(&Token::And) {
            self.tokens.next();
            let right = self.parse_primary()?;
            left = FilterExpr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<FilterExpr, AnnSqlError> {
        match self.tokens.next() {
            Some(Token::LParen) => {
                let expr = self.parse_or()?;
                match self.tokens.next() {
                    Some(Token::RParen) => Ok(expr),
                    _ => Err(malformed("expected )")),
                }
            }
            Some(Token::Key(key)) => {
                let op = match self.tokens.next() {
                    Some(Token::Op(op)) => op,
                    _ => return Err(malformed("expected comparison operator")),
                };
                let value = match self.tokens.next() {
                    Some(Token::Str(s)) => FilterValue::Str(s),
                    Some(Token::Num(n)) => FilterValue::Num(n),
                    _ => return Err(malformed("expected literal value")),
                };
                Ok(FilterExpr::Compare { key, op, value })
            }
            _ => Err(malformed("expected key or (")),
        }
    }
}
