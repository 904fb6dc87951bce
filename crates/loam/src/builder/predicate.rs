//! WHERE/HAVING predicate model shared by every statement verb.

use crate::value::Value;

/// Boolean connective joining a predicate to the previous one.
///
/// The first predicate's connective is dropped at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Connective {
    And,
    Or,
}

impl Connective {
    fn as_str(&self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum PredicateKind {
    /// `column <op> ?`
    Compare { op: String },
    /// `column IN (?, ...)`, placeholder list sized to the bound values
    In,
    /// `column IS NULL` / `column IS NOT NULL`, binds nothing
    Null { negated: bool },
    /// Raw expression rendered verbatim
    Raw { expr: String },
}

#[derive(Debug, Clone)]
pub(crate) struct Predicate {
    pub column: String,
    pub kind: PredicateKind,
    pub values: Vec<Value>,
    pub connective: Connective,
}

impl Predicate {
    pub fn compare(
        column: &str,
        op: &str,
        value: Value,
        connective: Connective,
    ) -> Self {
        Self {
            column: column.to_string(),
            kind: PredicateKind::Compare { op: op.to_string() },
            values: vec![value],
            connective,
        }
    }

    pub fn in_list(column: &str, values: Vec<Value>, connective: Connective) -> Self {
        Self {
            column: column.to_string(),
            kind: PredicateKind::In,
            values,
            connective,
        }
    }

    pub fn null(column: &str, negated: bool, connective: Connective) -> Self {
        Self {
            column: column.to_string(),
            kind: PredicateKind::Null { negated },
            values: Vec::new(),
            connective,
        }
    }

    pub fn raw(expr: &str, values: Vec<Value>, connective: Connective) -> Self {
        Self {
            column: String::new(),
            kind: PredicateKind::Raw {
                expr: expr.to_string(),
            },
            values,
            connective,
        }
    }

    /// Whether this predicate constrains the given column. Used to suppress
    /// the duplicate soft-delete filter.
    pub fn references(&self, column: &str) -> bool {
        match &self.kind {
            PredicateKind::Raw { expr } => contains_identifier(expr, column),
            _ => self.column == column,
        }
    }

    /// SQL fragment without the leading connective.
    fn fragment(&self) -> String {
        match &self.kind {
            PredicateKind::Compare { op } => format!("{} {} ?", self.column, op),
            PredicateKind::In => {
                if self.values.is_empty() {
                    // An empty IN list matches nothing.
                    "1 = 0".to_string()
                } else {
                    let placeholders = vec!["?"; self.values.len()].join(", ");
                    format!("{} IN ({})", self.column, placeholders)
                }
            }
            PredicateKind::Null { negated } => {
                if *negated {
                    format!("{} IS NOT NULL", self.column)
                } else {
                    format!("{} IS NULL", self.column)
                }
            }
            PredicateKind::Raw { expr } => expr.clone(),
        }
    }
}

/// Whether `expr` mentions `ident` as a whole identifier. A substring hit
/// inside a longer name (`deleted_at_reason`) does not count; a qualified
/// reference (`users.deleted_at`) does.
fn contains_identifier(expr: &str, ident: &str) -> bool {
    expr.match_indices(ident).any(|(i, _)| {
        let before = expr[..i].chars().next_back();
        let after = expr[i + ident.len()..].chars().next();
        !before.is_some_and(is_ident_char) && !after.is_some_and(is_ident_char)
    })
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Render a predicate list, appending bound values in emission order.
pub(crate) fn render(predicates: &[Predicate], sql: &mut String, params: &mut Vec<Value>) {
    for (i, predicate) in predicates.iter().enumerate() {
        if i > 0 {
            sql.push(' ');
            sql.push_str(predicate.connective.as_str());
            sql.push(' ');
        }
        sql.push_str(&predicate.fragment());
        match predicate.kind {
            // Empty IN collapses to a constant and binds nothing.
            PredicateKind::In if predicate.values.is_empty() => {}
            _ => params.extend(predicate.values.iter().cloned()),
        }
    }
}
