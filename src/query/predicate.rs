//! Typed predicate expressions rendered into SQLite with bound parameters.
//!
//! User-supplied values never become part of the SQL text: every literal is
//! pushed through `QueryBuilder::push_bind`, and column names come from a
//! closed enum.

use sqlx::{QueryBuilder, Sqlite};

/// Filterable columns of the `Games` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Platform,
    LaunchDate,
    NumOfPlayers,
    Ratings,
    CriticTotal,
    UserTotal,
}

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::Platform => "Platform",
            Column::LaunchDate => "LaunchDate",
            Column::NumOfPlayers => "NumOfPlayers",
            Column::Ratings => "Ratings",
            Column::CriticTotal => "CriticTotal",
            Column::UserTotal => "UserTotal",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Gt,
    Ge,
    Lt,
    Le,
}

impl CmpOp {
    fn sql(self) -> &'static str {
        match self {
            CmpOp::Gt => " > ",
            CmpOp::Ge => " >= ",
            CmpOp::Lt => " < ",
            CmpOp::Le => " <= ",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Equals(Column, Value),
    Compare(Column, CmpOp, Value),
    /// Inclusive on both ends.
    Range {
        column: Column,
        low: Value,
        high: Value,
    },
    /// Disjunction; an empty list matches nothing.
    Any(Vec<Predicate>),
    /// Conjunction; an empty list matches everything.
    All(Vec<Predicate>),
}

impl Predicate {
    pub fn equals(column: Column, value: impl Into<Value>) -> Self {
        Predicate::Equals(column, value.into())
    }

    pub fn compare(column: Column, op: CmpOp, value: impl Into<Value>) -> Self {
        Predicate::Compare(column, op, value.into())
    }

    pub fn range(column: Column, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Predicate::Range {
            column,
            low: low.into(),
            high: high.into(),
        }
    }

    /// True when rendering would add no condition at all.
    pub fn is_trivial(&self) -> bool {
        matches!(self, Predicate::All(parts) if parts.iter().all(Predicate::is_trivial))
    }

    /// Append ` WHERE <predicate>` unless the predicate is trivially true.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        if self.is_trivial() {
            return;
        }
        qb.push(" WHERE ");
        match self {
            // Top-level conjunction needs no surrounding parentheses.
            Predicate::All(parts) => push_joined(qb, parts, " AND "),
            other => other.push_to(qb),
        }
    }

    pub fn push_to(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Predicate::Equals(column, value) => {
                qb.push(column.name()).push(" = ");
                push_value(qb, value);
            }
            Predicate::Compare(column, op, value) => {
                qb.push(column.name()).push(op.sql());
                push_value(qb, value);
            }
            Predicate::Range { column, low, high } => {
                qb.push(column.name()).push(" BETWEEN ");
                push_value(qb, low);
                qb.push(" AND ");
                push_value(qb, high);
            }
            Predicate::Any(parts) if parts.is_empty() => {
                qb.push("0");
            }
            Predicate::All(parts) if self.is_trivial() || parts.is_empty() => {
                qb.push("1");
            }
            Predicate::Any(parts) => {
                qb.push("(");
                push_joined(qb, parts, " OR ");
                qb.push(")");
            }
            Predicate::All(parts) => {
                qb.push("(");
                push_joined(qb, parts, " AND ");
                qb.push(")");
            }
        }
    }
}

fn push_joined(qb: &mut QueryBuilder<'_, Sqlite>, parts: &[Predicate], sep: &str) {
    let mut first = true;
    for part in parts.iter().filter(|p| !p.is_trivial()) {
        if !first {
            qb.push(sep);
        }
        part.push_to(qb);
        first = false;
    }
}

fn push_value(qb: &mut QueryBuilder<'_, Sqlite>, value: &Value) {
    match value {
        Value::Text(s) => qb.push_bind(s.clone()),
        Value::Int(i) => qb.push_bind(*i),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(p: &Predicate) -> String {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("SELECT * FROM Games");
        p.push_where(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn empty_conjunction_adds_no_where_clause() {
        assert_eq!(render(&Predicate::All(vec![])), "SELECT * FROM Games");
        assert_eq!(
            render(&Predicate::All(vec![Predicate::All(vec![])])),
            "SELECT * FROM Games"
        );
    }

    #[test]
    fn conjunction_joins_fragments_and_wraps_disjunctions() {
        let p = Predicate::All(vec![
            Predicate::equals(Column::Platform, "PlayStation 4"),
            Predicate::Any(vec![
                Predicate::equals(Column::Ratings, "E"),
                Predicate::equals(Column::Ratings, "T"),
            ]),
            Predicate::compare(Column::CriticTotal, CmpOp::Ge, 5_i64),
        ]);
        let sql = render(&p);
        assert!(sql.starts_with("SELECT * FROM Games WHERE Platform = "));
        assert!(sql.contains(" AND (Ratings = "));
        assert!(sql.contains(" OR Ratings = "));
        assert!(sql.contains(") AND CriticTotal >= "));
        assert!(!sql.starts_with("SELECT * FROM Games WHERE ("));
    }

    #[test]
    fn literals_are_bound_not_interpolated() {
        let hostile = r#"E" OR 1=1 --"#;
        let p = Predicate::All(vec![
            Predicate::equals(Column::Ratings, hostile),
            Predicate::range(Column::LaunchDate, "2020-01-01", "2020-12-31"),
        ]);
        let sql = render(&p);
        assert!(!sql.contains("1=1"));
        assert!(!sql.contains("2020-01-01"));
        assert!(sql.contains("LaunchDate BETWEEN "));
    }

    #[test]
    fn empty_disjunction_matches_nothing() {
        let sql = render(&Predicate::Any(vec![]));
        assert_eq!(sql, "SELECT * FROM Games WHERE 0");
    }
}
