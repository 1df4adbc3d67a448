//! Minimal CQL statement builders.
//!
//! Each builder renders to query text through `Display`. Predicates are
//! accumulated as an ordered list and folded into one `WHERE` expression at
//! render time, so their order is exactly the order they were pushed.

use crate::domain::model::PropertyMeta;
use std::fmt;

/// Placeholder for a bound value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindMarker {
    /// `:name`
    Named(String),
    /// `?`
    Positional,
}

impl BindMarker {
    pub fn named(name: impl Into<String>) -> Self {
        BindMarker::Named(name.into())
    }
}

impl fmt::Display for BindMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindMarker::Named(name) => write!(f, ":{}", name),
            BindMarker::Positional => f.write_str("?"),
        }
    }
}

/// Name of the expiration bind marker attached to inserts and updates.
pub const TTL_MARKER: &str = "ttl";

/// Optionally keyspace-qualified table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    keyspace: Option<String>,
    name: String,
}

impl TableRef {
    pub fn new(keyspace: Option<&str>, name: &str) -> Self {
        Self {
            keyspace: keyspace.map(str::to_string),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.keyspace {
            Some(ks) => write!(f, "{}.{}", ks, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// `column = marker`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equality {
    pub column: String,
    pub marker: BindMarker,
}

/// Ordered conjunction of equalities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhereClause {
    predicates: Vec<Equality>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id predicate: one equality on a simple id, or one per component of a
    /// compound id in declared order.
    pub fn for_id(id_meta: &PropertyMeta) -> Self {
        id_meta
            .columns()
            .into_iter()
            .fold(Self::new(), |clause, column| {
                clause.and_eq(column, BindMarker::named(column))
            })
    }

    pub fn and_eq(mut self, column: &str, marker: BindMarker) -> Self {
        self.predicates.push(Equality {
            column: column.to_string(),
            marker,
        });
        self
    }

    pub fn predicates(&self) -> &[Equality] {
        &self.predicates
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl fmt::Display for WhereClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.predicates.is_empty() {
            return Ok(());
        }
        let expr = self
            .predicates
            .iter()
            .map(|eq| format!("{} = {}", eq.column, eq.marker))
            .collect::<Vec<_>>()
            .join(" AND ");
        write!(f, " WHERE {}", expr)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insert {
    pub table: TableRef,
    pub values: Vec<(String, BindMarker)>,
    pub ttl: Option<BindMarker>,
}

impl fmt::Display for Insert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self
            .values
            .iter()
            .map(|(c, _)| c.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let markers = self
            .values
            .iter()
            .map(|(_, m)| m.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "INSERT INTO {} ({}) VALUES ({})", self.table, columns, markers)?;
        if let Some(ttl) = &self.ttl {
            write!(f, " USING TTL {}", ttl)?;
        }
        Ok(())
    }
}

/// Column list of a select. `All` renders as `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Columns(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    pub table: TableRef,
    pub selection: Selection,
    pub filter: WhereClause,
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = match &self.selection {
            Selection::All => "*".to_string(),
            Selection::Columns(cols) => cols.join(", "),
        };
        write!(f, "SELECT {} FROM {}{}", columns, self.table, self.filter)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    /// `column = marker`
    Set(String, BindMarker),
    /// `column = column + marker`
    Increment(String, BindMarker),
    /// `column = column - marker`
    Decrement(String, BindMarker),
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assignment::Set(c, m) => write!(f, "{} = {}", c, m),
            Assignment::Increment(c, m) => write!(f, "{} = {} + {}", c, c, m),
            Assignment::Decrement(c, m) => write!(f, "{} = {} - {}", c, c, m),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub table: TableRef,
    pub ttl: Option<BindMarker>,
    pub assignments: Vec<Assignment>,
    pub filter: WhereClause,
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UPDATE {}", self.table)?;
        if let Some(ttl) = &self.ttl {
            write!(f, " USING TTL {}", ttl)?;
        }
        let assignments = self
            .assignments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, " SET {}{}", assignments, self.filter)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delete {
    pub table: TableRef,
    pub filter: WhereClause,
}

impl fmt::Display for Delete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE FROM {}{}", self.table, self.filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn where_clause_keeps_push_order() {
        let clause = WhereClause::new()
            .and_eq("zeta", BindMarker::named("zeta"))
            .and_eq("alpha", BindMarker::Positional);
        assert_eq!(clause.to_string(), " WHERE zeta = :zeta AND alpha = ?");
    }

    #[test]
    fn empty_where_clause_renders_nothing() {
        let delete = Delete {
            table: TableRef::new(Some("ks"), "t"),
            filter: WhereClause::new(),
        };
        assert_eq!(delete.to_string(), "DELETE FROM ks.t");
    }

    #[test]
    fn update_puts_ttl_before_assignments() {
        let update = Update {
            table: TableRef::new(None, "users"),
            ttl: Some(BindMarker::named(TTL_MARKER)),
            assignments: vec![
                Assignment::Set("email".into(), BindMarker::named("email")),
                Assignment::Increment("hits".into(), BindMarker::named("hits")),
            ],
            filter: WhereClause::new().and_eq("id", BindMarker::named("id")),
        };
        assert_eq!(
            update.to_string(),
            "UPDATE users USING TTL :ttl SET email = :email, hits = hits + :hits WHERE id = :id"
        );
    }
}
