//! Prepared-statement generation for mapped entities.

use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

pub mod counter;
pub mod cql;
pub mod generator;

pub use counter::{
    ClusteredCounterStatements, CounterOperation, CounterTarget, SimpleCounterStatements,
    DEFAULT_COUNTER_TABLE,
};
pub use cql::{BindMarker, WhereClause, TTL_MARKER};
pub use generator::StatementGenerator;

#[derive(Debug, Error)]
pub enum GeneratorError<E> {
    /// The request is a caller bug (e.g. a counter passed to a single-field select).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The store refused to prepare the statement.
    #[error(transparent)]
    Store(E),
}

impl<E> GeneratorError<E> {
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, GeneratorError::InvalidArgument(_))
    }
}

/// Every template one entity needs, prepared once at registration.
#[derive(Debug, Clone)]
pub struct EntityStatements<P> {
    pub insert: P,
    pub select_entity: P,
    /// One single-column select per regular property.
    pub select_fields: BTreeMap<String, P>,
    /// Keyed by table name.
    pub delete: HashMap<String, P>,
    /// Present when the entity has a compound id and at least one counter.
    pub clustered_counters: Option<ClusteredCounterStatements<P>>,
}
