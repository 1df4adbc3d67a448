//! Counter statement sets.

use std::collections::BTreeMap;
use std::fmt;

/// Default name of the shared table holding counters of simple-id entities.
pub const DEFAULT_COUNTER_TABLE: &str = "entity_counters";

pub const COUNTER_OWNER_TYPE: &str = "owner_type";
pub const COUNTER_OWNER_ID: &str = "owner_id";
pub const COUNTER_NAME: &str = "counter_name";
pub const COUNTER_VALUE: &str = "counter_value";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CounterOperation {
    Increment,
    Decrement,
    Select,
    Delete,
}

impl CounterOperation {
    pub const ALL: [CounterOperation; 4] = [
        CounterOperation::Increment,
        CounterOperation::Decrement,
        CounterOperation::Select,
        CounterOperation::Delete,
    ];
}

impl fmt::Display for CounterOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CounterOperation::Increment => "INCR",
            CounterOperation::Decrement => "DECR",
            CounterOperation::Select => "SELECT",
            CounterOperation::Delete => "DELETE",
        };
        f.pad(s)
    }
}

/// What a clustered-counter statement addresses: one counter column, or the
/// whole row of counters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CounterTarget {
    Counter(String),
    SelectAll,
    DeleteAll,
}

impl CounterTarget {
    pub fn counter(name: impl Into<String>) -> Self {
        CounterTarget::Counter(name.into())
    }
}

impl fmt::Display for CounterTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CounterTarget::Counter(name) => f.pad(name),
            CounterTarget::SelectAll => f.pad("SELECT_ALL"),
            CounterTarget::DeleteAll => f.pad("DELETE_ALL"),
        }
    }
}

/// The four statements against the shared counter table, keyed by
/// `(owner_type, owner_id, counter_name)`.
#[derive(Debug, Clone)]
pub struct SimpleCounterStatements<P> {
    pub increment: P,
    pub decrement: P,
    pub select: P,
    pub delete: P,
}

impl<P> SimpleCounterStatements<P> {
    pub fn get(&self, op: CounterOperation) -> &P {
        match op {
            CounterOperation::Increment => &self.increment,
            CounterOperation::Decrement => &self.decrement,
            CounterOperation::Select => &self.select,
            CounterOperation::Delete => &self.delete,
        }
    }
}

/// Per-counter statements against an entity's own table.
///
/// Increment and decrement hold one entry per counter. Select holds one entry
/// per counter plus `SelectAll`. Delete holds `DeleteAll` only.
#[derive(Debug, Clone)]
pub struct ClusteredCounterStatements<P> {
    increment: BTreeMap<CounterTarget, P>,
    decrement: BTreeMap<CounterTarget, P>,
    select: BTreeMap<CounterTarget, P>,
    delete: BTreeMap<CounterTarget, P>,
}

impl<P> ClusteredCounterStatements<P> {
    pub(crate) fn new(
        per_counter: Vec<(String, P, P, P)>,
        select_all: P,
        delete_all: P,
    ) -> Self {
        let mut increment = BTreeMap::new();
        let mut decrement = BTreeMap::new();
        let mut select = BTreeMap::new();
        for (name, incr, decr, sel) in per_counter {
            increment.insert(CounterTarget::Counter(name.clone()), incr);
            decrement.insert(CounterTarget::Counter(name.clone()), decr);
            select.insert(CounterTarget::Counter(name), sel);
        }
        select.insert(CounterTarget::SelectAll, select_all);

        let mut delete = BTreeMap::new();
        delete.insert(CounterTarget::DeleteAll, delete_all);

        Self {
            increment,
            decrement,
            select,
            delete,
        }
    }

    pub fn for_operation(&self, op: CounterOperation) -> &BTreeMap<CounterTarget, P> {
        match op {
            CounterOperation::Increment => &self.increment,
            CounterOperation::Decrement => &self.decrement,
            CounterOperation::Select => &self.select,
            CounterOperation::Delete => &self.delete,
        }
    }

    pub fn get(&self, op: CounterOperation, target: &CounterTarget) -> Option<&P> {
        self.for_operation(op).get(target)
    }

    /// Statement for one counter column; `None` for `Delete`, which only spans the row.
    pub fn counter(&self, op: CounterOperation, counter_name: &str) -> Option<&P> {
        self.get(op, &CounterTarget::counter(counter_name))
    }

    pub fn select_all(&self) -> &P {
        &self.select[&CounterTarget::SelectAll]
    }

    pub fn delete_all(&self) -> &P {
        &self.delete[&CounterTarget::DeleteAll]
    }
}
