//! In-process statement preparer.
//!
//! Performs the checks a store would do on text it cannot parse, assigns a
//! stable statement id, and keeps track of how many round-trips it served.

use crate::crypto::hashing::statement_id;
use crate::storage::prepare::template::{scan_bind_markers, PreparedTemplate};
use crate::storage::prepare::StatementPreparer;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use thiserror::Error;

const STATEMENT_VERBS: [&str; 4] = ["SELECT", "INSERT", "UPDATE", "DELETE"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrepareError {
    #[error("empty statement")]
    Empty,
    #[error("unsupported statement: {0}")]
    UnsupportedStatement(String),
    #[error("unterminated string literal starting at byte {offset}")]
    UnterminatedLiteral { offset: usize },
}

#[derive(Default)]
pub struct LocalPreparer {
    round_trips: AtomicUsize,
    history: Mutex<Vec<String>>,
}

impl LocalPreparer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `prepare` calls served, failed ones included.
    pub fn round_trips(&self) -> usize {
        self.round_trips.load(Ordering::SeqCst)
    }

    /// Query text of every successfully prepared statement, in call order.
    pub fn prepared_queries(&self) -> Vec<String> {
        match self.history.lock() {
            Ok(history) => history.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn check(query: &str) -> Result<PreparedTemplate, PrepareError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(PrepareError::Empty);
        }
        let verb = trimmed
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_uppercase();
        if !STATEMENT_VERBS.contains(&verb.as_str()) {
            return Err(PrepareError::UnsupportedStatement(verb));
        }
        let bind_markers = scan_bind_markers(trimmed)?;
        Ok(PreparedTemplate {
            id: statement_id(trimmed),
            query: trimmed.to_string(),
            bind_markers,
        })
    }
}

#[async_trait]
impl StatementPreparer for LocalPreparer {
    type Prepared = PreparedTemplate;
    type Error = PrepareError;

    async fn prepare(&self, query: &str) -> Result<PreparedTemplate, PrepareError> {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
        let template = Self::check(query)?;
        match self.history.lock() {
            Ok(mut history) => history.push(template.query.clone()),
            Err(poisoned) => poisoned.into_inner().push(template.query.clone()),
        }
        Ok(template)
    }
}
