//! Startup preparation.
//!
//! Runs the statement generator once over every registered entity and returns
//! the prepared handles. Keeping them (and sharing them between readers) is
//! the caller's job; nothing here is cached or invalidated.

use crate::domain::model::EntityRegistry;
use crate::domain::statement::{EntityStatements, SimpleCounterStatements, StatementGenerator};
use crate::infra::config;
use crate::storage::prepare::StatementPreparer;
use anyhow::Context;
use std::collections::BTreeMap;
use tracing::info;

/// Prepared handles for a whole registry.
#[derive(Debug, Clone)]
pub struct PreparedCatalog<P> {
    pub simple_counters: SimpleCounterStatements<P>,
    /// Keyed by entity class name.
    pub entities: BTreeMap<String, EntityStatements<P>>,
}

impl<P> PreparedCatalog<P> {
    pub fn entity(&self, class_name: &str) -> Option<&EntityStatements<P>> {
        self.entities.get(class_name)
    }
}

/// Builds a generator from `PREPARE_KEYSPACE` and `COUNTER_TABLE`.
pub fn generator_from_env() -> anyhow::Result<StatementGenerator> {
    let mut generator = StatementGenerator::new().with_counter_table(config::counter_table()?)?;
    if let Some(keyspace) = config::keyspace()? {
        generator = generator.with_keyspace(keyspace)?;
    }
    Ok(generator)
}

/// Prepares the shared counter statements, then every entity in class-name order.
pub async fn prepare_registry<P>(
    generator: &StatementGenerator,
    preparer: &P,
    registry: &EntityRegistry,
) -> anyhow::Result<PreparedCatalog<P::Prepared>>
where
    P: StatementPreparer + ?Sized,
{
    info!(
        entities = registry.len(),
        keyspace = generator.keyspace().unwrap_or("<none>"),
        "preparing statements"
    );

    let simple_counters = generator
        .prepare_simple_counter_operations(preparer)
        .await
        .context("failed to prepare shared counter statements")?;

    let mut entities = BTreeMap::new();
    for meta in registry.entities() {
        let statements = generator
            .prepare_entity(preparer, &meta)
            .await
            .with_context(|| format!("failed to prepare statements for entity '{}'", meta.class_name()))?;
        entities.insert(meta.class_name().to_string(), statements);
    }

    info!(entities = entities.len(), "statements prepared");
    Ok(PreparedCatalog {
        simple_counters,
        entities,
    })
}
