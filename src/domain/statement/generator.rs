//! The statement generator.
//!
//! Builds the CQL for every operation an entity needs and hands it to a
//! `StatementPreparer`, one round-trip per template. Nothing is cached here;
//! callers keep the returned handles for the lifetime of the process.

use crate::domain::model::{ensure_ident, EntityMeta, MetadataError, PropertyMeta};
use crate::domain::statement::counter::{
    ClusteredCounterStatements, SimpleCounterStatements, COUNTER_NAME, COUNTER_OWNER_ID,
    COUNTER_OWNER_TYPE, COUNTER_VALUE, DEFAULT_COUNTER_TABLE,
};
use crate::domain::statement::cql::{
    Assignment, BindMarker, Delete, Insert, Select, Selection, TableRef, Update, WhereClause,
    TTL_MARKER,
};
use crate::domain::statement::{EntityStatements, GeneratorError};
use crate::storage::prepare::StatementPreparer;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

type GenResult<P> =
    Result<<P as StatementPreparer>::Prepared, GeneratorError<<P as StatementPreparer>::Error>>;

#[derive(Debug, Clone)]
pub struct StatementGenerator {
    keyspace: Option<String>,
    counter_table: String,
}

impl StatementGenerator {
    pub fn new() -> Self {
        Self {
            keyspace: None,
            counter_table: DEFAULT_COUNTER_TABLE.to_string(),
        }
    }

    /// Qualifies every table name with `keyspace`.
    pub fn with_keyspace(mut self, keyspace: impl Into<String>) -> Result<Self, MetadataError> {
        let keyspace = keyspace.into();
        ensure_ident(&keyspace)?;
        self.keyspace = Some(keyspace);
        Ok(self)
    }

    /// Overrides the shared counter table used by simple counters.
    pub fn with_counter_table(mut self, table: impl Into<String>) -> Result<Self, MetadataError> {
        let table = table.into();
        ensure_ident(&table)?;
        self.counter_table = table;
        Ok(self)
    }

    pub fn keyspace(&self) -> Option<&str> {
        self.keyspace.as_deref()
    }

    pub fn counter_table(&self) -> &str {
        &self.counter_table
    }

    fn table(&self, name: &str) -> TableRef {
        TableRef::new(self.keyspace.as_deref(), name)
    }

    /// INSERT of the id (every component if compound) and every regular
    /// property, with a `ttl` marker. Counters are never part of it.
    pub async fn prepare_insert<P>(&self, preparer: &P, entity: &EntityMeta) -> GenResult<P>
    where
        P: StatementPreparer + ?Sized,
    {
        trace!(entity = entity.class_name(), "generate INSERT");

        let mut values: Vec<(String, BindMarker)> = entity
            .id_meta()
            .columns()
            .into_iter()
            .map(|c| (c.to_string(), BindMarker::named(c)))
            .collect();
        for pm in entity.all_except_id_and_counters() {
            values.push((pm.name().to_string(), BindMarker::named(pm.name())));
        }

        let insert = Insert {
            table: self.table(entity.table_name()),
            values,
            ttl: Some(BindMarker::named(TTL_MARKER)),
        };
        prepare(preparer, insert.to_string()).await
    }

    /// SELECT of one property, filtered by the id predicate.
    ///
    /// Counters and wide maps live in separate structures and are rejected
    /// with `InvalidArgument` before anything reaches the store.
    pub async fn prepare_select_field<P>(
        &self,
        preparer: &P,
        entity: &EntityMeta,
        pm: &PropertyMeta,
    ) -> GenResult<P>
    where
        P: StatementPreparer + ?Sized,
    {
        trace!(entity = entity.class_name(), property = pm.name(), "generate SELECT field");

        if pm.is_counter() {
            return Err(GeneratorError::InvalidArgument(format!(
                "cannot prepare statement for property '{}' of entity '{}' because it is a counter type",
                pm.name(),
                entity.class_name()
            )));
        }
        if pm.is_wide_map() {
            return Err(GeneratorError::InvalidArgument(format!(
                "cannot prepare statement for property '{}' of entity '{}' because it is a wide map",
                pm.name(),
                entity.class_name()
            )));
        }
        ensure_owned::<P::Error>(entity, pm)?;

        let select = Select {
            table: self.table(entity.table_name()),
            selection: Selection::Columns(owned_columns(pm)),
            filter: WhereClause::for_id(entity.id_meta()),
        };
        prepare(preparer, select.to_string()).await
    }

    /// SELECT of every loadable column (id components first), filtered by the id predicate.
    pub async fn prepare_select_entity<P>(&self, preparer: &P, entity: &EntityMeta) -> GenResult<P>
    where
        P: StatementPreparer + ?Sized,
    {
        trace!(entity = entity.class_name(), "generate SELECT entity");

        let columns = entity
            .columns_to_load()
            .into_iter()
            .flat_map(owned_columns)
            .collect();
        let select = Select {
            table: self.table(entity.table_name()),
            selection: Selection::Columns(columns),
            filter: WhereClause::for_id(entity.id_meta()),
        };
        prepare(preparer, select.to_string()).await
    }

    /// UPDATE assigning exactly `properties`, in the given order, with a `ttl`
    /// marker on the update itself.
    pub async fn prepare_update_fields<P>(
        &self,
        preparer: &P,
        entity: &EntityMeta,
        properties: &[&PropertyMeta],
    ) -> GenResult<P>
    where
        P: StatementPreparer + ?Sized,
    {
        trace!(
            entity = entity.class_name(),
            properties = ?properties.iter().map(|pm| pm.name()).collect::<Vec<_>>(),
            "generate UPDATE fields"
        );

        if properties.is_empty() {
            return Err(GeneratorError::InvalidArgument(format!(
                "cannot prepare an update of entity '{}' without properties",
                entity.class_name()
            )));
        }
        for pm in properties {
            if pm.is_counter() || pm.is_id() || pm.is_wide_map() {
                return Err(GeneratorError::InvalidArgument(format!(
                    "property '{}' of entity '{}' cannot be assigned by an update ({:?})",
                    pm.name(),
                    entity.class_name(),
                    pm.kind()
                )));
            }
            ensure_owned::<P::Error>(entity, pm)?;
        }

        let update = Update {
            table: self.table(entity.table_name()),
            ttl: Some(BindMarker::named(TTL_MARKER)),
            assignments: properties
                .iter()
                .map(|pm| Assignment::Set(pm.name().to_string(), BindMarker::named(pm.name())))
                .collect(),
            filter: WhereClause::for_id(entity.id_meta()),
        };
        prepare(preparer, update.to_string()).await
    }

    /// DELETE of the whole row, keyed by table name.
    pub async fn prepare_delete<P>(
        &self,
        preparer: &P,
        entity: &EntityMeta,
    ) -> Result<HashMap<String, P::Prepared>, GeneratorError<P::Error>>
    where
        P: StatementPreparer + ?Sized,
    {
        trace!(entity = entity.class_name(), "generate DELETE");

        let delete = Delete {
            table: self.table(entity.table_name()),
            filter: WhereClause::for_id(entity.id_meta()),
        };
        let prepared = prepare(preparer, delete.to_string()).await?;

        let mut statements = HashMap::new();
        statements.insert(entity.table_name().to_string(), prepared);
        Ok(statements)
    }

    /// The four statements against the shared counter table, all bound positionally:
    /// the delta first (increment/decrement), then owner type, owner id and counter name.
    pub async fn prepare_simple_counter_operations<P>(
        &self,
        preparer: &P,
    ) -> Result<SimpleCounterStatements<P::Prepared>, GeneratorError<P::Error>>
    where
        P: StatementPreparer + ?Sized,
    {
        trace!(table = %self.counter_table, "generate simple counter statements");

        let table = self.table(&self.counter_table);
        let filter = WhereClause::new()
            .and_eq(COUNTER_OWNER_TYPE, BindMarker::Positional)
            .and_eq(COUNTER_OWNER_ID, BindMarker::Positional)
            .and_eq(COUNTER_NAME, BindMarker::Positional);

        let incr = Update {
            table: table.clone(),
            ttl: None,
            assignments: vec![Assignment::Increment(
                COUNTER_VALUE.to_string(),
                BindMarker::Positional,
            )],
            filter: filter.clone(),
        };
        let decr = Update {
            table: table.clone(),
            ttl: None,
            assignments: vec![Assignment::Decrement(
                COUNTER_VALUE.to_string(),
                BindMarker::Positional,
            )],
            filter: filter.clone(),
        };
        let select = Select {
            table: table.clone(),
            selection: Selection::Columns(vec![COUNTER_VALUE.to_string()]),
            filter: filter.clone(),
        };
        let delete = Delete { table, filter };

        Ok(SimpleCounterStatements {
            increment: prepare(preparer, incr.to_string()).await?,
            decrement: prepare(preparer, decr.to_string()).await?,
            select: prepare(preparer, select.to_string()).await?,
            delete: prepare(preparer, delete.to_string()).await?,
        })
    }

    /// Per-counter increment, decrement and select against the entity's own
    /// table, plus one row-wide select and one row-wide delete.
    pub async fn prepare_clustered_counter_operations<P>(
        &self,
        preparer: &P,
        entity: &EntityMeta,
    ) -> Result<ClusteredCounterStatements<P::Prepared>, GeneratorError<P::Error>>
    where
        P: StatementPreparer + ?Sized,
    {
        trace!(entity = entity.class_name(), "generate clustered counter statements");

        let table = self.table(entity.table_name());
        let filter = WhereClause::for_id(entity.id_meta());

        let mut per_counter = Vec::new();
        for counter in entity.counters() {
            let name = counter.name();
            let incr = Update {
                table: table.clone(),
                ttl: None,
                assignments: vec![Assignment::Increment(name.to_string(), BindMarker::named(name))],
                filter: filter.clone(),
            };
            let decr = Update {
                table: table.clone(),
                ttl: None,
                assignments: vec![Assignment::Decrement(name.to_string(), BindMarker::named(name))],
                filter: filter.clone(),
            };
            let select = Select {
                table: table.clone(),
                selection: Selection::Columns(vec![name.to_string()]),
                filter: filter.clone(),
            };
            per_counter.push((
                name.to_string(),
                prepare(preparer, incr.to_string()).await?,
                prepare(preparer, decr.to_string()).await?,
                prepare(preparer, select.to_string()).await?,
            ));
        }

        let select_all = Select {
            table: table.clone(),
            selection: Selection::All,
            filter: filter.clone(),
        };
        let delete_all = Delete { table, filter };

        let select_all = prepare(preparer, select_all.to_string()).await?;
        let delete_all = prepare(preparer, delete_all.to_string()).await?;
        Ok(ClusteredCounterStatements::new(per_counter, select_all, delete_all))
    }

    /// Prepares everything `entity` needs. Clustered counter statements are
    /// included only for a compound id with counters.
    pub async fn prepare_entity<P>(
        &self,
        preparer: &P,
        entity: &EntityMeta,
    ) -> Result<EntityStatements<P::Prepared>, GeneratorError<P::Error>>
    where
        P: StatementPreparer + ?Sized,
    {
        let insert = self.prepare_insert(preparer, entity).await?;
        let select_entity = self.prepare_select_entity(preparer, entity).await?;

        let mut select_fields = BTreeMap::new();
        for pm in entity.all_except_id_and_counters() {
            let prepared = self.prepare_select_field(preparer, entity, pm).await?;
            select_fields.insert(pm.name().to_string(), prepared);
        }

        let delete = self.prepare_delete(preparer, entity).await?;

        let clustered_counters = if entity.id_meta().is_embedded_id() && entity.has_counters() {
            Some(self.prepare_clustered_counter_operations(preparer, entity).await?)
        } else {
            None
        };

        debug!(
            entity = entity.class_name(),
            fields = select_fields.len(),
            clustered_counters = clustered_counters.is_some(),
            "prepared entity statements"
        );

        Ok(EntityStatements {
            insert,
            select_entity,
            select_fields,
            delete,
            clustered_counters,
        })
    }
}

impl Default for StatementGenerator {
    fn default() -> Self {
        Self::new()
    }
}

async fn prepare<P>(preparer: &P, query: String) -> GenResult<P>
where
    P: StatementPreparer + ?Sized,
{
    trace!(query = %query, "prepare statement");
    preparer.prepare(&query).await.map_err(GeneratorError::Store)
}

fn owned_columns(pm: &PropertyMeta) -> Vec<String> {
    pm.columns().into_iter().map(str::to_string).collect()
}

fn ensure_owned<E>(entity: &EntityMeta, pm: &PropertyMeta) -> Result<(), GeneratorError<E>> {
    match entity.property(pm.name()) {
        Some(owned) if owned == pm => Ok(()),
        _ => Err(GeneratorError::InvalidArgument(format!(
            "property '{}' does not belong to entity '{}'",
            pm.name(),
            entity.class_name()
        ))),
    }
}

