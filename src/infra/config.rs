//! Centralized configuration (environment variables + defaults).

use crate::domain::model::validate_ident;
use crate::domain::statement::DEFAULT_COUNTER_TABLE;
use anyhow::Context;
use std::path::PathBuf;

/// JSON file holding the entity descriptors (required).
pub fn entity_schema_path() -> anyhow::Result<PathBuf> {
    let raw = std::env::var("ENTITY_SCHEMA_PATH").context("ENTITY_SCHEMA_PATH must be set")?;
    Ok(PathBuf::from(raw))
}

/// Shared counter table for simple-id entities (defaults to `entity_counters`).
pub fn counter_table() -> anyhow::Result<String> {
    let table =
        std::env::var("COUNTER_TABLE").unwrap_or_else(|_| DEFAULT_COUNTER_TABLE.to_string());
    ensure_ident("COUNTER_TABLE", table)
}

/// Optional keyspace qualifier for every generated statement.
pub fn keyspace() -> anyhow::Result<Option<String>> {
    match std::env::var("PREPARE_KEYSPACE") {
        Ok(ks) if !ks.trim().is_empty() => Ok(Some(ensure_ident("PREPARE_KEYSPACE", ks)?)),
        _ => Ok(None),
    }
}

fn ensure_ident(var: &str, value: String) -> anyhow::Result<String> {
    let value = value.trim().to_string();
    if !validate_ident(&value) {
        anyhow::bail!("{} must be a valid identifier, got '{}'", var, value);
    }
    Ok(value)
}
