//! EntityRegistry for mapping entity names to their metadata.

use crate::domain::model::{EntityDescriptor, EntityMeta, MetadataError};
use anyhow::Context;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// A registry that maps entity class names to shared, immutable `EntityMeta`.
#[derive(Debug)]
pub struct EntityRegistry {
    entities: HashMap<String, Arc<EntityMeta>>,
}

impl EntityRegistry {
    /// Creates a new empty EntityRegistry.
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
        }
    }

    /// Registers an entity under its class name, replacing any previous registration.
    pub fn register(&mut self, meta: EntityMeta) -> Arc<EntityMeta> {
        let meta = Arc::new(meta);
        self.entities
            .insert(meta.class_name().to_string(), meta.clone());
        meta
    }

    /// Retrieves an entity by class name.
    /// Returns None if the entity is not registered.
    pub fn get(&self, name: &str) -> Option<Arc<EntityMeta>> {
        self.entities.get(name).cloned()
    }

    pub fn require(&self, name: &str) -> Result<Arc<EntityMeta>, MetadataError> {
        self.get(name)
            .ok_or_else(|| MetadataError::UnknownEntity(name.to_string()))
    }

    /// Returns all registered entity names, sorted.
    pub fn list_entities(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entities.keys().cloned().collect();
        names.sort();
        names
    }

    /// All registered entities, ordered by class name.
    pub fn entities(&self) -> Vec<Arc<EntityMeta>> {
        let mut metas: Vec<Arc<EntityMeta>> = self.entities.values().cloned().collect();
        metas.sort_by(|a, b| a.class_name().cmp(b.class_name()));
        metas
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Builds a registry from descriptors, failing on the first invalid entity.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = EntityDescriptor>,
    ) -> Result<Self, MetadataError> {
        let mut reg = EntityRegistry::new();
        for descriptor in descriptors {
            reg.register(EntityMeta::try_from(descriptor)?);
        }
        Ok(reg)
    }

    /// Loads a JSON array of entity descriptors from `path`.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read entity descriptors from {}", path.display()))?;
        let descriptors: Vec<EntityDescriptor> = serde_json::from_str(&raw)
            .with_context(|| format!("invalid entity descriptor file {}", path.display()))?;
        let reg = Self::from_descriptors(descriptors)
            .with_context(|| format!("invalid entity metadata in {}", path.display()))?;
        Ok(reg)
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
