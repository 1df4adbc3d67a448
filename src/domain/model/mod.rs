//! Entity metadata consumed by statement generation and composite decoding.
//!
//! Descriptors are built once (from code or from a JSON descriptor file),
//! validated on construction, and shared read-only afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

pub mod descriptor;
pub mod examples;
pub mod registry;

pub use descriptor::{EntityDescriptor, PropertyDescriptor};
pub use examples::{tweet_index_property, tweet_line_entity, user_entity, user_tag_property};
pub use registry::EntityRegistry;

/// Structural problems in entity metadata. These are caller bugs, never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("entity '{entity}' has no id property")]
    MissingId { entity: String },
    #[error("entity '{entity}' declares more than one id property ('{first}', '{second}')")]
    DuplicateId {
        entity: String,
        first: String,
        second: String,
    },
    #[error("compound id '{property}' must declare at least one component")]
    EmptyCompoundId { property: String },
    #[error("entity '{entity}' declares property '{property}' twice")]
    DuplicateProperty { entity: String, property: String },
    #[error("entity '{entity}' maps column '{column}' more than once")]
    DuplicateColumn { entity: String, column: String },
    #[error("property '{property}' is a {kind:?}, not a wide map")]
    NotWideMap { property: String, kind: PropertyKind },
    #[error("wide map '{property}' declares {components} key component(s), which does not fit a {shape} key")]
    KeyShapeMismatch {
        property: String,
        components: usize,
        shape: &'static str,
    },
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),
    #[error("entity '{0}' is not registered")]
    UnknownEntity(String),
}

/// How a property is physically stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// Single-column primary key.
    Id,
    /// Compound primary key; one column per component.
    EmbeddedId,
    /// Regular column.
    Simple,
    /// Monotonic counter, stored apart from regular columns.
    Counter,
    /// Legacy wide-row map keyed by composite column names.
    WideMap,
}

/// Describes one property or key of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMeta {
    name: String,
    kind: PropertyKind,
    /// Declared component order. Drives both WHERE-clause order and composite decoding.
    component_names: Vec<String>,
}

impl PropertyMeta {
    pub fn id(name: impl Into<String>) -> Self {
        Self::plain(name, PropertyKind::Id)
    }

    /// Compound primary key. Component order is significant and never reordered.
    pub fn embedded_id<I, S>(name: impl Into<String>, components: I) -> Result<Self, MetadataError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let component_names: Vec<String> = components.into_iter().map(Into::into).collect();
        if component_names.is_empty() {
            return Err(MetadataError::EmptyCompoundId { property: name });
        }
        Ok(Self {
            name,
            kind: PropertyKind::EmbeddedId,
            component_names,
        })
    }

    pub fn simple(name: impl Into<String>) -> Self {
        Self::plain(name, PropertyKind::Simple)
    }

    pub fn counter(name: impl Into<String>) -> Self {
        Self::plain(name, PropertyKind::Counter)
    }

    /// Wide-row map whose column names carry `key_components` in encoding order.
    /// An empty list means a single-component key.
    pub fn wide_map<I, S>(name: impl Into<String>, key_components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: PropertyKind::WideMap,
            component_names: key_components.into_iter().map(Into::into).collect(),
        }
    }

    fn plain(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            component_names: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    pub fn component_names(&self) -> &[String] {
        &self.component_names
    }

    pub fn is_id(&self) -> bool {
        matches!(self.kind, PropertyKind::Id | PropertyKind::EmbeddedId)
    }

    pub fn is_embedded_id(&self) -> bool {
        self.kind == PropertyKind::EmbeddedId
    }

    pub fn is_counter(&self) -> bool {
        self.kind == PropertyKind::Counter
    }

    pub fn is_wide_map(&self) -> bool {
        self.kind == PropertyKind::WideMap
    }

    /// True when a wide-row key is made of one component only.
    pub fn is_single_key(&self) -> bool {
        self.component_names.len() <= 1
    }

    /// Physical columns backing this property, in declared order.
    pub fn columns(&self) -> Vec<&str> {
        if self.is_embedded_id() {
            self.component_names.iter().map(String::as_str).collect()
        } else {
            vec![self.name.as_str()]
        }
    }
}

/// Describes one mapped entity. Holds exactly one id property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMeta {
    class_name: String,
    table_name: String,
    properties: Vec<PropertyMeta>,
    id_index: usize,
}

impl EntityMeta {
    pub fn new(
        class_name: impl Into<String>,
        table_name: impl Into<String>,
        properties: Vec<PropertyMeta>,
    ) -> Result<Self, MetadataError> {
        let class_name = class_name.into();
        let table_name = table_name.into();

        ensure_ident(&table_name)?;

        let mut seen = HashSet::new();
        let mut columns = HashSet::new();
        let mut id_index: Option<usize> = None;
        for (idx, pm) in properties.iter().enumerate() {
            if !seen.insert(pm.name()) {
                return Err(MetadataError::DuplicateProperty {
                    entity: class_name,
                    property: pm.name().to_string(),
                });
            }
            for column in pm.columns() {
                ensure_ident(column)?;
                if !columns.insert(column) {
                    return Err(MetadataError::DuplicateColumn {
                        entity: class_name,
                        column: column.to_string(),
                    });
                }
            }
            if pm.is_id() {
                if let Some(first) = id_index {
                    return Err(MetadataError::DuplicateId {
                        entity: class_name,
                        first: properties[first].name().to_string(),
                        second: pm.name().to_string(),
                    });
                }
                if pm.is_embedded_id() && pm.component_names().is_empty() {
                    return Err(MetadataError::EmptyCompoundId {
                        property: pm.name().to_string(),
                    });
                }
                id_index = Some(idx);
            }
        }

        let id_index = id_index.ok_or_else(|| MetadataError::MissingId {
            entity: class_name.clone(),
        })?;

        Ok(Self {
            class_name,
            table_name,
            properties,
            id_index,
        })
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn properties(&self) -> &[PropertyMeta] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyMeta> {
        self.properties.iter().find(|pm| pm.name() == name)
    }

    pub fn id_meta(&self) -> &PropertyMeta {
        &self.properties[self.id_index]
    }

    /// Regular columns: everything but the id, counters and wide maps, in declared order.
    pub fn all_except_id_and_counters(&self) -> Vec<&PropertyMeta> {
        self.properties
            .iter()
            .filter(|pm| pm.kind() == PropertyKind::Simple)
            .collect()
    }

    pub fn counters(&self) -> Vec<&PropertyMeta> {
        self.properties.iter().filter(|pm| pm.is_counter()).collect()
    }

    pub fn has_counters(&self) -> bool {
        self.properties.iter().any(PropertyMeta::is_counter)
    }

    /// Columns read by a whole-entity select: the id first, then regular columns.
    pub fn columns_to_load(&self) -> Vec<&PropertyMeta> {
        let mut metas = Vec::with_capacity(self.properties.len());
        metas.push(self.id_meta());
        metas.extend(self.all_except_id_and_counters());
        metas
    }
}

pub(crate) fn ensure_ident(ident: &str) -> Result<(), MetadataError> {
    if validate_ident(ident) {
        Ok(())
    } else {
        Err(MetadataError::InvalidIdentifier(ident.to_string()))
    }
}

/// Accepts `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_ident(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
