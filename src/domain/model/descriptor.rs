use crate::domain::model::{EntityMeta, MetadataError, PropertyKind, PropertyMeta};
use serde::{Deserialize, Serialize};

/// Serialized form of an entity, as stored in descriptor files.
///
/// ```json
/// {
///   "class_name": "TweetLine",
///   "table_name": "tweet_line",
///   "properties": [
///     {"name": "id", "kind": "embedded_id", "components": ["user_id", "tweet_date"]},
///     {"name": "content", "kind": "simple"},
///     {"name": "likes", "kind": "counter"}
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    pub class_name: String,
    pub table_name: String,
    pub properties: Vec<PropertyDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub kind: PropertyKind,
    /// Ordered key components (embedded ids and multi-key wide maps).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<String>,
}

impl TryFrom<PropertyDescriptor> for PropertyMeta {
    type Error = MetadataError;

    fn try_from(d: PropertyDescriptor) -> Result<Self, Self::Error> {
        let pm = match d.kind {
            PropertyKind::Id => PropertyMeta::id(d.name),
            PropertyKind::EmbeddedId => PropertyMeta::embedded_id(d.name, d.components)?,
            PropertyKind::Simple => PropertyMeta::simple(d.name),
            PropertyKind::Counter => PropertyMeta::counter(d.name),
            PropertyKind::WideMap => PropertyMeta::wide_map(d.name, d.components),
        };
        Ok(pm)
    }
}

impl TryFrom<EntityDescriptor> for EntityMeta {
    type Error = MetadataError;

    fn try_from(d: EntityDescriptor) -> Result<Self, Self::Error> {
        let properties = d
            .properties
            .into_iter()
            .map(PropertyMeta::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        EntityMeta::new(d.class_name, d.table_name, properties)
    }
}

impl From<&PropertyMeta> for PropertyDescriptor {
    fn from(pm: &PropertyMeta) -> Self {
        Self {
            name: pm.name().to_string(),
            kind: pm.kind(),
            components: pm.component_names().to_vec(),
        }
    }
}

impl From<&EntityMeta> for EntityDescriptor {
    fn from(meta: &EntityMeta) -> Self {
        Self {
            class_name: meta.class_name().to_string(),
            table_name: meta.table_name().to_string(),
            properties: meta.properties().iter().map(PropertyDescriptor::from).collect(),
        }
    }
}
