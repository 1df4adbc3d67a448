//! Typed key/value reconstruction for wide-row columns.

use crate::domain::codec::composite::{Composite, RawColumn};
use crate::domain::codec::scalar::{
    ColumnScalar, Deserializer, MultiKeyBuilder, ScalarDeserializer, TupleKeyBuilder,
};
use crate::domain::codec::DecodeError;
use crate::domain::model::{MetadataError, PropertyMeta};
use bytes::Bytes;
use std::sync::Arc;

/// How the key of a wide-row column is rebuilt from its composite name.
pub enum KeyDecoding<K> {
    /// Key is the first component alone.
    Single(Arc<dyn Deserializer<K>>),
    /// Key is every component, in declared order.
    Compound(Arc<dyn MultiKeyBuilder<K>>),
}

impl<K> Clone for KeyDecoding<K> {
    fn clone(&self) -> Self {
        match self {
            KeyDecoding::Single(d) => KeyDecoding::Single(d.clone()),
            KeyDecoding::Compound(b) => KeyDecoding::Compound(b.clone()),
        }
    }
}

/// A wide-map property together with its key and value deserializers.
pub struct WideMapMeta<K, V> {
    property: PropertyMeta,
    key: KeyDecoding<K>,
    value: Arc<dyn Deserializer<V>>,
}

impl<K, V> std::fmt::Debug for WideMapMeta<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WideMapMeta")
            .field("property", &self.property)
            .finish_non_exhaustive()
    }
}

impl<K, V> WideMapMeta<K, V> {
    /// Pairs a wide-map property with its decoders.
    ///
    /// The property must be a wide map, and its component count must agree
    /// with `key`: at most one component for `Single`, two or more for `Compound`.
    pub fn new(
        property: PropertyMeta,
        key: KeyDecoding<K>,
        value: Arc<dyn Deserializer<V>>,
    ) -> Result<Self, MetadataError> {
        if !property.is_wide_map() {
            return Err(MetadataError::NotWideMap {
                property: property.name().to_string(),
                kind: property.kind(),
            });
        }
        let single = matches!(key, KeyDecoding::Single(_));
        if single != property.is_single_key() {
            return Err(MetadataError::KeyShapeMismatch {
                property: property.name().to_string(),
                components: property.component_names().len(),
                shape: if single { "single" } else { "compound" },
            });
        }
        Ok(Self {
            property,
            key,
            value,
        })
    }

    pub fn property(&self) -> &PropertyMeta {
        &self.property
    }

    pub fn is_single_key(&self) -> bool {
        matches!(self.key, KeyDecoding::Single(_))
    }
}

impl<K: ColumnScalar, V: ColumnScalar> WideMapMeta<K, V> {
    /// Scalar key and scalar value, both in their column encoding.
    pub fn single_key(property: PropertyMeta) -> Result<Self, MetadataError> {
        Self::new(
            property,
            KeyDecoding::Single(Arc::new(ScalarDeserializer::<K>::new())),
            Arc::new(ScalarDeserializer::<V>::new()),
        )
    }
}

impl<K: 'static, V: ColumnScalar> WideMapMeta<K, V>
where
    TupleKeyBuilder<K>: MultiKeyBuilder<K>,
{
    /// Tuple key, one scalar per declared component, and a scalar value.
    pub fn tuple_key(property: PropertyMeta) -> Result<Self, MetadataError> {
        Self::new(
            property,
            KeyDecoding::Compound(Arc::new(TupleKeyBuilder::<K>::new())),
            Arc::new(ScalarDeserializer::<V>::new()),
        )
    }
}

impl<K, V> Clone for WideMapMeta<K, V> {
    fn clone(&self) -> Self {
        Self {
            property: self.property.clone(),
            key: self.key.clone(),
            value: self.value.clone(),
        }
    }
}

/// One decoded wide-row column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue<K, V> {
    pub key: K,
    pub value: V,
    /// Remaining time-to-live in seconds; `NO_TTL` means no expiration.
    pub ttl: u32,
}

/// Stateless decoder for wide-row columns. Safe to share between readers.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeKeyCodec;

impl CompositeKeyCodec {
    pub fn new() -> Self {
        CompositeKeyCodec
    }

    pub fn decode_key<K, V>(
        &self,
        meta: &WideMapMeta<K, V>,
        column: &RawColumn,
    ) -> Result<K, DecodeError> {
        let name = Composite::parse(column.name())?;
        match &meta.key {
            KeyDecoding::Single(deserializer) => {
                let first = name
                    .components()
                    .first()
                    .ok_or(DecodeError::EmptyComposite)?;
                deserializer.deserialize(first)
            }
            KeyDecoding::Compound(builder) => builder.build(&meta.property, name.components()),
        }
    }

    pub fn decode_value<K, V>(
        &self,
        meta: &WideMapMeta<K, V>,
        column: &RawColumn,
    ) -> Result<V, DecodeError> {
        meta.value.deserialize(column.value())
    }

    /// The undecoded value payload.
    pub fn decode_raw(&self, column: &RawColumn) -> Bytes {
        column.value().clone()
    }

    pub fn decode_ttl(&self, column: &RawColumn) -> u32 {
        column.ttl()
    }

    pub fn decode_key_value<K, V>(
        &self,
        meta: &WideMapMeta<K, V>,
        column: &RawColumn,
    ) -> Result<KeyValue<K, V>, DecodeError> {
        let key = self.decode_key(meta, column)?;
        let value = self.decode_value(meta, column)?;
        let ttl = self.decode_ttl(column);
        Ok(KeyValue { key, value, ttl })
    }

    /// Decodes every column of a row; fails on the first bad column.
    pub fn decode_row<K, V>(
        &self,
        meta: &WideMapMeta<K, V>,
        columns: &[RawColumn],
    ) -> Result<Vec<KeyValue<K, V>>, DecodeError> {
        columns
            .iter()
            .map(self.key_value_transformer(meta))
            .collect()
    }

    pub fn key_transformer<'a, K, V>(
        &self,
        meta: &'a WideMapMeta<K, V>,
    ) -> impl Fn(&RawColumn) -> Result<K, DecodeError> + 'a {
        let codec = *self;
        move |column: &RawColumn| codec.decode_key(meta, column)
    }

    pub fn value_transformer<'a, K, V>(
        &self,
        meta: &'a WideMapMeta<K, V>,
    ) -> impl Fn(&RawColumn) -> Result<V, DecodeError> + 'a {
        let codec = *self;
        move |column: &RawColumn| codec.decode_value(meta, column)
    }

    pub fn raw_transformer(&self) -> impl Fn(&RawColumn) -> Bytes {
        let codec = *self;
        move |column: &RawColumn| codec.decode_raw(column)
    }

    pub fn ttl_transformer(&self) -> impl Fn(&RawColumn) -> u32 {
        let codec = *self;
        move |column: &RawColumn| codec.decode_ttl(column)
    }

    pub fn key_value_transformer<'a, K, V>(
        &self,
        meta: &'a WideMapMeta<K, V>,
    ) -> impl Fn(&RawColumn) -> Result<KeyValue<K, V>, DecodeError> + 'a {
        let codec = *self;
        move |column: &RawColumn| codec.decode_key_value(meta, column)
    }
}
