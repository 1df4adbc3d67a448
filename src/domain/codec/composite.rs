//! Composite column-name framing.
//!
//! Each component is written as a 2-byte big-endian length, the component
//! bytes, then one end-of-component byte (0 for stored names).

use crate::domain::codec::scalar::ColumnScalar;
use crate::domain::codec::DecodeError;
use bytes::{BufMut, Bytes, BytesMut};

/// TTL reported for a column that never expires.
pub const NO_TTL: u32 = 0;

const LENGTH_PREFIX: usize = 2;
const END_OF_COMPONENT: u8 = 0x00;

/// Ordered binary components of a composite column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composite {
    components: Vec<Bytes>,
}

impl Composite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one raw component.
    pub fn with(mut self, component: impl Into<Bytes>) -> Self {
        self.components.push(component.into());
        self
    }

    /// Appends one scalar component in its column encoding.
    pub fn with_scalar<T: ColumnScalar>(self, value: &T) -> Self {
        self.with(value.to_column_bytes())
    }

    pub fn components(&self) -> &[Bytes] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Splits a framed name into its components without copying.
    pub fn parse(raw: &Bytes) -> Result<Self, DecodeError> {
        if raw.is_empty() {
            return Err(DecodeError::EmptyComposite);
        }

        let mut components = Vec::new();
        let mut offset = 0usize;
        while offset < raw.len() {
            if raw.len() - offset < LENGTH_PREFIX {
                return Err(DecodeError::Truncated {
                    offset,
                    detail: "missing component length",
                });
            }
            let len = u16::from_be_bytes([raw[offset], raw[offset + 1]]) as usize;
            let start = offset + LENGTH_PREFIX;
            let end = start + len;
            if end > raw.len() {
                return Err(DecodeError::Truncated {
                    offset: start,
                    detail: "component shorter than its length prefix",
                });
            }
            if end == raw.len() {
                return Err(DecodeError::Truncated {
                    offset: end,
                    detail: "missing end-of-component byte",
                });
            }
            components.push(raw.slice(start..end));
            // the end-of-component byte only matters for slice bounds, not stored names
            offset = end + 1;
        }

        Ok(Self { components })
    }

    /// Frames the components into a column name.
    pub fn to_bytes(&self) -> Result<Bytes, DecodeError> {
        let size = self
            .components
            .iter()
            .map(|c| LENGTH_PREFIX + c.len() + 1)
            .sum();
        let mut buf = BytesMut::with_capacity(size);
        for component in &self.components {
            let len = u16::try_from(component.len())
                .map_err(|_| DecodeError::ComponentTooLong(component.len()))?;
            buf.put_u16(len);
            buf.put_slice(component);
            buf.put_u8(END_OF_COMPONENT);
        }
        Ok(buf.freeze())
    }
}

/// One wide-row column as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumn {
    name: Bytes,
    value: Bytes,
    ttl: u32,
}

impl RawColumn {
    pub fn new(name: impl Into<Bytes>, value: impl Into<Bytes>, ttl: u32) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ttl,
        }
    }

    pub fn from_composite(
        name: &Composite,
        value: impl Into<Bytes>,
        ttl: u32,
    ) -> Result<Self, DecodeError> {
        Ok(Self::new(name.to_bytes()?, value, ttl))
    }

    /// Framed composite name.
    pub fn name(&self) -> &Bytes {
        &self.name
    }

    pub fn value(&self) -> &Bytes {
        &self.value
    }

    /// Remaining time-to-live in seconds, `NO_TTL` when the column never expires.
    pub fn ttl(&self) -> u32 {
        self.ttl
    }
}
