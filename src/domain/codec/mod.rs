//! Decoding of legacy wide-row columns.
//!
//! A wide-row column carries one logical `(key, value)` pair: the key is the
//! composite column name, the value is the column payload, and the store
//! reports the remaining time-to-live alongside.

use thiserror::Error;

pub mod composite;
pub mod scalar;
pub mod transformer;

pub use composite::{Composite, RawColumn, NO_TTL};
pub use scalar::{ColumnScalar, Deserializer, MultiKeyBuilder, ScalarDeserializer, TupleKeyBuilder};
pub use transformer::{CompositeKeyCodec, KeyDecoding, KeyValue, WideMapMeta};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("composite name truncated at byte {offset}: {detail}")]
    Truncated { offset: usize, detail: &'static str },
    #[error("composite name has no components")]
    EmptyComposite,
    #[error("composite component of {0} bytes exceeds the 65535-byte frame limit")]
    ComponentTooLong(usize),
    #[error("expected {expected} bytes for {type_name}, got {actual}")]
    Width {
        type_name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("invalid UTF-8 in text component: {0}")]
    Utf8(String),
    #[error("invalid boolean byte 0x{0}")]
    Bool(String),
    #[error("key '{property}' declares {expected} components, column carries {actual}")]
    ComponentCount {
        property: String,
        expected: usize,
        actual: usize,
    },
}
