//! Scalar column encodings and the key/value deserialization capabilities.

use crate::domain::codec::DecodeError;
use crate::domain::model::PropertyMeta;
use bytes::Bytes;
use std::marker::PhantomData;

/// A type with a fixed column encoding.
pub trait ColumnScalar: Sized + Send + Sync + 'static {
    const TYPE_NAME: &'static str;

    fn from_column_bytes(bytes: &[u8]) -> Result<Self, DecodeError>;

    fn to_column_bytes(&self) -> Bytes;
}

fn fixed<const N: usize>(type_name: &'static str, bytes: &[u8]) -> Result<[u8; N], DecodeError> {
    bytes.try_into().map_err(|_| DecodeError::Width {
        type_name,
        expected: N,
        actual: bytes.len(),
    })
}

impl ColumnScalar for i32 {
    const TYPE_NAME: &'static str = "int";

    fn from_column_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(i32::from_be_bytes(fixed(Self::TYPE_NAME, bytes)?))
    }

    fn to_column_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.to_be_bytes())
    }
}

impl ColumnScalar for i64 {
    const TYPE_NAME: &'static str = "bigint";

    fn from_column_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(i64::from_be_bytes(fixed(Self::TYPE_NAME, bytes)?))
    }

    fn to_column_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.to_be_bytes())
    }
}

impl ColumnScalar for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn from_column_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        match fixed::<1>(Self::TYPE_NAME, bytes)? {
            [0] => Ok(false),
            [1] => Ok(true),
            [other] => Err(DecodeError::Bool(hex::encode([other]))),
        }
    }

    fn to_column_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&[u8::from(*self)])
    }
}

impl ColumnScalar for String {
    const TYPE_NAME: &'static str = "text";

    fn from_column_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| DecodeError::Utf8(e.to_string()))
    }

    fn to_column_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl ColumnScalar for Bytes {
    const TYPE_NAME: &'static str = "blob";

    fn from_column_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(Bytes::copy_from_slice(bytes))
    }

    fn to_column_bytes(&self) -> Bytes {
        self.clone()
    }
}

/// Turns raw bytes into a typed value.
pub trait Deserializer<T>: Send + Sync {
    fn deserialize(&self, bytes: &[u8]) -> Result<T, DecodeError>;
}

/// `Deserializer` backed by a type's `ColumnScalar` encoding.
pub struct ScalarDeserializer<T>(PhantomData<fn() -> T>);

impl<T> ScalarDeserializer<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for ScalarDeserializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ColumnScalar> Deserializer<T> for ScalarDeserializer<T> {
    fn deserialize(&self, bytes: &[u8]) -> Result<T, DecodeError> {
        T::from_column_bytes(bytes)
    }
}

/// Assembles the ordered components of a composite name into one key.
pub trait MultiKeyBuilder<K>: Send + Sync {
    fn build(&self, property: &PropertyMeta, components: &[Bytes]) -> Result<K, DecodeError>;
}

/// `MultiKeyBuilder` producing a tuple, one scalar per component, in declared order.
pub struct TupleKeyBuilder<K>(PhantomData<fn() -> K>);

impl<K> TupleKeyBuilder<K> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<K> Default for TupleKeyBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

fn check_arity(property: &PropertyMeta, arity: usize, actual: usize) -> Result<(), DecodeError> {
    let declared = property.component_names().len();
    if actual != declared || actual != arity {
        return Err(DecodeError::ComponentCount {
            property: property.name().to_string(),
            expected: declared.max(arity),
            actual,
        });
    }
    Ok(())
}

macro_rules! tuple_key_builder {
    ($arity:expr; $($t:ident => $idx:tt),+) => {
        impl<$($t: ColumnScalar),+> MultiKeyBuilder<($($t,)+)> for TupleKeyBuilder<($($t,)+)> {
            fn build(
                &self,
                property: &PropertyMeta,
                components: &[Bytes],
            ) -> Result<($($t,)+), DecodeError> {
                check_arity(property, $arity, components.len())?;
                Ok(($($t::from_column_bytes(&components[$idx])?,)+))
            }
        }
    };
}

tuple_key_builder!(2; A => 0, B => 1);
tuple_key_builder!(3; A => 0, B => 1, C => 2);
tuple_key_builder!(4; A => 0, B => 1, C => 2, D => 3);
