//! Loaded data before it becomes an attribute tree
//!
//! Mappings, JSON documents and YAML documents are all deserialized into
//! [`Value`]. Only the top-level [`Mapping`] is kept as such; the rest is
//! converted into holders and nodes by [`crate::holder`].

use indexmap::IndexMap;
use serde::Deserialize;

/// Ordered key-value data, the shape every source resolves to
pub type Mapping = IndexMap<String, Value>;

/// One loaded datum
///
/// Variants are tried in order when deserializing. Integers that fit in an
/// `i64` land in `Integer`; larger positive integers land in `UInt` rather
/// than being rounded into a float.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Mapping),
}

impl Value {
    /// The mapping inside, or `None` for any other kind of value
    pub fn into_mapping(self) -> Option<Mapping> {
        if let Value::Mapping(m) = self {
            Some(m)
        } else {
            None
        }
    }

    /// Short name of the variant, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) | Value::UInt(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i32 => Integer,
    i64 => Integer,
    f64 => Float,
    String => String,
    &str => String,
    Mapping => Mapping,
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        i64::try_from(u).map_or(Value::UInt(u), Value::Integer)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
