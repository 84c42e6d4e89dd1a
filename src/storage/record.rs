//! Record and field value types.
//!
//! A `Record` is one row waiting to be written: an ordered list of field
//! values bound, in order, to the placeholders of the insert statement.

use serde::{Deserialize, Serialize};

/// A single field value.
///
/// Deserializes from untagged JSON: `null`, booleans, integers, floats,
/// strings, and arrays of bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Integer(i64::from(v))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Real(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Blob(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// One row submitted by a caller.
///
/// Records are not validated: an empty record or one whose arity does not
/// match the statement is accepted and fails at commit time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Vec<Value>);

impl Record {
    pub fn new(fields: Vec<Value>) -> Self {
        Record(fields)
    }

    pub fn fields(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_fields(self) -> Vec<Value> {
        self.0
    }
}

impl From<Vec<Value>> for Record {
    fn from(fields: Vec<Value>) -> Self {
        Record(fields)
    }
}

impl FromIterator<Value> for Record {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Record(iter.into_iter().collect())
    }
}

/// Builds a [`Record`] from values of mixed types.
///
/// ```
/// use batch_insert::{record, Value};
///
/// let row = record![7, "seven", None::<f64>];
/// assert_eq!(row.fields()[1], Value::Text("seven".to_string()));
/// assert!(row.fields()[2].is_null());
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::Record::default()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Record::new(vec![$($crate::Value::from($value)),+])
    };
}
