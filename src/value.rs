//! Scalar values written into documents.
//!
//! - [`Scalar`]: a borrowed value handed to the [`Writer`](crate::Writer)
//! - [`Value`]: an owned value decoded by an [`ItemTree`](crate::ItemTree)
//! - [`DecodedValue`]: a single value or the list of a multi-valued entry
//!
//! Byte sequences are never treated as text; the writer transports them as
//! base64. Timestamps are written as RFC 3339 text in UTC.
//!
//! ## Examples
//!
//! ```rust
//! use pff_json::{Scalar, Value};
//!
//! let owned = Value::from("subject");
//! assert_eq!(owned.as_scalar(), Scalar::Text("subject"));
//!
//! let raw: Scalar = (&[0u8, 1, 2][..]).into();
//! assert!(matches!(raw, Scalar::Bytes(_)));
//! ```

use chrono::{DateTime, Utc};

/// A borrowed scalar accepted by the writer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar<'a> {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    /// Non-finite floats are written as `null`.
    Float(f64),
    Text(&'a str),
    Bytes(&'a [u8]),
    Timestamp(DateTime<Utc>),
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident as $conv:ty),* $(,)?) => {
        $(
            impl<'a> From<$ty> for Scalar<'a> {
                fn from(value: $ty) -> Self {
                    Scalar::$variant(value as $conv)
                }
            }
        )*
    };
}

scalar_from! {
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => UInt as u64,
    u16 => UInt as u64,
    u32 => UInt as u64,
    u64 => UInt as u64,
    usize => UInt as u64,
    f32 => Float as f64,
    f64 => Float as f64,
}

impl<'a> From<bool> for Scalar<'a> {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl<'a> From<&'a str> for Scalar<'a> {
    fn from(value: &'a str) -> Self {
        Scalar::Text(value)
    }
}

impl<'a> From<&'a String> for Scalar<'a> {
    fn from(value: &'a String) -> Self {
        Scalar::Text(value)
    }
}

impl<'a> From<&'a [u8]> for Scalar<'a> {
    fn from(value: &'a [u8]) -> Self {
        Scalar::Bytes(value)
    }
}

impl<'a> From<&'a Vec<u8>> for Scalar<'a> {
    fn from(value: &'a Vec<u8>) -> Self {
        Scalar::Bytes(value)
    }
}

impl<'a> From<DateTime<Utc>> for Scalar<'a> {
    fn from(value: DateTime<Utc>) -> Self {
        Scalar::Timestamp(value)
    }
}

impl<'a, T> From<Option<T>> for Scalar<'a>
where
    T: Into<Scalar<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Scalar::Null, Into::into)
    }
}

/// An owned value decoded from an item attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

/// Seconds between 1601-01-01 and 1970-01-01.
const FILETIME_UNIX_OFFSET: i64 = 11_644_473_600;
const FILETIME_TICKS_PER_SECOND: u64 = 10_000_000;

impl Value {
    /// Borrows this value as a [`Scalar`] for writing.
    #[must_use]
    pub fn as_scalar(&self) -> Scalar<'_> {
        match self {
            Value::Null => Scalar::Null,
            Value::Bool(b) => Scalar::Bool(*b),
            Value::Integer(i) => Scalar::Int(*i),
            Value::Unsigned(u) => Scalar::UInt(*u),
            Value::Float(f) => Scalar::Float(*f),
            Value::Text(s) => Scalar::Text(s),
            Value::Bytes(b) => Scalar::Bytes(b),
            Value::Timestamp(t) => Scalar::Timestamp(*t),
        }
    }

    /// Converts a Windows FILETIME (100 ns ticks since 1601-01-01 UTC).
    ///
    /// Returns `None` when the tick count is outside the range chrono can
    /// represent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pff_json::Value;
    ///
    /// let epoch = Value::from_filetime(116_444_736_000_000_000).unwrap();
    /// if let Value::Timestamp(t) = epoch {
    ///     assert_eq!(t.timestamp(), 0);
    /// }
    /// ```
    #[must_use]
    pub fn from_filetime(ticks: u64) -> Option<Value> {
        let secs = i64::try_from(ticks / FILETIME_TICKS_PER_SECOND).ok()? - FILETIME_UNIX_OFFSET;
        // remainder is below 10^7, so the product fits in u32
        let nanos = (ticks % FILETIME_TICKS_PER_SECOND) as u32 * 100;
        DateTime::<Utc>::from_timestamp(secs, nanos).map(Value::Timestamp)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Unsigned(u64::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Unsigned(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

/// The decoded content of one attribute entry.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedValue {
    Single(Value),
    /// Multi-valued entries keep the order reported by the provider.
    Multiple(Vec<Value>),
}

impl From<Value> for DecodedValue {
    fn from(value: Value) -> Self {
        DecodedValue::Single(value)
    }
}

impl From<Vec<Value>> for DecodedValue {
    fn from(values: Vec<Value>) -> Self {
        DecodedValue::Multiple(values)
    }
}

impl DecodedValue {
    /// Builds a multi-valued entry from any iterator of values.
    pub fn multiple<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        DecodedValue::Multiple(values.into_iter().map(Into::into).collect())
    }
}
