use super::error::BencodeError;
use bytes::Bytes;
use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};
use std::collections::BTreeMap;

/// A bencode value.
///
/// The variant is chosen when the value is built, never inferred from its
/// contents, so an empty list and an empty dictionary stay distinct.
///
/// `Bytes` and `Text` are two views of the same bencode byte string: they
/// compare equal when their bytes match, whichever decoder produced them.
///
/// # Examples
///
/// ```
/// use btwire::bencode::Value;
///
/// let int: Value = 42i64.into();
/// let text: Value = "hello".into();
///
/// assert_eq!(int.as_integer(), Some(42));
/// assert_eq!(text.as_str(), Some("hello"));
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// An integer of arbitrary magnitude.
    Integer(BigInt),
    /// A raw byte string.
    Bytes(Bytes),
    /// A byte string known to be valid UTF-8.
    Text(String),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A dictionary keyed by byte strings.
    Dict(BTreeMap<Bytes, Value>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => a == b,
            (a, b) => match (a.as_bytes(), b.as_bytes()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl Eq for Value {}

impl Value {
    /// Creates a text value.
    pub fn string(s: &str) -> Self {
        Value::Text(s.to_owned())
    }

    /// Creates a raw byte string value.
    pub fn bytes(b: &[u8]) -> Self {
        Value::Bytes(Bytes::copy_from_slice(b))
    }

    /// Creates an integer value from a float.
    ///
    /// Bencode has no fractional numbers, so anything that is not a finite
    /// whole number is rejected.
    ///
    /// ```
    /// use btwire::bencode::Value;
    ///
    /// assert_eq!(Value::from_f64(3.0).unwrap(), Value::from(3i64));
    /// assert!(Value::from_f64(1.5).is_err());
    /// ```
    pub fn from_f64(f: f64) -> Result<Self, BencodeError> {
        if !f.is_finite() || f.fract() != 0.0 {
            return Err(BencodeError::NonIntegral(f));
        }
        BigInt::from_f64(f)
            .map(Value::Integer)
            .ok_or(BencodeError::NonIntegral(f))
    }

    /// Returns the integer narrowed to `i64`, if it is an integer that fits.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => i.to_i64(),
            _ => None,
        }
    }

    /// Returns the full-precision integer.
    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            Value::Integer(i) => Some(i),
            _ => None,
        }
    }

    /// Returns the raw bytes of a byte or text string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            Value::Text(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Returns a UTF-8 view of a string value.
    ///
    /// Raw byte strings are viewed as text when they happen to be valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<Bytes, Value>> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Consumes the value and returns the dictionary, if it is one.
    pub fn into_dict(self) -> Option<BTreeMap<Bytes, Value>> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Looks up a key in this value if it is a dictionary.
    ///
    /// ```
    /// use btwire::bencode::decode;
    ///
    /// let value = decode(b"d3:foo3:bare").unwrap();
    /// assert_eq!(value.get(b"foo").and_then(|v| v.as_str()), Some("bar"));
    /// assert_eq!(value.get(b"missing"), None);
    /// ```
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        self.as_dict()?.get(key)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(BigInt::from(i))
    }
}

impl From<u64> for Value {
    fn from(i: u64) -> Self {
        Value::Integer(BigInt::from(i))
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(BigInt::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(BigInt::from(i))
    }
}

impl From<BigInt> for Value {
    fn from(i: BigInt) -> Self {
        Value::Integer(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

impl From<BTreeMap<Bytes, Value>> for Value {
    fn from(d: BTreeMap<Bytes, Value>) -> Self {
        Value::Dict(d)
    }
}
