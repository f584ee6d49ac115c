//! Bencode encoding and decoding ([BEP-3]).
//!
//! Bencode is the serialization format BitTorrent uses for `.torrent` files
//! and tracker responses.
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i42e` → 42 |
//! | Byte String | `<length>:<data>` | `4:spam` → "spam" |
//! | List | `l<items>e` | `l4:spami42ee` → ["spam", 42] |
//! | Dictionary | `d<key><value>...e` | `d3:foo3:bare` → {"foo": "bar"} |
//!
//! Integers have no size limit on the wire, so [`Value::Integer`] holds a
//! [`num_bigint::BigInt`]; [`Value::as_integer`] narrows to `i64` when the
//! value fits.
//!
//! ```
//! use btwire::bencode::{decode, encode, Value};
//!
//! let big = decode(b"i1267650600228229401496703205377e").unwrap();
//! assert_eq!(big.as_integer(), None);
//! assert_eq!(encode(&big).unwrap(), b"i1267650600228229401496703205377e");
//!
//! let value = decode(b"d4:spaml1:a1:bi1eee").unwrap();
//! let spam = value.get(b"spam").and_then(|v| v.as_list()).unwrap();
//! assert_eq!(spam[2].as_integer(), Some(1));
//! ```
//!
//! Two decoders are provided. [`decode`] keeps every byte string raw;
//! [`decode_text`] returns [`Value::Text`] for strings that are valid UTF-8
//! and falls back to [`Value::Bytes`] for those that are not. Dictionary keys
//! are always read as text and stored as their bytes.
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod decode;
mod encode;
mod error;
mod value;

pub use decode::{decode, decode_prefix, decode_text};
pub use encode::{encode, encode_into};
pub use error::BencodeError;
pub use value::Value;

#[cfg(test)]
mod tests;
