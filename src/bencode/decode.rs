use super::error::BencodeError;
use super::value::Value;
use crate::constants::MAX_BENCODE_DEPTH;
use bytes::Bytes;
use num_bigint::BigInt;
use std::collections::BTreeMap;

/// Number of decimal digits in `i64::MAX`. Shorter literals always fit a
/// native parse; anything as long or longer goes through `BigInt`.
const NATIVE_DIGITS: usize = 19;

/// Decodes a complete bencode value, keeping byte strings raw.
///
/// The whole input must be consumed; leftover bytes are an error.
///
/// ```
/// use btwire::bencode::{decode, Value};
///
/// assert_eq!(decode(b"i42e").unwrap(), Value::from(42i64));
/// assert!(decode(b"i42eextra").is_err());
/// ```
pub fn decode(data: &[u8]) -> Result<Value, BencodeError> {
    decode_all(data, false)
}

/// Decodes a complete bencode value, turning byte strings into text.
///
/// Strings that are not valid UTF-8 (piece hashes, peer ids) are returned
/// unchanged as raw bytes instead of failing.
///
/// ```
/// use btwire::bencode::{decode_text, Value};
///
/// assert_eq!(decode_text(b"3:foo").unwrap(), Value::string("foo"));
/// assert_eq!(decode_text(b"2:\xff\xfe").unwrap(), Value::bytes(&[0xff, 0xfe]));
/// ```
pub fn decode_text(data: &[u8]) -> Result<Value, BencodeError> {
    decode_all(data, true)
}

/// Decodes one value starting at `offset` and returns it with the offset
/// just past its encoding. Bytes after the value are left untouched.
pub fn decode_prefix(
    data: &[u8],
    offset: usize,
    text: bool,
) -> Result<(Value, usize), BencodeError> {
    let mut pos = offset;
    let value = decode_value(data, &mut pos, 0, text)?;
    Ok((value, pos))
}

fn decode_all(data: &[u8], text: bool) -> Result<Value, BencodeError> {
    let (value, pos) = decode_prefix(data, 0, text)?;

    if pos != data.len() {
        return Err(BencodeError::TrailingData { offset: pos });
    }

    Ok(value)
}

fn decode_value(
    data: &[u8],
    pos: &mut usize,
    depth: usize,
    text: bool,
) -> Result<Value, BencodeError> {
    if depth > MAX_BENCODE_DEPTH {
        return Err(BencodeError::NestingTooDeep { offset: *pos });
    }

    let Some(&lookahead) = data.get(*pos) else {
        return Err(BencodeError::UnexpectedEof { offset: *pos });
    };

    match lookahead {
        b'i' => decode_integer(data, pos),
        b'l' => decode_list(data, pos, depth, text),
        b'd' => decode_dict(data, pos, depth, text),
        b'0'..=b'9' => decode_string(data, pos, text),
        byte => Err(BencodeError::UnexpectedByte { offset: *pos, byte }),
    }
}

fn decode_integer(data: &[u8], pos: &mut usize) -> Result<Value, BencodeError> {
    let offset = *pos;
    *pos += 1;

    let start = *pos;
    while *pos < data.len() && data[*pos] != b'e' {
        *pos += 1;
    }

    if *pos >= data.len() {
        return Err(BencodeError::UnexpectedEof { offset: *pos });
    }

    let literal = &data[start..*pos];
    let invalid = |reason: &str| BencodeError::InvalidInteger {
        offset,
        reason: reason.to_string(),
    };

    let digits = literal.strip_prefix(b"-").unwrap_or(literal);
    if digits.is_empty() {
        return Err(invalid("empty"));
    }
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(invalid("non-digit character"));
    }
    if digits[0] == b'0' && (digits.len() > 1 || literal.len() != digits.len()) {
        return Err(invalid("leading zeros"));
    }

    let value = if digits.len() < NATIVE_DIGITS {
        // all ascii digits, so this is valid utf8
        let native: i64 = std::str::from_utf8(literal)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| invalid("out of range"))?;
        BigInt::from(native)
    } else {
        BigInt::parse_bytes(literal, 10).ok_or_else(|| invalid("out of range"))?
    };

    *pos += 1;
    Ok(Value::Integer(value))
}

fn decode_string(data: &[u8], pos: &mut usize, text: bool) -> Result<Value, BencodeError> {
    let offset = *pos;
    while *pos < data.len() && data[*pos] != b':' {
        *pos += 1;
    }

    if *pos >= data.len() {
        return Err(BencodeError::UnexpectedEof { offset: *pos });
    }

    let len: usize = std::str::from_utf8(&data[offset..*pos])
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(BencodeError::InvalidStringLength { offset })?;

    *pos += 1;

    let end = pos
        .checked_add(len)
        .ok_or(BencodeError::InvalidStringLength { offset })?;
    if end > data.len() {
        return Err(BencodeError::UnexpectedEof { offset: data.len() });
    }

    let raw = &data[*pos..end];
    *pos = end;

    if text {
        if let Ok(s) = std::str::from_utf8(raw) {
            return Ok(Value::Text(s.to_owned()));
        }
    }

    Ok(Value::Bytes(Bytes::copy_from_slice(raw)))
}

fn decode_list(
    data: &[u8],
    pos: &mut usize,
    depth: usize,
    text: bool,
) -> Result<Value, BencodeError> {
    *pos += 1;
    let mut list = Vec::new();

    while *pos < data.len() && data[*pos] != b'e' {
        list.push(decode_value(data, pos, depth + 1, text)?);
    }

    if *pos >= data.len() {
        return Err(BencodeError::UnexpectedEof { offset: *pos });
    }

    *pos += 1;
    Ok(Value::List(list))
}

fn decode_dict(
    data: &[u8],
    pos: &mut usize,
    depth: usize,
    text: bool,
) -> Result<Value, BencodeError> {
    *pos += 1;
    let mut dict = BTreeMap::new();

    while *pos < data.len() && data[*pos] != b'e' {
        let key_offset = *pos;
        let key = match decode_value(data, pos, depth + 1, true)? {
            Value::Text(s) => Bytes::from(s),
            Value::Bytes(b) => b,
            _ => {
                return Err(BencodeError::UnexpectedByte {
                    offset: key_offset,
                    byte: data[key_offset],
                })
            }
        };

        let value = decode_value(data, pos, depth + 1, text)?;
        // duplicate keys: last one wins
        dict.insert(key, value);
    }

    if *pos >= data.len() {
        return Err(BencodeError::UnexpectedEof { offset: *pos });
    }

    *pos += 1;
    Ok(Value::Dict(dict))
}
