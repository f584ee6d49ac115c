use super::error::BencodeError;
use super::value::Value;
use std::io::Write;

/// Encodes a bencode value to a byte vector.
///
/// - Integers: `i<number>e`, rendered exactly at any magnitude
/// - Byte and text strings: `<length>:<data>`
/// - Lists: `l<items>e`
/// - Dictionaries: `d<key><value>...e` in the map's iteration order
///
/// # Errors
///
/// Returns an error if writing to the internal buffer fails.
///
/// # Examples
///
/// ```
/// use btwire::bencode::{encode, Value};
///
/// assert_eq!(encode(&Value::from(-1i64)).unwrap(), b"i-1e");
/// assert_eq!(encode(&Value::string("")).unwrap(), b"0:");
///
/// let list = Value::List(vec![Value::string("spam"), Value::string("eggs")]);
/// assert_eq!(encode(&list).unwrap(), b"l4:spam4:eggse");
/// ```
pub fn encode(value: &Value) -> Result<Vec<u8>, BencodeError> {
    let mut buf = Vec::new();
    encode_into(value, &mut buf)?;
    Ok(buf)
}

/// Encodes a bencode value into any writer.
pub fn encode_into<W: Write>(value: &Value, writer: &mut W) -> Result<(), BencodeError> {
    match value {
        Value::Integer(i) => {
            write!(writer, "i{}e", i)?;
        }
        Value::Bytes(b) => write_string(writer, b)?,
        Value::Text(s) => write_string(writer, s.as_bytes())?,
        Value::List(l) => {
            writer.write_all(b"l")?;
            for item in l {
                encode_into(item, writer)?;
            }
            writer.write_all(b"e")?;
        }
        Value::Dict(d) => {
            writer.write_all(b"d")?;
            for (key, val) in d {
                write_string(writer, key)?;
                encode_into(val, writer)?;
            }
            writer.write_all(b"e")?;
        }
    }
    Ok(())
}

fn write_string<W: Write>(writer: &mut W, bytes: &[u8]) -> std::io::Result<()> {
    write!(writer, "{}:", bytes.len())?;
    writer.write_all(bytes)
}
