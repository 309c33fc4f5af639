//! Ready-made claim interpreters for common fixed-width fields.
//!
//! Each interpreter is a plain `fn(&[u8]) -> Value`, so it can be passed
//! straight to [`Curator::claim`](super::Curator::claim). An interpreter
//! never fails: when the claimed bytes do not fit the expected shape (a
//! decoder miscounted, or the field is not what it looked like), it falls
//! back to the lossless hex rendering instead of erroring, so the pass keeps
//! going and the report still shows every byte.

use bincurate_buffers::ByteReader;
use serde_json::Value;

use crate::render::hex_pairs;

/// Space-separated lowercase hex pairs, e.g. `"de ad be ef"`.
pub fn hex(bytes: &[u8]) -> Value {
    Value::String(hex_pairs(bytes))
}

/// Unsigned 8-bit integer.
pub fn u8(bytes: &[u8]) -> Value {
    exact(bytes, |r| r.u8().map(Value::from))
}

/// Unsigned 16-bit little-endian integer.
pub fn u16_le(bytes: &[u8]) -> Value {
    exact(bytes, |r| r.u16_le().map(Value::from))
}

/// Unsigned 32-bit little-endian integer.
pub fn u32_le(bytes: &[u8]) -> Value {
    exact(bytes, |r| r.u32_le().map(Value::from))
}

/// Unsigned 64-bit little-endian integer.
pub fn u64_le(bytes: &[u8]) -> Value {
    exact(bytes, |r| r.u64_le().map(Value::from))
}

/// Printable ASCII with trailing NUL padding trimmed.
pub fn ascii(bytes: &[u8]) -> Value {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
    let body = &bytes[..end];
    if !body.is_empty() && body.iter().all(|&b| (0x20..0x7f).contains(&b)) {
        match std::str::from_utf8(body) {
            Ok(s) => return Value::String(s.to_string()),
            Err(_) => return hex(bytes),
        }
    }
    hex(bytes)
}

/// Runs `read` over the claimed bytes and requires it to consume all of
/// them; anything else degrades to hex.
fn exact<F>(bytes: &[u8], read: F) -> Value
where
    F: FnOnce(&mut ByteReader) -> Result<Value, bincurate_buffers::BufferError>,
{
    let mut r = ByteReader::new(bytes);
    match read(&mut r) {
        Ok(v) if r.remaining() == 0 => v,
        _ => hex(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn u32_le_reads_little_endian() {
        assert_eq!(u32_le(&[0x78, 0x56, 0x34, 0x12]), json!(0x12345678u32));
    }

    #[test]
    fn wrong_width_falls_back_to_hex() {
        assert_eq!(u32_le(&[0x01, 0x02]), json!("01 02"));
        assert_eq!(u16_le(&[0x01, 0x02, 0x03]), json!("01 02 03"));
    }

    #[test]
    fn ascii_trims_nul_padding() {
        assert_eq!(ascii(b"res0\0\0\0\0"), json!("res0"));
    }

    #[test]
    fn non_printable_ascii_falls_back_to_hex() {
        assert_eq!(ascii(&[0x01, 0xff]), json!("01 ff"));
        assert_eq!(ascii(&[0, 0, 0]), json!("00 00 00"));
    }

    #[test]
    fn hex_of_empty_is_empty_string() {
        assert_eq!(hex(&[]), json!(""));
    }
}
