#![forbid(unsafe_code)]

use indexmap::IndexMap;

use crate::error::{JabError, JabResult};
use crate::gmf::value::DynamicValue;
use crate::io::ByteReader;

pub const TAG_END: u8 = 0;
pub const TAG_BOOL: u8 = 1;
pub const TAG_INT: u8 = 2;
pub const TAG_UINT: u8 = 3;
pub const TAG_DOUBLE: u8 = 4;
pub const TAG_STRING: u8 = 5;
pub const TAG_ARRAY: u8 = 6;
pub const TAG_OBJECT: u8 = 7;
pub const TAG_NULL: u8 = 8;
pub const TAG_BYTES: u8 = 10;
pub const TAG_VECTOR: u8 = 11;
pub const TAG_INT_VECTOR: u8 = 12;
pub const TAG_FLOAT: u8 = 101;

/// Tags the format defines but nothing here can decode.
const UNSUPPORTED: [u8; 4] = [9, 202, 203, 204];

/// Deepest container nesting accepted before decoding gives up.
pub const MAX_DEPTH: usize = 256;

/// Escape value of the `u16` string length announcing an `i32` length.
const LONG_STRING: u16 = 0xFFFF;

/// Decodes one tagged value (recursively for arrays, objects and vectors).
///
/// Any error aborts the whole tree; there is no partial result.
pub fn decode(r: &mut ByteReader<'_>) -> JabResult<DynamicValue> {
    decode_at(r, 0)
}

fn decode_at(r: &mut ByteReader<'_>, depth: usize) -> JabResult<DynamicValue> {
    let offset = r.position();
    if depth > MAX_DEPTH {
        return Err(JabError::NestingTooDeep { depth, offset });
    }
    let tag = r.read_u8("GMF tag")?;
    match tag {
        TAG_END | TAG_NULL => Ok(DynamicValue::Null),
        TAG_BOOL => Ok(DynamicValue::Bool(r.read_u8("GMF bool")? != 0)),
        TAG_INT => Ok(DynamicValue::Int(r.read_i32("GMF int")?)),
        TAG_UINT => Ok(DynamicValue::UInt(r.read_u32("GMF uint")?)),
        TAG_DOUBLE => Ok(DynamicValue::Double(r.read_f64("GMF double")?)),
        TAG_FLOAT => Ok(DynamicValue::Float(r.read_f32("GMF float")?)),
        TAG_STRING => read_string(r).map(DynamicValue::String),
        TAG_ARRAY => read_array(r, depth),
        TAG_OBJECT => read_object(r, depth),
        TAG_BYTES => read_bytes(r),
        TAG_VECTOR => read_vector(r, depth),
        TAG_INT_VECTOR => read_int_vector(r),
        t if UNSUPPORTED.contains(&t) => Err(JabError::UnsupportedTag { tag: t, offset }),
        t => Err(JabError::UnknownTag { tag: t, offset }),
    }
}

/// Convenience wrapper decoding the first value of `data`.
pub fn decode_slice(data: &[u8]) -> JabResult<DynamicValue> {
    decode(&mut ByteReader::new(data))
}

fn read_string(r: &mut ByteReader<'_>) -> JabResult<String> {
    let short = r.read_u16("GMF string length")?;
    if short == 0 {
        return Ok(String::new());
    }
    let len = if short == LONG_STRING {
        let real = r.read_i32("GMF long string length")?;
        if real < 0 {
            return Err(JabError::NegativeLength {
                what: "GMF string",
                length: real,
            });
        }
        real as usize
    } else {
        short as usize
    };
    r.read_utf8(len, "GMF string")
}

/// End position of a byte-length-delimited container. A negative length
/// yields an end before the cursor, i.e. an empty container.
fn span_end(r: &mut ByteReader<'_>, what: &'static str) -> JabResult<i64> {
    let len = r.read_i32(what)?;
    Ok(r.position() as i64 + len as i64)
}

// The loops below trust the declared span: a nested value that overshoots it
// simply ends the loop and leaves the cursor wherever that value stopped.
fn read_array(r: &mut ByteReader<'_>, depth: usize) -> JabResult<DynamicValue> {
    let end = span_end(r, "GMF array length")?;
    let mut items = Vec::new();
    while (r.position() as i64) < end {
        items.push(decode_at(r, depth + 1)?);
    }
    Ok(DynamicValue::Array(items))
}

fn read_object(r: &mut ByteReader<'_>, depth: usize) -> JabResult<DynamicValue> {
    let end = span_end(r, "GMF object length")?;
    let mut map = IndexMap::new();
    while (r.position() as i64) < end {
        let key = r.read_short_string("GMF object key")?;
        let value = decode_at(r, depth + 1)?;
        map.insert(key, value);
    }
    Ok(DynamicValue::Object(map))
}

fn read_bytes(r: &mut ByteReader<'_>) -> JabResult<DynamicValue> {
    let len = r.read_i32("GMF byte buffer length")?;
    if len <= 0 {
        return Ok(DynamicValue::Bytes(Vec::new()));
    }
    Ok(DynamicValue::Bytes(r.take(len as usize, "GMF byte buffer")?.to_vec()))
}

fn read_vector(r: &mut ByteReader<'_>, depth: usize) -> JabResult<DynamicValue> {
    let _element_type = r.read_u32("GMF vector element type")?;
    let count = r.read_i32("GMF vector count")?;
    if count < 0 {
        return Err(JabError::NegativeLength {
            what: "GMF vector",
            length: count,
        });
    }
    let mut items = Vec::with_capacity((count as usize).min(r.remaining()));
    for _ in 0..count {
        items.push(decode_at(r, depth + 1)?);
    }
    Ok(DynamicValue::Vector(items.into_boxed_slice()))
}

fn read_int_vector(r: &mut ByteReader<'_>) -> JabResult<DynamicValue> {
    let byte_len = r.read_i32("GMF int vector length")?;
    if byte_len < 0 {
        return Err(JabError::NegativeLength {
            what: "GMF int vector",
            length: byte_len,
        });
    }
    let count = (byte_len / 4) as usize;
    let mut items = Vec::with_capacity(count.min(r.remaining() / 4));
    for _ in 0..count {
        items.push(r.read_i32("GMF int vector element")?);
    }
    Ok(DynamicValue::IntVector(items.into_boxed_slice()))
}
