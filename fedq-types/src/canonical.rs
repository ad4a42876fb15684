//! Canonical byte encoding for values.
//!
//! The encoding is the identity of a value for grouping: two values are equal
//! exactly when their canonical bytes are equal. Each value is a kind tag byte
//! followed by a big-endian payload. Strings, tuples and objects carry a
//! length prefix so concatenated encodings stay unambiguous, and object
//! entries are written in sorted key order.
//!
//! Integers and durations flip the sign bit so that, within one kind,
//! byte order matches numeric order.

use crate::value::Value;

const TAG_NULL: u8 = 0x00;
const TAG_BOOL: u8 = 0x01;
const TAG_INT: u8 = 0x02;
const TAG_FLOAT: u8 = 0x03;
const TAG_STRING: u8 = 0x04;
const TAG_TIME: u8 = 0x05;
const TAG_DURATION: u8 = 0x06;
const TAG_TUPLE: u8 = 0x07;
const TAG_OBJECT: u8 = 0x08;

/// Types with a canonical, structure-preserving byte encoding.
pub trait CanonicalKey {
    /// Append the canonical encoding of `self` to `out`.
    fn write_canonical(&self, out: &mut Vec<u8>);

    fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_canonical(&mut out);
        out
    }
}

/// Collapse `-0.0` onto `0.0` and every NaN payload onto one NaN.
#[inline]
pub fn normalize_f64(raw: f64) -> f64 {
    if raw.is_nan() {
        f64::NAN
    } else if raw == 0.0 {
        0.0
    } else {
        raw
    }
}

#[inline]
fn write_len(out: &mut Vec<u8>, len: usize) {
    out.extend_from_slice(&(len as u64).to_be_bytes());
}

#[inline]
fn write_i64(out: &mut Vec<u8>, v: i64) {
    out.extend_from_slice(&((v as u64) ^ (1 << 63)).to_be_bytes());
}

#[inline]
fn write_i128(out: &mut Vec<u8>, v: i128) {
    out.extend_from_slice(&((v as u128) ^ (1 << 127)).to_be_bytes());
}

impl CanonicalKey for Value {
    fn write_canonical(&self, out: &mut Vec<u8>) {
        match self {
            Value::Null => out.push(TAG_NULL),
            Value::Bool(v) => {
                out.push(TAG_BOOL);
                out.push(u8::from(*v));
            }
            Value::Int(v) => {
                out.push(TAG_INT);
                write_i64(out, *v);
            }
            Value::Float(v) => {
                out.push(TAG_FLOAT);
                out.extend_from_slice(&normalize_f64(*v).to_bits().to_be_bytes());
            }
            Value::String(v) => {
                out.push(TAG_STRING);
                write_len(out, v.len());
                out.extend_from_slice(v.as_bytes());
            }
            Value::Time(v) => {
                out.push(TAG_TIME);
                write_i128(out, v.unix_timestamp_nanos());
            }
            Value::Duration(v) => {
                out.push(TAG_DURATION);
                write_i128(out, v.whole_nanoseconds());
            }
            Value::Tuple(items) => {
                out.push(TAG_TUPLE);
                write_len(out, items.len());
                for item in items {
                    item.write_canonical(out);
                }
            }
            Value::Object(fields) => {
                out.push(TAG_OBJECT);
                write_len(out, fields.len());
                // BTreeMap iterates in sorted key order.
                for (name, item) in fields {
                    write_len(out, name.len());
                    out.extend_from_slice(name.as_bytes());
                    item.write_canonical(out);
                }
            }
        }
    }
}

impl CanonicalKey for [Value] {
    fn write_canonical(&self, out: &mut Vec<u8>) {
        out.push(TAG_TUPLE);
        write_len(out, self.len());
        for item in self {
            item.write_canonical(out);
        }
    }
}
