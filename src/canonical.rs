//! Canonical JSON encoding used as the claim signing input.
//!
//! Object keys are sorted at every nesting level, no whitespace is emitted
//! around `:` or `,`, and the result is UTF-8. Any change to this encoding is a
//! breaking change for every verifier of existing claims.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::finite::ensure_finite;

/// Serializes `value` into its canonical byte form. NaN and infinite floats
/// are rejected rather than encoded as `null`.
pub fn to_canonical_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    ensure_finite(value)?;
    let value = serde_json::to_value(value)?;
    let mut out = Vec::new();
    write_value(&value, &mut out)?;
    Ok(out)
}

// Keys are sorted here: serde_json's own map order flips with `preserve_order`.
fn write_value(value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push(b'{');
            for (i, (key, val)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                serde_json::to_writer(&mut *out, key)?;
                out.push(b':');
                write_value(val, out)?;
            }
            out.push(b'}');
        }
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(item, out)?;
            }
            out.push(b']');
        }
        scalar => serde_json::to_writer(&mut *out, scalar)?,
    }
    Ok(())
}
