//! A stable byte-serialisation of structured data. Every hash, signature,
//! and integrity check in this workspace is computed over the output of
//! [`CanonicalValue::encode`] — never over `serde_json`'s default
//! (non-canonical, order-preserving-by-feature-flag) output.

use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// A structured value in canonical form.
///
/// Object keys are held in a `BTreeMap`, so iteration order is always
/// lexicographic by construction — there is no sorting step to forget.
#[derive(Clone, Debug, PartialEq)]
pub enum CanonicalValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<CanonicalValue>),
    Object(BTreeMap<String, CanonicalValue>),
}

impl CanonicalValue {
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, CanonicalValue)>,
        K: Into<String>,
    {
        CanonicalValue::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn array<I>(items: I) -> Self
    where
        I: IntoIterator<Item = CanonicalValue>,
    {
        CanonicalValue::Array(items.into_iter().collect())
    }

    pub fn str(s: impl Into<String>) -> Self {
        CanonicalValue::String(s.into())
    }

    pub fn int(n: i64) -> Self {
        CanonicalValue::Number(n as f64)
    }

    /// Encode this value into its canonical UTF-8 byte string.
    ///
    /// # Panics
    /// Panics if a `Number` is `NaN` or infinite. Canonical values are
    /// built from typed Rust data inside this workspace, never parsed
    /// from untrusted floats, so this can never trigger in practice —
    /// there is no silent coercion to a sentinel value, per this
    /// workspace's no-silent-fallback error policy.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        self.write(&mut out);
        out
    }

    fn write(&self, out: &mut String) {
        match self {
            CanonicalValue::Null => out.push_str("null"),
            CanonicalValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            CanonicalValue::Number(n) => write_canonical_number(*n, out),
            CanonicalValue::String(s) => write_canonical_string(s, out),
            CanonicalValue::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.write(out);
                }
                out.push(']');
            }
            CanonicalValue::Object(fields) => {
                out.push('{');
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_canonical_string(k, out);
                    out.push(':');
                    v.write(out);
                }
                out.push('}');
            }
        }
    }
}

fn write_canonical_number(n: f64, out: &mut String) {
    assert!(
        n.is_finite(),
        "canonical numbers must be finite (no NaN/Infinity)"
    );
    // Normalise -0.0 to 0.
    let n = if n == 0.0 { 0.0 } else { n };
    if n.fract() == 0.0 && n.abs() < 1e15 {
        write!(out, "{}", n as i64).expect("write to String is infallible");
    } else {
        write!(out, "{}", n).expect("write to String is infallible");
    }
}

fn write_canonical_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                write!(out, "\\u{:04x}", c as u32).expect("write to String is infallible");
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

impl From<&Value> for CanonicalValue {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => CanonicalValue::Null,
            Value::Bool(b) => CanonicalValue::Bool(*b),
            Value::Number(n) => CanonicalValue::Number(number_to_f64(n)),
            Value::String(s) => CanonicalValue::String(s.clone()),
            Value::Array(items) => CanonicalValue::Array(items.iter().map(Into::into).collect()),
            Value::Object(map) => CanonicalValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), CanonicalValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for CanonicalValue {
    fn from(v: Value) -> Self {
        (&v).into()
    }
}

fn number_to_f64(n: &Number) -> f64 {
    n.as_f64().unwrap_or(0.0)
}

/// Build a `CanonicalValue::Object` from `serde_json`-serialisable data.
///
/// Convenience for call sites that already have a `Serialize` type and
/// want its canonical byte form without hand-rolling `CanonicalValue`
/// construction.
pub fn canonicalize<T: serde::Serialize>(value: &T) -> Result<CanonicalValue, String> {
    let v = serde_json::to_value(value).map_err(|e| e.to_string())?;
    Ok(CanonicalValue::from(v))
}

/// Convenience: turn a `BTreeMap`-backed `serde_json::Map` into a sorted
/// `CanonicalValue::Object` directly, bypassing `Value`.
pub fn object_from_map(map: Map<String, Value>) -> CanonicalValue {
    CanonicalValue::Object(
        map.into_iter()
            .map(|(k, v)| (k, CanonicalValue::from(v)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keys_sort_lexicographically() {
        let v = CanonicalValue::object([
            ("b", CanonicalValue::int(2)),
            ("a", CanonicalValue::int(1)),
        ]);
        assert_eq!(v.encode(), r#"{"a":1,"b":2}"#);
    }

    #[test]
    fn integers_have_no_fractional_suffix() {
        assert_eq!(CanonicalValue::Number(42.0).encode(), "42");
    }

    #[test]
    fn negative_zero_normalises_to_zero() {
        assert_eq!(CanonicalValue::Number(-0.0).encode(), "0");
    }

    #[test]
    fn nested_structures_round_trip_order() {
        let v = CanonicalValue::object([
            (
                "arr",
                CanonicalValue::array([CanonicalValue::int(3), CanonicalValue::int(1)]),
            ),
            ("nil", CanonicalValue::Null),
            ("flag", CanonicalValue::Bool(true)),
        ]);
        assert_eq!(v.encode(), r#"{"arr":[3,1],"flag":true,"nil":null}"#);
    }

    #[test]
    fn same_object_different_field_order_encodes_identically() {
        let a = CanonicalValue::object([("x", CanonicalValue::int(1)), ("y", CanonicalValue::int(2))]);
        let b = CanonicalValue::object([("y", CanonicalValue::int(2)), ("x", CanonicalValue::int(1))]);
        assert_eq!(a.encode(), b.encode());
    }
}
