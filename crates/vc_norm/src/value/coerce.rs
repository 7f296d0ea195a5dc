//! Loose scalar casts used when denormalizing builtin types.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use super::Value;

impl Value {
    /// Casts to a boolean.
    ///
    /// `null`, `false`, `0`, `0.0`, `""`, `"0"` and empty collections are falsy.
    pub fn cast_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !(s.is_empty() || s == "0"),
            Value::List(list) => !list.is_empty(),
            Value::Map(map) => !map.is_empty(),
            Value::Object(_) => true,
        }
    }

    /// Casts to an integer, truncating floats and parsing the numeric prefix of strings.
    pub fn cast_int(&self) -> i64 {
        match self {
            Value::Null => 0,
            Value::Bool(b) => *b as i64,
            Value::Int(i) => *i,
            Value::Float(f) => float_to_int(*f),
            Value::String(s) => match numeric_prefix(s) {
                Some(Numeric::Int(i)) => i,
                Some(Numeric::Float(f)) => float_to_int(f),
                None => 0,
            },
            Value::List(list) => !list.is_empty() as i64,
            Value::Map(map) => !map.is_empty() as i64,
            Value::Object(_) => 1,
        }
    }

    /// Casts to a float, parsing the numeric prefix of strings.
    pub fn cast_float(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => *b as i64 as f64,
            Value::Int(i) => *i as f64,
            Value::Float(f) => *f,
            Value::String(s) => match numeric_prefix(s) {
                Some(Numeric::Int(i)) => i as f64,
                Some(Numeric::Float(f)) => f,
                None => 0.0,
            },
            Value::List(list) => !list.is_empty() as i64 as f64,
            Value::Map(map) => !map.is_empty() as i64 as f64,
            Value::Object(_) => 1.0,
        }
    }

    /// Casts to its textual form.
    ///
    /// `true` becomes `"1"`, `false` and `null` the empty string,
    /// integral floats drop their fraction.
    pub fn cast_string(&self) -> String {
        match self {
            Value::Null | Value::Bool(false) => String::new(),
            Value::Bool(true) => String::from("1"),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => float_to_string(*f),
            Value::String(s) => s.clone(),
            Value::List(_) | Value::Map(_) => String::from("Array"),
            Value::Object(object) => object.class_name(),
        }
    }

    /// Casts to a collection.
    ///
    /// `null` becomes an empty list, scalars and objects a single element list,
    /// collections are kept as they are.
    pub fn cast_collection(self) -> Value {
        match self {
            Value::Null => Value::List(Vec::new()),
            Value::List(_) | Value::Map(_) => self,
            other => Value::List(alloc::vec![other]),
        }
    }
}

fn float_to_int(f: f64) -> i64 {
    if f.is_finite() { f as i64 } else { 0 }
}

fn float_to_string(f: f64) -> String {
    if f.is_nan() {
        return String::from("NAN");
    }
    if f.is_infinite() {
        return String::from(if f > 0.0 { "INF" } else { "-INF" });
    }
    if f.fract() == 0.0 && f.abs() < 1e15 {
        return (f as i64).to_string();
    }
    f.to_string()
}

enum Numeric {
    Int(i64),
    Float(f64),
}

/// Parses the leading numeric part of `s`: `" 12abc"` is 12, `"1.5e3x"` is 1500.
fn numeric_prefix(s: &str) -> Option<Numeric> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut is_float = false;
    let mut has_digits = end > digits_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac = end + 1;
        while frac < bytes.len() && bytes[frac].is_ascii_digit() {
            frac += 1;
        }
        if frac > end + 1 || has_digits {
            has_digits |= frac > end + 1;
            is_float = true;
            end = frac;
        }
    }
    if !has_digits {
        return None;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp = end + 1;
        if exp < bytes.len() && matches!(bytes[exp], b'+' | b'-') {
            exp += 1;
        }
        let exp_digits = exp;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > exp_digits {
            is_float = true;
            end = exp;
        }
    }

    let number = &s[..end];
    if !is_float {
        if let Ok(i) = number.parse::<i64>() {
            return Some(Numeric::Int(i));
        }
    }
    number.parse::<f64>().ok().map(Numeric::Float)
}

#[cfg(test)]
mod tests {
    use crate::value::Value;

    #[test]
    fn int_casts() {
        assert_eq!(Value::from("123").cast_int(), 123);
        assert_eq!(Value::from(" 42abc").cast_int(), 42);
        assert_eq!(Value::from("12.7").cast_int(), 12);
        assert_eq!(Value::from("1e3").cast_int(), 1000);
        assert_eq!(Value::from("abc").cast_int(), 0);
        assert_eq!(Value::from(12.7).cast_int(), 12);
        assert_eq!(Value::from(-12.7).cast_int(), -12);
        assert_eq!(Value::from(true).cast_int(), 1);
        assert_eq!(Value::Null.cast_int(), 0);
    }

    #[test]
    fn float_casts() {
        assert_eq!(Value::from("12.5").cast_float(), 12.5);
        assert_eq!(Value::from(".5").cast_float(), 0.5);
        assert_eq!(Value::from(3).cast_float(), 3.0);
        assert_eq!(Value::from(false).cast_float(), 0.0);
        assert_eq!(Value::from("-").cast_float(), 0.0);
    }

    #[test]
    fn string_casts() {
        assert_eq!(Value::from(123).cast_string(), "123");
        assert_eq!(Value::Null.cast_string(), "");
        assert_eq!(Value::from(true).cast_string(), "1");
        assert_eq!(Value::from(false).cast_string(), "");
        assert_eq!(Value::from(12.3).cast_string(), "12.3");
        assert_eq!(Value::from(2.0).cast_string(), "2");
    }

    #[test]
    fn bool_casts() {
        for falsy in [
            Value::Null,
            Value::from(false),
            Value::from(0),
            Value::from(""),
            Value::from("0"),
            Value::from(0.0),
            Value::list(),
        ] {
            assert!(!falsy.cast_bool(), "{falsy:?} should be falsy");
        }
        for truthy in [
            Value::from(true),
            Value::from(2),
            Value::from("a"),
            Value::from("0.0"),
            Value::from_iter([Value::Null]),
        ] {
            assert!(truthy.cast_bool(), "{truthy:?} should be truthy");
        }
    }

    #[test]
    fn collection_casts() {
        assert_eq!(Value::from(123).cast_collection(), Value::from_iter([Value::from(123)]));
        assert_eq!(Value::Null.cast_collection(), Value::list());
        let map = Value::from_iter([("a", 1)]);
        assert_eq!(map.clone().cast_collection(), map);
    }
}
