//! Typed lookups into arbitrary JSON documents.
//!
//! Paths use dotted field access and zero-based indexes, e.g.
//! `rows[0].status`, `[2].CUSNUM` or `data.items[1][0]`.

use serde_json::Value;

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Field(String),
    Index(usize),
}

/// Parsed path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    raw: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn parse(path: &str) -> Result<Self> {
        let invalid = |reason: &str| CoreError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        let mut chars = path.trim().chars();
        let mut field = String::new();
        // A field is expected at the start and after every '.'
        let mut after_dot = false;

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if field.is_empty() && (segments.is_empty() || after_dot) {
                        return Err(invalid("empty field name"));
                    }
                    if !field.is_empty() {
                        segments.push(Segment::Field(std::mem::take(&mut field)));
                    }
                    after_dot = true;
                }
                '[' => {
                    if !field.is_empty() {
                        segments.push(Segment::Field(std::mem::take(&mut field)));
                    } else if after_dot {
                        return Err(invalid("empty field name"));
                    }
                    let mut digits = String::new();
                    loop {
                        match chars.next() {
                            Some(']') => break,
                            Some(d) if d.is_ascii_digit() => digits.push(d),
                            Some(_) => return Err(invalid("index must be a non-negative integer")),
                            None => return Err(invalid("unclosed '['")),
                        }
                    }
                    let index = digits
                        .parse::<usize>()
                        .map_err(|_| invalid("index must be a non-negative integer"))?;
                    segments.push(Segment::Index(index));
                    after_dot = false;
                }
                ']' => return Err(invalid("unexpected ']'")),
                c => {
                    field.push(c);
                    after_dot = false;
                }
            }
        }

        if after_dot {
            return Err(invalid("path ends with '.'"));
        }
        if !field.is_empty() {
            segments.push(Segment::Field(field));
        }
        if segments.is_empty() {
            return Err(invalid("empty path"));
        }

        Ok(Self {
            raw: path.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Follow the path through `root`. Missing fields, out-of-range indexes
    /// and indexing into the wrong kind of value all yield `None`.
    pub fn find<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |current, segment| match segment {
                Segment::Field(name) => current.as_object()?.get(name),
                Segment::Index(i) => current.as_array()?.get(*i),
            })
    }
}

/// Scalar types that can be read out of a JSON value
pub trait JsonScalar: Sized + Default {
    const TYPE_NAME: &'static str;

    fn from_json(value: &Value) -> Option<Self>;
}

impl JsonScalar for String {
    const TYPE_NAME: &'static str = "string";

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl JsonScalar for i64 {
    const TYPE_NAME: &'static str = "integer";

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_to_i64)),
            Value::String(s) => {
                let s = s.trim();
                s.parse()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(whole_to_i64))
            }
            _ => None,
        }
    }
}

impl JsonScalar for i32 {
    const TYPE_NAME: &'static str = "integer";

    fn from_json(value: &Value) -> Option<Self> {
        i64::from_json(value).and_then(|v| i32::try_from(v).ok())
    }
}

impl JsonScalar for f64 {
    const TYPE_NAME: &'static str = "double";

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl JsonScalar for f32 {
    const TYPE_NAME: &'static str = "float";

    fn from_json(value: &Value) -> Option<Self> {
        f64::from_json(value).and_then(|v| {
            let narrowed = v as f32;
            (narrowed.is_finite() || !v.is_finite()).then_some(narrowed)
        })
    }
}

/// `12.0` reads as 12; fractional or out-of-range values do not convert
fn whole_to_i64(v: f64) -> Option<i64> {
    // 2^63 is exactly representable, so the upper bound is exclusive
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (v.fract() == 0.0 && v >= -LIMIT && v < LIMIT).then_some(v as i64)
}

impl JsonScalar for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Read a typed value at `path`, reporting why it could not be read
pub fn extract<T: JsonScalar>(json_text: &str, path: &str) -> Result<T> {
    let root: Value = serde_json::from_str(json_text)?;
    extract_from(&root, path)
}

pub fn extract_from<T: JsonScalar>(root: &Value, path: &str) -> Result<T> {
    let parsed = JsonPath::parse(path)?;
    let value = parsed
        .find(root)
        .ok_or_else(|| CoreError::PathNotFound(path.to_string()))?;
    T::from_json(value).ok_or_else(|| CoreError::TypeMismatch {
        path: path.to_string(),
        expected: T::TYPE_NAME,
    })
}

/// Read a typed value at `path`, falling back to the type's zero value
pub fn extract_or_default<T: JsonScalar>(json_text: &str, path: &str) -> T {
    extract(json_text, path).unwrap_or_default()
}
