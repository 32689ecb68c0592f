//! Generic value tree: [`JsonValue`], the insertion-ordered [`JsonRecord`] and
//! [`JsonNumber`].

use std::fmt;
use std::ops::Index;

use indexmap::IndexMap;

use crate::encoder::encode_tree;
use crate::error::JsonError;
use crate::lexer::{Lexer, TokenKind};
use crate::options::EncodeOptions;
use crate::rules::format_f64;

static NULL: JsonValue = JsonValue::Null;

/// A JSON number, kept as its validated literal text.
///
/// Keeping the literal lets a tree be bound to any numeric kind with the
/// same result as decoding the original text directly (no detour through
/// `f64` for 64-bit integers or decimals).
#[derive(Debug, Clone)]
pub struct JsonNumber {
    repr: String,
}

impl JsonNumber {
    pub(crate) fn from_literal(text: &str) -> Self {
        Self {
            repr: text.to_string(),
        }
    }

    /// Validate `text` as a JSON number literal.
    pub fn parse(text: &str) -> Result<Self, JsonError> {
        let mut lexer = Lexer::new(text);
        let token = lexer.expect(TokenKind::Number)?;
        lexer.finish()?;
        Ok(Self::from_literal(token.as_str()))
    }

    /// `None` for NaN and infinities, which JSON cannot represent.
    pub fn from_f64(f: f64) -> Option<Self> {
        f.is_finite().then(|| Self { repr: format_f64(f) })
    }

    pub fn as_str(&self) -> &str {
        &self.repr
    }

    pub fn as_f64(&self) -> f64 {
        self.repr.parse().unwrap_or(f64::NAN)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.repr.parse().ok()
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.repr.parse().ok()
    }

    /// `true` when the literal has neither fraction nor exponent.
    pub fn is_integer(&self) -> bool {
        !self.repr.bytes().any(|b| matches!(b, b'.' | b'e' | b'E'))
    }
}

/// Exact value of a number literal as significant digits and a power of
/// ten, with zero normalized to no digits and no sign. `None` when the
/// exponent does not fit an `i128`.
fn normalize(repr: &str) -> Option<(bool, String, i128)> {
    let (negative, repr) = match repr.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, repr),
    };
    let (mantissa, exponent) = match repr.find(['e', 'E']) {
        Some(at) => (&repr[..at], repr[at + 1..].parse::<i128>().ok()?),
        None => (repr, 0),
    };
    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all: String = int.chars().chain(frac.chars()).collect();
    let significant = all.trim_start_matches('0');
    let trimmed = significant.trim_end_matches('0');
    if trimmed.is_empty() {
        return Some((false, String::new(), 0));
    }
    let trailing = (significant.len() - trimmed.len()) as i128;
    let exponent = exponent.checked_sub(frac.len() as i128)?.checked_add(trailing)?;
    Some((negative, trimmed.to_string(), exponent))
}

impl PartialEq for JsonNumber {
    fn eq(&self, other: &Self) -> bool {
        match (normalize(&self.repr), normalize(&other.repr)) {
            (Some(a), Some(b)) => a == b,
            _ => self.repr == other.repr,
        }
    }
}

impl fmt::Display for JsonNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr)
    }
}

macro_rules! number_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for JsonNumber {
            fn from(n: $ty) -> Self {
                Self { repr: n.to_string() }
            }
        })*
    };
}

number_from_int!(i8, i16, i32, i64, u8, u16, u32, u64);

/// Untyped JSON value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JsonValue {
    #[default]
    Null,
    Bool(bool),
    Number(JsonNumber),
    String(String),
    Array(Vec<JsonValue>),
    Object(JsonRecord),
}

impl JsonValue {
    /// Same names as [`TokenKind::value_name`], so tree and text errors agree.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&JsonNumber> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(JsonNumber::as_f64)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(JsonNumber::as_i64)
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_number().and_then(JsonNumber::as_u64)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<JsonValue>> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<JsonValue>> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&JsonRecord> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut JsonRecord> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Member lookup on objects; `None` for other kinds.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.as_object().and_then(|o| o.get(key))
    }
}

impl Index<&str> for JsonValue {
    type Output = JsonValue;

    fn index(&self, key: &str) -> &JsonValue {
        self.get(key).unwrap_or(&NULL)
    }
}

impl Index<usize> for JsonValue {
    type Output = JsonValue;

    fn index(&self, index: usize) -> &JsonValue {
        self.as_array().and_then(|a| a.get(index)).unwrap_or(&NULL)
    }
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_tree(self, &EncodeOptions::default()))
    }
}

impl From<bool> for JsonValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for JsonValue {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl From<i64> for JsonValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<u64> for JsonValue {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

/// Non-finite floats become `Null`.
impl From<f64> for JsonValue {
    fn from(f: f64) -> Self {
        JsonNumber::from_f64(f).map_or(Self::Null, Self::Number)
    }
}

impl From<&str> for JsonValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for JsonValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<JsonValue>> for JsonValue {
    fn from(items: Vec<JsonValue>) -> Self {
        Self::Array(items)
    }
}

impl From<JsonRecord> for JsonValue {
    fn from(record: JsonRecord) -> Self {
        Self::Object(record)
    }
}

impl<T: Into<JsonValue>> From<Option<T>> for JsonValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for JsonValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(JsonNumber::from_literal(&n.to_string())),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(arr) => Self::Array(arr.into_iter().map(Self::from).collect()),
            serde_json::Value::Object(obj) => {
                Self::Object(obj.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<JsonValue> for serde_json::Value {
    fn from(v: JsonValue) -> Self {
        match v {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Number(n) => n
                .as_str()
                .parse::<serde_json::Number>()
                .map_or(Self::Null, Self::Number),
            JsonValue::String(s) => Self::String(s),
            JsonValue::Array(arr) => Self::Array(arr.into_iter().map(Self::from).collect()),
            JsonValue::Object(obj) => {
                Self::Object(obj.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

/// JSON object with insertion-ordered, unique keys. Inserting an existing
/// key replaces its value in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsonRecord {
    entries: IndexMap<String, JsonValue>,
}

impl JsonRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut JsonValue> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the previous value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Option<JsonValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Removes `key`, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<JsonValue> {
        self.entries.shift_remove(key)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, JsonValue> {
        self.entries.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, JsonValue> {
        self.entries.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, JsonValue> {
        self.entries.values()
    }
}

impl Index<&str> for JsonRecord {
    type Output = JsonValue;

    fn index(&self, key: &str) -> &JsonValue {
        self.get(key).unwrap_or(&NULL)
    }
}

impl FromIterator<(String, JsonValue)> for JsonRecord {
    fn from_iter<I: IntoIterator<Item = (String, JsonValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for JsonRecord {
    type Item = (String, JsonValue);
    type IntoIter = indexmap::map::IntoIter<String, JsonValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a JsonRecord {
    type Item = (&'a String, &'a JsonValue);
    type IntoIter = indexmap::map::Iter<'a, String, JsonValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
