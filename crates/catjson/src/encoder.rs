//! Text output for typed values and for [`JsonValue`] trees.

use std::any::Any;

use catjson_util::write_quoted;

use crate::error::JsonError;
use crate::options::EncodeOptions;
use crate::rules::format_number;
use crate::shape::{JsonShape, Shape, ShapeKind};
use crate::shape_cache;
use crate::value::JsonValue;

/// Encode a tree. Object members come out in insertion order.
pub fn encode_tree(value: &JsonValue, options: &EncodeOptions) -> String {
    let mut encoder = Encoder::new(options.clone());
    encoder.write_tree(value);
    encoder.out
}

pub struct Encoder {
    out: String,
    options: EncodeOptions,
    depth: usize,
}

impl Encoder {
    pub fn new(options: EncodeOptions) -> Self {
        Self {
            out: String::new(),
            options,
            depth: 0,
        }
    }

    pub fn encode<T: JsonShape>(&mut self, value: &T) -> Result<String, JsonError> {
        self.encode_shape(value, T::shape())
    }

    /// Encode `value` as `shape`. Records are written member by member in
    /// declaration order; nullable members holding nothing are written as
    /// `null`.
    pub fn encode_shape(&mut self, value: &dyn Any, shape: Shape) -> Result<String, JsonError> {
        self.out.clear();
        self.depth = 0;
        self.write_shape(value, shape)?;
        Ok(std::mem::take(&mut self.out))
    }

    fn write_shape(&mut self, value: &dyn Any, shape: Shape) -> Result<(), JsonError> {
        let mismatch = || JsonError::ShapeMismatch { shape: shape.name };
        match shape.kind {
            ShapeKind::Bool => {
                let b = value.downcast_ref::<bool>().ok_or_else(mismatch)?;
                self.out.push_str(if *b { "true" } else { "false" });
            }
            ShapeKind::Number(kind) => {
                let text = format_number(kind, value).ok_or_else(mismatch)?;
                self.out.push_str(&text);
            }
            ShapeKind::String => {
                let s = value.downcast_ref::<String>().ok_or_else(mismatch)?;
                write_quoted(&mut self.out, s);
            }
            ShapeKind::Char => {
                let c = value.downcast_ref::<char>().ok_or_else(mismatch)?;
                let mut buf = [0u8; 4];
                write_quoted(&mut self.out, c.encode_utf8(&mut buf));
            }
            ShapeKind::Enum(e) => {
                let ordinal = (e.to_ordinal)(value).ok_or_else(mismatch)?;
                self.out.push_str(&ordinal.to_string());
            }
            ShapeKind::Nullable(n) => match (n.get)(value).ok_or_else(mismatch)? {
                Some(inner) => self.write_shape(inner, (n.inner)())?,
                None => self.out.push_str("null"),
            },
            ShapeKind::Sequence(seq) => {
                let items = (seq.items)(value).ok_or_else(mismatch)?;
                let element = (seq.element)();
                self.open('[');
                for (i, item) in items.iter().enumerate() {
                    self.separator(i);
                    self.write_shape(*item, element)?;
                }
                self.close(']', !items.is_empty());
            }
            ShapeKind::Map(map) => {
                let entries = (map.entries)(value).ok_or_else(mismatch)?;
                let value_shape = (map.value)();
                self.open('{');
                for (i, (key, item)) in entries.iter().enumerate() {
                    self.separator(i);
                    self.key(key);
                    self.write_shape(*item, value_shape)?;
                }
                self.close('}', !entries.is_empty());
            }
            ShapeKind::Record(record) => {
                let descriptor = shape_cache::record_descriptor(&shape, &record);
                self.open('{');
                for (i, member) in descriptor.members().enumerate() {
                    let item = member.get(value).ok_or_else(mismatch)?;
                    self.separator(i);
                    self.key(member.name());
                    self.write_shape(item, member.shape())?;
                }
                self.close('}', !descriptor.is_empty());
            }
            ShapeKind::Any => {
                let tree = value.downcast_ref::<JsonValue>().ok_or_else(mismatch)?;
                self.write_tree(tree);
            }
        }
        Ok(())
    }

    fn write_tree(&mut self, value: &JsonValue) {
        match value {
            JsonValue::Null => self.out.push_str("null"),
            JsonValue::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            JsonValue::Number(n) => self.out.push_str(n.as_str()),
            JsonValue::String(s) => write_quoted(&mut self.out, s),
            JsonValue::Array(items) => {
                self.open('[');
                for (i, item) in items.iter().enumerate() {
                    self.separator(i);
                    self.write_tree(item);
                }
                self.close(']', !items.is_empty());
            }
            JsonValue::Object(record) => {
                self.open('{');
                for (i, (key, item)) in record.iter().enumerate() {
                    self.separator(i);
                    self.key(key);
                    self.write_tree(item);
                }
                self.close('}', !record.is_empty());
            }
        }
    }

    fn open(&mut self, ch: char) {
        self.out.push(ch);
        self.depth += 1;
    }

    fn close(&mut self, ch: char, non_empty: bool) {
        self.depth -= 1;
        if non_empty {
            self.newline();
        }
        self.out.push(ch);
    }

    fn separator(&mut self, index: usize) {
        if index > 0 {
            self.out.push(',');
        }
        self.newline();
    }

    fn newline(&mut self) {
        if self.options.indent {
            self.out.push('\n');
            let width = self.depth * self.options.indent_width;
            self.out.extend(std::iter::repeat(' ').take(width));
        }
    }

    fn key(&mut self, key: &str) {
        write_quoted(&mut self.out, key);
        self.out.push(':');
        if self.options.indent {
            self.out.push(' ');
        }
    }
}
