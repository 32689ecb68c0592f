//! Binding an already-parsed [`JsonValue`] tree to a shape.
//!
//! Conversion follows the same rules as decoding from text, so converting
//! `parse(text)` gives the same value as decoding `text` directly. Types
//! with a registered extension decoder are handled by re-encoding the
//! subtree and running the extension over that text.

use tracing::trace;

use crate::decoder::{Decoded, Decoder};
use crate::encoder::encode_tree;
use crate::error::JsonError;
use crate::lexer::Lexer;
use crate::options::{DecodeOptions, EncodeOptions};
use crate::registry::Registry;
use crate::rules;
use crate::shape::{unbox, JsonShape, Shape, ShapeKind};
use crate::shape_cache;
use crate::value::JsonValue;

pub struct Converter<'r> {
    registry: &'r Registry,
}

impl<'r> Converter<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    pub fn convert<T: JsonShape>(&self, value: &JsonValue) -> Result<T, JsonError> {
        let shape = T::shape();
        unbox::<T>(self.convert_shape(value, shape)?.or_default(&shape))
    }

    pub fn convert_shape(&self, value: &JsonValue, shape: Shape) -> Result<Decoded, JsonError> {
        let shape = self.registry.resolve(shape);
        if self.registry.extension(shape.id).is_some() {
            return self.through_extension(value, shape);
        }
        match (value, shape.kind) {
            (_, ShapeKind::Any) => Ok(Decoded::Value(Box::new(value.clone()))),
            (JsonValue::Null, _) => rules::null(&shape),
            (_, ShapeKind::Nullable(n)) => {
                let inner = self.convert_shape(value, (n.inner)())?;
                rules::wrap_nullable(&n, inner)
            }
            (JsonValue::Bool(b), ShapeKind::Bool) => Ok(Decoded::Value(Box::new(*b))),
            (JsonValue::Number(n), ShapeKind::Number(kind)) => {
                rules::number(n.as_str(), kind, shape.name, None).map(Decoded::Value)
            }
            (JsonValue::Number(n), ShapeKind::Enum(e)) => {
                rules::ordinal(n.as_str(), &e, shape.name, None).map(Decoded::Value)
            }
            (JsonValue::String(s), ShapeKind::String) => Ok(Decoded::Value(Box::new(s.clone()))),
            (JsonValue::String(s), ShapeKind::Char) => {
                rules::character(s, None).map(Decoded::Value)
            }
            (JsonValue::Array(items), ShapeKind::Sequence(seq)) => {
                let element = (seq.element)();
                let items = items
                    .iter()
                    .map(|item| Ok(self.convert_shape(item, element)?.or_default(&element)))
                    .collect::<Result<Vec<_>, JsonError>>()?;
                rules::sequence(&seq, items, None).map(Decoded::Value)
            }
            (JsonValue::Object(record), ShapeKind::Map(map)) => {
                let value_shape = (map.value)();
                let mut target = (shape.default)();
                for (key, item) in record {
                    let item = self.convert_shape(item, value_shape)?.or_default(&value_shape);
                    (map.insert)(&mut *target, key, item)?;
                }
                Ok(Decoded::Value(target))
            }
            (JsonValue::Object(record), ShapeKind::Record(rec)) => {
                let descriptor = shape_cache::record_descriptor(&shape, &rec);
                let mut target = (shape.default)();
                for (key, item) in record {
                    let Some(member) = descriptor.member(key) else {
                        continue;
                    };
                    if let Decoded::Value(v) = self.convert_shape(item, member.shape())? {
                        member.set(&mut *target, v)?;
                    }
                }
                (rec.finish)(&mut *target);
                Ok(Decoded::Value(target))
            }
            _ => Err(JsonError::TypeMismatch {
                offset: None,
                found: value.kind_name(),
                shape: shape.name,
            }),
        }
    }

    fn through_extension(&self, value: &JsonValue, shape: Shape) -> Result<Decoded, JsonError> {
        trace!(shape = shape.name, "re-encoding subtree for extension decoder");
        let text = encode_tree(value, &EncodeOptions::default());
        let mut lexer = Lexer::new(&text);
        let decoded = Decoder::new(&mut lexer, self.registry, &DecodeOptions::default())
            .decode_shape(shape)?;
        lexer.finish()?;
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::BTreeMap;

    fn tree(text: &str) -> JsonValue {
        crate::parse(text).unwrap()
    }

    #[test]
    fn converts_like_text_decoding() {
        let converter = Converter::new(Registry::empty());
        let v: Vec<Option<u8>> = converter.convert(&tree("[1, null, 3]")).unwrap();
        assert_eq!(v, [Some(1), None, Some(3)]);
        let m: BTreeMap<i8, String> = converter.convert(&tree(r#"{"-1": "a"}"#)).unwrap();
        assert_eq!(m[&-1], "a");
        assert_eq!(converter.convert::<u64>(&tree("null")).unwrap(), 0);
    }

    #[test]
    fn range_and_kind_errors() {
        let converter = Converter::new(Registry::empty());
        let err = converter.convert::<u8>(&tree("300")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
        let err = converter.convert::<String>(&tree("[]")).unwrap_err();
        assert_eq!(
            err,
            JsonError::TypeMismatch {
                offset: None,
                found: "array",
                shape: std::any::type_name::<String>()
            }
        );
    }

    #[test]
    fn extension_sees_reencoded_subtree() {
        let mut registry = Registry::new();
        registry.register_extension::<String, _>(|decoder| {
            let value: JsonValue = decoder.decode()?;
            Ok(value.to_string())
        });
        let converter = Converter::new(&registry);
        let v: Vec<String> = converter.convert(&tree(r#"[{"a": 1}, [true]]"#)).unwrap();
        assert_eq!(v, [r#"{"a":1}"#, "[true]"]);
    }
}
