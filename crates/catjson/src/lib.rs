//! catjson - type-driven JSON decoding and encoding.
//!
//! Text is decoded either into the generic [`JsonValue`] tree or straight
//! into any type implementing [`JsonShape`]. Record member tables are
//! built once per type and cached process-wide; root types with a
//! registered decoder can skip shape dispatch entirely through
//! [`DecodeMode::Precompiled`].
//!
//! ```
//! use catjson::{json_record, JsonValue};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//!     tags: Vec<String>,
//! }
//!
//! json_record!(Point { x, y, tags });
//!
//! let p: Point = catjson::from_str(r#"{"x": 1, "y": -2, "tags": ["a"], "extra": {}}"#).unwrap();
//! assert_eq!(p.y, -2);
//! assert_eq!(catjson::to_string(&p).unwrap(), r#"{"x":1,"y":-2,"tags":["a"]}"#);
//!
//! let tree: JsonValue = catjson::parse("[1, {\"k\": null}]").unwrap();
//! assert!(tree[1]["k"].is_null());
//! ```

pub mod cli;
pub mod convert;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod lexer;
mod macros;
pub mod options;
pub mod registry;
mod rules;
pub mod shape;
pub mod shape_cache;
mod tree;
pub mod value;

pub use convert::Converter;
pub use decoder::{DecodeStrategy, Decoded, Decoder, Precompiled, Reflective};
pub use encoder::{encode_tree, Encoder};
pub use error::{ErrorKind, JsonError, LexicalReason, SyntaxReason};
pub use lexer::{Lexer, Span, SpanToken, Token, TokenKind};
pub use options::{DecodeMode, DecodeOptions, EncodeOptions};
pub use registry::{Registry, ShapeAdapter};
pub use shape::{
    unbox, Boxed, JsonEnum, JsonShape, MapKey, Record, RecordBuilder, RecordDescriptor, Shape,
    ShapeKind,
};
pub use value::{JsonNumber, JsonRecord, JsonValue};

/// Parse `text` into the generic tree.
pub fn parse(text: &str) -> Result<JsonValue, JsonError> {
    parse_with(text, &DecodeOptions::default())
}

/// [`parse`] with an explicit depth limit. The decode mode is ignored.
pub fn parse_with(text: &str, options: &DecodeOptions) -> Result<JsonValue, JsonError> {
    let mut lexer = Lexer::new(text);
    let value = tree::read_value(&mut lexer, 0, options.max_depth)?;
    lexer.finish()?;
    Ok(value)
}

pub fn from_str<T: JsonShape>(text: &str) -> Result<T, JsonError> {
    from_str_with(text, Registry::empty(), &DecodeOptions::default())
}

pub fn from_str_with<T: JsonShape>(
    text: &str,
    registry: &Registry,
    options: &DecodeOptions,
) -> Result<T, JsonError> {
    unbox::<T>(decode_shape(text, T::shape(), registry, options)?)
}

/// Untyped decode of `text` into `shape`.
pub fn decode_shape(
    text: &str,
    shape: Shape,
    registry: &Registry,
    options: &DecodeOptions,
) -> Result<Boxed, JsonError> {
    decoder::decode_text(text, shape, registry, options)
}

pub fn from_value<T: JsonShape>(value: &JsonValue) -> Result<T, JsonError> {
    from_value_with(value, Registry::empty())
}

pub fn from_value_with<T: JsonShape>(value: &JsonValue, registry: &Registry) -> Result<T, JsonError> {
    Converter::new(registry).convert(value)
}

/// Untyped conversion of a tree into `shape`; `null` for a non-nullable
/// shape yields its default.
pub fn convert_shape(value: &JsonValue, shape: Shape, registry: &Registry) -> Result<Boxed, JsonError> {
    Ok(Converter::new(registry)
        .convert_shape(value, shape)?
        .or_default(&shape))
}

pub fn to_string<T: JsonShape>(value: &T) -> Result<String, JsonError> {
    to_string_with(value, &EncodeOptions::default())
}

pub fn to_string_pretty<T: JsonShape>(value: &T) -> Result<String, JsonError> {
    to_string_with(value, &EncodeOptions::pretty())
}

pub fn to_string_with<T: JsonShape>(value: &T, options: &EncodeOptions) -> Result<String, JsonError> {
    Encoder::new(options.clone()).encode(value)
}
