//! Type-dispatch decoding from text.
//!
//! [`Decoder`] walks the token stream under the direction of a [`Shape`]:
//! adapters may swap the shape, registered extensions take over whole
//! types, and everything else is dispatched on the shape kind and the next
//! token.

mod precompiled;

use indexmap::IndexMap;
use tracing::trace;

pub use precompiled::Precompiled;

use crate::error::{JsonError, SyntaxReason};
use crate::lexer::{Lexer, SpanToken, TokenKind};
use crate::options::{DecodeMode, DecodeOptions};
use crate::registry::Registry;
use crate::rules;
use crate::shape::{
    unbox, Boxed, JsonShape, MapShape, RecordShape, SequenceShape, Shape, ShapeKind,
};
use crate::shape_cache;
use crate::tree;

/// Result of decoding one value.
pub enum Decoded {
    Value(Boxed),
    /// `null` met a shape that cannot hold it; the target keeps its default.
    Null,
}

impl Decoded {
    pub fn into_value(self) -> Option<Boxed> {
        match self {
            Self::Value(v) => Some(v),
            Self::Null => None,
        }
    }

    /// The decoded value, or `shape`'s default for [`Decoded::Null`].
    pub fn or_default(self, shape: &Shape) -> Boxed {
        match self {
            Self::Value(v) => v,
            Self::Null => (shape.default)(),
        }
    }
}

pub struct Decoder<'d, 'a> {
    lexer: &'d mut Lexer<'a>,
    registry: &'d Registry,
    max_depth: usize,
    depth: usize,
}

impl<'d, 'a> Decoder<'d, 'a> {
    pub fn new(lexer: &'d mut Lexer<'a>, registry: &'d Registry, options: &DecodeOptions) -> Self {
        Self {
            lexer,
            registry,
            max_depth: options.max_depth,
            depth: 0,
        }
    }

    pub fn lexer(&mut self) -> &mut Lexer<'a> {
        self.lexer
    }

    pub fn registry(&self) -> &'d Registry {
        self.registry
    }

    /// Decode a `T`; `null` for a non-nullable `T` yields its default.
    pub fn decode<T: JsonShape>(&mut self) -> Result<T, JsonError> {
        let shape = T::shape();
        let value = self.decode_shape(shape)?.or_default(&shape);
        unbox::<T>(value)
    }

    pub fn decode_shape(&mut self, shape: Shape) -> Result<Decoded, JsonError> {
        let shape = self.registry.resolve(shape);
        let registry = self.registry;
        if let Some(extension) = registry.extension(shape.id) {
            trace!(shape = shape.name, "dispatching to extension decoder");
            return extension(self).map(Decoded::Value);
        }

        let token = self.lexer.peek_kind()?;
        let offset = self.lexer.offset();
        match (token, shape.kind) {
            (_, ShapeKind::Any) => {
                let value = tree::read_value(self.lexer, self.depth, self.max_depth)?;
                Ok(Decoded::Value(Box::new(value)))
            }
            (TokenKind::Null, _) => {
                self.lexer.next_token()?;
                rules::null(&shape)
            }
            (_, ShapeKind::Nullable(n)) => {
                let inner = self.decode_shape((n.inner)())?;
                rules::wrap_nullable(&n, inner)
            }
            (TokenKind::True | TokenKind::False, ShapeKind::Bool) => {
                self.lexer.next_token()?;
                Ok(Decoded::Value(Box::new(token == TokenKind::True)))
            }
            (TokenKind::Number, ShapeKind::Number(kind)) => {
                let text = self.lexer.next_token()?.span;
                rules::number(text.as_str(), kind, shape.name, Some(offset)).map(Decoded::Value)
            }
            (TokenKind::Number, ShapeKind::Enum(e)) => {
                let text = self.lexer.next_token()?.span;
                rules::ordinal(text.as_str(), &e, shape.name, Some(offset)).map(Decoded::Value)
            }
            (TokenKind::String, ShapeKind::String) => {
                let text = self.lexer.next_token()?.span;
                Ok(Decoded::Value(Box::new(text.into_owned())))
            }
            (TokenKind::String, ShapeKind::Char) => {
                let text = self.lexer.next_token()?.span;
                rules::character(text.as_str(), Some(offset)).map(Decoded::Value)
            }
            (TokenKind::LeftBracket, ShapeKind::Sequence(seq)) => self.decode_sequence(&seq),
            (TokenKind::LeftBrace, ShapeKind::Map(map)) => self.decode_map(&shape, &map),
            (TokenKind::LeftBrace, ShapeKind::Record(record)) => self.decode_record(&shape, &record),
            (
                TokenKind::Colon
                | TokenKind::Comma
                | TokenKind::RightBrace
                | TokenKind::RightBracket
                | TokenKind::EndOfInput,
                _,
            ) => Err(JsonError::syntax(offset, SyntaxReason::UnexpectedToken(token))),
            _ => Err(JsonError::TypeMismatch {
                offset: Some(offset),
                found: token.value_name(),
                shape: shape.name,
            }),
        }
    }

    /// Run `f` one nesting level deeper. The depth is restored whether or
    /// not `f` succeeds, so an extension that recovers from an error keeps
    /// an accurate count.
    fn nested<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R, JsonError>) -> Result<R, JsonError> {
        let depth = self.depth;
        self.depth = tree::enter(self.lexer, depth, self.max_depth)?;
        let result = f(self);
        self.depth = depth;
        result
    }

    fn decode_sequence(&mut self, seq: &SequenceShape) -> Result<Decoded, JsonError> {
        let offset = self.lexer.offset();
        let items = self.nested(|this| {
            this.lexer.expect(TokenKind::LeftBracket)?;
            let element = (seq.element)();
            let mut items = Vec::new();
            while this.lexer.peek_kind()? != TokenKind::RightBracket {
                items.push(this.decode_shape(element)?.or_default(&element));
                if !this.lexer.next_separator(TokenKind::RightBracket)? {
                    break;
                }
            }
            this.lexer.expect(TokenKind::RightBracket)?;
            Ok(items)
        })?;
        rules::sequence(seq, items, Some(offset)).map(Decoded::Value)
    }

    /// Walk an object without building values and return, per distinct
    /// key in order of first appearance, the offset of its last value,
    /// followed by the offset just past the closing brace. The generic
    /// tree keeps one entry per key in the same way, so decoding only
    /// these values gives the same result on both paths.
    fn scan_members(&mut self) -> Result<(IndexMap<SpanToken<'a>, usize>, usize), JsonError> {
        self.lexer.expect(TokenKind::LeftBrace)?;
        let mut members = IndexMap::new();
        while self.lexer.peek_kind()? != TokenKind::RightBrace {
            let key = self.lexer.expect(TokenKind::String)?;
            self.lexer.expect(TokenKind::Colon)?;
            self.lexer.peek_kind()?;
            members.insert(key, self.lexer.offset());
            self.skip_value()?;
            if !self.lexer.next_separator(TokenKind::RightBrace)? {
                break;
            }
        }
        self.lexer.expect(TokenKind::RightBrace)?;
        Ok((members, self.lexer.offset()))
    }

    fn decode_map(&mut self, shape: &Shape, map: &MapShape) -> Result<Decoded, JsonError> {
        let target = self.nested(|this| {
            let (members, end) = this.scan_members()?;
            let value_shape = (map.value)();
            let mut target = (shape.default)();
            for (key, at) in members {
                this.lexer.seek(at);
                let value = this.decode_shape(value_shape)?.or_default(&value_shape);
                (map.insert)(&mut *target, key.as_str(), value).map_err(|e| e.at(key.offset()))?;
            }
            this.lexer.seek(end);
            Ok(target)
        })?;
        Ok(Decoded::Value(target))
    }

    fn decode_record(&mut self, shape: &Shape, record: &RecordShape) -> Result<Decoded, JsonError> {
        let descriptor = shape_cache::record_descriptor(shape, record);
        let mut target = self.nested(|this| {
            let (members, end) = this.scan_members()?;
            let mut target = (shape.default)();
            for (key, at) in members {
                let Some(member) = descriptor.member(key.as_str()) else {
                    continue;
                };
                this.lexer.seek(at);
                if let Decoded::Value(value) = this.decode_shape(member.shape())? {
                    member.set(&mut *target, value)?;
                }
            }
            this.lexer.seek(end);
            Ok(target)
        })?;
        (record.finish)(&mut *target);
        Ok(Decoded::Value(target))
    }

    /// Consume one value of any kind without building it.
    pub fn skip_value(&mut self) -> Result<(), JsonError> {
        let token = self.lexer.peek_kind()?;
        match token {
            TokenKind::LeftBracket => self.nested(|this| {
                this.lexer.next_token()?;
                while this.lexer.peek_kind()? != TokenKind::RightBracket {
                    this.skip_value()?;
                    if !this.lexer.next_separator(TokenKind::RightBracket)? {
                        break;
                    }
                }
                this.lexer.expect(TokenKind::RightBracket)?;
                Ok(())
            }),
            TokenKind::LeftBrace => self.nested(|this| {
                this.lexer.next_token()?;
                while this.lexer.peek_kind()? != TokenKind::RightBrace {
                    this.lexer.expect(TokenKind::String)?;
                    this.lexer.expect(TokenKind::Colon)?;
                    this.skip_value()?;
                    if !this.lexer.next_separator(TokenKind::RightBrace)? {
                        break;
                    }
                }
                this.lexer.expect(TokenKind::RightBrace)?;
                Ok(())
            }),
            TokenKind::Null
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Number
            | TokenKind::String => {
                self.lexer.next_token()?;
                Ok(())
            }
            _ => Err(JsonError::syntax(
                self.lexer.offset(),
                SyntaxReason::UnexpectedToken(token),
            )),
        }
    }
}

/// How the root value of a text is decoded.
pub trait DecodeStrategy {
    fn decode_root(&self, lexer: &mut Lexer<'_>, shape: Shape) -> Result<Boxed, JsonError>;
}

/// Shape-driven decoding; `null` at the root yields the type's default.
pub struct Reflective<'r> {
    registry: &'r Registry,
    options: DecodeOptions,
}

impl<'r> Reflective<'r> {
    pub fn new(registry: &'r Registry, options: &DecodeOptions) -> Self {
        Self {
            registry,
            options: options.clone(),
        }
    }
}

impl DecodeStrategy for Reflective<'_> {
    fn decode_root(&self, lexer: &mut Lexer<'_>, shape: Shape) -> Result<Boxed, JsonError> {
        let mut decoder = Decoder::new(lexer, self.registry, &self.options);
        Ok(decoder.decode_shape(shape)?.or_default(&shape))
    }
}

/// Decode one whole text into `shape` and require that nothing but
/// whitespace follows the root value.
pub fn decode_text(
    text: &str,
    shape: Shape,
    registry: &Registry,
    options: &DecodeOptions,
) -> Result<Boxed, JsonError> {
    let mut lexer = Lexer::new(text);
    let value = match options.mode {
        DecodeMode::Reflective => Reflective::new(registry, options).decode_root(&mut lexer, shape)?,
        DecodeMode::Precompiled => Precompiled::new(registry).decode_root(&mut lexer, shape)?,
    };
    lexer.finish()?;
    Ok(value)
}
