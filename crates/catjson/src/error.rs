//! Error taxonomy for tokenizing, decoding, converting and encoding.

use thiserror::Error;

use crate::lexer::TokenKind;

/// Character-level failure inside a single token.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexicalReason {
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    #[error("invalid literal")]
    InvalidLiteral,
    #[error("invalid number")]
    InvalidNumber,
    #[error("unterminated string")]
    UnterminatedString,
    #[error("raw control character in string")]
    ControlCharacter,
    #[error("invalid escape sequence `\\{0}`")]
    InvalidEscape(char),
    #[error("invalid \\u escape")]
    InvalidUnicodeEscape,
    #[error("unpaired surrogate in \\u escape")]
    LoneSurrogate,
}

/// Structural failure between tokens.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxReason {
    #[error("expected {expected}, found {found}")]
    Expected { expected: TokenKind, found: TokenKind },
    #[error("trailing comma before {0}")]
    TrailingComma(TokenKind),
    #[error("unexpected {0} where a value was expected")]
    UnexpectedToken(TokenKind),
    #[error("trailing characters after the root value")]
    TrailingCharacters,
    #[error("nesting deeper than {0} levels")]
    DepthLimitExceeded(usize),
}

/// Coarse classification of a [`JsonError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed token at the character level.
    Lexical,
    /// Missing delimiter, trailing comma, unterminated container.
    Syntax,
    /// Token or value incompatible with the requested shape.
    TypeMismatch,
    /// Numeric literal outside the target kind's range.
    Overflow,
    /// Missing precompiled decoder, value/shape disagreement.
    Configuration,
    /// Map key that cannot be converted to the map's key kind.
    MemberResolution,
    /// Raised by a user-registered decoder.
    Custom,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum JsonError {
    #[error("lexical error at offset {offset}: {reason}")]
    Lexical { offset: usize, reason: LexicalReason },

    #[error("syntax error at offset {offset}: {reason}")]
    Syntax { offset: usize, reason: SyntaxReason },

    #[error("cannot decode {found} into `{shape}`")]
    TypeMismatch {
        offset: Option<usize>,
        found: &'static str,
        shape: &'static str,
    },

    #[error("`{text}` is not a valid `{shape}`")]
    InvalidNumber {
        offset: Option<usize>,
        text: String,
        shape: &'static str,
    },

    #[error("`{text}` is out of range for `{shape}`")]
    NumberOverflow {
        offset: Option<usize>,
        text: String,
        shape: &'static str,
    },

    #[error("no variant of `{shape}` has ordinal {ordinal}")]
    UnknownOrdinal {
        offset: Option<usize>,
        ordinal: i64,
        shape: &'static str,
    },

    #[error("expected exactly one character, found {len}")]
    NotAChar { offset: Option<usize>, len: usize },

    #[error("`{shape}` holds {expected} elements, found {found}")]
    LengthMismatch {
        offset: Option<usize>,
        expected: usize,
        found: usize,
        shape: &'static str,
    },

    #[error("map key `{key}` is not a valid {key_kind} for `{shape}`")]
    MapKey {
        offset: Option<usize>,
        key: String,
        key_kind: &'static str,
        shape: &'static str,
    },

    #[error("no precompiled decoder registered for `{shape}`")]
    MissingPrecompiled { shape: &'static str },

    #[error("value does not have the layout of shape `{shape}`")]
    ShapeMismatch { shape: &'static str },

    #[error("{0}")]
    Custom(String),
}

impl JsonError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Lexical { .. } => ErrorKind::Lexical,
            Self::Syntax { .. } => ErrorKind::Syntax,
            Self::TypeMismatch { .. }
            | Self::InvalidNumber { .. }
            | Self::UnknownOrdinal { .. }
            | Self::NotAChar { .. }
            | Self::LengthMismatch { .. } => ErrorKind::TypeMismatch,
            Self::NumberOverflow { .. } => ErrorKind::Overflow,
            Self::MissingPrecompiled { .. } | Self::ShapeMismatch { .. } => {
                ErrorKind::Configuration
            }
            Self::MapKey { .. } => ErrorKind::MemberResolution,
            Self::Custom(_) => ErrorKind::Custom,
        }
    }

    /// Byte offset into the source text, when the error came from text.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Lexical { offset, .. } | Self::Syntax { offset, .. } => Some(*offset),
            Self::TypeMismatch { offset, .. }
            | Self::InvalidNumber { offset, .. }
            | Self::NumberOverflow { offset, .. }
            | Self::UnknownOrdinal { offset, .. }
            | Self::NotAChar { offset, .. }
            | Self::LengthMismatch { offset, .. }
            | Self::MapKey { offset, .. } => *offset,
            Self::MissingPrecompiled { .. } | Self::ShapeMismatch { .. } | Self::Custom(_) => None,
        }
    }

    /// Attach `at` to an error that does not carry an offset yet.
    pub fn at(mut self, at: usize) -> Self {
        match &mut self {
            Self::TypeMismatch { offset, .. }
            | Self::InvalidNumber { offset, .. }
            | Self::NumberOverflow { offset, .. }
            | Self::UnknownOrdinal { offset, .. }
            | Self::NotAChar { offset, .. }
            | Self::LengthMismatch { offset, .. }
            | Self::MapKey { offset, .. } => {
                offset.get_or_insert(at);
            }
            _ => {}
        }
        self
    }

    pub fn custom(msg: impl std::fmt::Display) -> Self {
        Self::Custom(msg.to_string())
    }

    pub(crate) fn lexical(offset: usize, reason: LexicalReason) -> Self {
        Self::Lexical { offset, reason }
    }

    pub(crate) fn syntax(offset: usize, reason: SyntaxReason) -> Self {
        Self::Syntax { offset, reason }
    }
}
