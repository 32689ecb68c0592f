//! catjson-util - string helpers for catjson.
//!
//! The tokenizer uses [`strings::unescape`] to decode string literals that
//! contain escape sequences, the encoder uses [`strings::write_quoted`] to
//! emit them again.

pub mod strings;

// Re-exports for convenience
pub use strings::{escape, unescape, write_quoted, UnescapeError, UnescapeErrorKind};
