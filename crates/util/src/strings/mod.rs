//! String utilities.
//!
//! Escaping for JSON output and unescaping of JSON string literal bodies.

mod escape;
mod unescape;

pub use escape::{escape, write_quoted};
pub use unescape::{unescape, UnescapeError, UnescapeErrorKind};
