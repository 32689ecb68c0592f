//! `Lexer`: on-demand JSON tokenizer over a borrowed text buffer.
//!
//! Tokens are classified from their first byte, so [`Lexer::peek_kind`] is
//! cheap and never consumes input. Numbers are returned as raw spans: the
//! decoder parses them against the target numeric kind. String literals
//! without escapes are returned as zero-copy spans.

use std::borrow::{Borrow, Cow};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;

use catjson_util::strings::{unescape, UnescapeError, UnescapeErrorKind};

use crate::error::{JsonError, LexicalReason, SyntaxReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Null,
    True,
    False,
    Number,
    String,
    Colon,
    Comma,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    EndOfInput,
}

impl TokenKind {
    /// Name of the JSON value this token starts, used in type mismatch errors.
    pub fn value_name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::True | Self::False => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::LeftBracket => "array",
            Self::LeftBrace => "object",
            Self::Colon => "`:`",
            Self::Comma => "`,`",
            Self::RightBrace => "`}`",
            Self::RightBracket => "`]`",
            Self::EndOfInput => "end of input",
        }
    }

    fn classify(b: u8) -> Option<Self> {
        Some(match b {
            b'{' => Self::LeftBrace,
            b'}' => Self::RightBrace,
            b'[' => Self::LeftBracket,
            b']' => Self::RightBracket,
            b':' => Self::Colon,
            b',' => Self::Comma,
            b'"' => Self::String,
            b'n' => Self::Null,
            b't' => Self::True,
            b'f' => Self::False,
            b'-' | b'0'..=b'9' => Self::Number,
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Null => "`null`",
            Self::True => "`true`",
            Self::False => "`false`",
            Self::Number => "number",
            Self::String => "string",
            Self::Colon => "`:`",
            Self::Comma => "`,`",
            Self::LeftBrace => "`{`",
            Self::RightBrace => "`}`",
            Self::LeftBracket => "`[`",
            Self::RightBracket => "`]`",
            Self::EndOfInput => "end of input",
        };
        f.write_str(s)
    }
}

/// Byte range into the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    pub fn range(self) -> Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Reference into the source text, usable as a lookup key.
///
/// Equality and hashing go through the referenced characters, so a token
/// can be compared against member names or used to probe a `str`-keyed map
/// without materializing a `String`. String literals that contained escapes
/// carry their decoded text; everything else borrows the source.
#[derive(Debug, Clone)]
pub struct SpanToken<'a> {
    src: &'a str,
    span: Span,
    decoded: Option<String>,
}

impl<'a> SpanToken<'a> {
    fn borrowed(src: &'a str, span: Span) -> Self {
        Self {
            src,
            span,
            decoded: None,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn offset(&self) -> usize {
        self.span.offset
    }

    /// The token text; the contents between the quotes for strings.
    pub fn as_str(&self) -> &str {
        match &self.decoded {
            Some(s) => s,
            None => &self.src[self.span.range()],
        }
    }

    /// `true` when no copy was made for this token.
    pub fn is_borrowed(&self) -> bool {
        self.decoded.is_none()
    }

    pub fn into_owned(self) -> String {
        match self.decoded {
            Some(s) => s,
            None => self.src[self.span.range()].to_string(),
        }
    }
}

impl PartialEq for SpanToken<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for SpanToken<'_> {}

impl PartialEq<str> for SpanToken<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for SpanToken<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Hash for SpanToken<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must agree with `str`'s hash for the `Borrow<str>` impl.
        self.as_str().hash(state)
    }
}

impl Borrow<str> for SpanToken<'_> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for SpanToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A consumed token together with its classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub span: SpanToken<'a>,
}

pub struct Lexer<'a> {
    src: &'a str,
    x: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, x: 0 }
    }

    pub fn reset(&mut self, src: &'a str) {
        self.src = src;
        self.x = 0;
    }

    pub fn source(&self) -> &'a str {
        self.src
    }

    /// Byte offset of the cursor.
    pub fn offset(&self) -> usize {
        self.x
    }

    /// Move the cursor to `offset`, which must be a token boundary
    /// previously reported by [`Lexer::offset`].
    pub fn seek(&mut self, offset: usize) {
        self.x = offset.min(self.src.len());
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.src.as_bytes();
        while self.x < bytes.len() {
            match bytes[self.x] {
                b' ' | b'\t' | b'\n' | b'\r' => self.x += 1,
                _ => break,
            }
        }
    }

    /// Kind of the next token, without consuming it.
    pub fn peek_kind(&mut self) -> Result<TokenKind, JsonError> {
        self.skip_whitespace();
        let Some(&b) = self.src.as_bytes().get(self.x) else {
            return Ok(TokenKind::EndOfInput);
        };
        TokenKind::classify(b).ok_or_else(|| self.unexpected_char())
    }

    /// Consume and classify the next token.
    pub fn next_token(&mut self) -> Result<Token<'a>, JsonError> {
        let kind = self.peek_kind()?;
        let start = self.x;
        let span = match kind {
            TokenKind::EndOfInput => SpanToken::borrowed(self.src, Span { offset: start, len: 0 }),
            TokenKind::Null => self.scan_literal(b"null")?,
            TokenKind::True => self.scan_literal(b"true")?,
            TokenKind::False => self.scan_literal(b"false")?,
            TokenKind::Number => self.scan_number()?,
            TokenKind::String => self.scan_string()?,
            _ => {
                self.x += 1;
                SpanToken::borrowed(self.src, Span { offset: start, len: 1 })
            }
        };
        Ok(Token { kind, span })
    }

    /// Consume the next token, failing unless it is of kind `expected`.
    pub fn expect(&mut self, expected: TokenKind) -> Result<SpanToken<'a>, JsonError> {
        let found = self.peek_kind()?;
        if found != expected {
            return Err(JsonError::syntax(
                self.x,
                SyntaxReason::Expected { expected, found },
            ));
        }
        Ok(self.next_token()?.span)
    }

    /// Require that only whitespace remains.
    pub fn finish(&mut self) -> Result<(), JsonError> {
        match self.peek_kind() {
            Ok(TokenKind::EndOfInput) => Ok(()),
            _ => Err(JsonError::syntax(self.x, SyntaxReason::TrailingCharacters)),
        }
    }

    /// Handle the separator after a container element. Consumes a comma and
    /// returns `true` when another element follows; returns `false` without
    /// consuming when the next token is not a comma. A comma directly before
    /// `close` is rejected.
    pub fn next_separator(&mut self, close: TokenKind) -> Result<bool, JsonError> {
        if self.peek_kind()? != TokenKind::Comma {
            return Ok(false);
        }
        self.next_token()?;
        if self.peek_kind()? == close {
            return Err(JsonError::syntax(self.x, SyntaxReason::TrailingComma(close)));
        }
        Ok(true)
    }

    fn unexpected_char(&self) -> JsonError {
        let ch = self.src[self.x..].chars().next().unwrap_or('\0');
        JsonError::lexical(self.x, LexicalReason::UnexpectedChar(ch))
    }

    fn scan_literal(&mut self, word: &'static [u8]) -> Result<SpanToken<'a>, JsonError> {
        let start = self.x;
        let end = start + word.len();
        if self.src.as_bytes().get(start..end) != Some(word) {
            return Err(JsonError::lexical(start, LexicalReason::InvalidLiteral));
        }
        self.x = end;
        Ok(SpanToken::borrowed(self.src, Span { offset: start, len: word.len() }))
    }

    fn scan_number(&mut self) -> Result<SpanToken<'a>, JsonError> {
        let data = self.src.as_bytes();
        let start = self.x;
        let invalid = || JsonError::lexical(start, LexicalReason::InvalidNumber);
        let mut x = start;

        if data.get(x) == Some(&b'-') {
            x += 1;
        }
        match data.get(x) {
            Some(b'0') => {
                x += 1;
                if data.get(x).is_some_and(u8::is_ascii_digit) {
                    return Err(invalid());
                }
            }
            Some(b'1'..=b'9') => x = skip_digits(data, x),
            _ => return Err(invalid()),
        }
        if data.get(x) == Some(&b'.') {
            let digits = x + 1;
            x = skip_digits(data, digits);
            if x == digits {
                return Err(invalid());
            }
        }
        if matches!(data.get(x), Some(b'e' | b'E')) {
            x += 1;
            if matches!(data.get(x), Some(b'+' | b'-')) {
                x += 1;
            }
            let digits = x;
            x = skip_digits(data, digits);
            if x == digits {
                return Err(invalid());
            }
        }

        self.x = x;
        Ok(SpanToken::borrowed(self.src, Span { offset: start, len: x - start }))
    }

    fn scan_string(&mut self) -> Result<SpanToken<'a>, JsonError> {
        let data = self.src.as_bytes();
        let quote = self.x;
        let body = quote + 1;
        let mut x = body;
        let mut has_escape = false;

        loop {
            match data.get(x) {
                None => {
                    return Err(JsonError::lexical(quote, LexicalReason::UnterminatedString));
                }
                Some(b'"') => break,
                Some(b'\\') => {
                    has_escape = true;
                    x += 2;
                }
                Some(&b) if b < 0x20 => {
                    return Err(JsonError::lexical(x, LexicalReason::ControlCharacter));
                }
                Some(_) => x += 1,
            }
        }

        self.x = x + 1;
        let span = Span { offset: body, len: x - body };
        if !has_escape {
            return Ok(SpanToken::borrowed(self.src, span));
        }
        let decoded = match unescape(&self.src[span.range()]) {
            Ok(Cow::Owned(s)) => Some(s),
            Ok(Cow::Borrowed(_)) => None,
            Err(e) => return Err(map_unescape_error(body, e)),
        };
        Ok(SpanToken {
            src: self.src,
            span,
            decoded,
        })
    }
}

fn skip_digits(data: &[u8], mut x: usize) -> usize {
    while data.get(x).is_some_and(u8::is_ascii_digit) {
        x += 1;
    }
    x
}

fn map_unescape_error(body: usize, e: UnescapeError) -> JsonError {
    let reason = match e.kind {
        UnescapeErrorKind::InvalidEscape(ch) => LexicalReason::InvalidEscape(ch),
        UnescapeErrorKind::InvalidUnicode => LexicalReason::InvalidUnicodeEscape,
        UnescapeErrorKind::LoneSurrogate => LexicalReason::LoneSurrogate,
        UnescapeErrorKind::UnexpectedEnd => LexicalReason::UnterminatedString,
    };
    JsonError::lexical(body + e.offset, reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn kinds(text: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(text);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            out.push(token.kind);
            if token.kind == TokenKind::EndOfInput {
                return out;
            }
        }
    }

    #[test]
    fn classifies_structural_tokens() {
        use TokenKind::*;
        assert_eq!(
            kinds(" {\"a\" : [1, true, false, null]}\n"),
            vec![
                LeftBrace, String, Colon, LeftBracket, Number, Comma, True, Comma, False, Comma,
                Null, RightBracket, RightBrace, EndOfInput
            ]
        );
    }

    #[test]
    fn into_owned_copies_decoded_text() {
        let mut lexer = Lexer::new(r#""plain" "esc\u0041""#);
        let plain = lexer.expect(TokenKind::String).unwrap();
        assert!(plain.is_borrowed());
        assert_eq!(plain.into_owned(), "plain");
        let escaped = lexer.expect(TokenKind::String).unwrap();
        assert!(!escaped.is_borrowed());
        assert_eq!(escaped.into_owned(), "escA");
    }

    #[test]
    fn seek_rewinds_to_a_token() {
        let mut lexer = Lexer::new(r#"{"a": [1, 2]}"#);
        lexer.expect(TokenKind::LeftBrace).unwrap();
        lexer.expect(TokenKind::String).unwrap();
        lexer.expect(TokenKind::Colon).unwrap();
        lexer.peek_kind().unwrap();
        let at = lexer.offset();
        assert_eq!(at, 6);
        lexer.expect(TokenKind::LeftBracket).unwrap();
        lexer.seek(at);
        assert_eq!(lexer.peek_kind().unwrap(), TokenKind::LeftBracket);
        lexer.seek(100);
        assert_eq!(lexer.peek_kind().unwrap(), TokenKind::EndOfInput);
    }

    #[test]
    fn separator_rejects_trailing_comma() {
        let mut lexer = Lexer::new("1, 2 ]");
        lexer.next_token().unwrap();
        assert!(lexer.next_separator(TokenKind::RightBracket).unwrap());
        lexer.next_token().unwrap();
        assert!(!lexer.next_separator(TokenKind::RightBracket).unwrap());
        assert_eq!(lexer.peek_kind().unwrap(), TokenKind::RightBracket);

        let mut lexer = Lexer::new("1 , }");
        lexer.next_token().unwrap();
        let err = lexer.next_separator(TokenKind::RightBrace).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.offset(), Some(4));
    }

    #[test]
    fn peek_does_not_consume() {
        let mut lexer = Lexer::new("  42 ,");
        assert_eq!(lexer.peek_kind().unwrap(), TokenKind::Number);
        assert_eq!(lexer.peek_kind().unwrap(), TokenKind::Number);
        let token = lexer.next_token().unwrap();
        assert_eq!(token.span, "42");
        assert_eq!(token.span.offset(), 2);
        assert_eq!(lexer.peek_kind().unwrap(), TokenKind::Comma);
    }

    #[test]
    fn numbers_follow_json_grammar() {
        for ok in ["0", "-0", "12", "-3.25", "1e10", "1E+2", "6.02e-23"] {
            let mut lexer = Lexer::new(ok);
            let token = lexer.expect(TokenKind::Number).unwrap();
            assert_eq!(token, ok);
            lexer.finish().unwrap();
        }
        for bad in ["-", "01", "1.", ".5", "1e", "1e+", "-a"] {
            let mut lexer = Lexer::new(bad);
            let err = lexer.next_token().unwrap_err();
            assert!(
                matches!(err, JsonError::Lexical { reason: LexicalReason::InvalidNumber, .. })
                    || matches!(err, JsonError::Lexical { reason: LexicalReason::UnexpectedChar(_), .. }),
                "{bad}: {err:?}"
            );
        }
    }

    #[test]
    fn plain_strings_are_zero_copy() {
        let mut lexer = Lexer::new(r#""hello""#);
        let token = lexer.expect(TokenKind::String).unwrap();
        assert!(token.is_borrowed());
        assert_eq!(token.span(), Span { offset: 1, len: 5 });
        assert_eq!(token, "hello");
    }

    #[test]
    fn escaped_strings_are_decoded() {
        let mut lexer = Lexer::new(r#""a\"bé\n""#);
        let token = lexer.expect(TokenKind::String).unwrap();
        assert!(!token.is_borrowed());
        assert_eq!(token.as_str(), "a\"bé\n");
        lexer.finish().unwrap();
    }

    #[test]
    fn span_tokens_hash_like_str() {
        use std::collections::HashMap;
        let mut map: HashMap<&str, u32> = HashMap::new();
        map.insert("name", 1);
        let mut lexer = Lexer::new(r#""name" "name""#);
        let plain = lexer.expect(TokenKind::String).unwrap();
        let again = lexer.expect(TokenKind::String).unwrap();
        assert_eq!(plain, again);
        assert_eq!(map.get(plain.as_str()), Some(&1));

        let mut set = std::collections::HashSet::new();
        set.insert(plain);
        assert!(set.contains("name"));
    }

    #[test]
    fn lexical_errors_carry_offsets() {
        let cases: [(&str, usize, LexicalReason); 6] = [
            ("  @", 2, LexicalReason::UnexpectedChar('@')),
            ("nul", 0, LexicalReason::InvalidLiteral),
            ("tru e", 0, LexicalReason::InvalidLiteral),
            (r#" "abc"#, 1, LexicalReason::UnterminatedString),
            ("\"a\u{1}\"", 2, LexicalReason::ControlCharacter),
            (r#""ab\x""#, 3, LexicalReason::InvalidEscape('x')),
        ];
        for (text, offset, reason) in cases {
            let err = Lexer::new(text).next_token().unwrap_err();
            assert_eq!(err, JsonError::Lexical { offset, reason }, "{text}");
            assert_eq!(err.kind(), ErrorKind::Lexical);
        }
    }

    #[test]
    fn expect_reports_syntax_error() {
        let mut lexer = Lexer::new("{ 1");
        lexer.expect(TokenKind::LeftBrace).unwrap();
        let err = lexer.expect(TokenKind::String).unwrap_err();
        assert_eq!(
            err,
            JsonError::Syntax {
                offset: 2,
                reason: SyntaxReason::Expected {
                    expected: TokenKind::String,
                    found: TokenKind::Number
                }
            }
        );
    }

    #[test]
    fn finish_rejects_trailing_characters() {
        let mut lexer = Lexer::new("1 2");
        lexer.next_token().unwrap();
        assert_eq!(
            lexer.finish().unwrap_err(),
            JsonError::Syntax {
                offset: 2,
                reason: SyntaxReason::TrailingCharacters
            }
        );
    }

    #[test]
    fn reset_rewinds_onto_new_text() {
        let mut lexer = Lexer::new("[");
        lexer.next_token().unwrap();
        lexer.reset("true");
        assert_eq!(lexer.offset(), 0);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::True);
    }
}
