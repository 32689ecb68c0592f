use std::borrow::Cow;

use thiserror::Error;

/// Why a string literal body could not be unescaped.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnescapeErrorKind {
    #[error("invalid escape sequence `\\{0}`")]
    InvalidEscape(char),
    #[error("invalid \\u escape")]
    InvalidUnicode,
    #[error("unpaired surrogate in \\u escape")]
    LoneSurrogate,
    #[error("escape sequence cut off by end of string")]
    UnexpectedEnd,
}

/// Unescape failure; `offset` is relative to the start of the body.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{kind} at offset {offset}")]
pub struct UnescapeError {
    pub offset: usize,
    pub kind: UnescapeErrorKind,
}

/// Decode the body of a JSON string literal (the text between the quotes).
///
/// Handles `\" \\ \/ \b \f \n \r \t` and `\uXXXX`, combining UTF-16
/// surrogate pairs. Returns the input borrowed when it holds no backslash.
///
/// ```
/// use catjson_util::strings::unescape;
///
/// assert_eq!(unescape("plain").unwrap(), "plain");
/// assert_eq!(unescape(r"a\nb").unwrap(), "a\nb");
/// assert_eq!(unescape(r"\ud83d\ude00").unwrap(), "😀");
/// ```
pub fn unescape(body: &str) -> Result<Cow<'_, str>, UnescapeError> {
    let Some(first) = body.find('\\') else {
        return Ok(Cow::Borrowed(body));
    };

    let bytes = body.as_bytes();
    let mut out = String::with_capacity(body.len());
    out.push_str(&body[..first]);
    let mut x = first;
    let mut run = first;

    while x < bytes.len() {
        if bytes[x] != b'\\' {
            x += 1;
            continue;
        }
        out.push_str(&body[run..x]);
        let at = x;
        let Some(&esc) = bytes.get(x + 1) else {
            return Err(err(at, UnescapeErrorKind::UnexpectedEnd));
        };
        x += 2;
        match esc {
            b'"' => out.push('"'),
            b'\\' => out.push('\\'),
            b'/' => out.push('/'),
            b'b' => out.push('\u{0008}'),
            b'f' => out.push('\u{000C}'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'u' => {
                let hi = read_hex4(bytes, x).ok_or_else(|| hex_err(bytes, at, x))?;
                x += 4;
                let code = if (0xD800..0xDC00).contains(&hi) {
                    // High surrogate, the low half must follow immediately.
                    if bytes.get(x) != Some(&b'\\') || bytes.get(x + 1) != Some(&b'u') {
                        return Err(err(at, UnescapeErrorKind::LoneSurrogate));
                    }
                    let lo = read_hex4(bytes, x + 2).ok_or_else(|| hex_err(bytes, x, x + 2))?;
                    if !(0xDC00..0xE000).contains(&lo) {
                        return Err(err(at, UnescapeErrorKind::LoneSurrogate));
                    }
                    x += 6;
                    0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00)
                } else if (0xDC00..0xE000).contains(&hi) {
                    return Err(err(at, UnescapeErrorKind::LoneSurrogate));
                } else {
                    hi
                };
                match char::from_u32(code) {
                    Some(ch) => out.push(ch),
                    None => return Err(err(at, UnescapeErrorKind::InvalidUnicode)),
                }
            }
            other => {
                let ch = body[at + 1..].chars().next().unwrap_or(other as char);
                return Err(err(at, UnescapeErrorKind::InvalidEscape(ch)));
            }
        }
        run = x;
    }

    out.push_str(&body[run..]);
    Ok(Cow::Owned(out))
}

fn err(offset: usize, kind: UnescapeErrorKind) -> UnescapeError {
    UnescapeError { offset, kind }
}

fn hex_err(bytes: &[u8], at: usize, digits: usize) -> UnescapeError {
    if digits + 4 > bytes.len() {
        err(at, UnescapeErrorKind::UnexpectedEnd)
    } else {
        err(at, UnescapeErrorKind::InvalidUnicode)
    }
}

fn read_hex4(bytes: &[u8], x: usize) -> Option<u32> {
    let digits = bytes.get(x..x + 4)?;
    let mut code = 0u32;
    for &d in digits {
        code = (code << 4) | (d as char).to_digit(16)?;
    }
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrowed_without_backslash() {
        assert!(matches!(unescape("abc"), Ok(Cow::Borrowed("abc"))));
    }

    #[test]
    fn short_escapes() {
        assert_eq!(
            unescape(r#"\"\\\/\b\f\n\r\t"#).unwrap(),
            "\"\\/\u{8}\u{c}\n\r\t"
        );
    }

    #[test]
    fn unicode_escapes() {
        assert_eq!(unescape(r"caf\u00e9").unwrap(), "café");
        assert_eq!(unescape(r"x\u4e2Dy").unwrap(), "x中y");
        assert_eq!(unescape(r"\ud83d\ude00!").unwrap(), "😀!");
    }

    #[test]
    fn invalid_escape_reports_offset() {
        let e = unescape(r"ab\q").unwrap_err();
        assert_eq!(e.offset, 2);
        assert_eq!(e.kind, UnescapeErrorKind::InvalidEscape('q'));
    }

    #[test]
    fn lone_surrogates_are_rejected() {
        assert_eq!(
            unescape(r"\ud800").unwrap_err().kind,
            UnescapeErrorKind::LoneSurrogate
        );
        assert_eq!(
            unescape(r"\udc00").unwrap_err().kind,
            UnescapeErrorKind::LoneSurrogate
        );
        assert_eq!(
            unescape(r"\ud800A").unwrap_err().kind,
            UnescapeErrorKind::LoneSurrogate
        );
    }

    #[test]
    fn truncated_escapes() {
        assert_eq!(unescape("a\\").unwrap_err().kind, UnescapeErrorKind::UnexpectedEnd);
        assert_eq!(unescape(r"\u12").unwrap_err().kind, UnescapeErrorKind::UnexpectedEnd);
        assert_eq!(unescape(r"\u12zz").unwrap_err().kind, UnescapeErrorKind::InvalidUnicode);
    }
}
