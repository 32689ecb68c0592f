use std::borrow::Cow;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Escape special characters in a string for JSON serialization.
///
/// This function escapes:
/// - Control characters (0x00-0x1F), using the short form where JSON has one
/// - Double quote (0x22)
/// - Backslash (0x5C)
///
/// Forward slashes and non-ASCII text are left as they are. When nothing
/// needs escaping the input is returned borrowed.
///
/// # Examples
///
/// ```
/// use catjson_util::strings::escape;
///
/// assert_eq!(escape("hello"), "hello");
/// assert_eq!(escape("say \"hi\""), "say \\\"hi\\\"");
/// assert_eq!(escape("line1\nline2"), "line1\\nline2");
/// ```
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.bytes().any(needs_escape) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    push_escaped(&mut out, s);
    Cow::Owned(out)
}

/// Append `s` to `out` as a quoted JSON string.
///
/// ```
/// use catjson_util::strings::write_quoted;
///
/// let mut out = String::new();
/// write_quoted(&mut out, "tab\there");
/// assert_eq!(out, "\"tab\\there\"");
/// ```
pub fn write_quoted(out: &mut String, s: &str) {
    out.reserve(s.len() + 2);
    out.push('"');
    push_escaped(out, s);
    out.push('"');
}

#[inline]
fn needs_escape(b: u8) -> bool {
    b < 0x20 || b == b'"' || b == b'\\'
}

fn push_escaped(out: &mut String, s: &str) {
    let bytes = s.as_bytes();
    let mut last = 0;

    for (i, &b) in bytes.iter().enumerate() {
        if !needs_escape(b) {
            continue;
        }
        // Every byte that needs escaping is ASCII, so `i` is a char boundary.
        out.push_str(&s[last..i]);
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            0x08 => out.push_str("\\b"),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            0x0C => out.push_str("\\f"),
            b'\r' => out.push_str("\\r"),
            _ => {
                out.push_str("\\u00");
                out.push(HEX[(b >> 4) as usize] as char);
                out.push(HEX[(b & 0xF) as usize] as char);
            }
        }
        last = i + 1;
    }

    out.push_str(&s[last..]);
}
