use crate::error::{JsonError, SyntaxReason};
use crate::lexer::{Lexer, TokenKind};
use crate::value::{JsonNumber, JsonRecord, JsonValue};

/// Read one value starting at the lexer's cursor. `depth` is the nesting
/// level of the value's container.
pub(crate) fn read_value(
    lexer: &mut Lexer<'_>,
    depth: usize,
    max_depth: usize,
) -> Result<JsonValue, JsonError> {
    match lexer.peek_kind()? {
        TokenKind::Null => {
            lexer.next_token()?;
            Ok(JsonValue::Null)
        }
        TokenKind::True => {
            lexer.next_token()?;
            Ok(JsonValue::Bool(true))
        }
        TokenKind::False => {
            lexer.next_token()?;
            Ok(JsonValue::Bool(false))
        }
        TokenKind::Number => {
            let token = lexer.next_token()?;
            Ok(JsonValue::Number(JsonNumber::from_literal(token.span.as_str())))
        }
        TokenKind::String => Ok(JsonValue::String(lexer.next_token()?.span.into_owned())),
        TokenKind::LeftBracket => {
            let depth = enter(lexer, depth, max_depth)?;
            read_array(lexer, depth, max_depth)
        }
        TokenKind::LeftBrace => {
            let depth = enter(lexer, depth, max_depth)?;
            read_object(lexer, depth, max_depth)
        }
        other => Err(JsonError::syntax(
            lexer.offset(),
            SyntaxReason::UnexpectedToken(other),
        )),
    }
}

pub(crate) fn enter(lexer: &Lexer<'_>, depth: usize, max_depth: usize) -> Result<usize, JsonError> {
    if depth >= max_depth {
        return Err(JsonError::syntax(
            lexer.offset(),
            SyntaxReason::DepthLimitExceeded(max_depth),
        ));
    }
    Ok(depth + 1)
}

fn read_array(lexer: &mut Lexer<'_>, depth: usize, max_depth: usize) -> Result<JsonValue, JsonError> {
    lexer.expect(TokenKind::LeftBracket)?;
    let mut items = Vec::new();
    while lexer.peek_kind()? != TokenKind::RightBracket {
        items.push(read_value(lexer, depth, max_depth)?);
        if !lexer.next_separator(TokenKind::RightBracket)? {
            break;
        }
    }
    lexer.expect(TokenKind::RightBracket)?;
    Ok(JsonValue::Array(items))
}

fn read_object(lexer: &mut Lexer<'_>, depth: usize, max_depth: usize) -> Result<JsonValue, JsonError> {
    lexer.expect(TokenKind::LeftBrace)?;
    let mut record = JsonRecord::new();
    while lexer.peek_kind()? != TokenKind::RightBrace {
        let key = lexer.expect(TokenKind::String)?.into_owned();
        lexer.expect(TokenKind::Colon)?;
        let value = read_value(lexer, depth, max_depth)?;
        record.insert(key, value);
        if !lexer.next_separator(TokenKind::RightBrace)? {
            break;
        }
    }
    lexer.expect(TokenKind::RightBrace)?;
    Ok(JsonValue::Object(record))
}
