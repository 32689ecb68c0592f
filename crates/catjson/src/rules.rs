//! Per-kind value rules shared by text decoding, tree conversion and
//! encoding, so every path agrees on ranges, nulls and number text.

use std::any::Any;
use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::decoder::Decoded;
use crate::error::JsonError;
use crate::shape::{
    Boxed, EnumShape, NullableShape, NumKind, SequenceShape, Shape, ShapeKind,
};
use crate::value::JsonValue;

/// Outcome of a JSON `null` for `shape`.
pub(crate) fn null(shape: &Shape) -> Result<Decoded, JsonError> {
    match shape.kind {
        ShapeKind::Nullable(n) => Ok(Decoded::Value((n.wrap)(None)?)),
        ShapeKind::Any => Ok(Decoded::Value(Box::new(JsonValue::Null))),
        _ => Ok(Decoded::Null),
    }
}

pub(crate) fn wrap_nullable(n: &NullableShape, inner: Decoded) -> Result<Decoded, JsonError> {
    Ok(Decoded::Value((n.wrap)(inner.into_value())?))
}

fn is_negative_integer(text: &str) -> bool {
    text.strip_prefix('-')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

fn parse_int<T>(text: &str, shape: &'static str, offset: Option<usize>) -> Result<T, JsonError>
where
    T: FromStr<Err = ParseIntError> + Default,
{
    let overflow = || JsonError::NumberOverflow {
        offset,
        text: text.to_string(),
        shape,
    };
    match text.parse::<T>() {
        Ok(v) => Ok(v),
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Err(overflow())
        }
        // Unsigned kinds reject any sign; "-0" is still zero.
        Err(_) if is_negative_integer(text) => {
            if text[1..].bytes().all(|b| b == b'0') {
                Ok(T::default())
            } else {
                Err(overflow())
            }
        }
        Err(_) => Err(JsonError::InvalidNumber {
            offset,
            text: text.to_string(),
            shape,
        }),
    }
}

/// Float kinds, so an out-of-range literal is caught instead of becoming
/// an infinity.
trait Float: FromStr {
    fn is_infinite(&self) -> bool;
}

impl Float for f32 {
    fn is_infinite(&self) -> bool {
        f32::is_infinite(*self)
    }
}

impl Float for f64 {
    fn is_infinite(&self) -> bool {
        f64::is_infinite(*self)
    }
}

fn parse_float<T: Float>(text: &str, shape: &'static str, offset: Option<usize>) -> Result<T, JsonError> {
    match text.parse::<T>() {
        Ok(v) if v.is_infinite() => Err(JsonError::NumberOverflow {
            offset,
            text: text.to_string(),
            shape,
        }),
        Ok(v) => Ok(v),
        Err(_) => Err(JsonError::InvalidNumber {
            offset,
            text: text.to_string(),
            shape,
        }),
    }
}

/// Decimal places a `Decimal` can carry.
const DECIMAL_MAX_SCALE: i64 = 28;

fn parse_decimal(text: &str, shape: &'static str, offset: Option<usize>) -> Result<Decimal, JsonError> {
    let parsed = if text.bytes().any(|b| matches!(b, b'e' | b'E')) {
        Decimal::from_scientific(text).ok()
    } else {
        Decimal::from_str(text).ok()
    };
    // Lexically valid JSON numbers only fail on range or precision; excess
    // precision rounds, too large a magnitude overflows.
    parsed
        .or_else(|| round_decimal(text))
        .ok_or_else(|| JsonError::NumberOverflow {
            offset,
            text: text.to_string(),
            shape,
        })
}

/// Round a lexically valid number literal to the digits a `Decimal` can
/// hold, half to even. `None` when the integral part does not fit.
fn round_decimal(text: &str) -> Option<Decimal> {
    let (negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(at) => {
            let exp = &text[at + 1..];
            let saturated = if exp.starts_with('-') { -1_000_000 } else { 1_000_000 };
            (&text[..at], exp.parse::<i64>().unwrap_or(saturated))
        }
        None => (text, 0),
    };
    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let mut digits: String = int.chars().chain(frac.chars()).collect();
    let leading = digits.len() - digits.trim_start_matches('0').len();
    digits.drain(..leading);
    if digits.is_empty() {
        return Some(Decimal::ZERO);
    }

    let mut scale = frac.len() as i64 - exponent;
    if scale < 0 {
        // Whole number with trailing zeros; anything past 29 digits cannot fit.
        if digits.len() as i64 - scale > 29 {
            return None;
        }
        digits.extend(std::iter::repeat('0').take((-scale) as usize));
        scale = 0;
    }

    let len = digits.len() as i64;
    let mut cut = (scale - DECIMAL_MAX_SCALE).max(0);
    let excess = len - cut - DECIMAL_MAX_SCALE;
    if excess > 0 {
        cut += excess.min(scale - cut);
    }

    let (kept, dropped) = if cut >= len {
        ("", digits.as_str())
    } else {
        digits.split_at((len - cut) as usize)
    };
    let mut value: i128 = if kept.is_empty() { 0 } else { kept.parse().ok()? };
    // When `cut > len` every digit lies below the smallest place.
    if let (true, Some(first)) = (cut <= len, dropped.bytes().next()) {
        let rest_nonzero = dropped.bytes().skip(1).any(|b| b != b'0');
        if first > b'5' || (first == b'5' && (rest_nonzero || value % 2 == 1)) {
            value += 1;
        }
    }
    if negative {
        value = -value;
    }
    Decimal::try_from_i128_with_scale(value, (scale - cut) as u32).ok()
}

/// Bind a validated number literal to `kind`.
pub(crate) fn number(
    text: &str,
    kind: NumKind,
    shape: &'static str,
    offset: Option<usize>,
) -> Result<Boxed, JsonError> {
    Ok(match kind {
        NumKind::I8 => Box::new(parse_int::<i8>(text, shape, offset)?),
        NumKind::I16 => Box::new(parse_int::<i16>(text, shape, offset)?),
        NumKind::I32 => Box::new(parse_int::<i32>(text, shape, offset)?),
        NumKind::I64 => Box::new(parse_int::<i64>(text, shape, offset)?),
        NumKind::U8 => Box::new(parse_int::<u8>(text, shape, offset)?),
        NumKind::U16 => Box::new(parse_int::<u16>(text, shape, offset)?),
        NumKind::U32 => Box::new(parse_int::<u32>(text, shape, offset)?),
        NumKind::U64 => Box::new(parse_int::<u64>(text, shape, offset)?),
        NumKind::F32 => Box::new(parse_float::<f32>(text, shape, offset)?),
        NumKind::F64 => Box::new(parse_float::<f64>(text, shape, offset)?),
        NumKind::Decimal => Box::new(parse_decimal(text, shape, offset)?),
    })
}

pub(crate) fn ordinal(
    text: &str,
    e: &EnumShape,
    shape: &'static str,
    offset: Option<usize>,
) -> Result<Boxed, JsonError> {
    let ordinal = parse_int::<i64>(text, shape, offset)?;
    (e.from_ordinal)(ordinal).ok_or(JsonError::UnknownOrdinal {
        offset,
        ordinal,
        shape,
    })
}

pub(crate) fn character(text: &str, offset: Option<usize>) -> Result<Boxed, JsonError> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Box::new(c)),
        _ => Err(JsonError::NotAChar {
            offset,
            len: text.chars().count(),
        }),
    }
}

pub(crate) fn sequence(
    seq: &SequenceShape,
    items: Vec<Boxed>,
    offset: Option<usize>,
) -> Result<Boxed, JsonError> {
    let built = (seq.build)(items);
    match offset {
        Some(at) => built.map_err(|e| e.at(at)),
        None => built,
    }
}

/// Shortest text that parses back to `f`. Integral values below 1e15 print
/// without a fraction; NaN prints as `null` and infinities clamp to
/// ±1e308.
pub(crate) fn format_f64(f: f64) -> String {
    if f.is_nan() {
        "null".to_string()
    } else if f.is_infinite() {
        let clamped = if f > 0.0 { "1e308" } else { "-1e308" };
        clamped.to_string()
    } else if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{f}")
    }
}

pub(crate) fn format_f32(f: f32) -> String {
    if !f.is_finite() || (f.fract() == 0.0 && f.abs() < 1e15) {
        format_f64(f64::from(f))
    } else {
        format!("{f}")
    }
}

/// Text of a numeric value of `kind`; `None` when `value` is not of that
/// kind.
pub(crate) fn format_number(kind: NumKind, value: &dyn Any) -> Option<String> {
    fn show<T: ToString + 'static>(value: &dyn Any) -> Option<String> {
        value.downcast_ref::<T>().map(ToString::to_string)
    }
    match kind {
        NumKind::I8 => show::<i8>(value),
        NumKind::I16 => show::<i16>(value),
        NumKind::I32 => show::<i32>(value),
        NumKind::I64 => show::<i64>(value),
        NumKind::U8 => show::<u8>(value),
        NumKind::U16 => show::<u16>(value),
        NumKind::U32 => show::<u32>(value),
        NumKind::U64 => show::<u64>(value),
        NumKind::F32 => value.downcast_ref::<f32>().map(|f| format_f32(*f)),
        NumKind::F64 => value.downcast_ref::<f64>().map(|f| format_f64(*f)),
        NumKind::Decimal => show::<Decimal>(value),
    }
}
