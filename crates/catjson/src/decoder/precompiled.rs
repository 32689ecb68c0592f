use tracing::debug;

use super::DecodeStrategy;
use crate::error::JsonError;
use crate::lexer::Lexer;
use crate::registry::Registry;
use crate::shape::{Boxed, Shape, ShapeKind};

/// Dispatch to the decoder registered for the root type. A record root
/// gets its decode-finished hook run once after the decoder returns.
pub struct Precompiled<'r> {
    registry: &'r Registry,
}

impl<'r> Precompiled<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }
}

impl DecodeStrategy for Precompiled<'_> {
    fn decode_root(&self, lexer: &mut Lexer<'_>, shape: Shape) -> Result<Boxed, JsonError> {
        let decode = self
            .registry
            .precompiled(shape.id)
            .ok_or(JsonError::MissingPrecompiled { shape: shape.name })?;
        debug!(shape = shape.name, "dispatching to precompiled decoder");
        let mut value = decode(lexer)?;
        if let ShapeKind::Record(record) = shape.kind {
            (record.finish)(&mut *value);
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::lexer::TokenKind;
    use crate::shape::{unbox, JsonShape};

    #[test]
    fn missing_decoder_is_a_configuration_error() {
        let mut lexer = Lexer::new("1");
        let err = Precompiled::new(Registry::empty())
            .decode_root(&mut lexer, u32::shape())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn registered_decoder_reads_from_the_lexer() {
        let mut registry = Registry::new();
        registry.register_precompiled::<u32, _>(|lexer| {
            let text = lexer.expect(TokenKind::String)?;
            text.as_str().parse::<u32>().map_err(JsonError::custom)
        });
        let mut lexer = Lexer::new(r#""41""#);
        let value = Precompiled::new(&registry)
            .decode_root(&mut lexer, u32::shape())
            .unwrap();
        assert_eq!(unbox::<u32>(value).unwrap(), 41);
    }
}
