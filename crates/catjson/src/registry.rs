//! Registration of user decoders and shape adapters.
//!
//! A [`Registry`] is passed by reference to decode and convert calls; the
//! default is [`Registry::empty`]. Registering happens before sharing, so
//! lookups need no locking.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::trace;

use crate::decoder::Decoder;
use crate::error::JsonError;
use crate::lexer::Lexer;
use crate::shape::{Boxed, JsonShape, Shape};

/// Decoder that takes over one type inside the reflective path.
pub type ExtensionFn = Arc<dyn Fn(&mut Decoder<'_, '_>) -> Result<Boxed, JsonError> + Send + Sync>;

/// Whole-value decoder for a root type, reading straight from the lexer.
pub type PrecompiledFn = Arc<dyn Fn(&mut Lexer<'_>) -> Result<Boxed, JsonError> + Send + Sync>;

/// Substitutes the shape used for a type. The substitute must describe the
/// same Rust type.
pub trait ShapeAdapter: Send + Sync {
    fn adapt(&self, shape: &Shape) -> Option<Shape>;
}

#[derive(Clone, Default)]
pub struct Registry {
    extensions: HashMap<TypeId, ExtensionFn>,
    precompiled: HashMap<TypeId, PrecompiledFn>,
    adapters: Vec<Arc<dyn ShapeAdapter>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared registry with nothing registered.
    pub fn empty() -> &'static Registry {
        static EMPTY: OnceLock<Registry> = OnceLock::new();
        EMPTY.get_or_init(Registry::new)
    }

    /// Decode every occurrence of `T` with `decode` instead of its shape.
    /// Replaces any earlier extension for `T`.
    pub fn register_extension<T, F>(&mut self, decode: F) -> &mut Self
    where
        T: JsonShape,
        F: Fn(&mut Decoder<'_, '_>) -> Result<T, JsonError> + Send + Sync + 'static,
    {
        trace!(shape = type_name::<T>(), "registered extension decoder");
        self.extensions.insert(
            TypeId::of::<T>(),
            Arc::new(move |decoder: &mut Decoder<'_, '_>| {
                decode(decoder).map(|v| Box::new(v) as Boxed)
            }),
        );
        self
    }

    /// Untyped form of [`register_extension`](Self::register_extension).
    pub fn register_extension_shape(&mut self, shape: &Shape, decode: ExtensionFn) -> &mut Self {
        trace!(shape = shape.name, "registered extension decoder");
        self.extensions.insert(shape.id, decode);
        self
    }

    /// Decoder used for root type `T` in precompiled mode.
    pub fn register_precompiled<T, F>(&mut self, decode: F) -> &mut Self
    where
        T: JsonShape,
        F: Fn(&mut Lexer<'_>) -> Result<T, JsonError> + Send + Sync + 'static,
    {
        trace!(shape = type_name::<T>(), "registered precompiled decoder");
        self.precompiled.insert(
            TypeId::of::<T>(),
            Arc::new(move |lexer: &mut Lexer<'_>| decode(lexer).map(|v| Box::new(v) as Boxed)),
        );
        self
    }

    pub fn add_adapter(&mut self, adapter: impl ShapeAdapter + 'static) -> &mut Self {
        self.adapters.push(Arc::new(adapter));
        self
    }

    pub fn extension(&self, id: TypeId) -> Option<&ExtensionFn> {
        self.extensions.get(&id)
    }

    pub fn precompiled(&self, id: TypeId) -> Option<&PrecompiledFn> {
        self.precompiled.get(&id)
    }

    /// First adapter substitution for `shape`, or `shape` itself. The
    /// substitute always keeps the original type id.
    pub fn resolve(&self, shape: Shape) -> Shape {
        self.adapters
            .iter()
            .find_map(|adapter| adapter.adapt(&shape))
            .map(|adapted| Shape {
                id: shape.id,
                ..adapted
            })
            .unwrap_or(shape)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("extensions", &self.extensions.len())
            .field("precompiled", &self.precompiled.len())
            .field("adapters", &self.adapters.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Renamer;

    impl ShapeAdapter for Renamer {
        fn adapt(&self, shape: &Shape) -> Option<Shape> {
            shape.is::<u8>().then(|| Shape {
                name: "byte",
                ..*shape
            })
        }
    }

    #[test]
    fn lookups_by_type() {
        let mut registry = Registry::new();
        registry
            .register_extension::<u8, _>(|_| Ok(7))
            .register_precompiled::<String, _>(|lexer| {
                lexer.next_token().map(|t| t.span.into_owned())
            });
        assert!(registry.extension(TypeId::of::<u8>()).is_some());
        assert!(registry.extension(TypeId::of::<u16>()).is_none());
        assert!(registry.precompiled(TypeId::of::<String>()).is_some());
        assert!(Registry::empty().extension(TypeId::of::<u8>()).is_none());
    }

    #[test]
    fn adapters_substitute_shapes() {
        let mut registry = Registry::new();
        registry.add_adapter(Renamer);
        assert_eq!(registry.resolve(Shape::of::<u8>()).name, "byte");
        assert_eq!(registry.resolve(Shape::of::<i8>()).name, "i8");
    }
}
