//! Decode and encode options.

/// Which decoding path a typed decode takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Shape-driven decoding through cached record descriptors.
    #[default]
    Reflective,
    /// Dispatch to a decoder registered for the root type; error when none.
    Precompiled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    pub mode: DecodeMode,
    /// Maximum container nesting before a syntax error is raised.
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            mode: DecodeMode::Reflective,
            max_depth: 128,
        }
    }
}

impl DecodeOptions {
    pub fn precompiled() -> Self {
        Self {
            mode: DecodeMode::Precompiled,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Emit newlines and indentation between container elements.
    pub indent: bool,
    pub indent_width: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            indent: false,
            indent_width: 2,
        }
    }
}

impl EncodeOptions {
    pub fn pretty() -> Self {
        Self {
            indent: true,
            ..Default::default()
        }
    }
}
