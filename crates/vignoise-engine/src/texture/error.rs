use std::fmt;

/// Reasons a [`Texture2D`](super::Texture2D) cannot be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureError {
    /// Width or height is zero. A bound texture always has at least one texel.
    ZeroSize { width: u32, height: u32 },
    /// Texel buffer length does not equal `width * height`.
    TexelCountMismatch { expected: usize, actual: usize },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::ZeroSize { width, height } => {
                write!(f, "texture size {width}x{height} has no texels")
            }
            TextureError::TexelCountMismatch { expected, actual } => {
                write!(f, "expected {expected} texels, got {actual}")
            }
        }
    }
}

impl std::error::Error for TextureError {}
