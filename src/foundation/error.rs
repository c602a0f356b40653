/// Convenience result type used across ldiview.
pub type LdiResult<T> = Result<T, LdiError>;

/// Ways the container's binary layout can be malformed.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatError {
    /// The trailing end marker is missing or wrong.
    #[error("not an LDI container (end marker {found:#06x}, expected {expected:#06x})")]
    NotContainerFormat {
        /// Marker found in the last two bytes (0 when the buffer is shorter than two bytes).
        found: u16,
        /// Marker the decoder expects.
        expected: u16,
    },

    /// A read ran past the bytes available to the directory.
    #[error("truncated container: needed {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        /// Absolute offset of the failed read.
        offset: usize,
        /// Bytes the read required.
        needed: usize,
        /// Bytes that were left.
        available: usize,
    },

    /// The declared field count did not consume the directory exactly.
    #[error("bad field count: {declared} fields declared, {trailing} bytes left in directory")]
    BadFieldCount {
        /// Field count read from the directory header.
        declared: u32,
        /// Unconsumed bytes between the last field and the trailer.
        trailing: usize,
    },
}

/// Top-level error taxonomy used by loading and synthesis APIs.
#[derive(thiserror::Error, Debug)]
pub enum LdiError {
    /// Malformed, truncated, or foreign container bytes.
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// Neither the current nor the legacy scene-description field is present.
    #[error("missing scene description")]
    MissingSceneDescription,

    /// The scene description is not valid UTF-8 JSON or violates the schema.
    #[error("invalid scene description: {0}")]
    InvalidSceneDescription(String),

    /// A view or layer names a blob that is absent from the field directory.
    #[error("unresolved blob reference: {path} -> blob {blob_id}")]
    UnresolvedBlobReference {
        /// JSON path of the reference.
        path: String,
        /// Referenced field type.
        blob_id: i64,
    },

    /// Pixel decoding or packing of a referenced blob failed.
    #[error("image decode error: {0}")]
    ImageDecode(String),

    /// A newer load replaced this one before it finished.
    #[error("load superseded by a newer request")]
    Superseded,

    /// Invalid configuration or caller-provided arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LdiError {
    /// Build a [`LdiError::InvalidSceneDescription`] value.
    pub fn invalid_scene(msg: impl Into<String>) -> Self {
        Self::InvalidSceneDescription(msg.into())
    }

    /// Build a [`LdiError::ImageDecode`] value.
    pub fn image_decode(msg: impl Into<String>) -> Self {
        Self::ImageDecode(msg.into())
    }

    /// Build a [`LdiError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// The container format failure, if this is one.
    pub fn format_error(&self) -> Option<FormatError> {
        match self {
            Self::Format(e) => Some(*e),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
