/// Convenience result type used across rendition.
pub type RenditionResult<T> = Result<T, RenditionError>;

/// Top-level error taxonomy returned by the rendition pipeline.
#[derive(thiserror::Error, Debug)]
pub enum RenditionError {
    /// Malformed operation-stack token.
    #[error("parse error: {0}")]
    Parse(String),

    /// Missing project, identifier or source file.
    #[error("not found: {identifier} ({detail})")]
    NotFound {
        /// Identifier the caller asked for.
        identifier: String,
        /// What exactly was missing.
        detail: String,
    },

    /// Operation type outside the supported set.
    #[error("unsupported operation: '{0}'")]
    UnsupportedOperation(String),

    /// Operation parameters that are well-formed but invalid for the image or the operation.
    #[error("operation parameter error: {0}")]
    OperationParameter(String),

    /// Source bytes could not be decoded into an image.
    #[error("decode error: {0}")]
    Decode(String),

    /// Output format not allowed, or the encoder failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Invalid service configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification of a [`RenditionError`], for mapping onto transport status codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`RenditionError::Parse`].
    Parse,
    /// See [`RenditionError::NotFound`].
    NotFound,
    /// See [`RenditionError::UnsupportedOperation`].
    UnsupportedOperation,
    /// See [`RenditionError::OperationParameter`].
    OperationParameter,
    /// See [`RenditionError::Decode`].
    Decode,
    /// See [`RenditionError::Encode`].
    Encode,
    /// See [`RenditionError::Config`].
    Config,
    /// See [`RenditionError::Other`].
    Other,
}

impl RenditionError {
    /// Build a [`RenditionError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`RenditionError::NotFound`] value.
    pub fn not_found(identifier: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::NotFound {
            identifier: identifier.into(),
            detail: detail.into(),
        }
    }

    /// Build a [`RenditionError::UnsupportedOperation`] value.
    pub fn unsupported(kind: impl Into<String>) -> Self {
        Self::UnsupportedOperation(kind.into())
    }

    /// Build a [`RenditionError::OperationParameter`] value.
    pub fn parameter(msg: impl Into<String>) -> Self {
        Self::OperationParameter(msg.into())
    }

    /// Build a [`RenditionError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`RenditionError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`RenditionError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Copy of this error, or `None` for [`RenditionError::Other`], whose source chain cannot be
    /// duplicated.
    pub fn try_clone(&self) -> Option<Self> {
        Some(match self {
            Self::Parse(m) => Self::Parse(m.clone()),
            Self::NotFound { identifier, detail } => Self::NotFound {
                identifier: identifier.clone(),
                detail: detail.clone(),
            },
            Self::UnsupportedOperation(m) => Self::UnsupportedOperation(m.clone()),
            Self::OperationParameter(m) => Self::OperationParameter(m.clone()),
            Self::Decode(m) => Self::Decode(m.clone()),
            Self::Encode(m) => Self::Encode(m.clone()),
            Self::Config(m) => Self::Config(m.clone()),
            Self::Other(_) => return None,
        })
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(_) => ErrorKind::Parse,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            Self::OperationParameter(_) => ErrorKind::OperationParameter,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Encode(_) => ErrorKind::Encode,
            Self::Config(_) => ErrorKind::Config,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
