/// Convenience result type used across trackovl.
pub type TrackovlResult<T> = Result<T, TrackovlError>;

/// Top-level error taxonomy used by table, geometry and rendering APIs.
#[derive(thiserror::Error, Debug)]
pub enum TrackovlError {
    /// A required column is missing from the track table header.
    #[error("schema error: {0}")]
    Schema(String),

    /// A field could not be parsed into the expected type.
    #[error("parse error: {0}")]
    Parse(String),

    /// A requested time slice or track is absent.
    #[error("lookup error: {0}")]
    Lookup(String),

    /// A crop center lies outside the image, or the clamped region is empty.
    #[error("out of bounds error: {0}")]
    OutOfBounds(String),

    /// A fill color does not fit the color mode of the frame.
    #[error("color format error: {0}")]
    ColorFormat(String),

    /// Positions and labels are not paired one-to-one.
    #[error("arity error: {0}")]
    Arity(String),

    /// A file name does not encode a time key, or a required file is missing.
    #[error("naming convention error: {0}")]
    NamingConvention(String),

    /// Invalid configuration or option combination.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TrackovlError {
    /// Build a [`TrackovlError::Schema`] value.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Build a [`TrackovlError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`TrackovlError::Lookup`] value.
    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }

    /// Build a [`TrackovlError::OutOfBounds`] value.
    pub fn out_of_bounds(msg: impl Into<String>) -> Self {
        Self::OutOfBounds(msg.into())
    }

    /// Build a [`TrackovlError::ColorFormat`] value.
    pub fn color_format(msg: impl Into<String>) -> Self {
        Self::ColorFormat(msg.into())
    }

    /// Build a [`TrackovlError::Arity`] value.
    pub fn arity(msg: impl Into<String>) -> Self {
        Self::Arity(msg.into())
    }

    /// Build a [`TrackovlError::NamingConvention`] value.
    pub fn naming_convention(msg: impl Into<String>) -> Self {
        Self::NamingConvention(msg.into())
    }

    /// Build a [`TrackovlError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether a batch may record this error against one item and keep going.
    ///
    /// Malformed caller input (schema, parse, color, arity, configuration) fails the same way on
    /// every item, so it is never recoverable.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Lookup(_) | Self::NamingConvention(_) | Self::OutOfBounds(_) | Self::Other(_) => {
                true
            }
            Self::Schema(_)
            | Self::Parse(_)
            | Self::ColorFormat(_)
            | Self::Arity(_)
            | Self::Validation(_) => false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
