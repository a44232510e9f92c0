use thiserror::Error;

use crate::{error::HexConvError, parse::error::ParseError};

/// Top-level failure of a whole-buffer decode.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The input was a hex string that could not be interpreted.
    #[error("hex input rejected: {0}")]
    Conv(#[from] HexConvError),
    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),
    /// The value parsed successfully but `residual` bytes were left over.
    #[error("{residual} bytes left over after decoding complete value")]
    NonEmpty { residual: usize },
}

impl DecodeError {
    /// Returns `true` if decoding met a discriminant absent from the
    /// discriminant table of some union type.
    #[must_use]
    pub fn is_unknown_variant(&self) -> bool {
        matches!(self, DecodeError::Parse(err) if err.is_unknown_variant())
    }

    /// Returns `true` if a decoded value was rejected by a type constraint.
    #[must_use]
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, DecodeError::Parse(err) if err.is_constraint_violation())
    }

    /// Returns `true` if the input ended before the value was complete.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        matches!(self, DecodeError::Parse(err) if err.is_truncated())
    }
}

impl From<std::convert::Infallible> for DecodeError {
    fn from(void: std::convert::Infallible) -> Self {
        match void {}
    }
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
mod test {
    fn dummy<T: Send + Sync>() {}

    #[test]
    fn decode_error_threadsafe() {
        dummy::<super::DecodeError>()
    }
}
