//! Failures of low-level parsing
//!
//! [`ParseError`] is what every [`Parser`](crate::parse::Parser) method and
//! every `Decode` implementation reports. Its cases are grouped by where the
//! fault lies:
//!
//!   * [`WindowError`]: the input ended early, or nesting went too deep
//!   * [`TokenError`]: a byte had no valid interpretation (booleans, tags, compact modes)
//!   * [`ExternalError`]: the raw value was read but violates a type-level constraint
//!   * [`InternalError`]: parser bugs that should never surface

use std::array::TryFromSliceError;
use std::convert::Infallible;
use std::string::FromUtf8Error;

use thiserror::Error;

use crate::error::ConstraintError;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Window(#[from] WindowError),
    #[error(transparent)]
    Internal(#[from] InternalError),
    /// The raw value was read but cannot be converted into the target type.
    #[error(transparent)]
    External(#[from] ExternalError),
    /// Unknown discriminants, bytes that are not booleans, malformed compact
    /// integers.
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl ParseError {
    /// Wraps an arbitrary error raised while converting a raw value.
    ///
    /// Prefer the dedicated `From` conversions for errors of this module.
    pub fn reify<E: 'static + std::error::Error + Send + Sync>(err: E) -> Self {
        Self::External(ExternalError::GenericError(Box::new(err)))
    }

    /// Returns `true` if this error was caused by a discriminant that is
    /// absent from the discriminant table of the type being decoded.
    #[must_use]
    pub fn is_unknown_variant(&self) -> bool {
        matches!(self, ParseError::Token(TokenError::InvalidTag(_)))
    }

    #[must_use]
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, ParseError::External(ExternalError::Constraint(_)))
    }

    /// Returns `true` if the input ended before the value was complete.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        matches!(
            self,
            ParseError::Window(WindowError::ConsumeWouldExceedLimit { .. })
        )
    }
}

impl From<Infallible> for ParseError {
    fn from(void: Infallible) -> Self {
        match void {}
    }
}

impl From<FromUtf8Error> for ParseError {
    fn from(err: FromUtf8Error) -> Self {
        Self::External(ExternalError::InvalidUtf8(err))
    }
}

impl From<ConstraintError> for ParseError {
    fn from(err: ConstraintError) -> Self {
        Self::External(ExternalError::Constraint(err))
    }
}

impl From<TagError> for ParseError {
    fn from(err: TagError) -> Self {
        Self::Token(TokenError::InvalidTag(err))
    }
}

pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Errors related to the extent of the buffer and the nesting depth of
/// recursive values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WindowError {
    /// Consuming `requested` bytes at `offset` would run past `limit`.
    #[error("cannot consume {requested} bytes at offset {offset} (buffer ends at {limit})")]
    ConsumeWouldExceedLimit {
        offset: usize,
        requested: usize,
        limit: usize,
    },
    /// See [`DecodeLimits`](crate::parse::DecodeLimits).
    #[error("value nests more deeply than the limit of {limit} levels")]
    DepthLimitExceeded { limit: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("invalid boolean encoding {0:#04x}")]
    InvalidBoolean(u8),
    #[error(transparent)]
    InvalidTag(TagError),
    /// Compact integer used a wider mode than its value requires
    #[error("compact integer {value} is not in canonical form")]
    NonCanonicalCompact { value: u128 },
    #[error("compact integer out of range for {for_type}")]
    CompactOutOfRange { for_type: &'static str },
}

/// 'Impossible' cases that signify a bug in a `Parser` implementation.
#[derive(Debug, Clone, Copy, Error)]
pub enum InternalError {
    #[error("failed to coerce byte-slice into fixed-length array")]
    SliceCoerceFailure(#[from] TryFromSliceError),
}

/// Converts a borrowed byte-slice into an owned byte-array.
///
/// Callers slice exactly `N` bytes, so failure is an [`InternalError`].
pub(crate) fn coerce_slice<const N: usize>(bytes: &[u8]) -> ParseResult<[u8; N]> {
    <[u8; N]>::try_from(bytes).map_err(|err| InternalError::from(err).into())
}

/// Raw values that were read in full but are not legal values of their type.
#[derive(Debug, Error)]
pub enum ExternalError {
    #[error("string is not valid UTF-8: {0}")]
    InvalidUtf8(FromUtf8Error),
    /// Non-zero wrappers, validated names, closed flag alphabets
    #[error("constraint violation: {0}")]
    Constraint(ConstraintError),
    #[error("{0}")]
    GenericError(Box<dyn std::error::Error + Send + Sync>),
}

/// A discriminant absent from the discriminant table of the union type being
/// decoded.
///
/// Usually a sign of a protocol-version mismatch between peers, rather than
/// of corrupted data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "unexpected discriminant {actual:#04x} for {for_type} ({})",
    describe_expected(.expected)
)]
pub struct TagError {
    actual: u8,
    for_type: &'static str,
    expected: Vec<u8>,
}

fn describe_expected(expected: &[u8]) -> String {
    if expected.is_empty() {
        String::from("type has no constructible variants")
    } else {
        format!("expected one of {expected:?}")
    }
}

impl TagError {
    pub fn new(actual: u8, for_type: &'static str, expected: &[u8]) -> Self {
        Self {
            actual,
            for_type,
            expected: expected.to_vec(),
        }
    }

    /// Like [`TagError::new`], naming the type through [`std::any::type_name`].
    pub fn with_type<T: ?Sized>(actual: u8, expected: &[u8]) -> Self {
        Self::new(actual, std::any::type_name::<T>(), expected)
    }

    #[must_use]
    pub fn actual(&self) -> u8 {
        self.actual
    }

    #[must_use]
    pub fn for_type(&self) -> &'static str {
        self.for_type
    }

    /// All tags that would have been accepted (empty for uninhabited types).
    #[must_use]
    pub fn expected(&self) -> &[u8] {
        &self.expected
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tag_errors_name_the_alternatives() {
        let err = ParseError::from(TagError::new(9, "Level", &[0, 1, 2]));
        assert!(err.is_unknown_variant());
        assert_eq!(
            err.to_string(),
            "unexpected discriminant 0x09 for Level (expected one of [0, 1, 2])"
        );
        let void = TagError::new(0, "Never", &[]);
        assert!(void.to_string().ends_with("(type has no constructible variants)"));
    }

    #[test]
    fn truncation_is_distinguished() {
        let err = ParseError::from(WindowError::ConsumeWouldExceedLimit {
            offset: 3,
            requested: 4,
            limit: 5,
        });
        assert!(err.is_truncated());
        assert!(!err.is_constraint_violation());
        assert!(!ParseError::from(WindowError::DepthLimitExceeded { limit: 8 }).is_truncated());
    }
}
