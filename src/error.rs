//! Errors shared across layers
//!
//! Width checks on fixed-size byte values, malformed hex text, and the
//! constraint violations raised both by validating constructors and by the
//! `Decode` implementations of the same types.

use thiserror::Error;

/// A byte value whose length does not fit the type it was meant for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidthError {
    #[error("{actual}-byte value violated requirement of {exact} bytes")]
    WrongWidth { exact: usize, actual: usize },
}

/// Hex text that does not denote a byte sequence of the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexConvError {
    #[error("odd-length hex string `{0}`")]
    OddParity(String),

    /// Anything outside `[0-9a-fA-F]`
    #[error("non-hex character in `{0}`")]
    NonHex(String),

    #[error(transparent)]
    Width(#[from] WidthError),
}

/// A value that is well-formed on the wire but forbidden by its type.
///
/// Raised by fallible constructors (`NonZero::new`, `Name::new`,
/// `from_bits` on bitmap sets, `FromStr` on identifiers), and by the
/// corresponding `Decode` implementations, wrapped in a
/// [`ParseError`](crate::parse::error::ParseError).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("zero is not a valid value of {type_name}")]
    Zero { type_name: &'static str },

    #[error("name must not be empty")]
    EmptyName,

    #[error("name `{name}` contains forbidden character {ch:?}")]
    ForbiddenChar { name: String, ch: char },

    #[error("bitmask {bits:#x} contains flags unknown to {type_name}")]
    UnknownFlags { type_name: &'static str, bits: u64 },

    #[error("malformed {kind} `{input}`: {reason}")]
    Malformed {
        kind: &'static str,
        input: String,
        reason: &'static str,
    },
}

impl ConstraintError {
    pub(crate) fn malformed(kind: &'static str, input: &str, reason: &'static str) -> Self {
        Self::Malformed {
            kind,
            input: input.to_owned(),
            reason,
        }
    }
}
