//! Scalar ledger values: time, hashes and decimal numbers

use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::str::FromStr;

use num_bigint::BigUint;

use crate::compact::Compact;
use crate::conv::{target::Target, Decode, Encode};
use crate::error::{ConstraintError, HexConvError};
use crate::fixed::FixedBytes;
use crate::nonzero::IsZero;
use crate::parse::{ParseResult, Parser};

macro_rules! millis_newtype {
    ( $( #[$meta:meta] )* $name:ident ) => {
        $( #[$meta] )*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[repr(transparent)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub const fn from_millis(ms: u64) -> Self {
                Self(ms)
            }

            #[must_use]
            pub const fn as_millis(&self) -> u64 {
                self.0
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($name), "({}ms)"), self.0)
            }
        }

        impl Encode for $name {
            #[inline]
            fn write_to<U: Target>(&self, buf: &mut U) -> usize {
                self.0.write_to(buf)
            }
        }

        impl Decode for $name {
            #[inline]
            fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
                p.take_u64().map(Self)
            }
        }

        #[cfg(feature = "serde_impls")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_u64(self.0)
            }
        }
    };
}

millis_newtype! {
    /// Point in time, in milliseconds since the Unix epoch
    Timestamp
}

millis_newtype! {
    /// Span of time, in milliseconds
    Duration
}

impl Timestamp {
    /// Current wall-clock time; saturates at zero for clocks set before 1970.
    #[must_use]
    pub fn now() -> Self {
        let since_epoch = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();
        Self(u64::try_from(since_epoch.as_millis()).unwrap_or(u64::MAX))
    }

    #[must_use]
    pub fn checked_add(self, span: Duration) -> Option<Self> {
        self.0.checked_add(span.0).map(Self)
    }
}

impl Duration {
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }
}

impl IsZero for Duration {
    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl From<std::time::Duration> for Duration {
    fn from(value: std::time::Duration) -> Self {
        Self(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }
}

impl From<Duration> for std::time::Duration {
    fn from(value: Duration) -> Self {
        std::time::Duration::from_millis(value.0)
    }
}

pub const HASH_LENGTH: usize = 32;

/// 32-byte digest, written as raw bytes with no length prefix
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Hash(FixedBytes<HASH_LENGTH>);

impl Hash {
    #[must_use]
    pub const fn from_array(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(FixedBytes::from_array(bytes))
    }

    #[must_use]
    pub const fn bytes(&self) -> &[u8; HASH_LENGTH] {
        self.0.bytes()
    }
}

impl Debug for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hash({})", self.0)
    }
}

impl Display for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for Hash {
    type Err = HexConvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FixedBytes::from_hex(s).map(Self)
    }
}

impl Encode for Hash {
    #[inline]
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.0.write_to(buf)
    }
}

impl Decode for Hash {
    #[inline]
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        FixedBytes::parse(p).map(Self)
    }
}

#[cfg(feature = "serde_impls")]
impl serde::Serialize for Hash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Non-negative decimal number `mantissa * 10^-scale`
///
/// Equality is structural: `1.0` (mantissa 10, scale 1) and `1` (mantissa 1,
/// scale 0) are distinct values with distinct encodings. Use
/// [`Numeric::cmp_value`] to compare magnitudes across scales.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, crate::Encode, crate::Decode)]
pub struct Numeric {
    mantissa: Compact<u128>,
    scale: Compact<u32>,
}

impl Numeric {
    #[must_use]
    pub const fn new(mantissa: u128, scale: u32) -> Self {
        Self {
            mantissa: Compact::new(mantissa),
            scale: Compact::new(scale),
        }
    }

    #[must_use]
    pub const fn integer(value: u128) -> Self {
        Self::new(value, 0)
    }

    #[must_use]
    pub const fn mantissa(&self) -> u128 {
        self.mantissa.0
    }

    #[must_use]
    pub const fn scale(&self) -> u32 {
        self.scale.0
    }

    /// Compares the numeric values of `self` and `other`, regardless of scale.
    #[must_use]
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        let (m1, s1) = (self.mantissa(), self.scale());
        let (m2, s2) = (other.mantissa(), other.scale());
        match (m1 == 0, m2 == 0) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        // position of the leading digit relative to the decimal point
        let magnitude = |m: u128, s: u32| i64::from(m.ilog10()) - i64::from(s);
        match magnitude(m1, s1).cmp(&magnitude(m2, s2)) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
        // equal magnitudes bound the scale difference by the digit count of u128
        let ten = BigUint::from(10u8);
        let lhs = BigUint::from(m1) * ten.pow(s2.saturating_sub(s1));
        let rhs = BigUint::from(m2) * ten.pow(s1.saturating_sub(s2));
        lhs.cmp(&rhs)
    }
}

impl IsZero for Numeric {
    fn is_zero(&self) -> bool {
        self.mantissa() == 0
    }
}

impl From<u32> for Numeric {
    fn from(value: u32) -> Self {
        Self::integer(u128::from(value))
    }
}

impl From<u64> for Numeric {
    fn from(value: u64) -> Self {
        Self::integer(u128::from(value))
    }
}

impl Debug for Numeric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Numeric({self})")
    }
}

/// Fractions with more leading zeros than this are written in exponent form
/// (`5e-100`).
const MAX_LEADING_ZEROS: usize = 64;

impl Display for Numeric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = self.mantissa().to_string();
        let scale = self.scale() as usize;
        if scale == 0 {
            return f.write_str(&digits);
        }
        if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            return write!(f, "{int}.{frac}");
        }
        if scale - digits.len() > MAX_LEADING_ZEROS {
            return write!(f, "{digits}e-{scale}");
        }
        write!(f, "0.{digits:0>scale$}")
    }
}

impl FromStr for Numeric {
    type Err = ConstraintError;

    /// Parses decimal notation, keeping every written fractional digit as
    /// part of the scale (`"1.50"` has scale 2).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (int, frac) = match s.split_once('.') {
            Some((int, frac)) => (int, frac),
            None => (s, ""),
        };
        if int.is_empty() || (s.contains('.') && frac.is_empty()) {
            return Err(ConstraintError::malformed("numeric", s, "missing digits"));
        }
        if !int.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(ConstraintError::malformed("numeric", s, "non-digit character"));
        }
        let scale = u32::try_from(frac.len())
            .map_err(|_| ConstraintError::malformed("numeric", s, "scale out of range"))?;
        let mantissa = format!("{int}{frac}")
            .parse::<u128>()
            .map_err(|_| ConstraintError::malformed("numeric", s, "mantissa out of range"))?;
        Ok(Self::new(mantissa, scale))
    }
}

#[cfg(feature = "serde_impls")]
impl serde::Serialize for Numeric {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Constraint on the values an asset definition admits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, crate::Encode, crate::Decode)]
pub struct NumericSpec {
    pub scale: Option<u32>,
}

impl NumericSpec {
    #[must_use]
    pub const fn integer() -> Self {
        Self { scale: Some(0) }
    }

    #[must_use]
    pub const fn fractional(scale: u32) -> Self {
        Self { scale: Some(scale) }
    }

    /// Returns `true` if `value` is representable with this precision.
    #[must_use]
    pub fn admits(&self, value: &Numeric) -> bool {
        self.scale.map_or(true, |scale| value.scale() <= scale)
    }
}
