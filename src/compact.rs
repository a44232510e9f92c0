//! SCALE compact integers
//!
//! A compact integer occupies a number of bytes proportional to its magnitude.
//! The two low bits of the first byte select the mode:
//!
//! | mode   | range               | layout                                        |
//! |--------|---------------------|-----------------------------------------------|
//! | `0b00` | `0..2^6`            | one byte, `v << 2`                            |
//! | `0b01` | `2^6..2^14`         | two bytes LE, `(v << 2) \| 0b01`               |
//! | `0b10` | `2^14..2^30`        | four bytes LE, `(v << 2) \| 0b10`              |
//! | `0b11` | `2^30..`            | `((n - 4) << 2) \| 0b11`, then `n` LE bytes    |
//!
//! Collection lengths throughout the wire format are compact integers.
//! Decoding accepts only the canonical (narrowest) encoding of each value.

use std::fmt::{Debug, Display};

use num_integer::Integer;

use crate::conv::{target::Target, Decode, Encode};
use crate::nonzero::IsZero;
use crate::parse::error::{ParseResult, TokenError};
use crate::parse::Parser;

const SINGLE_BYTE_MAX: u128 = (1 << 6) - 1;
const TWO_BYTE_MAX: u128 = (1 << 14) - 1;
const FOUR_BYTE_MAX: u128 = (1 << 30) - 1;

/// Number of little-endian bytes needed for `value` in big-integer mode.
fn big_mode_width(value: u128) -> usize {
    let bits = (u128::BITS - value.leading_zeros()) as usize;
    Integer::div_ceil(&bits, &8).max(4)
}

/// Writes `value` in compact form, returning the number of bytes written.
pub fn write_compact<U: Target>(value: u128, buf: &mut U) -> usize {
    let written = match value {
        0..=SINGLE_BYTE_MAX => buf.push_one((value as u8) << 2),
        0..=TWO_BYTE_MAX => buf.push_many((((value as u16) << 2) | 0b01).to_le_bytes()),
        0..=FOUR_BYTE_MAX => buf.push_many((((value as u32) << 2) | 0b10).to_le_bytes()),
        _ => {
            let width = big_mode_width(value);
            buf.push_one((((width - 4) as u8) << 2) | 0b11)
                + buf.push_all(&value.to_le_bytes()[..width])
        }
    };
    written + crate::resolve_zero!(buf)
}

/// Reads a compact integer of any width up to `u128`.
pub fn parse_compact<P: Parser>(p: &mut P) -> ParseResult<u128> {
    let first = p.consume_byte()?;
    let (value, min) = match first & 0b11 {
        0b00 => return Ok(u128::from(first >> 2)),
        0b01 => {
            let second = p.consume_byte()?;
            let value = u128::from(u16::from_le_bytes([first, second]) >> 2);
            (value, SINGLE_BYTE_MAX + 1)
        }
        0b10 => {
            let [b1, b2, b3] = p.consume_arr::<3>()?;
            let value = u128::from(u32::from_le_bytes([first, b1, b2, b3]) >> 2);
            (value, TWO_BYTE_MAX + 1)
        }
        _ => {
            let width = usize::from(first >> 2) + 4;
            if width > 16 {
                return Err(TokenError::CompactOutOfRange { for_type: "u128" }.into());
            }
            let bytes = p.consume(width)?;
            let mut word = [0u8; 16];
            word[..width].copy_from_slice(bytes);
            let value = u128::from_le_bytes(word);
            if bytes[width - 1] == 0 {
                return Err(TokenError::NonCanonicalCompact { value }.into());
            }
            (value, FOUR_BYTE_MAX + 1)
        }
    };
    if value < min {
        return Err(TokenError::NonCanonicalCompact { value }.into());
    }
    Ok(value)
}

pub(crate) fn parse_compact_usize<P: Parser>(p: &mut P) -> ParseResult<usize> {
    let value = parse_compact(p)?;
    usize::try_from(value)
        .map_err(|_| TokenError::CompactOutOfRange { for_type: "usize" }.into())
}

/// Unsigned integer types that have a compact encoding.
pub trait CompactInt: Copy + Ord + Debug + Display + Default {
    fn to_u128(self) -> u128;

    fn from_u128(value: u128) -> Option<Self>;
}

macro_rules! impl_compact_int {
    ( $( $t:ty ),+ ) => {
        $(
            impl CompactInt for $t {
                #[inline]
                fn to_u128(self) -> u128 {
                    self as u128
                }

                #[inline]
                fn from_u128(value: u128) -> Option<Self> {
                    <$t>::try_from(value).ok()
                }
            }
        )+
    };
}

impl_compact_int!(u8, u16, u32, u64, u128);

/// Newtype selecting the compact encoding for an unsigned integer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Compact<T>(pub T);

impl<T: CompactInt> Compact<T> {
    pub const fn new(value: T) -> Self {
        Self(value)
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: CompactInt> From<T> for Compact<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T: Debug> Debug for Compact<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Compact").field(&self.0).finish()
    }
}

impl<T: Display> Display for Compact<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<T: CompactInt> IsZero for Compact<T> {
    fn is_zero(&self) -> bool {
        self.0 == T::default()
    }
}

impl<T: CompactInt> Encode for Compact<T> {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        write_compact(self.0.to_u128(), buf)
    }
}

impl<T: CompactInt> Decode for Compact<T> {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let value = parse_compact(p)?;
        match T::from_u128(value) {
            Some(v) => Ok(Self(v)),
            None => Err(TokenError::CompactOutOfRange {
                for_type: std::any::type_name::<T>(),
            }
            .into()),
        }
    }
}
