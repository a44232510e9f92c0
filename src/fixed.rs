//! Fixed-width byte strings
//!
//! [`FixedBytes<N>`] holds exactly `N` opaque bytes and is written as those
//! bytes with no length prefix. Hashes are the main consumer.

use std::fmt::{Debug, Display};
use std::str::FromStr;

use crate::conv::{target::Target, Decode, Encode};
use crate::error::{HexConvError, WidthError};
use crate::hexstring::util::{bytes_of_hex, hex_of_bytes};
use crate::parse::{ParseResult, Parser};

/// Binary sequence of a statically fixed width
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct FixedBytes<const N: usize>([u8; N]);

impl<const N: usize> FixedBytes<N> {
    #[inline(always)]
    #[must_use]
    pub const fn from_array(arr: [u8; N]) -> Self {
        Self(arr)
    }

    /// Returns a reference to the raw bytes
    #[inline]
    #[must_use]
    pub const fn bytes(&self) -> &[u8; N] {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    #[inline(always)]
    #[must_use]
    pub const fn to_array(self) -> [u8; N] {
        self.0
    }

    /// Always `N`.
    #[inline(always)]
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    #[inline(always)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Copies the bytes of a slice whose length must be exactly `N`.
    ///
    /// # Errors
    ///
    /// Returns [`WidthError::WrongWidth`] if `bytes.len() != N`.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, WidthError> {
        <[u8; N]>::try_from(bytes)
            .map(Self)
            .map_err(|_| WidthError::WrongWidth {
                exact: N,
                actual: bytes.len(),
            })
    }

    /// Parses `N` bytes from their hex encoding.
    pub fn from_hex(hex: &str) -> Result<Self, HexConvError> {
        Ok(Self::try_from_slice(&bytes_of_hex(hex)?)?)
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex_of_bytes(&self.0)
    }
}

impl<const N: usize> Default for FixedBytes<N> {
    fn default() -> Self {
        Self([0; N])
    }
}

impl<const N: usize> From<[u8; N]> for FixedBytes<N> {
    fn from(arr: [u8; N]) -> Self {
        Self(arr)
    }
}

impl<const N: usize> TryFrom<&[u8]> for FixedBytes<N> {
    type Error = WidthError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::try_from_slice(bytes)
    }
}

impl<const N: usize> AsRef<[u8]> for FixedBytes<N> {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const N: usize> Debug for FixedBytes<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FixedBytes<{N}>({})", self.to_hex())
    }
}

impl<const N: usize> Display for FixedBytes<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl<const N: usize> FromStr for FixedBytes<N> {
    type Err = HexConvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl<const N: usize> Encode for FixedBytes<N> {
    #[inline]
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        buf.push_many(self.0) + crate::resolve_zero!(buf)
    }
}

impl<const N: usize> Decode for FixedBytes<N> {
    #[inline]
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        p.take_fixed::<N>().map(Self)
    }
}

#[cfg(feature = "serde_impls")]
impl<const N: usize> serde::Serialize for FixedBytes<N> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{hex, HexString};

    #[test]
    fn no_length_prefix() {
        let fb = FixedBytes::from_array([0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(fb.encode::<HexString>(), hex!("deadbeef"));
        assert_eq!(FixedBytes::<4>::decode(hex!("deadbeef")), fb);
        assert!(FixedBytes::<4>::try_decode::<_, crate::ByteParser>(hex!("dead"))
            .unwrap_err()
            .is_truncated());
    }

    #[test]
    fn slice_width_checked() {
        assert_eq!(
            FixedBytes::<2>::try_from_slice(&[1, 2, 3]),
            Err(WidthError::WrongWidth { exact: 2, actual: 3 })
        );
        assert_eq!("0102".parse::<FixedBytes<2>>().unwrap().to_array(), [1, 2]);
        assert!("010203".parse::<FixedBytes<2>>().is_err());
    }
}
