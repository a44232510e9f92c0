//! Bytes that print and parse as hex
//!
//! Hashes, public-key payloads and encoded test vectors are all written as
//! hex. [`HexString`] keeps the decoded bytes while displaying and parsing as
//! hex, and is itself a [`Target`], so `value.encode::<HexString>()` gives a
//! hex rendering of an encoded value that compares directly against a
//! [`hex!`](crate::hex) literal.
//!
//! `From` conversions into `HexString` take bytes; `from_hex` and
//! `str::parse` take hex text.

use crate::conv::target::Target;
use crate::error::HexConvError;

pub(crate) mod util {
    use crate::error::HexConvError;

    const DIGITS: &[u8; 16] = b"0123456789abcdef";

    /// Lower-case, undelimited
    #[must_use]
    pub fn hex_of_bytes(bytes: &[u8]) -> String {
        bytes
            .iter()
            .flat_map(|&b| [DIGITS[usize::from(b >> 4)], DIGITS[usize::from(b & 0xf)]])
            .map(char::from)
            .collect()
    }

    fn nibble(digit: u8) -> Option<u8> {
        match digit {
            b'0'..=b'9' => Some(digit - b'0'),
            b'a'..=b'f' => Some(digit - b'a' + 10),
            b'A'..=b'F' => Some(digit - b'A' + 10),
            _ => None,
        }
    }

    /// Decodes case-insensitive hex text.
    ///
    /// # Errors
    ///
    /// [`HexConvError::OddParity`] for odd-length input, otherwise
    /// [`HexConvError::NonHex`] if any byte is not a hex digit.
    pub fn bytes_of_hex(src: &str) -> Result<Vec<u8>, HexConvError> {
        let digits = src.as_bytes();
        if digits.len() % 2 != 0 {
            return Err(HexConvError::OddParity(src.to_owned()));
        }
        digits
            .chunks_exact(2)
            .map(|pair| Some((nibble(pair[0])? << 4) | nibble(pair[1])?))
            .collect::<Option<Vec<u8>>>()
            .ok_or_else(|| HexConvError::NonHex(src.to_owned()))
    }
}

/// Byte buffer whose textual form is hex
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[repr(transparent)]
pub struct HexString {
    bytes: Vec<u8>,
}

impl HexString {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of bytes, not of hex digits
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        util::hex_of_bytes(&self.bytes)
    }

    /// # Errors
    ///
    /// See [`HexConvError`].
    pub fn from_hex(hex: impl AsRef<str>) -> Result<Self, HexConvError> {
        util::bytes_of_hex(hex.as_ref()).map(Self::from)
    }
}

impl AsRef<[u8]> for HexString {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for HexString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "hex!({:?})", self.to_hex())
    }
}

impl std::fmt::Display for HexString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.to_hex())
    }
}

impl std::str::FromStr for HexString {
    type Err = HexConvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<Vec<u8>> for HexString {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl From<&[u8]> for HexString {
    fn from(bytes: &[u8]) -> Self {
        bytes.to_vec().into()
    }
}

impl From<HexString> for Vec<u8> {
    fn from(hex: HexString) -> Self {
        hex.bytes
    }
}

impl Target for HexString {
    fn anticipate(&mut self, extra: usize) {
        self.bytes.reserve(extra);
    }

    fn create() -> Self {
        Self::new()
    }

    fn push_one(&mut self, b: u8) -> usize {
        self.bytes.push_one(b)
    }

    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize {
        self.bytes.push_many(arr)
    }

    fn push_all(&mut self, buf: &[u8]) -> usize {
        self.bytes.push_all(buf)
    }
}

/// [`HexString`] from a hex literal, panicking if it is malformed.
///
/// For test vectors and constants.
#[macro_export]
macro_rules! hex {
    ($s:expr) => {{
        match $crate::hexstring::HexString::from_hex($s) {
            Ok(hex) => hex,
            Err(err) => panic!("malformed hex literal: {err}"),
        }
    }};
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let h = hex!("DeadBeef");
        assert_eq!(h.as_bytes(), &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(h.to_hex(), "deadbeef");
        assert_eq!(format!("{h:?}"), "hex!(\"deadbeef\")");
        assert_eq!("".parse::<HexString>().unwrap(), HexString::new());
    }

    #[test]
    fn hex_rejects_malformed() {
        assert_eq!(
            HexString::from_hex("abc"),
            Err(HexConvError::OddParity("abc".into()))
        );
        assert_eq!(
            HexString::from_hex("zz"),
            Err(HexConvError::NonHex("zz".into()))
        );
        // two bytes of UTF-8, so even length but not hex
        assert!(HexString::from_hex("é").is_err());
    }
}
