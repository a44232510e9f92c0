//! The `Encode` and `Decode` traits
//!
//! Every wire type of the ledger implements both traits; together they are
//! the codec of that type. Implementations are resolved by type identity at
//! compile time, which means recursive types (an instruction holding a list of
//! instructions, a predicate holding its own negation) are bound lazily, at the
//! moment a value is encoded or decoded, rather than when the codec is defined.
//!
//! Encoding writes into a [`target::Target`], the output-side counterpart of
//! [`crate::parse::Parser`]. The derive macros live in the `encode_derive`
//! and `decode_derive` sub-crates.

use crate::parse::{ParseResult, Parser, SliceParser, TryIntoParser};

use self::target::Target;

pub mod error;
pub mod target;

pub use error::DecodeResult;

#[macro_export]
macro_rules! write_all_to {
    ($($x:expr),* $(,)? => $tgt:expr) => {
        { $( $crate::conv::Encode::write_to(&$x, $tgt) + )* $crate::conv::target::Target::resolve_zero($tgt) }
    };
}

/// Trait for types that support serialization into the SCALE-style binary
/// form exchanged with ledger peers.
///
/// Only [`write_to`](Encode::write_to) is required. Encoding a well-typed
/// in-memory value never fails.
pub trait Encode {
    /// Appends the wire form of `self` to `buf` and returns its length in
    /// bytes.
    fn write_to<U: Target>(&self, buf: &mut U) -> usize;

    /// [`write_to`](Encode::write_to) specialized to `Vec<u8>`
    #[inline]
    fn write_to_vec(&self, buf: &mut Vec<u8>) {
        let _ = self.write_to(buf);
    }

    /// Encodes `self` into a fresh buffer of type `U`.
    #[must_use]
    #[inline]
    fn encode<U: Target>(&self) -> U {
        let mut buf: U = U::create();
        let _ = self.write_to::<U>(&mut buf);
        buf
    }

    /// Wire form of `self` as an owned byte vector
    #[must_use]
    #[inline]
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write_to_vec(&mut buf);
        buf
    }
}

/// Encoded-length queries, implemented for every [`Encode`] type
pub trait EncodeLength: Encode {
    /// Length of the wire form of `self`, counted through a
    /// [`ByteCounter`](target::ByteCounter) without allocating.
    #[must_use]
    #[inline]
    fn enc_len(&self) -> usize {
        self.write_to(&mut std::io::sink())
    }

    /// Like [`Encode::to_bytes`], allocating exactly once.
    #[must_use]
    fn to_bytes_full(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.enc_len());
        self.write_to_vec(&mut buf);
        buf
    }
}

impl<T: Encode + ?Sized> EncodeLength for T {}

/// Types that can be read back from their wire form
///
/// The one required method, [`parse`](Decode::parse), consumes exactly the
/// bytes of one value from a [`Parser`], or fails.
///
/// Decoding is atomic: no partially-built value is ever observable, since
/// the value is only assembled once every constituent has been parsed.
///
/// # Derive Macro
///
/// `#[derive(Decode)]` handles structs (positional fields) and enums (one-byte
/// discriminant, then payload); see the [`adt`](crate::adt) module for the
/// attribute that fixes explicit discriminants.
///
/// # Example
///
/// ```
/// use ledger_model::{Decode, Encode};
///
/// #[derive(Debug, PartialEq, Encode, Decode)]
/// pub struct MyTypeElem {
///     is_valid: bool,
///     id: u8,
/// }
///
/// let elems = vec![MyTypeElem { is_valid: true, id: 42 }];
/// assert_eq!(elems.to_bytes(), vec![0x04, 0x01, 0x2a]);
/// assert_eq!(elems, <Vec<MyTypeElem> as Decode>::decode(vec![0x04, 0x01, 0x2a]));
/// ```
pub trait Decode {
    /// # Errors
    ///
    /// Propagates [`Parser`] failures, and reports values that violate a
    /// constraint of `Self`.
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self>
    where
        Self: Sized;

    /// Attempt to decode a value of the `Self` type from a value `input` of the
    /// generic type `U: TryIntoParser<P>`.
    ///
    /// # Errors
    ///
    /// Propagates any error of [`TryIntoParser::try_into_parser`] or [`parse`](Decode::parse).
    ///
    /// In addition, if the feature-flag `check_complete_parse` is enabled (the default),
    /// any bytes left unconsumed after a successful parse are reported as
    /// [`DecodeError::NonEmpty`](error::DecodeError::NonEmpty).
    fn try_decode<U, P>(input: U) -> DecodeResult<Self>
    where
        Self: Sized,
        P: Parser,
        U: TryIntoParser<P>,
        error::DecodeError: From<U::Error>,
    {
        let mut p: P = input.try_into_parser()?;
        let ret = match Self::parse(&mut p) {
            Ok(ret) => ret,
            Err(err) => {
                tracing::trace!(
                    target_type = std::any::type_name::<Self>(),
                    offset = p.offset(),
                    error = %err,
                    "decode failed"
                );
                return Err(err.into());
            }
        };
        #[cfg(feature = "check_complete_parse")]
        {
            if p.remainder() != 0 {
                return Err(error::DecodeError::NonEmpty {
                    residual: p.remainder(),
                });
            }
        }
        Ok(ret)
    }

    /// Decodes a value starting at `offset` within `bytes`, returning it along
    /// with the offset of the first byte following it.
    ///
    /// Trailing bytes are expected here, as several values may be laid out
    /// back to back.
    fn decode_at(bytes: &[u8], offset: usize) -> DecodeResult<(Self, usize)>
    where
        Self: Sized,
    {
        if offset > bytes.len() {
            return Err(crate::parse::error::ParseError::from(
                crate::parse::error::WindowError::ConsumeWouldExceedLimit {
                    offset,
                    requested: 0,
                    limit: bytes.len(),
                },
            )
            .into());
        }
        let mut p = SliceParser::at_offset(bytes, offset);
        let ret = Self::parse(&mut p)?;
        Ok((ret, p.offset()))
    }

    /// Decodes a value of type `Self` from a value `input` of the generic
    /// type `U: TryIntoParser`, using [`ByteParser`](crate::parse::ByteParser) as the
    /// `Parser` type internally.
    ///
    /// # Panics
    ///
    /// This method will panic if the interior call to [`try_decode`](Decode::try_decode)
    /// returns an `Err(_)` value.
    fn decode<U>(inp: U) -> Self
    where
        Self: Sized,
        U: TryIntoParser,
        error::DecodeError: From<U::Error>,
    {
        Self::try_decode(inp).unwrap_or_else(|err| {
            panic!(
                "<{} as Decode>::decode encountered error: {:?}",
                std::any::type_name::<Self>(),
                err
            )
        })
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    #[inline]
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        T::write_to(*self, buf)
    }
}

impl Encode for str {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        crate::compact::write_compact(self.len() as u128, buf)
            + buf.push_all(self.as_bytes())
            + crate::resolve_zero!(buf)
    }
}

impl Encode for String {
    #[inline]
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.as_str().write_to(buf)
    }
}

impl Decode for String {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let len = p.take_length()?;
        let buf: Vec<u8> = p.take_dynamic(len)?;
        Ok(String::from_utf8(buf)?)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        (match self {
            Some(val) => buf.push_one(0x01) + val.write_to(buf),
            None => buf.push_one(0x00),
        }) + crate::resolve_zero!(buf)
    }
}

impl<T: Decode> Decode for Option<T> {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        match p.take_tagword::<Option<T>>(&[0x00, 0x01])? {
            0x00 => Ok(None),
            _ => Ok(Some(T::parse(p)?)),
        }
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    #[inline]
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.as_ref().write_to(buf)
    }
}

impl<T: Decode> Decode for Box<T> {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        p.nested(|p| T::parse(p).map(Box::new))
    }
}

impl<T: Encode, E: Encode> Encode for Result<T, E> {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        (match self {
            Ok(val) => buf.push_one(0x00) + val.write_to(buf),
            Err(err) => buf.push_one(0x01) + err.write_to(buf),
        }) + crate::resolve_zero!(buf)
    }
}

impl<T: Decode, E: Decode> Decode for Result<T, E> {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        match p.take_tagword::<Result<T, E>>(&[0x00, 0x01])? {
            0x00 => Ok(Ok(T::parse(p)?)),
            _ => Ok(Err(E::parse(p)?)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{hex, HexString};

    #[test]
    fn string_is_length_prefixed() {
        assert_eq!(String::from("alice").encode::<HexString>(), hex!("14616c696365"));
        assert_eq!(String::decode(hex!("14616c696365")), "alice");
        assert_eq!(String::new().to_bytes(), vec![0x00]);
    }

    #[test]
    fn string_rejects_invalid_utf8() {
        let err = String::try_decode::<_, crate::parse::ByteParser>(vec![0x04, 0xc3]).unwrap_err();
        assert!(matches!(
            err,
            error::DecodeError::Parse(crate::parse::error::ParseError::External(_))
        ));
    }

    #[test]
    fn option_flags() {
        assert_eq!(Some(7u8).encode::<HexString>(), hex!("0107"));
        assert_eq!(None::<u8>.encode::<HexString>(), hex!("00"));
        assert_eq!(Option::<u8>::decode(hex!("0107")), Some(7));
        let err = Option::<u8>::try_decode::<_, crate::parse::ByteParser>(hex!("0207")).unwrap_err();
        assert!(err.is_unknown_variant());
    }

    #[test]
    fn result_tags() {
        let ok: Result<u8, String> = Ok(1);
        let err: Result<u8, String> = Err("x".into());
        assert_eq!(ok.encode::<HexString>(), hex!("0001"));
        assert_eq!(err.encode::<HexString>(), hex!("010478"));
        assert_eq!(Result::<u8, String>::decode(hex!("010478")), err);
    }

    #[test]
    fn decode_at_returns_next_offset() {
        let bytes = [0xff, 0x08, 0x68, 0x69, 0x2a];
        let (s, next) = String::decode_at(&bytes, 1).unwrap();
        assert_eq!(s, "hi");
        assert_eq!(next, 4);
        let (n, next) = u8::decode_at(&bytes, next).unwrap();
        assert_eq!((n, next), (42, 5));
        assert!(u8::decode_at(&bytes, next).unwrap_err().is_truncated());
        assert!(u8::decode_at(&bytes, 9).is_err());
    }

    #[cfg(feature = "check_complete_parse")]
    #[test]
    fn trailing_bytes_rejected() {
        let err = u8::try_decode::<_, crate::parse::ByteParser>(vec![0x01, 0x02]).unwrap_err();
        assert!(matches!(err, error::DecodeError::NonEmpty { residual: 1 }));
    }

    #[test]
    fn enc_len_matches_bytes() {
        let v = vec![String::from("a"), String::from("bc")];
        assert_eq!(v.enc_len(), v.to_bytes().len());
        assert_eq!(v.to_bytes_full(), v.to_bytes());
    }
}
