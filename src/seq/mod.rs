//! Sequence codecs
//!
//! * `Vec<T>` and `[T]`: compact element count, then each element in order.
//! * `[T; N]` and tuples `(A,)` through `(A, B, C, D, E, F)`: elements only,
//!   the arity being part of the type.
//! * [`SortedSet`] and [`SortedMap`]: like `Vec`, but the element order is
//!   fixed by a [`Comparator`] rather than by insertion.
//!
//! Element codecs are resolved when the sequence is encoded or decoded, so a
//! type may hold a `Vec` of itself. Decoding a `Vec` opens a recursion frame
//! (see [`Parser::nested`]) to keep such self-similar input within the
//! configured depth limit.

use crate::conv::{target::Target, Decode, Encode};
use crate::error::WidthError;
use crate::parse::error::{ParseError, WindowError};
use crate::parse::{ParseResult, Parser};

pub mod sorted;
mod tuple;

pub use sorted::{Comparator, NaturalOrder, SortedMap, SortedSet};

impl<T: Encode> Encode for [T] {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        let mut written = crate::compact::write_compact(self.len() as u128, buf);
        for elem in self {
            written += elem.write_to(buf);
        }
        written + crate::resolve_zero!(buf)
    }
}

impl<T: Encode> Encode for Vec<T> {
    #[inline]
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.as_slice().write_to(buf)
    }
}

/// Upper bound on the elements of a zero-sized type that may be decoded
/// beyond the remaining byte count.
pub const ZERO_SIZED_SLACK: usize = 1 << 12;

/// Reads a compact element count, rejecting counts that the remaining input
/// could not possibly hold.
///
/// Zero-sized elements occupy no bytes on the wire, so their count may exceed
/// the remainder, but only by [`ZERO_SIZED_SLACK`].
pub(crate) fn take_count<T, P: Parser>(p: &mut P) -> ParseResult<usize> {
    let offset = p.offset();
    let count = p.take_length()?;
    let limit = if std::mem::size_of::<T>() == 0 {
        p.remainder().saturating_add(ZERO_SIZED_SLACK)
    } else {
        p.remainder()
    };
    if count > limit {
        return Err(WindowError::ConsumeWouldExceedLimit {
            offset,
            requested: count,
            limit: p.view_len(),
        }
        .into());
    }
    Ok(count)
}

/// Parses exactly `count` consecutive values of `T`.
pub(crate) fn parse_elements<T: Decode, P: Parser>(p: &mut P, count: usize) -> ParseResult<Vec<T>> {
    let mut elems = Vec::with_capacity(count.min(p.remainder()));
    for _ in 0..count {
        elems.push(T::parse(p)?);
    }
    Ok(elems)
}

impl<T: Decode> Decode for Vec<T> {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let count = take_count::<T, P>(p)?;
        p.nested(|p| parse_elements(p, count))
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.iter().map(|elem| elem.write_to(buf)).sum::<usize>() + crate::resolve_zero!(buf)
    }
}

impl<T: Decode, const N: usize> Decode for [T; N] {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let elems: Vec<T> = parse_elements(p, N)?;
        <[T; N]>::try_from(elems).map_err(|elems| {
            ParseError::reify(WidthError::WrongWidth {
                exact: N,
                actual: elems.len(),
            })
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parse::{ByteParser, DecodeLimits};
    use crate::{hex, Decode, Encode, HexString};

    #[derive(Debug, PartialEq, Encode, Decode)]
    enum Tree {
        Leaf(u8),
        Node(Vec<Tree>),
    }

    #[test]
    fn vec_is_count_prefixed() {
        assert_eq!(vec![1u16, 2].encode::<HexString>(), hex!("0801000200"));
        assert_eq!(Vec::<u16>::decode(hex!("0801000200")), vec![1, 2]);
        assert_eq!(Vec::<u8>::new().encode::<HexString>(), hex!("00"));
        let bytes: &[u8] = &[1, 2, 3];
        assert_eq!(bytes.encode::<HexString>(), hex!("0c010203"));
    }

    #[test]
    fn arrays_have_no_prefix() {
        assert_eq!([0xaau8, 0xbb, 0xcc].encode::<HexString>(), hex!("aabbcc"));
        assert_eq!(<[u16; 2]>::decode(hex!("01000200")), [1, 2]);
        assert!(<[u8; 4]>::try_decode::<_, ByteParser>(hex!("010203")).is_err());
    }

    #[test]
    fn implausible_count_fails_fast() {
        // claims 2^30 elements with a single byte following
        let err = Vec::<u8>::try_decode::<_, ByteParser>(hex!("030000004001")).unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn unit_runs_are_bounded() {
        assert_eq!(Vec::<()>::decode(hex!("0c")), vec![(), (), ()]);
        // 2^60 units in a ten-byte input
        let err = Vec::<()>::try_decode::<_, ByteParser>(hex!("13000000000000001001")).unwrap_err();
        assert!(err.is_truncated());
        let within = (((ZERO_SIZED_SLACK as u16) << 2) | 0x01).to_le_bytes().to_vec();
        assert_eq!(Vec::<()>::decode(within).len(), ZERO_SIZED_SLACK);
    }

    #[test]
    fn recursive_vec_round_trips() {
        let tree = Tree::Node(vec![Tree::Leaf(1), Tree::Node(vec![Tree::Leaf(2)])]);
        let bytes = tree.to_bytes();
        assert_eq!(bytes, vec![0x01, 0x08, 0x00, 0x01, 0x01, 0x04, 0x00, 0x02]);
        assert_eq!(Tree::decode(bytes), tree);
    }

    fn nested_tree(levels: usize) -> Vec<u8> {
        let mut bytes = Vec::new();
        for _ in 0..levels {
            bytes.extend_from_slice(&[0x01, 0x04]);
        }
        bytes.extend_from_slice(&[0x00, 0x00]);
        bytes
    }

    #[test]
    fn deep_nesting_hits_depth_limit() {
        let err = Tree::try_decode::<_, ByteParser>(nested_tree(300)).unwrap_err();
        assert!(matches!(
            err,
            crate::conv::error::DecodeError::Parse(ParseError::Window(
                WindowError::DepthLimitExceeded { limit: 256 }
            ))
        ));
        assert!(Tree::try_decode::<_, ByteParser>(nested_tree(100)).is_ok());

        let mut p = ByteParser::with_limits(nested_tree(100), DecodeLimits { max_depth: 50 });
        assert!(Tree::parse(&mut p).is_err());
    }
}
