//! Byte-level readers underneath [`Decode`](crate::conv::Decode)
//!
//! [`Parser`] is a forward-only cursor over an input buffer that also keeps
//! track of how deeply recursive values are nested. [`ByteParser`] owns its
//! buffer and [`SliceParser`] borrows one; [`TryIntoParser`] builds either
//! from the usual input types (byte vectors and slices, hex text).

pub mod error;

use crate::error::HexConvError;
use crate::hexstring::HexString;
pub use error::ParseResult;
use error::{ParseError, TagError, TokenError, WindowError};

/// Default ceiling on the nesting depth of recursive values
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Runtime bounds enforced by a [`Parser`] while decoding untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum number of nested recursive frames (boxed values and
    /// sequences) that may be open at once.
    pub max_depth: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Forward-only reader over an immutable buffer
///
/// Bytes are seen only by consuming them, in order, and never twice.
/// Multi-byte integers are little-endian. Recursive values open a frame via
/// [`Parser::nested`], and at most [`DecodeLimits::max_depth`] frames may be
/// open at once.
///
/// Implementations uphold:
///
/// * a fresh parser has `offset() == 0` and `view_len()` equal to the buffer length;
/// * `remainder()` is the largest `n` for which `consume(n)` succeeds;
/// * a successful `consume(n)` lowers `remainder()` by `n`, a failed one leaves it unchanged.
pub trait Parser {
    /// What the parser reads from
    type Buffer;

    /// New parser at offset zero, with default limits
    fn from_buffer(buf: Self::Buffer) -> Self;

    fn view_len(&self) -> usize;

    fn offset(&self) -> usize;

    /// Bytes left to consume
    fn remainder(&self) -> usize {
        self.view_len() - self.offset()
    }

    fn consume_byte(&mut self) -> ParseResult<u8>;

    /// Takes the next `nbytes` bytes.
    ///
    /// Succeeds exactly when that many bytes remain, with a slice of length
    /// `nbytes`. On failure nothing is consumed.
    fn consume(&mut self, nbytes: usize) -> ParseResult<&[u8]>;

    fn limits(&self) -> DecodeLimits;

    /// Open recursion frames
    fn depth(&self) -> usize;

    /// Opens a recursion frame, failing if doing so would exceed the depth limit.
    fn descend(&mut self) -> ParseResult<()>;

    /// Closes the innermost recursion frame.
    fn ascend(&mut self);

    /// Runs `f` inside a fresh recursion frame.
    ///
    /// The frame is closed whether or not `f` succeeds.
    fn nested<T, F>(&mut self, f: F) -> ParseResult<T>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> ParseResult<T>,
    {
        self.descend()?;
        let ret = f(self);
        self.ascend();
        ret
    }

    fn consume_arr<const N: usize>(&mut self) -> ParseResult<[u8; N]> {
        error::coerce_slice(self.consume(N)?)
    }

    #[inline]
    fn take_u8(&mut self) -> ParseResult<u8> {
        self.consume_byte()
    }

    #[inline]
    fn take_i8(&mut self) -> ParseResult<i8> {
        self.consume_arr::<1>().map(i8::from_le_bytes)
    }

    #[inline]
    fn take_u16(&mut self) -> ParseResult<u16> {
        self.consume_arr::<2>().map(u16::from_le_bytes)
    }

    #[inline]
    fn take_i16(&mut self) -> ParseResult<i16> {
        self.consume_arr::<2>().map(i16::from_le_bytes)
    }

    #[inline]
    fn take_u32(&mut self) -> ParseResult<u32> {
        self.consume_arr::<4>().map(u32::from_le_bytes)
    }

    #[inline]
    fn take_i32(&mut self) -> ParseResult<i32> {
        self.consume_arr::<4>().map(i32::from_le_bytes)
    }

    #[inline]
    fn take_u64(&mut self) -> ParseResult<u64> {
        self.consume_arr::<8>().map(u64::from_le_bytes)
    }

    #[inline]
    fn take_i64(&mut self) -> ParseResult<i64> {
        self.consume_arr::<8>().map(i64::from_le_bytes)
    }

    #[inline]
    fn take_u128(&mut self) -> ParseResult<u128> {
        self.consume_arr::<16>().map(u128::from_le_bytes)
    }

    /// `0x01` is `true` and `0x00` is `false`; any other byte is an
    /// [`InvalidBoolean`](TokenError::InvalidBoolean) error.
    #[inline]
    fn take_bool(&mut self) -> ParseResult<bool> {
        match self.consume_byte()? {
            0x01 => Ok(true),
            0x00 => Ok(false),
            byte => Err(ParseError::Token(TokenError::InvalidBoolean(byte))),
        }
    }

    /// Parses a one-byte tag and verifies that it is a member of `valid`,
    /// the discriminant table of the type `T`, before returning it.
    ///
    /// # Invariants
    ///
    /// The only possible return values are `Err(_)`, and `Ok(val)` for some
    /// `val` in `valid`.
    fn take_tagword<T: ?Sized>(&mut self, valid: &[u8]) -> ParseResult<u8> {
        let actual = self.consume_byte()?;
        if valid.contains(&actual) {
            Ok(actual)
        } else {
            Err(TagError::with_type::<T>(actual, valid).into())
        }
    }

    /// Owned variant of [`Parser::consume`]
    #[inline]
    fn take_dynamic(&mut self, nbytes: usize) -> ParseResult<Vec<u8>> {
        self.consume(nbytes).map(Vec::from)
    }

    #[inline]
    fn take_fixed<const N: usize>(&mut self) -> ParseResult<[u8; N]> {
        self.consume_arr::<N>()
    }

    /// Consumes a compact-encoded collection length prefix.
    fn take_length(&mut self) -> ParseResult<usize>
    where
        Self: Sized,
    {
        crate::compact::parse_compact_usize(self)
    }
}

macro_rules! impl_parser_common {
    () => {
        fn view_len(&self) -> usize {
            self.buffer.len()
        }

        fn offset(&self) -> usize {
            self.offset
        }

        fn consume_byte(&mut self) -> ParseResult<u8> {
            match self.buffer.get(self.offset) {
                Some(&byte) => {
                    self.offset += 1;
                    Ok(byte)
                }
                None => Err(WindowError::ConsumeWouldExceedLimit {
                    offset: self.offset,
                    requested: 1,
                    limit: self.buffer.len(),
                }
                .into()),
            }
        }

        fn consume(&mut self, nbytes: usize) -> ParseResult<&[u8]> {
            let start = self.offset;
            match start.checked_add(nbytes) {
                Some(end) if end <= self.buffer.len() => {
                    self.offset = end;
                    Ok(&self.buffer[start..end])
                }
                _ => Err(WindowError::ConsumeWouldExceedLimit {
                    offset: start,
                    requested: nbytes,
                    limit: self.buffer.len(),
                }
                .into()),
            }
        }

        fn limits(&self) -> DecodeLimits {
            self.limits
        }

        fn depth(&self) -> usize {
            self.depth
        }

        fn descend(&mut self) -> ParseResult<()> {
            if self.depth >= self.limits.max_depth {
                return Err(WindowError::DepthLimitExceeded {
                    limit: self.limits.max_depth,
                }
                .into());
            }
            self.depth += 1;
            Ok(())
        }

        fn ascend(&mut self) {
            self.depth = self.depth.saturating_sub(1);
        }
    };
}

/// Parser over an owned byte-buffer
#[derive(Debug, Clone)]
pub struct ByteParser {
    buffer: Vec<u8>,
    offset: usize,
    depth: usize,
    limits: DecodeLimits,
}

impl ByteParser {
    /// Constructs a `ByteParser` that enforces the given limits instead of the defaults
    #[must_use]
    pub fn with_limits(buffer: Vec<u8>, limits: DecodeLimits) -> Self {
        Self {
            buffer,
            offset: 0,
            depth: 0,
            limits,
        }
    }
}

impl Parser for ByteParser {
    type Buffer = Vec<u8>;

    fn from_buffer(buffer: Vec<u8>) -> Self {
        Self::with_limits(buffer, DecodeLimits::default())
    }

    impl_parser_common!();
}

/// Parser over a borrowed byte-slice, starting at an arbitrary offset
#[derive(Debug, Clone)]
pub struct SliceParser<'a> {
    buffer: &'a [u8],
    offset: usize,
    depth: usize,
    limits: DecodeLimits,
}

impl<'a> SliceParser<'a> {
    /// Constructs a `SliceParser` positioned at `offset` within `buffer`.
    ///
    /// Offsets past the end of the buffer are clamped, so that the first
    /// consume operation reports the overrun.
    #[must_use]
    pub fn at_offset(buffer: &'a [u8], offset: usize) -> Self {
        Self {
            buffer,
            offset: offset.min(buffer.len()),
            depth: 0,
            limits: DecodeLimits::default(),
        }
    }

    /// Constructs a `SliceParser` that enforces the given limits instead of the defaults
    #[must_use]
    pub fn with_limits(buffer: &'a [u8], limits: DecodeLimits) -> Self {
        Self {
            buffer,
            offset: 0,
            depth: 0,
            limits,
        }
    }
}

impl<'a> Parser for SliceParser<'a> {
    type Buffer = &'a [u8];

    fn from_buffer(buffer: &'a [u8]) -> Self {
        Self::with_limits(buffer, DecodeLimits::default())
    }

    impl_parser_common!();
}

/// Fallible conversion of arbitrary byte sources into a specific `Parser` type
///
/// String slices are interpreted as hex, never as raw bytes; use
/// `str::as_bytes` explicitly for the latter.
pub trait TryIntoParser<P = ByteParser>
where
    P: Parser,
{
    type Error;

    fn try_into_parser(self) -> Result<P, Self::Error>;
}

impl TryIntoParser<ByteParser> for Vec<u8> {
    type Error = std::convert::Infallible;

    fn try_into_parser(self) -> Result<ByteParser, Self::Error> {
        Ok(ByteParser::from_buffer(self))
    }
}

impl TryIntoParser<ByteParser> for &[u8] {
    type Error = std::convert::Infallible;

    fn try_into_parser(self) -> Result<ByteParser, Self::Error> {
        Ok(ByteParser::from_buffer(self.to_vec()))
    }
}

impl<'a> TryIntoParser<SliceParser<'a>> for &'a [u8] {
    type Error = std::convert::Infallible;

    fn try_into_parser(self) -> Result<SliceParser<'a>, Self::Error> {
        Ok(SliceParser::from_buffer(self))
    }
}

impl<const N: usize> TryIntoParser<ByteParser> for [u8; N] {
    type Error = std::convert::Infallible;

    fn try_into_parser(self) -> Result<ByteParser, Self::Error> {
        Ok(ByteParser::from_buffer(self.to_vec()))
    }
}

impl<const N: usize> TryIntoParser<ByteParser> for &[u8; N] {
    type Error = std::convert::Infallible;

    fn try_into_parser(self) -> Result<ByteParser, Self::Error> {
        Ok(ByteParser::from_buffer(self.to_vec()))
    }
}

impl TryIntoParser<ByteParser> for HexString {
    type Error = std::convert::Infallible;

    fn try_into_parser(self) -> Result<ByteParser, Self::Error> {
        Ok(ByteParser::from_buffer(self.into_vec()))
    }
}

impl TryIntoParser<ByteParser> for &str {
    type Error = HexConvError;

    fn try_into_parser(self) -> Result<ByteParser, Self::Error> {
        Ok(ByteParser::from_buffer(HexString::from_hex(self)?.into_vec()))
    }
}
