//! Codecs for the unit type, booleans, and fixed-width integers
//!
//! Fixed-width integers are encoded little-endian at their natural width.

use crate::conv::error::{DecodeError, DecodeResult};
use crate::conv::{target::Target, Decode, Encode};
use crate::parse::{ParseResult, Parser, TryIntoParser};

impl Encode for () {
    fn write_to<U: Target>(&self, _: &mut U) -> usize {
        0
    }

    #[inline(always)]
    fn write_to_vec(&self, _: &mut Vec<u8>) {}

    fn encode<U: Target>(&self) -> U {
        U::create()
    }

    #[inline(always)]
    fn to_bytes(&self) -> Vec<u8> {
        Vec::new()
    }
}

impl Decode for () {
    #[inline]
    fn parse<P: Parser>(_: &mut P) -> ParseResult<()> {
        Ok(())
    }

    cfg_if::cfg_if! {
        if #[cfg(feature = "check_complete_parse")] {
            fn try_decode<U, P>(inp: U) -> DecodeResult<()>
            where
                P: Parser,
                U: TryIntoParser<P>,
                DecodeError: From<U::Error>,
            {
                let p: P = inp.try_into_parser()?;
                match p.remainder() {
                    0 => Ok(()),
                    residual => Err(DecodeError::NonEmpty { residual }),
                }
            }
        } else {
            fn try_decode<U, P>(inp: U) -> DecodeResult<()>
            where
                P: Parser,
                U: TryIntoParser<P>,
                DecodeError: From<U::Error>,
            {
                let _: P = inp.try_into_parser()?;
                Ok(())
            }
        }
    }
}

impl Encode for bool {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        buf.push_one(u8::from(*self)) + crate::resolve_zero!(buf)
    }
}

impl Decode for bool {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        p.take_bool()
    }
}

macro_rules! impl_fixed_int {
    ( $( $t:ty => $take:ident ),+ $(,)? ) => {
        $(
            impl Encode for $t {
                #[inline]
                fn write_to<U: Target>(&self, buf: &mut U) -> usize {
                    buf.push_many(self.to_le_bytes()) + crate::resolve_zero!(buf)
                }
            }

            impl Decode for $t {
                #[inline]
                fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
                    p.$take()
                }
            }
        )+
    };
}

impl_fixed_int! {
    u8 => take_u8,
    i8 => take_i8,
    u16 => take_u16,
    i16 => take_i16,
    u32 => take_u32,
    i32 => take_i32,
    u64 => take_u64,
    i64 => take_i64,
    u128 => take_u128,
}
