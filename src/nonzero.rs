//! Non-zero-constrained wrapper
//!
//! [`NonZero<T>`] shares the wire form of `T`; it only narrows the set of
//! admissible values. Construction from zero fails, and so does decoding
//! a zero.

use std::fmt::{Debug, Display};

use crate::conv::{target::Target, Decode, Encode};
use crate::error::ConstraintError;
use crate::parse::{ParseResult, Parser};

/// Types with a distinguished zero value.
pub trait IsZero {
    fn is_zero(&self) -> bool;
}

macro_rules! impl_is_zero {
    ( $( $t:ty ),+ ) => {
        $(
            impl IsZero for $t {
                #[inline]
                fn is_zero(&self) -> bool {
                    *self == 0
                }
            }
        )+
    };
}

impl_is_zero!(u8, u16, u32, u64, u128, i8, i16, i32, i64);

/// A value of `T` that is statically known not to be zero.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct NonZero<T>(T);

impl<T: IsZero> NonZero<T> {
    /// Wraps `value`, failing with [`ConstraintError::Zero`] if it is zero.
    pub fn new(value: T) -> Result<Self, ConstraintError> {
        if value.is_zero() {
            Err(ConstraintError::Zero {
                type_name: std::any::type_name::<Self>(),
            })
        } else {
            Ok(Self(value))
        }
    }

    pub fn get(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Copy> NonZero<T> {
    pub fn value(&self) -> T {
        self.0
    }
}

impl<T: Debug> Debug for NonZero<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("NonZero").field(&self.0).finish()
    }
}

impl<T: Display> Display for NonZero<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<T: Encode> Encode for NonZero<T> {
    #[inline]
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.0.write_to(buf)
    }
}

impl<T: Decode + IsZero> Decode for NonZero<T> {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        Ok(Self::new(T::parse(p)?)?)
    }
}

#[cfg(feature = "serde_impls")]
impl<T: serde::Serialize> serde::Serialize for NonZero<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Rejects zero, exactly as [`NonZero::new`] does.
#[cfg(feature = "serde_impls")]
impl<'de, T: serde::Deserialize<'de> + IsZero> serde::Deserialize<'de> for NonZero<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = T::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compact::Compact;
    use crate::parse::ByteParser;
    use crate::{hex, HexString};

    #[test]
    fn zero_rejected_at_construction() {
        assert_eq!(
            NonZero::new(0u64),
            Err(ConstraintError::Zero {
                type_name: std::any::type_name::<NonZero<u64>>()
            })
        );
        assert!(NonZero::new(Compact(0u32)).is_err());
    }

    #[test]
    fn five_round_trips() {
        let five = NonZero::new(5u64).unwrap();
        let bytes = five.encode::<HexString>();
        assert_eq!(bytes, hex!("0500000000000000"));
        assert_eq!(NonZero::<u64>::decode(bytes).value(), 5);
    }

    #[test]
    fn zero_rejected_at_decode() {
        let err = NonZero::<u64>::try_decode::<_, ByteParser>(hex!("0000000000000000")).unwrap_err();
        assert!(err.is_constraint_violation());
        let err = NonZero::<Compact<u32>>::try_decode::<_, ByteParser>(hex!("00")).unwrap_err();
        assert!(err.is_constraint_violation());
    }

    #[cfg(feature = "serde_impls")]
    #[test]
    fn text_form_rejects_zero() {
        let seven: NonZero<u32> = serde_json::from_str("7").unwrap();
        assert_eq!(seven.value(), 7);
        assert_eq!(serde_json::to_string(&seven).unwrap(), "7");
        let err = serde_json::from_str::<NonZero<u32>>("0").unwrap_err();
        assert!(err.to_string().contains("zero"), "{err}");
    }
}
