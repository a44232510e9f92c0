//! Bitmap-encoded flag sets
//!
//! Event filters subscribe to a *set* of event kinds drawn from a fixed
//! alphabet. Such sets are written as a single unsigned integer in which each
//! member of the alphabet owns one bit. [`bitmap_set!`](crate::bitmap_set)
//! declares both the flag enum and the set type:
//!
//! ```
//! use ledger_model::{bitmap_set, Decode, Encode};
//!
//! bitmap_set! {
//!     /// Kinds of change to a ledger entry
//!     pub ChangeSet of Change: u32 {
//!         Created = 1 << 0,
//!         Deleted = 1 << 1,
//!         Renamed = 1 << 2,
//!     }
//! }
//!
//! let set = ChangeSet::from_iter([Change::Created, Change::Renamed]);
//! assert_eq!(set.bits(), 0b101);
//! assert_eq!(set.to_bytes(), vec![0x05, 0x00, 0x00, 0x00]);
//! assert!(ChangeSet::from_bits(0b1000).is_err());
//! assert_eq!(ChangeSet::decode(vec![0x05, 0, 0, 0]), set);
//! ```
//!
//! Bits outside the declared alphabet are never silently dropped: both
//! [`from_bits`](#method.from_bits) and decoding reject them with
//! [`ConstraintError::UnknownFlags`](crate::error::ConstraintError::UnknownFlags).

/// Declares a flag enum and a bitmap-backed set of its members.
///
/// Every flag value must be a distinct power of two that fits the backing
/// integer (one of `u8`, `u16`, `u32`, `u64`). Iteration follows declaration
/// order.
#[macro_export]
macro_rules! bitmap_set {
    (
        $( #[$meta:meta] )*
        $vis:vis $set:ident of $flag:ident : $repr:ident {
            $( $( #[$vmeta:meta] )* $variant:ident = $bit:expr ),+ $(,)?
        }
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr($repr)]
        $vis enum $flag {
            $( $( #[$vmeta] )* $variant = $bit ),+
        }

        const _: () = {
            let mut seen: u64 = 0;
            $(
                assert!(($flag::$variant as u64).is_power_of_two(), "flag value must be a power of two");
                assert!(seen & ($flag::$variant as u64) == 0, "flag values must be distinct");
                seen |= $flag::$variant as u64;
            )+
            let _ = seen;
        };

        impl $flag {
            /// Every member of the alphabet, in declaration order
            pub const ALL: &'static [$flag] = &[ $( $flag::$variant ),+ ];

            #[inline]
            pub const fn bit(self) -> $repr {
                self as $repr
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $( $flag::$variant => stringify!($variant) ),+
                }
            }
        }

        $( #[$meta] )*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        $vis struct $set {
            bits: $repr,
        }

        impl $set {
            /// Union of every declared flag bit
            pub const MASK: $repr = 0 $( | ($flag::$variant as $repr) )+;

            #[must_use]
            pub const fn empty() -> Self {
                Self { bits: 0 }
            }

            #[must_use]
            pub const fn all() -> Self {
                Self { bits: Self::MASK }
            }

            /// Interprets a raw bitmask, rejecting any bit outside the alphabet.
            pub fn from_bits(bits: $repr) -> ::std::result::Result<Self, $crate::error::ConstraintError> {
                let unknown = bits & !Self::MASK;
                if unknown != 0 {
                    return Err($crate::error::ConstraintError::UnknownFlags {
                        type_name: stringify!($set),
                        bits: unknown as u64,
                    });
                }
                Ok(Self { bits })
            }

            #[inline]
            pub const fn bits(&self) -> $repr {
                self.bits
            }

            pub const fn contains(&self, flag: $flag) -> bool {
                self.bits & flag.bit() != 0
            }

            /// Adds `flag`, returning `false` if it was already present.
            pub fn insert(&mut self, flag: $flag) -> bool {
                let fresh = !self.contains(flag);
                self.bits |= flag.bit();
                fresh
            }

            /// Removes `flag`, returning `false` if it was absent.
            pub fn remove(&mut self, flag: $flag) -> bool {
                let present = self.contains(flag);
                self.bits &= !flag.bit();
                present
            }

            #[must_use]
            pub const fn union(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }

            #[must_use]
            pub const fn intersection(self, other: Self) -> Self {
                Self { bits: self.bits & other.bits }
            }

            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }

            pub fn len(&self) -> usize {
                self.bits.count_ones() as usize
            }

            /// Iterates over the members of the set, in declaration order.
            pub fn iter(&self) -> impl Iterator<Item = $flag> + '_ {
                $flag::ALL.iter().copied().filter(move |flag| self.contains(*flag))
            }
        }

        impl ::std::fmt::Debug for $set {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_set().entries(self.iter().map($flag::name)).finish()
            }
        }

        impl ::std::convert::From<$flag> for $set {
            fn from(flag: $flag) -> Self {
                Self { bits: flag.bit() }
            }
        }

        impl ::std::iter::FromIterator<$flag> for $set {
            fn from_iter<I: ::std::iter::IntoIterator<Item = $flag>>(iter: I) -> Self {
                let mut set = Self::empty();
                for flag in iter {
                    set.insert(flag);
                }
                set
            }
        }

        impl ::std::ops::BitOr for $set {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                self.union(rhs)
            }
        }

        impl ::std::ops::BitAnd for $set {
            type Output = Self;

            fn bitand(self, rhs: Self) -> Self {
                self.intersection(rhs)
            }
        }

        impl $crate::conv::Encode for $set {
            fn write_to<U: $crate::conv::target::Target>(&self, buf: &mut U) -> usize {
                $crate::conv::Encode::write_to(&self.bits, buf)
            }
        }

        impl $crate::conv::Decode for $set {
            fn parse<P: $crate::parse::Parser>(p: &mut P) -> $crate::parse::ParseResult<Self> {
                let bits = <$repr as $crate::conv::Decode>::parse(p)?;
                Ok(Self::from_bits(bits)?)
            }
        }
    };
}

#[cfg(test)]
mod test {
    use crate::conv::{Decode, Encode};
    use crate::error::ConstraintError;
    use crate::{hex, HexString};

    crate::bitmap_set! {
        pub(crate) TinySet of Tiny: u8 {
            A = 1,
            B = 2,
            D = 8,
        }
    }

    #[test]
    fn set_operations() {
        let mut set = TinySet::empty();
        assert!(set.insert(Tiny::D));
        assert!(!set.insert(Tiny::D));
        assert!(set.insert(Tiny::A));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Tiny::A, Tiny::D]);
        assert_eq!(set.len(), 2);
        assert!(set.remove(Tiny::A));
        assert!(!set.contains(Tiny::A));
        assert_eq!(TinySet::from(Tiny::B) | set, TinySet::from_iter([Tiny::B, Tiny::D]));
        assert_eq!(TinySet::all() & set, set);
        assert_eq!(TinySet::all().bits(), 0b1011);
        assert_eq!(format!("{:?}", TinySet::all()), r#"{"A", "B", "D"}"#);
    }

    #[test]
    fn every_subset_round_trips() {
        for bits in 0u8..=u8::MAX {
            match TinySet::from_bits(bits) {
                Ok(set) => {
                    assert_eq!(bits & !TinySet::MASK, 0);
                    assert_eq!(TinySet::decode(set.to_bytes()), set);
                }
                Err(err) => {
                    assert_ne!(bits & !TinySet::MASK, 0);
                    assert_eq!(
                        err,
                        ConstraintError::UnknownFlags {
                            type_name: "TinySet",
                            bits: u64::from(bits & !TinySet::MASK)
                        }
                    );
                }
            }
        }
    }

    #[test]
    fn unknown_bit_rejected_on_decode() {
        assert_eq!(TinySet::from_iter([Tiny::A, Tiny::D]).encode::<HexString>(), hex!("09"));
        let err = TinySet::try_decode::<_, crate::ByteParser>(hex!("04")).unwrap_err();
        assert!(err.is_constraint_violation());
    }
}
