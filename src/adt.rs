//! Discriminated unions
//!
//! Every enum deriving [`Encode`](crate::conv::Encode) is written as a
//! one-byte wire tag followed by the payload of the active variant. The tag of
//! each variant is fixed with `#[codec(tag = N)]`; a variant without the
//! attribute takes its declaration position. Tags need not be contiguous, and
//! must never be renumbered once published.
//!
//! ```
//! use ledger_model::{adt::Discriminant, Decode, Encode};
//!
//! #[derive(Debug, PartialEq, Encode, Decode)]
//! enum Versioned {
//!     #[codec(tag = 1)]
//!     V1(u8),
//! }
//!
//! assert_eq!(Versioned::V1(7).to_bytes(), vec![0x01, 0x07]);
//! assert_eq!(Versioned::VARIANTS, &[("V1", 1)]);
//! assert!(Versioned::try_decode::<_, ledger_model::ByteParser>(vec![0x00, 0x07]).is_err());
//! ```
//!
//! The derive also implements [`Discriminant`], which exposes the table of
//! the enum at runtime; [`crate::schema`] collects these tables by type name.

/// Runtime view of the discriminant table of a union type
pub trait Discriminant {
    /// `(variant name, wire tag)` pairs, in declaration order
    const VARIANTS: &'static [(&'static str, u8)];

    /// Returns the wire tag of the active variant
    fn discriminant(&self) -> u8;

    /// Returns the name of the active variant
    fn variant_name(&self) -> &'static str {
        let tag = self.discriminant();
        Self::VARIANTS
            .iter()
            .find_map(|&(name, t)| (t == tag).then_some(name))
            .unwrap_or("<unknown>")
    }

    /// Looks up the tag assigned to the variant called `name`
    fn tag_of(name: &str) -> Option<u8> {
        Self::VARIANTS
            .iter()
            .find_map(|&(n, tag)| (n == name).then_some(tag))
    }

    /// Returns every valid wire tag, in declaration order
    fn tags() -> Vec<u8> {
        Self::VARIANTS.iter().map(|&(_, tag)| tag).collect()
    }

    /// Returns `true` if the type has no constructible variants
    fn is_uninhabited() -> bool {
        Self::VARIANTS.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Decode, Encode};
    use crate::parse::ByteParser;
    use crate::{hex, HexString};

    #[derive(Debug, PartialEq, Encode, Decode)]
    enum Sparse {
        #[codec(tag = 0)]
        Zero,
        #[codec(tag = 7)]
        Seven(u16),
        #[codec(tag = 3)]
        Three { flag: bool, name: String },
    }

    #[derive(Debug, PartialEq, Encode, Decode)]
    enum Positional {
        First,
        Second(u8),
    }

    #[derive(Debug, PartialEq, Encode, Decode)]
    enum Never {}

    #[derive(Debug, PartialEq, Encode, Decode)]
    enum SignedEnvelope {
        #[codec(tag = 1)]
        V1(String),
    }

    #[test]
    fn explicit_tags_on_the_wire() {
        assert_eq!(Sparse::Zero.encode::<HexString>(), hex!("00"));
        assert_eq!(Sparse::Seven(0x0102).encode::<HexString>(), hex!("070201"));
        assert_eq!(
            Sparse::Three { flag: true, name: "a".into() }.encode::<HexString>(),
            hex!("03010461")
        );
        assert_eq!(Sparse::decode(hex!("070201")), Sparse::Seven(0x0102));
        assert_eq!(Positional::Second(9).encode::<HexString>(), hex!("0109"));
    }

    #[test]
    fn table_introspection() {
        assert_eq!(Sparse::VARIANTS, &[("Zero", 0), ("Seven", 7), ("Three", 3)]);
        assert_eq!(Sparse::tag_of("Three"), Some(3));
        assert_eq!(Sparse::tag_of("Four"), None);
        assert_eq!(Sparse::Seven(1).variant_name(), "Seven");
        assert_eq!(Positional::tags(), vec![0, 1]);
        assert!(Never::is_uninhabited());
    }

    #[test]
    fn unknown_tag_is_reported() {
        let err = Sparse::try_decode::<_, ByteParser>(hex!("05")).unwrap_err();
        assert!(err.is_unknown_variant());
        let msg = err.to_string();
        assert!(msg.contains("Sparse"), "{msg}");
    }

    #[test]
    fn single_variant_envelope() {
        let v = SignedEnvelope::V1("x".into());
        assert_eq!(v.encode::<HexString>(), hex!("010478"));
        assert_eq!(SignedEnvelope::decode(hex!("010478")), v);
        let err = SignedEnvelope::try_decode::<_, ByteParser>(hex!("000478")).unwrap_err();
        assert!(err.is_unknown_variant());
    }

    #[test]
    fn uninhabited_never_decodes() {
        for byte in [0x00u8, 0x01, 0xff] {
            let err = Never::try_decode::<_, ByteParser>(vec![byte]).unwrap_err();
            assert!(err.is_unknown_variant());
        }
    }
}
