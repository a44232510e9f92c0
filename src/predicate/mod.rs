//! Transmissible filters
//!
//! A filter over values of a type `T` is a tree whose shape follows `T`
//! itself: the projection predicate of `T` has one variant per sub-field
//! (carrying a projection predicate of that field's type) and a single `Atom`
//! variant for conditions on `T` as a whole. [`CompoundPredicate`] combines
//! such trees with AND, OR and NOT.
//!
//! ```
//! use ledger_model::model::DomainId;
//! use ledger_model::predicate::{CompoundPredicate, EvaluatePredicate};
//! use ledger_model::predicate::atoms::StringPredicateAtom;
//! use ledger_model::projection::{DomainIdProjectionPredicate, NameProjectionPredicate};
//!
//! let named = |s: &str| {
//!     CompoundPredicate::Atom(DomainIdProjectionPredicate::Name(
//!         NameProjectionPredicate::Atom(StringPredicateAtom::StartsWith(s.into())),
//!     ))
//! };
//! let filter = named("wonder") & !named("wonderland");
//!
//! let id = |s: &str| s.parse::<DomainId>().unwrap();
//! assert!(filter.applies(&id("wonders")));
//! assert!(!filter.applies(&id("wonderland")));
//! assert!(!filter.applies(&id("garden")));
//! ```
//!
//! Types for which no whole-value condition is defined (entities such as
//! `Domain` or `Account`) have an uninhabited atom type: a predicate naming
//! such an atom cannot be built in Rust, and a decoder rejects its tag
//! before anything is evaluated.

pub mod atoms;

use crate::{Decode, Encode};

/// Evaluation of a predicate against a value of `T`.
///
/// Implementations must be pure.
pub trait EvaluatePredicate<T: ?Sized> {
    fn applies(&self, input: &T) -> bool;
}

/// Boolean combination of atomic predicates `P`
///
/// `And(vec![])` holds for every input and `Or(vec![])` for none; see
/// [`CompoundPredicate::PASS`] and [`CompoundPredicate::FAIL`].
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum CompoundPredicate<P> {
    #[codec(tag = 0)]
    Atom(P),
    #[codec(tag = 1)]
    Not(Box<CompoundPredicate<P>>),
    #[codec(tag = 2)]
    And(Vec<CompoundPredicate<P>>),
    #[codec(tag = 3)]
    Or(Vec<CompoundPredicate<P>>),
}

impl<P> CompoundPredicate<P> {
    /// Holds for every input
    pub const PASS: Self = Self::And(Vec::new());

    /// Holds for no input
    pub const FAIL: Self = Self::Or(Vec::new());

    /// Conjunction, flattening nested conjunctions.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::And(mut lhs), Self::And(rhs)) => {
                lhs.extend(rhs);
                Self::And(lhs)
            }
            (Self::And(mut lhs), rhs) => {
                lhs.push(rhs);
                Self::And(lhs)
            }
            (lhs, Self::And(mut rhs)) => {
                rhs.insert(0, lhs);
                Self::And(rhs)
            }
            (lhs, rhs) => Self::And(vec![lhs, rhs]),
        }
    }

    /// Disjunction, flattening nested disjunctions.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::Or(mut lhs), Self::Or(rhs)) => {
                lhs.extend(rhs);
                Self::Or(lhs)
            }
            (Self::Or(mut lhs), rhs) => {
                lhs.push(rhs);
                Self::Or(lhs)
            }
            (lhs, Self::Or(mut rhs)) => {
                rhs.insert(0, lhs);
                Self::Or(rhs)
            }
            (lhs, rhs) => Self::Or(vec![lhs, rhs]),
        }
    }

    /// Negation; a double negation cancels out.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }

    /// Rewrites every atom through `f`, keeping the boolean structure.
    pub fn map_atoms<Q, F>(self, f: &mut F) -> CompoundPredicate<Q>
    where
        F: FnMut(P) -> Q,
    {
        match self {
            Self::Atom(p) => CompoundPredicate::Atom(f(p)),
            Self::Not(inner) => CompoundPredicate::Not(Box::new(inner.map_atoms(f))),
            Self::And(all) => CompoundPredicate::And(all.into_iter().map(|p| p.map_atoms(f)).collect()),
            Self::Or(any) => CompoundPredicate::Or(any.into_iter().map(|p| p.map_atoms(f)).collect()),
        }
    }

    /// Number of nodes in the tree
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Atom(_) => 1,
            Self::Not(inner) => 1 + inner.size(),
            Self::And(children) | Self::Or(children) => {
                1 + children.iter().map(Self::size).sum::<usize>()
            }
        }
    }
}

impl<P> Default for CompoundPredicate<P> {
    fn default() -> Self {
        Self::PASS
    }
}

impl<P> From<P> for CompoundPredicate<P> {
    fn from(atom: P) -> Self {
        Self::Atom(atom)
    }
}

impl<P> std::ops::BitAnd for CompoundPredicate<P> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.and(rhs)
    }
}

impl<P> std::ops::BitOr for CompoundPredicate<P> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.or(rhs)
    }
}

impl<P> std::ops::Not for CompoundPredicate<P> {
    type Output = Self;

    fn not(self) -> Self {
        self.negate()
    }
}

impl<T: ?Sized, P: EvaluatePredicate<T>> EvaluatePredicate<T> for CompoundPredicate<P> {
    fn applies(&self, input: &T) -> bool {
        match self {
            Self::Atom(atom) => atom.applies(input),
            Self::Not(inner) => !inner.applies(input),
            Self::And(all) => all.iter().all(|p| p.applies(input)),
            Self::Or(any) => any.iter().any(|p| p.applies(input)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{hex, HexString};

    #[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
    enum Parity {
        #[codec(tag = 0)]
        Even,
        #[codec(tag = 1)]
        Odd,
    }

    impl EvaluatePredicate<u32> for Parity {
        fn applies(&self, input: &u32) -> bool {
            match self {
                Parity::Even => input % 2 == 0,
                Parity::Odd => input % 2 == 1,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
    enum Never {}

    type P = CompoundPredicate<Parity>;

    #[test]
    fn identities() {
        for n in 0u32..4 {
            assert!(P::PASS.applies(&n));
            assert!(!P::FAIL.applies(&n));
            let even = P::Atom(Parity::Even);
            assert_eq!(P::Not(Box::new(even.clone())).applies(&n), !even.applies(&n));
        }
    }

    #[test]
    fn combinators_flatten() {
        let even = || P::Atom(Parity::Even);
        let odd = || P::Atom(Parity::Odd);
        let conj = even() & odd() & even();
        assert_eq!(conj, P::And(vec![even(), odd(), even()]));
        let disj = (even() | odd()) | (odd() | even());
        assert_eq!(disj, P::Or(vec![even(), odd(), odd(), even()]));
        assert_eq!(!!even(), even());
        assert!(disj.applies(&3));
        assert!(!conj.applies(&2));
        assert_eq!(P::PASS & even(), P::And(vec![even()]));
        assert_eq!(conj.size(), 4);
    }

    #[test]
    fn wire_form() {
        let p = !(P::Atom(Parity::Odd) | P::FAIL);
        // Not, Or of [Atom(Odd)], since FAIL is absorbed as an empty Or
        assert_eq!(p.encode::<HexString>(), hex!("0103040001"));
        assert_eq!(P::decode(hex!("0103040001")), p);
        assert_eq!(P::PASS.encode::<HexString>(), hex!("0200"));
    }

    #[test]
    fn uninhabited_atom_rejected_on_decode() {
        type N = CompoundPredicate<Never>;
        assert_eq!(N::decode(hex!("0200")), N::PASS);
        let err = N::try_decode::<_, crate::ByteParser>(hex!("0000")).unwrap_err();
        assert!(err.is_unknown_variant());
        // nested under Not and And
        let err = N::try_decode::<_, crate::ByteParser>(hex!("0102040000")).unwrap_err();
        assert!(err.is_unknown_variant());
    }
}
