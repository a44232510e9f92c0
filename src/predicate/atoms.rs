//! Whole-value conditions at the leaves of projection predicates

use std::cmp::Ordering;

use super::EvaluatePredicate;
use crate::model::{
    Account, AccountId, Asset, AssetDefinition, AssetDefinitionId, AssetId, AssetValue,
    BlockHeader, Domain, DomainId, Hash, Json, Metadata, Name, Numeric, PeerId, Permission,
    PublicKey, Role, RoleId,
};
use crate::{Decode, Encode};

/// Conditions on text
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum StringPredicateAtom {
    #[codec(tag = 0)]
    Equals(String),
    #[codec(tag = 1)]
    Contains(String),
    #[codec(tag = 2)]
    StartsWith(String),
    #[codec(tag = 3)]
    EndsWith(String),
}

impl EvaluatePredicate<str> for StringPredicateAtom {
    fn applies(&self, input: &str) -> bool {
        match self {
            Self::Equals(s) => input == s,
            Self::Contains(s) => input.contains(s.as_str()),
            Self::StartsWith(s) => input.starts_with(s.as_str()),
            Self::EndsWith(s) => input.ends_with(s.as_str()),
        }
    }
}

impl EvaluatePredicate<String> for StringPredicateAtom {
    fn applies(&self, input: &String) -> bool {
        <Self as EvaluatePredicate<str>>::applies(self, input)
    }
}

impl EvaluatePredicate<Name> for StringPredicateAtom {
    fn applies(&self, input: &Name) -> bool {
        <Self as EvaluatePredicate<str>>::applies(self, input.as_str())
    }
}

/// Comparisons of decimal values, exact across scales
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum NumericPredicateAtom {
    #[codec(tag = 0)]
    Equals(Numeric),
    #[codec(tag = 1)]
    LessThan(Numeric),
    #[codec(tag = 2)]
    LessOrEqual(Numeric),
    #[codec(tag = 3)]
    GreaterThan(Numeric),
    #[codec(tag = 4)]
    GreaterOrEqual(Numeric),
}

impl EvaluatePredicate<Numeric> for NumericPredicateAtom {
    fn applies(&self, input: &Numeric) -> bool {
        match self {
            Self::Equals(n) => input.cmp_value(n) == Ordering::Equal,
            Self::LessThan(n) => input.cmp_value(n) == Ordering::Less,
            Self::LessOrEqual(n) => input.cmp_value(n) != Ordering::Greater,
            Self::GreaterThan(n) => input.cmp_value(n) == Ordering::Greater,
            Self::GreaterOrEqual(n) => input.cmp_value(n) != Ordering::Less,
        }
    }
}

/// Equality on JSON values, insensitive to formatting
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum JsonPredicateAtom {
    #[codec(tag = 0)]
    Equals(Json),
}

impl EvaluatePredicate<Json> for JsonPredicateAtom {
    fn applies(&self, input: &Json) -> bool {
        match self {
            Self::Equals(expected) => input.same_value(expected),
        }
    }
}

/// Declares an atom whose only condition is equality with a given value.
macro_rules! equals_atom {
    ( $( $(#[$meta:meta])* $atom:ident : $t:ty ),+ $(,)? ) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
            pub enum $atom {
                #[codec(tag = 0)]
                Equals($t),
            }

            impl EvaluatePredicate<$t> for $atom {
                fn applies(&self, input: &$t) -> bool {
                    match self {
                        Self::Equals(expected) => input == expected,
                    }
                }
            }
        )+
    };
}

equals_atom! {
    PublicKeyPredicateAtom: PublicKey,
    HashPredicateAtom: Hash,
    DomainIdPredicateAtom: DomainId,
    AccountIdPredicateAtom: AccountId,
    AssetDefinitionIdPredicateAtom: AssetDefinitionId,
    AssetIdPredicateAtom: AssetId,
    RoleIdPredicateAtom: RoleId,
    PeerIdPredicateAtom: PeerId,
}

/// Distinguishes the kinds of asset value
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum AssetValuePredicateAtom {
    #[codec(tag = 0)]
    IsNumeric,
    #[codec(tag = 1)]
    IsStore,
}

impl EvaluatePredicate<AssetValue> for AssetValuePredicateAtom {
    fn applies(&self, input: &AssetValue) -> bool {
        matches!(
            (self, input),
            (Self::IsNumeric, AssetValue::Numeric(_)) | (Self::IsStore, AssetValue::Store(_))
        )
    }
}

/// Declares atoms with no variants, for types without whole-value conditions.
macro_rules! uninhabited_atom {
    ( $( $atom:ident : $t:ty ),+ $(,)? ) => {
        $(
            #[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
            pub enum $atom {}

            impl EvaluatePredicate<$t> for $atom {
                fn applies(&self, _input: &$t) -> bool {
                    match *self {}
                }
            }
        )+
    };
}

uninhabited_atom! {
    DomainPredicateAtom: Domain,
    AccountPredicateAtom: Account,
    AssetPredicateAtom: Asset,
    AssetDefinitionPredicateAtom: AssetDefinition,
    RolePredicateAtom: Role,
    PermissionPredicateAtom: Permission,
    BlockHeaderPredicateAtom: BlockHeader,
    MetadataPredicateAtom: Metadata,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::adt::Discriminant;

    #[test]
    fn string_conditions() {
        let name: Name = "alice".parse().unwrap();
        assert!(StringPredicateAtom::Equals("alice".into()).applies(&name));
        assert!(!StringPredicateAtom::Equals("bob".into()).applies(&name));
        assert!(StringPredicateAtom::Contains("lic".into()).applies(&name));
        assert!(StringPredicateAtom::StartsWith("al".into()).applies(&name));
        assert!(StringPredicateAtom::EndsWith("ce".into()).applies(&name));
        assert!(!StringPredicateAtom::EndsWith("al".into()).applies(&name));
        assert!(StringPredicateAtom::Contains(String::new()).applies(&String::new()));
    }

    #[test]
    fn numeric_conditions_cross_scale() {
        let one_point_five = Numeric::new(15, 1);
        assert!(NumericPredicateAtom::Equals(Numeric::new(150, 2)).applies(&one_point_five));
        assert!(NumericPredicateAtom::LessThan(Numeric::integer(2)).applies(&one_point_five));
        assert!(NumericPredicateAtom::LessOrEqual(Numeric::new(15, 1)).applies(&one_point_five));
        assert!(!NumericPredicateAtom::GreaterThan(Numeric::new(1500, 3)).applies(&one_point_five));
        assert!(NumericPredicateAtom::GreaterOrEqual(Numeric::integer(1)).applies(&one_point_five));
    }

    #[test]
    fn json_equality_ignores_formatting() {
        let atom = JsonPredicateAtom::Equals(Json::new(&serde_json::json!({"a": [1, 2]})));
        assert!(atom.applies(&r#"{ "a" : [1,2] }"#.parse::<Json>().unwrap()));
        assert!(!atom.applies(&Json::null()));
    }

    #[test]
    fn entity_atoms_are_uninhabited() {
        assert!(DomainPredicateAtom::is_uninhabited());
        assert!(MetadataPredicateAtom::is_uninhabited());
        assert!(!DomainIdPredicateAtom::is_uninhabited());
        assert_eq!(NumericPredicateAtom::tags(), vec![0, 1, 2, 3, 4]);
    }
}
