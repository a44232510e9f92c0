//! Per-type predicate and selector trees
//!
//! For every queryable type `T` this module defines two enums of the same
//! shape:
//!
//! - `TProjectionPredicate`, with `Atom(TPredicateAtom)` at tag 0 and one
//!   variant per projectable field, holding a predicate on that field;
//! - `TProjectionSelector`, with the unit `Atom` (select `T` itself) at tag 0
//!   and one variant per field, holding a selector on that field.
//!
//! Field tags start at 1 and are shared between the two trees. The
//! [`Projectable`] trait links a type to its pair.

use crate::model::{
    Account, AccountId, Asset, AssetDefinition, AssetDefinitionId, AssetId, AssetValue,
    BlockHeader, Domain, DomainId, Hash, Json, Metadata, Name, Numeric, PeerId, Permission,
    PublicKey, Role, RoleId,
};
use crate::predicate::atoms::{
    AccountIdPredicateAtom, AccountPredicateAtom, AssetDefinitionIdPredicateAtom,
    AssetDefinitionPredicateAtom, AssetIdPredicateAtom, AssetPredicateAtom,
    AssetValuePredicateAtom, BlockHeaderPredicateAtom, DomainIdPredicateAtom, DomainPredicateAtom,
    HashPredicateAtom, JsonPredicateAtom, MetadataPredicateAtom, NumericPredicateAtom,
    PeerIdPredicateAtom, PermissionPredicateAtom, PublicKeyPredicateAtom, RoleIdPredicateAtom,
    RolePredicateAtom, StringPredicateAtom,
};
use crate::predicate::{CompoundPredicate, EvaluatePredicate};
use crate::selector::{EvaluateSelector, QueryOutputBatchBox, SelectedKind, SelectedValue};
use crate::{Decode, Encode};

/// Types with a predicate tree and a selector tree
pub trait Projectable: SelectedKind + Clone {
    type Predicate: EvaluatePredicate<Self> + Encode + Decode + Clone + std::fmt::Debug + Eq;
    type Selector: EvaluateSelector<Self> + Encode + Decode + Clone + std::fmt::Debug + Eq + Default;
}

/// Compound predicate over the projection tree of `T`
pub type PredicateOf<T> = CompoundPredicate<<T as Projectable>::Predicate>;

/// Selector over the projection tree of `T`
pub type SelectorOf<T> = <T as Projectable>::Selector;

macro_rules! projections {
    ( $(
        $(#[$meta:meta])*
        $ty:ident => $pred:ident / $sel:ident {
            atom: $atom:ty
            $( , $field:ident ( $fty:ident ) = $tag:tt => $access:ident )* $(,)?
        }
    )+ ) => { $(
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
        pub enum $pred {
            #[codec(tag = 0)]
            Atom($atom),
            $(
                #[codec(tag = $tag)]
                $field(<$fty as Projectable>::Predicate),
            )*
        }

        impl EvaluatePredicate<$ty> for $pred {
            fn applies(&self, input: &$ty) -> bool {
                match self {
                    Self::Atom(atom) => atom.applies(input),
                    $( Self::$field(projection) => projection.applies(&input.$access), )*
                }
            }
        }

        #[derive(Debug, Clone, PartialEq, Eq, Default, Encode, Decode)]
        pub enum $sel {
            #[default]
            #[codec(tag = 0)]
            Atom,
            $(
                #[codec(tag = $tag)]
                $field(<$fty as Projectable>::Selector),
            )*
        }

        impl EvaluateSelector<$ty> for $sel {
            fn project(&self, input: &$ty) -> SelectedValue {
                match self {
                    Self::Atom => input.clone().into_value(),
                    $( Self::$field(projection) => projection.project(&input.$access), )*
                }
            }

            fn project_column<'a, I>(&self, items: I) -> QueryOutputBatchBox
            where
                I: Iterator<Item = &'a $ty>,
                $ty: 'a,
            {
                match self {
                    Self::Atom => <$ty as SelectedKind>::into_batch(items.cloned().collect()),
                    $(
                        Self::$field(projection) => {
                            projection.project_column(items.map(|item| &item.$access))
                        }
                    )*
                }
            }
        }

        impl Projectable for $ty {
            type Predicate = $pred;
            type Selector = $sel;
        }
    )+ };
}

projections! {
    Name => NameProjectionPredicate / NameProjectionSelector {
        atom: StringPredicateAtom
    }
    String => StringProjectionPredicate / StringProjectionSelector {
        atom: StringPredicateAtom
    }
    Json => JsonProjectionPredicate / JsonProjectionSelector {
        atom: JsonPredicateAtom
    }
    PublicKey => PublicKeyProjectionPredicate / PublicKeyProjectionSelector {
        atom: PublicKeyPredicateAtom
    }
    Numeric => NumericProjectionPredicate / NumericProjectionSelector {
        atom: NumericPredicateAtom
    }
    Hash => HashProjectionPredicate / HashProjectionSelector {
        atom: HashPredicateAtom
    }
    DomainId => DomainIdProjectionPredicate / DomainIdProjectionSelector {
        atom: DomainIdPredicateAtom,
        Name(Name) = 1 => name,
    }
    Domain => DomainProjectionPredicate / DomainProjectionSelector {
        atom: DomainPredicateAtom,
        Id(DomainId) = 1 => id,
        Metadata(Metadata) = 2 => metadata,
    }
    AccountId => AccountIdProjectionPredicate / AccountIdProjectionSelector {
        atom: AccountIdPredicateAtom,
        Domain(DomainId) = 1 => domain,
        Signatory(PublicKey) = 2 => signatory,
    }
    Account => AccountProjectionPredicate / AccountProjectionSelector {
        atom: AccountPredicateAtom,
        Id(AccountId) = 1 => id,
        Metadata(Metadata) = 2 => metadata,
    }
    AssetDefinitionId => AssetDefinitionIdProjectionPredicate / AssetDefinitionIdProjectionSelector {
        atom: AssetDefinitionIdPredicateAtom,
        Domain(DomainId) = 1 => domain,
        Name(Name) = 2 => name,
    }
    AssetDefinition => AssetDefinitionProjectionPredicate / AssetDefinitionProjectionSelector {
        atom: AssetDefinitionPredicateAtom,
        Id(AssetDefinitionId) = 1 => id,
        Metadata(Metadata) = 2 => metadata,
        OwnedBy(AccountId) = 3 => owned_by,
        TotalQuantity(Numeric) = 4 => total_quantity,
    }
    AssetId => AssetIdProjectionPredicate / AssetIdProjectionSelector {
        atom: AssetIdPredicateAtom,
        Account(AccountId) = 1 => account,
        Definition(AssetDefinitionId) = 2 => definition,
    }
    Asset => AssetProjectionPredicate / AssetProjectionSelector {
        atom: AssetPredicateAtom,
        Id(AssetId) = 1 => id,
        Value(AssetValue) = 2 => value,
    }
    RoleId => RoleIdProjectionPredicate / RoleIdProjectionSelector {
        atom: RoleIdPredicateAtom,
        Name(Name) = 1 => name,
    }
    Role => RoleProjectionPredicate / RoleProjectionSelector {
        atom: RolePredicateAtom,
        Id(RoleId) = 1 => id,
    }
    Permission => PermissionProjectionPredicate / PermissionProjectionSelector {
        atom: PermissionPredicateAtom,
        Name(String) = 1 => name,
        Payload(Json) = 2 => payload,
    }
    PeerId => PeerIdProjectionPredicate / PeerIdProjectionSelector {
        atom: PeerIdPredicateAtom,
        PublicKey(PublicKey) = 1 => public_key,
    }
    BlockHeader => BlockHeaderProjectionPredicate / BlockHeaderProjectionSelector {
        atom: BlockHeaderPredicateAtom,
        TransactionsHash(Hash) = 1 => transactions_hash,
    }
}

/// Predicate on a metadata map
///
/// `Key` applies its projection to the value stored under `key`; a map
/// without that key does not satisfy it.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum MetadataProjectionPredicate {
    #[codec(tag = 0)]
    Atom(MetadataPredicateAtom),
    #[codec(tag = 1)]
    Key {
        key: Name,
        projection: JsonProjectionPredicate,
    },
}

impl EvaluatePredicate<Metadata> for MetadataProjectionPredicate {
    fn applies(&self, input: &Metadata) -> bool {
        match self {
            Self::Atom(atom) => atom.applies(input),
            Self::Key { key, projection } => input
                .get(key)
                .map_or(false, |value| projection.applies(value)),
        }
    }
}

/// Selector on a metadata map
///
/// `Key` projects the value stored under `key`, or JSON `null` where the map
/// has no such key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Encode, Decode)]
pub enum MetadataProjectionSelector {
    #[default]
    #[codec(tag = 0)]
    Atom,
    #[codec(tag = 1)]
    Key {
        key: Name,
        projection: JsonProjectionSelector,
    },
}

impl EvaluateSelector<Metadata> for MetadataProjectionSelector {
    fn project(&self, input: &Metadata) -> SelectedValue {
        match self {
            Self::Atom => input.clone().into_value(),
            Self::Key { key, projection } => match input.get(key) {
                Some(value) => projection.project(value),
                None => projection.project(&Json::null()),
            },
        }
    }

    fn project_column<'a, I>(&self, items: I) -> QueryOutputBatchBox
    where
        I: Iterator<Item = &'a Metadata>,
    {
        match self {
            Self::Atom => Metadata::into_batch(items.cloned().collect()),
            Self::Key { key, projection } => {
                let values: Vec<Json> = items
                    .map(|metadata| metadata.get(key).cloned().unwrap_or_else(Json::null))
                    .collect();
                projection.project_column(values.iter())
            }
        }
    }
}

impl Projectable for Metadata {
    type Predicate = MetadataProjectionPredicate;
    type Selector = MetadataProjectionSelector;
}

/// Predicate on an asset value, either on its kind or on the contents of one
/// kind; a case projection never holds for a value of the other kind.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum AssetValueProjectionPredicate {
    #[codec(tag = 0)]
    Atom(AssetValuePredicateAtom),
    #[codec(tag = 1)]
    Numeric(NumericProjectionPredicate),
    #[codec(tag = 2)]
    Store(MetadataProjectionPredicate),
}

impl EvaluatePredicate<AssetValue> for AssetValueProjectionPredicate {
    fn applies(&self, input: &AssetValue) -> bool {
        match (self, input) {
            (Self::Atom(atom), _) => atom.applies(input),
            (Self::Numeric(projection), AssetValue::Numeric(value)) => projection.applies(value),
            (Self::Store(projection), AssetValue::Store(store)) => projection.applies(store),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Encode, Decode)]
pub enum AssetValueProjectionSelector {
    #[default]
    #[codec(tag = 0)]
    Atom,
}

impl EvaluateSelector<AssetValue> for AssetValueProjectionSelector {
    fn project(&self, input: &AssetValue) -> SelectedValue {
        match self {
            Self::Atom => input.clone().into_value(),
        }
    }

    fn project_column<'a, I>(&self, items: I) -> QueryOutputBatchBox
    where
        I: Iterator<Item = &'a AssetValue>,
    {
        match self {
            Self::Atom => AssetValue::into_batch(items.cloned().collect()),
        }
    }
}

impl Projectable for AssetValue {
    type Predicate = AssetValueProjectionPredicate;
    type Selector = AssetValueProjectionSelector;
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::crypto::Algorithm;
    use crate::selector::SelectorTuple;
    use crate::{hex, HexString};

    fn key(seed: u8) -> PublicKey {
        PublicKey::new(Algorithm::Ed25519, vec![seed; 32])
    }

    fn account(seed: u8, domain: &str) -> AccountId {
        AccountId::new(domain.parse().unwrap(), key(seed))
    }

    fn domain(name: &str, metadata: &[(&str, serde_json::Value)]) -> Domain {
        Domain {
            id: name.parse().unwrap(),
            logo: None,
            metadata: metadata
                .iter()
                .map(|(k, v)| (k.parse().unwrap(), Json::new(v)))
                .collect(),
            owned_by: account(1, "genesis"),
        }
    }

    fn by_domain_name(atom: StringPredicateAtom) -> PredicateOf<Domain> {
        CompoundPredicate::Atom(DomainProjectionPredicate::Id(DomainIdProjectionPredicate::Name(
            NameProjectionPredicate::Atom(atom),
        )))
    }

    #[test]
    fn nested_name_equality() {
        let alice = domain("alice", &[]);
        let bob = domain("bob", &[]);
        let pred = by_domain_name(StringPredicateAtom::Equals("alice".into()));
        assert!(pred.applies(&alice));
        assert!(!pred.applies(&bob));
        assert!(!(!pred).applies(&alice));
    }

    #[test]
    fn predicate_wire_form() {
        let pred = by_domain_name(StringPredicateAtom::Equals("a".into()));
        // Atom, Id, Name, Atom, Equals("a")
        assert_eq!(pred.encode::<HexString>(), hex!("00010100000461"));
        assert_eq!(PredicateOf::<Domain>::decode(hex!("00010100000461")), pred);
        // an atom on a whole domain cannot be decoded
        assert!(PredicateOf::<Domain>::try_decode::<_, crate::ByteParser>(hex!("000000"))
            .unwrap_err()
            .is_unknown_variant());
    }

    #[test]
    fn metadata_key_predicate() {
        let tagged = domain("tagged", &[("tier", serde_json::json!(3))]);
        let plain = domain("plain", &[]);
        let has_tier_3 = CompoundPredicate::Atom(DomainProjectionPredicate::Metadata(
            MetadataProjectionPredicate::Key {
                key: "tier".parse().unwrap(),
                projection: JsonProjectionPredicate::Atom(JsonPredicateAtom::Equals(3u64.into())),
            },
        ));
        assert!(has_tier_3.applies(&tagged));
        assert!(!has_tier_3.applies(&plain));
        // the negation holds where the key is missing
        assert!((!has_tier_3).applies(&plain));
    }

    #[test]
    fn selector_identity_and_fields() {
        let d = domain("wonderland", &[("tier", serde_json::json!("gold"))]);
        assert_eq!(
            DomainProjectionSelector::Atom.project(&d),
            SelectedValue::Domain(d.clone())
        );
        assert_eq!(
            DomainProjectionSelector::Id(DomainIdProjectionSelector::Name(NameProjectionSelector::Atom))
                .project(&d),
            SelectedValue::Name("wonderland".parse().unwrap())
        );
        let missing = DomainProjectionSelector::Metadata(MetadataProjectionSelector::Key {
            key: "absent".parse().unwrap(),
            projection: JsonProjectionSelector::Atom,
        });
        assert_eq!(missing.project(&d), SelectedValue::Json(Json::null()));
    }

    #[test]
    fn selector_tuple_projects_columns() {
        let domains = vec![domain("a", &[]), domain("b", &[("k", serde_json::json!(1))])];
        let selectors = SelectorTuple::new(vec![
            DomainProjectionSelector::Id(DomainIdProjectionSelector::Atom),
            DomainProjectionSelector::Metadata(MetadataProjectionSelector::Key {
                key: "k".parse().unwrap(),
                projection: JsonProjectionSelector::Atom,
            }),
        ]);
        let batch = selectors.project_batch(&domains);
        assert_eq!(batch.width(), 2);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.tuple[1], QueryOutputBatchBox::Json(vec![Json::null(), 1u64.into()]));

        let empty = selectors.project_batch::<Domain>(&[]);
        assert_eq!(empty.tuple[0], QueryOutputBatchBox::DomainId(vec![]));
        assert!(empty.is_empty());
    }

    #[test]
    fn asset_value_cases() {
        let numeric = AssetValue::Numeric(Numeric::integer(10));
        let store = AssetValue::Store(Metadata::new());
        let big = AssetValueProjectionPredicate::Numeric(NumericProjectionPredicate::Atom(
            NumericPredicateAtom::GreaterThan(Numeric::integer(5)),
        ));
        assert!(big.applies(&numeric));
        assert!(!big.applies(&store));
        assert!(AssetValueProjectionPredicate::Atom(AssetValuePredicateAtom::IsStore).applies(&store));
    }

    #[test]
    fn shared_field_tags() {
        use crate::adt::Discriminant;
        assert_eq!(
            AssetDefinitionProjectionPredicate::tags(),
            AssetDefinitionProjectionSelector::tags()
        );
        assert_eq!(AccountIdProjectionSelector::default(), AccountIdProjectionSelector::Atom);
        assert_eq!(AccountIdProjectionSelector::Atom.encode::<HexString>(), hex!("00"));
        let signatory = AccountIdProjectionPredicate::Signatory(PublicKeyProjectionPredicate::Atom(
            PublicKeyPredicateAtom::Equals(key(9)),
        ));
        assert!(signatory.applies(&account(9, "wonderland")));
        assert!(!signatory.applies(&account(8, "wonderland")));
    }
}
