//! Registry of wire discriminant tables
//!
//! Every union type of the catalogue is listed here by name, together with
//! its `(variant, tag)` table as reported by
//! [`Discriminant`](crate::adt::Discriminant). The registry is built on first
//! use and is immutable afterwards.
//!
//! ```
//! use ledger_model::schema;
//!
//! let table = schema::lookup("InstructionBox").unwrap();
//! assert_eq!(table.tag_of("Log"), Some(12));
//! assert_eq!(table.variant_of(14), Some("Sequence"));
//! assert!(schema::lookup("NoSuchType").is_none());
//! ```

use std::collections::BTreeMap;

use lazy_static::lazy_static;

use crate::adt::Discriminant;
use crate::model::events::DataEventFilter;
use crate::model::isi::{
    BurnBox, GrantBox, InstructionBox, Level, MintBox, RegisterBox, RemoveKeyValueBox, RevokeBox,
    SetKeyValueBox, TransferBox, UnregisterBox,
};
use crate::model::{
    Algorithm, AssetType, AssetValue, Executable, Mintable, SignedBlock, SignedTransaction,
    SocketAddr, TransactionRejectionReason,
};
use crate::predicate::atoms::{AssetValuePredicateAtom, NumericPredicateAtom, StringPredicateAtom};
use crate::query::{
    FindError, QueryBox, QueryExecutionFail, QueryRequest, QueryResponse, SignedQuery,
    SingularQueryBox, SingularQueryOutputBox,
};
use crate::selector::{QueryOutputBatchBox, SelectedValue};

/// Discriminant table of one union type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnionSchema {
    pub name: &'static str,
    pub variants: &'static [(&'static str, u8)],
}

impl UnionSchema {
    fn of<T: Discriminant>(name: &'static str) -> Self {
        Self {
            name,
            variants: T::VARIANTS,
        }
    }

    #[must_use]
    pub fn tag_of(&self, variant: &str) -> Option<u8> {
        self.variants
            .iter()
            .find_map(|&(name, tag)| (name == variant).then_some(tag))
    }

    #[must_use]
    pub fn variant_of(&self, tag: u8) -> Option<&'static str> {
        self.variants
            .iter()
            .find_map(|&(name, t)| (t == tag).then_some(name))
    }
}

macro_rules! union_schemas {
    ( $( $t:ident ),+ $(,)? ) => {
        vec![ $( UnionSchema::of::<$t>(stringify!($t)) ),+ ]
    };
}

lazy_static! {
    static ref REGISTRY: BTreeMap<&'static str, UnionSchema> = union_schemas![
        Algorithm,
        AssetType,
        AssetValue,
        Mintable,
        SocketAddr,
        Level,
        RegisterBox,
        UnregisterBox,
        MintBox,
        BurnBox,
        TransferBox,
        SetKeyValueBox,
        RemoveKeyValueBox,
        GrantBox,
        RevokeBox,
        InstructionBox,
        Executable,
        SignedTransaction,
        TransactionRejectionReason,
        SignedBlock,
        DataEventFilter,
        StringPredicateAtom,
        NumericPredicateAtom,
        AssetValuePredicateAtom,
        SelectedValue,
        QueryOutputBatchBox,
        QueryBox,
        SingularQueryBox,
        SingularQueryOutputBox,
        QueryRequest,
        QueryResponse,
        SignedQuery,
        FindError,
        QueryExecutionFail,
    ]
    .into_iter()
    .map(|schema| (schema.name, schema))
    .collect();
}

/// Looks up the discriminant table of the union type called `name`.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static UnionSchema> {
    REGISTRY.get(name)
}

/// Every registered table, ordered by type name
pub fn registered() -> impl Iterator<Item = &'static UnionSchema> {
    REGISTRY.values()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tables_match_declared_tags() {
        let fail = lookup("QueryExecutionFail").unwrap();
        assert_eq!(fail.tag_of("CapacityLimit"), Some(7));
        assert_eq!(lookup("SignedQuery").unwrap().variants, &[("V1", 1)]);
        assert_eq!(lookup("FindError").unwrap().variant_of(8), None);
    }

    #[test]
    fn registry_is_sorted_and_unique() {
        let names: Vec<&str> = registered().map(|schema| schema.name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(names, sorted);
        assert!(names.len() >= 30);
        for schema in registered() {
            let mut tags: Vec<u8> = schema.variants.iter().map(|&(_, tag)| tag).collect();
            tags.sort_unstable();
            tags.dedup();
            assert_eq!(tags.len(), schema.variants.len(), "{}", schema.name);
        }
    }
}
