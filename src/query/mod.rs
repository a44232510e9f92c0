//! Query envelopes and the cursor protocol
//!
//! An iterable query is sent as a [`QueryWithFilter`], which pairs the query
//! proper with a predicate and a tuple of selectors over the projection tree
//! of the query's item type (see [`crate::projection`]). The [`QueryBox`]
//! table fixes, per query, which predicate and selector families are used.
//!
//! Results come back one page at a time. A page that is not the last carries
//! a [`ForwardCursor`]; sending it back in a [`QueryRequest::Continue`]
//! fetches the next page. A cursor is only good once: reusing it, or using it
//! after the last page, is a terminal failure and the query has to be started
//! over.
//!
//! [`store::LiveQueryStore`] is an in-memory server for this protocol, and
//! [`client::QueryExecutor`] drives it (or any other transport) from the
//! client side.

pub mod client;
pub mod fail;
pub mod store;
pub mod world;

use crate::model::{
    AccountId, AssetDefinitionId, AssetId, DomainId, Json, Name, Numeric, Signature,
};
use crate::nonzero::NonZero;
use crate::predicate::CompoundPredicate;
use crate::projection::{PredicateOf, Projectable, SelectorOf};
use crate::selector::{QueryOutputBatchBoxTuple, SelectorTuple};
use crate::{Decode, Encode};

pub use fail::{FindError, QueryExecutionFail};

use self::world::WorldSnapshot;

/// An iterable query, executed against a snapshot of the ledger state
pub trait IterableQuery: Sized {
    type Item: Projectable;

    /// Lists every item the query ranges over, before filtering.
    ///
    /// # Errors
    ///
    /// Fails with [`QueryExecutionFail::Find`] when the query names an entity
    /// that does not exist.
    fn execute(&self, world: &WorldSnapshot) -> Result<Vec<Self::Item>, QueryExecutionFail>;
}

/// An iterable query together with its filter and selectors
///
/// The defaults, [`CompoundPredicate::PASS`] and a single `Atom` selector,
/// return every item whole.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct QueryWithFilter<Q, P, S> {
    pub query: Q,
    pub predicate: CompoundPredicate<P>,
    pub selector: SelectorTuple<S>,
}

/// The filtered form of query `Q`, with the predicate and selector families
/// of its item type
pub type FilteredQuery<Q> = QueryWithFilter<
    Q,
    <<Q as IterableQuery>::Item as Projectable>::Predicate,
    <<Q as IterableQuery>::Item as Projectable>::Selector,
>;

impl<Q: IterableQuery> QueryWithFilter<Q, <Q::Item as Projectable>::Predicate, SelectorOf<Q::Item>> {
    #[must_use]
    pub fn new(query: Q) -> Self {
        Self {
            query,
            predicate: CompoundPredicate::PASS,
            selector: SelectorTuple::default(),
        }
    }

    /// Replaces the predicate.
    #[must_use]
    pub fn filter(mut self, predicate: PredicateOf<Q::Item>) -> Self {
        self.predicate = predicate;
        self
    }

    /// Replaces the selectors; the output gets one column per selector.
    #[must_use]
    pub fn select(mut self, selector: SelectorTuple<SelectorOf<Q::Item>>) -> Self {
        self.selector = selector;
        self
    }
}

macro_rules! unit_queries {
    ( $( $(#[$meta:meta])* $query:ident ),+ $(,)? ) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
            pub struct $query;
        )+
    };
}

unit_queries! {
    FindDomains,
    FindAccounts,
    FindAssets,
    FindAssetsDefinitions,
    FindRoles,
    FindPeers,
    /// Headers are listed from the latest block down.
    FindBlockHeaders,
}

/// Permissions granted directly to an account, not through its roles
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct FindPermissionsByAccountId {
    pub id: AccountId,
}

/// Accounts holding an asset of the given definition
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct FindAccountsWithAsset {
    pub asset_definition: AssetDefinitionId,
}

/// Declares the table of iterable queries: one variant per query, carrying
/// the filtered form of that query.
macro_rules! query_box {
    ( $( $variant:ident = $tag:tt ),+ $(,)? ) => {
        /// Tags 5, 7 and 10 to 13 are reserved.
        #[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
        pub enum QueryBox {
            $(
                #[codec(tag = $tag)]
                $variant(FilteredQuery<$variant>),
            )+
        }

        $(
            impl From<FilteredQuery<$variant>> for QueryBox {
                fn from(query: FilteredQuery<$variant>) -> Self {
                    Self::$variant(query)
                }
            }

            impl From<$variant> for QueryBox {
                fn from(query: $variant) -> Self {
                    Self::$variant(FilteredQuery::<$variant>::new(query))
                }
            }
        )+

        impl QueryBox {
            /// Name of the query
            #[must_use]
            pub fn query_name(&self) -> &'static str {
                match self {
                    $( Self::$variant(_) => stringify!($variant), )+
                }
            }

            /// Runs the query and projects the surviving items.
            pub(crate) fn run(
                &self,
                world: &WorldSnapshot,
                params: &QueryParams,
            ) -> Result<QueryOutputBatchBoxTuple, QueryExecutionFail> {
                match self {
                    $( Self::$variant(query) => world::run_filtered(query, world, params), )+
                }
            }
        }
    };
}

query_box! {
    FindDomains = 0,
    FindAccounts = 1,
    FindAssets = 2,
    FindAssetsDefinitions = 3,
    FindRoles = 4,
    FindPermissionsByAccountId = 6,
    FindAccountsWithAsset = 8,
    FindPeers = 9,
    FindBlockHeaders = 14,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub struct Pagination {
    pub limit: Option<NonZero<u64>>,
    pub offset: u64,
}

/// Sorting of results by the JSON text stored under a metadata key
#[derive(Debug, Clone, PartialEq, Eq, Default, Encode, Decode)]
pub struct Sorting {
    pub sort_by_metadata_key: Option<Name>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub struct FetchSize {
    pub fetch_size: Option<NonZero<u64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Encode, Decode)]
pub struct QueryParams {
    pub pagination: Pagination,
    pub sorting: Sorting,
    pub fetch_size: FetchSize,
}

impl QueryParams {
    #[must_use]
    pub fn with_limit(mut self, limit: NonZero<u64>) -> Self {
        self.pagination.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.pagination.offset = offset;
        self
    }

    #[must_use]
    pub fn sorted_by(mut self, key: Name) -> Self {
        self.sorting.sort_by_metadata_key = Some(key);
        self
    }

    #[must_use]
    pub fn with_fetch_size(mut self, fetch_size: NonZero<u64>) -> Self {
        self.fetch_size.fetch_size = Some(fetch_size);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct QueryWithParams {
    pub query: QueryBox,
    pub params: QueryParams,
}

impl QueryWithParams {
    #[must_use]
    pub fn new(query: impl Into<QueryBox>, params: QueryParams) -> Self {
        Self {
            query: query.into(),
            params,
        }
    }
}

/// Position of a client within a live query
///
/// `query` names the live query on the server; `cursor` counts the items
/// already delivered. Clients treat both as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Encode, Decode)]
pub struct ForwardCursor {
    pub query: String,
    pub cursor: NonZero<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct FindAssetQuantityById {
    pub id: AssetId,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct FindDomainMetadata {
    pub id: DomainId,
    pub key: Name,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct FindAccountMetadata {
    pub id: AccountId,
    pub key: Name,
}

/// Looks up a key in the contents of a store asset.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct FindAssetMetadata {
    pub id: AssetId,
    pub key: Name,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct FindAssetDefinitionMetadata {
    pub id: AssetDefinitionId,
    pub key: Name,
}

/// Queries that return exactly one value
///
/// Tags 1 (executor data model), 2 (parameters) and 7 (trigger metadata)
/// are reserved.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum SingularQueryBox {
    #[codec(tag = 0)]
    FindAssetQuantityById(FindAssetQuantityById),
    #[codec(tag = 3)]
    FindDomainMetadata(FindDomainMetadata),
    #[codec(tag = 4)]
    FindAccountMetadata(FindAccountMetadata),
    #[codec(tag = 5)]
    FindAssetMetadata(FindAssetMetadata),
    #[codec(tag = 6)]
    FindAssetDefinitionMetadata(FindAssetDefinitionMetadata),
}

macro_rules! singular_into_box {
    ( $( $query:ident ),+ $(,)? ) => {
        $(
            impl From<$query> for SingularQueryBox {
                fn from(query: $query) -> Self {
                    Self::$query(query)
                }
            }
        )+
    };
}

singular_into_box!(
    FindAssetQuantityById,
    FindDomainMetadata,
    FindAccountMetadata,
    FindAssetMetadata,
    FindAssetDefinitionMetadata,
);

/// Tag 1 (executor data model) is reserved.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum SingularQueryOutputBox {
    #[codec(tag = 0)]
    Numeric(Numeric),
    #[codec(tag = 2)]
    Json(Json),
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum QueryRequest {
    #[codec(tag = 0)]
    Singular(SingularQueryBox),
    #[codec(tag = 1)]
    Start(QueryWithParams),
    #[codec(tag = 2)]
    Continue(ForwardCursor),
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct QueryRequestWithAuthority {
    pub authority: AccountId,
    pub request: QueryRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct SignedQueryV1 {
    pub signature: Signature,
    pub payload: QueryRequestWithAuthority,
}

/// Versioned envelope of a query request; tag 0 is reserved.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum SignedQuery {
    #[codec(tag = 1)]
    V1(SignedQueryV1),
}

impl SignedQuery {
    #[must_use]
    pub fn new(authority: AccountId, request: QueryRequest, signature: Signature) -> Self {
        Self::V1(SignedQueryV1 {
            signature,
            payload: QueryRequestWithAuthority { authority, request },
        })
    }

    #[must_use]
    pub fn authority(&self) -> &AccountId {
        match self {
            Self::V1(query) => &query.payload.authority,
        }
    }

    #[must_use]
    pub fn request(&self) -> &QueryRequest {
        match self {
            Self::V1(query) => &query.payload.request,
        }
    }

    #[must_use]
    pub fn into_request(self) -> QueryRequest {
        match self {
            Self::V1(query) => query.payload.request,
        }
    }
}

/// One page of an iterable query
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct QueryOutput {
    pub batch: QueryOutputBatchBoxTuple,
    /// Number of items left after this page
    pub remaining_items: u64,
    pub continue_cursor: Option<ForwardCursor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum QueryResponse {
    #[codec(tag = 0)]
    Singular(SingularQueryOutputBox),
    #[codec(tag = 1)]
    Iterable(QueryOutput),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::adt::Discriminant;
    use crate::{hex, HexString};

    #[test]
    fn default_filtered_query_wire_form() {
        let query = QueryWithParams::new(FindDomains, QueryParams::default());
        // FindDomains, PASS, [Atom], no limit, offset 0, no sorting, no fetch size
        assert_eq!(
            query.encode::<HexString>(),
            hex!("00020004000000000000000000000000")
        );
        assert_eq!(QueryWithParams::decode(query.to_bytes()), query);
    }

    #[test]
    fn request_tags() {
        let cursor = ForwardCursor {
            query: "01".into(),
            cursor: NonZero::new(3).unwrap(),
        };
        assert_eq!(
            QueryRequest::Continue(cursor).encode::<HexString>(),
            hex!("020830310300000000000000")
        );
        assert_eq!(QueryBox::tags(), vec![0, 1, 2, 3, 4, 6, 8, 9, 14]);
        assert_eq!(SingularQueryBox::tags(), vec![0, 3, 4, 5, 6]);
        assert!(SignedQuery::try_decode::<_, crate::ByteParser>(hex!("00"))
            .unwrap_err()
            .is_unknown_variant());
    }

    #[test]
    fn zero_cursor_rejected() {
        let err = ForwardCursor::try_decode::<_, crate::ByteParser>(hex!("000000000000000000"))
            .unwrap_err();
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn query_names() {
        let query: QueryBox = FindAccountsWithAsset {
            asset_definition: "rose#wonderland".parse().unwrap(),
        }
        .into();
        assert_eq!(query.query_name(), "FindAccountsWithAsset");
    }
}
