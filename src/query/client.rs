//! Client side of the cursor protocol

use thiserror::Error as ThisError;
use tracing::warn;

use super::store::LiveQueryStore;
use super::{
    FilteredQuery, ForwardCursor, IterableQuery, QueryBox, QueryExecutionFail, QueryOutput,
    QueryParams, QueryRequest, QueryResponse, QueryWithParams, SignedQuery, SingularQueryBox,
    SingularQueryOutputBox,
};
use crate::conv::{Decode, Encode};
use crate::model::{AccountId, Json, Numeric, Signature};
use crate::parse::ByteParser;
use crate::projection::PredicateOf;
use crate::selector::{QueryOutputBatchBoxTuple, SelectedKind};

/// Failures seen by a query client
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum QueryError {
    #[error("query failed: {0}")]
    Execution(QueryExecutionFail),

    /// The cursor can no longer be used; the query has to be started again.
    #[error("query cursor is no longer valid: {0}")]
    Terminal(QueryExecutionFail),

    #[error("expected exactly one result, got {got}")]
    ExpectedOne { got: usize },

    #[error("column of {got} where {expected} was expected")]
    ColumnMismatch {
        expected: &'static str,
        got: &'static str,
    },

    #[error("unexpected {0} response")]
    UnexpectedResponse(&'static str),
}

impl From<QueryExecutionFail> for QueryError {
    fn from(fail: QueryExecutionFail) -> Self {
        if fail.is_terminal() {
            warn!(error = %fail, "query cursor rejected");
            Self::Terminal(fail)
        } else {
            Self::Execution(fail)
        }
    }
}

/// Carries requests to a ledger and brings back its answers
pub trait QueryTransport {
    /// Sends one request.
    ///
    /// # Errors
    ///
    /// Returns the failure reported by the ledger.
    fn send(&mut self, request: QueryRequest) -> Result<QueryResponse, QueryExecutionFail>;
}

impl QueryTransport for LiveQueryStore {
    fn send(&mut self, request: QueryRequest) -> Result<QueryResponse, QueryExecutionFail> {
        self.handle(request)
    }
}

impl<T: QueryTransport + ?Sized> QueryTransport for &mut T {
    fn send(&mut self, request: QueryRequest) -> Result<QueryResponse, QueryExecutionFail> {
        (**self).send(request)
    }
}

/// Transport that signs requests on behalf of `authority` and exchanges them
/// with a [`LiveQueryStore`] in encoded form.
#[derive(Debug)]
pub struct ByteTransport<'a> {
    store: &'a mut LiveQueryStore,
    authority: AccountId,
    signature: Signature,
}

impl<'a> ByteTransport<'a> {
    #[must_use]
    pub fn new(store: &'a mut LiveQueryStore, authority: AccountId) -> Self {
        Self {
            store,
            authority,
            signature: Signature::default(),
        }
    }

    /// Sets the signature attached to every request.
    #[must_use]
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = signature;
        self
    }
}

impl QueryTransport for ByteTransport<'_> {
    fn send(&mut self, request: QueryRequest) -> Result<QueryResponse, QueryExecutionFail> {
        let query = SignedQuery::new(self.authority.clone(), request, self.signature.clone());
        let reply = self.store.handle_bytes(&query.to_bytes());
        Result::<QueryResponse, QueryExecutionFail>::try_decode::<_, ByteParser>(reply)
            .map_err(|err| QueryExecutionFail::Conversion(err.to_string()))?
    }
}

/// Runs queries over a [`QueryTransport`], following cursors to the end
#[derive(Debug)]
pub struct QueryExecutor<T: QueryTransport> {
    transport: T,
}

impl<T: QueryTransport> QueryExecutor<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    fn page(&mut self, request: QueryRequest) -> Result<QueryOutput, QueryError> {
        match self.transport.send(request)? {
            QueryResponse::Iterable(output) => Ok(output),
            QueryResponse::Singular(_) => Err(QueryError::UnexpectedResponse("singular")),
        }
    }

    /// Returns a lazy iterator over the pages of `query`.
    pub fn pages(&mut self, query: QueryWithParams) -> QueryIterator<'_, T> {
        QueryIterator {
            executor: self,
            state: IterState::Start(Box::new(query)),
        }
    }

    /// Fetches every page of `query` and joins them column by column.
    ///
    /// # Errors
    ///
    /// Fails on the first page the ledger refuses, or if two pages do not
    /// have the same columns.
    pub fn execute_all(&mut self, query: QueryWithParams) -> Result<QueryOutputBatchBoxTuple, QueryError> {
        let mut all = QueryOutputBatchBoxTuple::default();
        for page in self.pages(query) {
            all.extend(page?).map_err(|page| QueryError::ColumnMismatch {
                expected: all.tuple.first().map_or("nothing", |column| column.type_name()),
                got: page.tuple.first().map_or("nothing", |column| column.type_name()),
            })?;
        }
        Ok(all)
    }

    /// Fetches every item of `query` that satisfies `predicate`, whole.
    ///
    /// # Errors
    ///
    /// See [`QueryExecutor::execute_all`].
    pub fn execute<Q>(
        &mut self,
        query: Q,
        predicate: PredicateOf<Q::Item>,
        params: QueryParams,
    ) -> Result<Vec<Q::Item>, QueryError>
    where
        Q: IterableQuery,
        QueryBox: From<FilteredQuery<Q>>,
    {
        let filtered = FilteredQuery::<Q>::new(query).filter(predicate);
        let batch = self.execute_all(QueryWithParams::new(filtered, params))?;
        let mut columns = batch.into_columns().into_iter();
        match columns.next() {
            None => Ok(Vec::new()),
            Some(column) => <Q::Item as SelectedKind>::from_batch(column).map_err(|other| {
                QueryError::ColumnMismatch {
                    expected: std::any::type_name::<Q::Item>(),
                    got: other.type_name(),
                }
            }),
        }
    }

    /// Like [`QueryExecutor::execute`], for queries that must match exactly
    /// one item.
    ///
    /// # Errors
    ///
    /// Fails with [`QueryError::ExpectedOne`] on no match or several.
    pub fn execute_single<Q>(
        &mut self,
        query: Q,
        predicate: PredicateOf<Q::Item>,
    ) -> Result<Q::Item, QueryError>
    where
        Q: IterableQuery,
        QueryBox: From<FilteredQuery<Q>>,
    {
        let mut items = self.execute(query, predicate, QueryParams::default())?;
        match items.len() {
            1 => Ok(items.remove(0)),
            got => Err(QueryError::ExpectedOne { got }),
        }
    }

    /// Runs a singular query.
    ///
    /// # Errors
    ///
    /// Returns the failure reported by the ledger.
    pub fn singular(&mut self, query: impl Into<SingularQueryBox>) -> Result<SingularQueryOutputBox, QueryError> {
        match self.transport.send(QueryRequest::Singular(query.into()))? {
            QueryResponse::Singular(output) => Ok(output),
            QueryResponse::Iterable(_) => Err(QueryError::UnexpectedResponse("iterable")),
        }
    }

    /// Runs a singular query that answers with a quantity.
    ///
    /// # Errors
    ///
    /// See [`QueryExecutor::singular`].
    pub fn singular_numeric(&mut self, query: impl Into<SingularQueryBox>) -> Result<Numeric, QueryError> {
        match self.singular(query)? {
            SingularQueryOutputBox::Numeric(value) => Ok(value),
            SingularQueryOutputBox::Json(_) => Err(QueryError::UnexpectedResponse("json")),
        }
    }

    /// Runs a singular query that answers with a JSON value.
    ///
    /// # Errors
    ///
    /// See [`QueryExecutor::singular`].
    pub fn singular_json(&mut self, query: impl Into<SingularQueryBox>) -> Result<Json, QueryError> {
        match self.singular(query)? {
            SingularQueryOutputBox::Json(value) => Ok(value),
            SingularQueryOutputBox::Numeric(_) => Err(QueryError::UnexpectedResponse("numeric")),
        }
    }
}

#[derive(Debug)]
enum IterState {
    Start(Box<QueryWithParams>),
    Continue(ForwardCursor),
    Done,
}

/// Pages of one query, each fetched when asked for
///
/// After an error the iterator is exhausted.
#[derive(Debug)]
pub struct QueryIterator<'a, T: QueryTransport> {
    executor: &'a mut QueryExecutor<T>,
    state: IterState,
}

impl<T: QueryTransport> Iterator for QueryIterator<'_, T> {
    type Item = Result<QueryOutputBatchBoxTuple, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        let request = match std::mem::replace(&mut self.state, IterState::Done) {
            IterState::Start(query) => QueryRequest::Start(*query),
            IterState::Continue(cursor) => QueryRequest::Continue(cursor),
            IterState::Done => return None,
        };
        match self.executor.page(request) {
            Ok(output) => {
                if let Some(cursor) = output.continue_cursor {
                    self.state = IterState::Continue(cursor);
                }
                Some(Ok(output.batch))
            }
            Err(err) => Some(Err(err)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{Account, AssetDefinitionId, AssetId, Domain};
    use crate::nonzero::NonZero;
    use crate::predicate::atoms::StringPredicateAtom;
    use crate::predicate::CompoundPredicate;
    use crate::projection::{DomainIdProjectionPredicate, DomainProjectionPredicate, NameProjectionPredicate};
    use crate::query::world::test::{account_id, sample_world};
    use crate::query::{FindAccounts, FindAssetQuantityById, FindDomainMetadata, FindDomains};

    fn paged(fetch_size: u64) -> QueryParams {
        QueryParams::default().with_fetch_size(NonZero::new(fetch_size).unwrap())
    }

    #[test]
    fn follows_cursors_to_the_end() {
        let mut store = LiveQueryStore::new(sample_world());
        let mut client = QueryExecutor::new(&mut store);
        let pages: Vec<_> = client
            .pages(QueryWithParams::new(FindAccounts, paged(1)))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(pages.len(), 3);
        assert!(pages.iter().all(|page| page.len() == 1));

        let accounts: Vec<Account> = client
            .execute(FindAccounts, CompoundPredicate::PASS, paged(2))
            .unwrap();
        assert_eq!(accounts.len(), 3);
        assert_eq!(store.live_queries(), 0);
    }

    #[test]
    fn single_item_queries() {
        let mut store = LiveQueryStore::new(sample_world());
        let mut client = QueryExecutor::new(&mut store);
        let garden = CompoundPredicate::Atom(DomainProjectionPredicate::Id(
            DomainIdProjectionPredicate::Name(NameProjectionPredicate::Atom(
                StringPredicateAtom::Equals("garden".into()),
            )),
        ));
        let domain: Domain = client.execute_single(FindDomains, garden).unwrap();
        assert_eq!(domain.id.to_string(), "garden");
        assert_eq!(
            client.execute_single(FindDomains, CompoundPredicate::PASS),
            Err(QueryError::ExpectedOne { got: 2 })
        );
    }

    #[test]
    fn stale_cursor_is_terminal() {
        let mut store = LiveQueryStore::new(sample_world());
        let first = match store
            .send(QueryRequest::Start(QueryWithParams::new(FindAccounts, paged(1))))
            .unwrap()
        {
            QueryResponse::Iterable(output) => output,
            other => panic!("unexpected response {other:?}"),
        };
        let cursor = first.continue_cursor.unwrap();
        let mut client = QueryExecutor::new(&mut store);
        assert!(client.page(QueryRequest::Continue(cursor.clone())).is_ok());
        assert_eq!(
            client.page(QueryRequest::Continue(cursor)),
            Err(QueryError::Terminal(QueryExecutionFail::CursorMismatch))
        );
    }

    #[test]
    fn over_bytes() {
        let mut store = LiveQueryStore::new(sample_world());
        let mut client = QueryExecutor::new(ByteTransport::new(&mut store, account_id(1, "wonderland")));
        let all = client
            .execute_all(QueryWithParams::new(FindAccounts, paged(2)))
            .unwrap();
        assert_eq!(all.len(), 3);

        let rose: AssetDefinitionId = "rose#wonderland".parse().unwrap();
        let quantity = client
            .singular_numeric(FindAssetQuantityById {
                id: AssetId::new(rose, account_id(1, "wonderland")),
            })
            .unwrap();
        assert_eq!(quantity, Numeric::integer(13));

        let missing = client.singular_json(FindDomainMetadata {
            id: "nowhere".parse().unwrap(),
            key: "motto".parse().unwrap(),
        });
        assert!(matches!(missing, Err(QueryError::Execution(QueryExecutionFail::Find(_)))));
    }
}
