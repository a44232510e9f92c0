//! In-memory server half of the cursor protocol
//!
//! [`LiveQueryStore`] answers [`QueryRequest`]s from a [`WorldSnapshot`]. A
//! `Start` request runs the query to completion, keeps whatever does not fit
//! in the first page as a live query, and hands back a cursor to it; each
//! `Continue` pops the next page. Once the last page has gone out the live
//! query is dropped, and its id is remembered for a while so that a stale
//! cursor can be told apart from one that never existed.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use super::world::WorldSnapshot;
use super::{
    ForwardCursor, QueryExecutionFail, QueryOutput, QueryRequest, QueryResponse, QueryWithParams,
    SignedQuery,
};
use crate::conv::{Decode, Encode};
use crate::nonzero::NonZero;
use crate::parse::ByteParser;
use crate::selector::QueryOutputBatchBoxTuple;

/// Page size used when a query does not ask for one
pub const DEFAULT_FETCH_SIZE: u64 = 100;

/// Largest page size a query may ask for
pub const MAX_FETCH_SIZE: u64 = 10_000;

/// Default bound on the number of queries kept alive at once
pub const DEFAULT_MAX_LIVE_QUERIES: usize = 1024;

#[derive(Debug)]
struct LiveQuery {
    remaining: QueryOutputBatchBoxTuple,
    /// Items delivered so far; the cursor a client must present next
    delivered: u64,
    fetch_size: u64,
}

/// Server-side state of every live query
#[derive(Debug)]
pub struct LiveQueryStore {
    world: WorldSnapshot,
    live: HashMap<String, LiveQuery>,
    finished: HashSet<String>,
    finished_order: VecDeque<String>,
    next_id: u64,
    capacity: usize,
}

impl LiveQueryStore {
    #[must_use]
    pub fn new(world: WorldSnapshot) -> Self {
        Self::with_capacity(world, DEFAULT_MAX_LIVE_QUERIES)
    }

    /// Creates a store that keeps at most `capacity` queries alive.
    #[must_use]
    pub fn with_capacity(world: WorldSnapshot, capacity: usize) -> Self {
        Self {
            world,
            live: HashMap::new(),
            finished: HashSet::new(),
            finished_order: VecDeque::new(),
            next_id: 0,
            capacity,
        }
    }

    #[must_use]
    pub fn world(&self) -> &WorldSnapshot {
        &self.world
    }

    /// Mutable access to the state; live queries keep the results they were
    /// started with.
    pub fn world_mut(&mut self) -> &mut WorldSnapshot {
        &mut self.world
    }

    /// Number of queries with pages still to be fetched
    #[must_use]
    pub fn live_queries(&self) -> usize {
        self.live.len()
    }

    /// Answers a single request.
    ///
    /// # Errors
    ///
    /// Returns the [`QueryExecutionFail`] the ledger would send back for this
    /// request.
    pub fn handle(&mut self, request: QueryRequest) -> Result<QueryResponse, QueryExecutionFail> {
        match request {
            QueryRequest::Singular(query) => self
                .world
                .execute_singular(&query)
                .map(QueryResponse::Singular),
            QueryRequest::Start(query) => self.start(query).map(QueryResponse::Iterable),
            QueryRequest::Continue(cursor) => self.resume(cursor).map(QueryResponse::Iterable),
        }
    }

    /// Answers a signed request; signatures are not checked.
    ///
    /// # Errors
    ///
    /// See [`LiveQueryStore::handle`].
    pub fn handle_signed(&mut self, query: SignedQuery) -> Result<QueryResponse, QueryExecutionFail> {
        debug!(authority = %query.authority(), "handling signed query");
        self.handle(query.into_request())
    }

    /// Answers an encoded [`SignedQuery`] with an encoded
    /// `Result<QueryResponse, QueryExecutionFail>`.
    ///
    /// Bytes that do not decode as a signed query are answered with
    /// [`QueryExecutionFail::Conversion`].
    pub fn handle_bytes(&mut self, bytes: &[u8]) -> Vec<u8> {
        let response = match SignedQuery::try_decode::<_, ByteParser>(bytes) {
            Ok(query) => self.handle_signed(query),
            Err(err) => Err(QueryExecutionFail::Conversion(err.to_string())),
        };
        response.to_bytes()
    }

    fn start(&mut self, query: QueryWithParams) -> Result<QueryOutput, QueryExecutionFail> {
        let fetch_size = match query.params.fetch_size.fetch_size {
            None => DEFAULT_FETCH_SIZE,
            Some(size) if size.value() > MAX_FETCH_SIZE => {
                return Err(QueryExecutionFail::FetchSizeTooBig)
            }
            Some(size) => size.value(),
        };

        let mut remaining = query.query.run(&self.world, &query.params)?;
        let total = remaining.len() as u64;
        let batch = remaining.split_front(page_len(fetch_size));
        let sent = batch.len() as u64;

        if sent == total {
            debug!(query = query.query.query_name(), items = total, "query answered in one page");
            return Ok(QueryOutput {
                batch,
                remaining_items: 0,
                continue_cursor: None,
            });
        }
        if self.live.len() >= self.capacity {
            return Err(QueryExecutionFail::CapacityLimit);
        }

        let id = format!("{:016x}", self.next_id);
        self.next_id += 1;
        let cursor = cursor_at(&id, sent)?;
        debug!(
            query = query.query.query_name(),
            id = %id,
            items = total,
            fetch_size,
            "live query started"
        );
        self.live.insert(
            id,
            LiveQuery {
                remaining,
                delivered: sent,
                fetch_size,
            },
        );
        Ok(QueryOutput {
            batch,
            remaining_items: total - sent,
            continue_cursor: Some(cursor),
        })
    }

    fn resume(&mut self, cursor: ForwardCursor) -> Result<QueryOutput, QueryExecutionFail> {
        let Some(live) = self.live.get_mut(&cursor.query) else {
            return Err(if self.finished.contains(&cursor.query) {
                QueryExecutionFail::CursorDone
            } else {
                QueryExecutionFail::NotFound
            });
        };
        if cursor.cursor.value() != live.delivered {
            debug!(
                id = %cursor.query,
                expected = live.delivered,
                got = cursor.cursor.value(),
                "cursor mismatch"
            );
            return Err(QueryExecutionFail::CursorMismatch);
        }

        let batch = live.remaining.split_front(page_len(live.fetch_size));
        live.delivered += batch.len() as u64;
        let remaining_items = live.remaining.len() as u64;
        debug!(id = %cursor.query, delivered = live.delivered, remaining_items, "live query continued");

        if remaining_items == 0 {
            self.live.remove(&cursor.query);
            self.retire(cursor.query);
            return Ok(QueryOutput {
                batch,
                remaining_items,
                continue_cursor: None,
            });
        }
        let next = cursor_at(&cursor.query, live.delivered)?;
        Ok(QueryOutput {
            batch,
            remaining_items,
            continue_cursor: Some(next),
        })
    }

    /// Remembers `id` as exhausted, forgetting the oldest such id once as
    /// many are remembered as queries may be live.
    fn retire(&mut self, id: String) {
        if self.finished_order.len() >= self.capacity.max(1) {
            if let Some(oldest) = self.finished_order.pop_front() {
                self.finished.remove(&oldest);
            }
        }
        self.finished.insert(id.clone());
        self.finished_order.push_back(id);
    }
}

fn page_len(fetch_size: u64) -> usize {
    usize::try_from(fetch_size).unwrap_or(usize::MAX)
}

fn cursor_at(id: &str, delivered: u64) -> Result<ForwardCursor, QueryExecutionFail> {
    let cursor = NonZero::new(delivered)
        .map_err(|err| QueryExecutionFail::Conversion(err.to_string()))?;
    Ok(ForwardCursor {
        query: id.to_owned(),
        cursor,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{Account, Domain, Signature};
    use crate::query::world::test::{account_id, sample_world};
    use crate::query::{FindAccounts, FindDomains, QueryParams};

    fn start(store: &mut LiveQueryStore, fetch_size: u64) -> QueryOutput {
        let params = QueryParams::default().with_fetch_size(NonZero::new(fetch_size).unwrap());
        match store.handle(QueryRequest::Start(QueryWithParams::new(FindAccounts, params))) {
            Ok(QueryResponse::Iterable(output)) => output,
            other => panic!("unexpected response {other:?}"),
        }
    }

    fn accounts(output: &QueryOutput) -> Vec<Account> {
        output.batch.tuple[0].clone().into_typed().unwrap()
    }

    #[test]
    fn pages_without_repeats_or_gaps() {
        let mut store = LiveQueryStore::new(sample_world());
        let first = start(&mut store, 2);
        assert_eq!(first.remaining_items, 1);
        let cursor = first.continue_cursor.clone().unwrap();
        assert_eq!(cursor.cursor.value(), 2);
        assert_eq!(store.live_queries(), 1);

        let second = match store.handle(QueryRequest::Continue(cursor.clone())).unwrap() {
            QueryResponse::Iterable(output) => output,
            other => panic!("unexpected response {other:?}"),
        };
        assert_eq!(second.remaining_items, 0);
        assert!(second.continue_cursor.is_none());
        assert_eq!(store.live_queries(), 0);

        let mut seen: Vec<Account> = accounts(&first);
        seen.extend(accounts(&second));
        let all: Vec<Account> = store.world().accounts.values().cloned().collect();
        assert_eq!(seen, all);

        // the same cursor again, now that the query is exhausted
        assert_eq!(
            store.handle(QueryRequest::Continue(cursor)),
            Err(QueryExecutionFail::CursorDone)
        );
    }

    #[test]
    fn cursor_errors() {
        let mut store = LiveQueryStore::new(sample_world());
        let first = start(&mut store, 1);
        let cursor = first.continue_cursor.unwrap();

        let stale = ForwardCursor {
            query: cursor.query.clone(),
            cursor: NonZero::new(7).unwrap(),
        };
        assert_eq!(
            store.handle(QueryRequest::Continue(stale)),
            Err(QueryExecutionFail::CursorMismatch)
        );
        let unknown = ForwardCursor {
            query: "nonexistent".into(),
            cursor: NonZero::new(1).unwrap(),
        };
        assert_eq!(
            store.handle(QueryRequest::Continue(unknown)),
            Err(QueryExecutionFail::NotFound)
        );
        // a mismatch does not consume the page
        assert!(store.handle(QueryRequest::Continue(cursor)).is_ok());
    }

    #[test]
    fn fetch_size_and_capacity_limits() {
        let mut store = LiveQueryStore::with_capacity(sample_world(), 1);
        let too_big = QueryParams::default().with_fetch_size(NonZero::new(MAX_FETCH_SIZE + 1).unwrap());
        assert_eq!(
            store.handle(QueryRequest::Start(QueryWithParams::new(FindDomains, too_big))),
            Err(QueryExecutionFail::FetchSizeTooBig)
        );

        start(&mut store, 1);
        let params = QueryParams::default().with_fetch_size(NonZero::new(1).unwrap());
        assert_eq!(
            store.handle(QueryRequest::Start(QueryWithParams::new(FindAccounts, params))),
            Err(QueryExecutionFail::CapacityLimit)
        );
        // a query answered in one page needs no slot
        let one_page = store
            .handle(QueryRequest::Start(QueryWithParams::new(FindDomains, QueryParams::default())))
            .unwrap();
        match one_page {
            QueryResponse::Iterable(output) => {
                assert_eq!(output.batch.tuple[0].clone().into_typed::<Domain>().unwrap().len(), 2)
            }
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[test]
    fn byte_level_round_trip() {
        let mut store = LiveQueryStore::new(sample_world());
        let query = SignedQuery::new(
            account_id(1, "wonderland"),
            QueryRequest::Start(QueryWithParams::new(FindDomains, QueryParams::default())),
            Signature::from_bytes(vec![0; 64]),
        );
        let reply = store.handle_bytes(&query.to_bytes());
        let decoded = Result::<QueryResponse, QueryExecutionFail>::decode(reply).unwrap();
        assert!(matches!(decoded, QueryResponse::Iterable(ref out) if out.batch.len() == 2));

        let garbage = store.handle_bytes(&[0x07]);
        assert!(matches!(
            Result::<QueryResponse, QueryExecutionFail>::decode(garbage),
            Err(QueryExecutionFail::Conversion(_))
        ));
    }
}
