use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ledger_model::model::{
    Account, AccountId, Algorithm, Json, Metadata, NewAccount, NewDomain, PublicKey,
};
use ledger_model::predicate::atoms::StringPredicateAtom;
use ledger_model::predicate::CompoundPredicate;
use ledger_model::projection::{
    AccountIdProjectionPredicate, AccountProjectionPredicate, DomainIdProjectionPredicate,
    NameProjectionPredicate, PredicateOf,
};
use ledger_model::query::client::{ByteTransport, QueryExecutor};
use ledger_model::query::store::LiveQueryStore;
use ledger_model::query::world::WorldSnapshot;
use ledger_model::query::{FilteredQuery, FindAccounts, QueryParams, QueryWithParams};
use ledger_model::NonZero;

const DOMAINS: u16 = 10;
const ACCOUNTS: u16 = 2000;

fn signatory(seed: u16) -> PublicKey {
    let mut payload = vec![0u8; 32];
    payload[..2].copy_from_slice(&seed.to_le_bytes());
    PublicKey::new(Algorithm::Ed25519, payload)
}

fn account_id(seed: u16) -> AccountId {
    let domain = format!("d{}", seed % DOMAINS);
    AccountId::new(domain.parse().unwrap(), signatory(seed))
}

fn world() -> WorldSnapshot {
    let mut world = WorldSnapshot::new();
    for d in 0..DOMAINS {
        world.add_domain(NewDomain::new(format!("d{d}").parse().unwrap()).build(account_id(d)));
    }
    for seed in 0..ACCOUNTS {
        let mut metadata = Metadata::new();
        metadata.insert("rank".parse().unwrap(), Json::from(u64::from(seed % 97)));
        let mut account = NewAccount::new(account_id(seed));
        account.metadata = metadata;
        world.add_account(account.build());
    }
    world
}

fn in_domain(name: &str) -> PredicateOf<Account> {
    CompoundPredicate::Atom(AccountProjectionPredicate::Id(
        AccountIdProjectionPredicate::Domain(DomainIdProjectionPredicate::Name(
            NameProjectionPredicate::Atom(StringPredicateAtom::Equals(name.into())),
        )),
    ))
}

fn filter_bench(c: &mut Criterion) {
    let mut executor = QueryExecutor::new(LiveQueryStore::new(world()));
    c.bench_function("filter_accounts_by_domain", |b| {
        b.iter(|| {
            black_box(
                executor
                    .execute(FindAccounts, in_domain("d3"), QueryParams::default())
                    .unwrap(),
            )
        })
    });
}

fn paging_bench(c: &mut Criterion) {
    let mut executor = QueryExecutor::new(LiveQueryStore::new(world()));
    let params = QueryParams::default()
        .sorted_by("rank".parse().unwrap())
        .with_fetch_size(NonZero::new(50).unwrap());
    c.bench_function("page_sorted_accounts", |b| {
        b.iter(|| {
            let query = QueryWithParams::new(FilteredQuery::<FindAccounts>::new(FindAccounts), params.clone());
            black_box(executor.execute_all(query).unwrap())
        })
    });
}

fn wire_bench(c: &mut Criterion) {
    let mut store = LiveQueryStore::new(world());
    let authority = account_id(0);
    c.bench_function("page_accounts_over_bytes", |b| {
        b.iter(|| {
            let mut executor = QueryExecutor::new(ByteTransport::new(&mut store, authority.clone()));
            let params = QueryParams::default().with_fetch_size(NonZero::new(200).unwrap());
            black_box(
                executor
                    .execute(FindAccounts, CompoundPredicate::PASS, params)
                    .unwrap(),
            )
        })
    });
}

criterion_group! {
    name = query_benches;
    config = Criterion::default();
    targets = filter_bench, paging_bench, wire_bench
}

criterion_main!(query_benches);
