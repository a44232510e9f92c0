//! Read-only snapshot of ledger state, and query execution against it

use std::collections::{BTreeMap, BTreeSet};

use super::{
    FilteredQuery, FindAccountMetadata, FindAccounts, FindAccountsWithAsset,
    FindAssetDefinitionMetadata, FindAssetMetadata, FindAssetQuantityById, FindAssets,
    FindAssetsDefinitions, FindBlockHeaders, FindDomainMetadata, FindDomains, FindError, FindPeers,
    FindPermissionsByAccountId, FindRoles, IterableQuery, QueryExecutionFail, QueryParams,
    SingularQueryBox, SingularQueryOutputBox,
};
use crate::model::{
    Account, AccountId, Asset, AssetDefinition, AssetDefinitionId, AssetId, AssetValue,
    BlockHeader, Domain, DomainId, Json, Metadata, Name, PeerId, Permission, Role, RoleId,
};
use crate::predicate::EvaluatePredicate;
use crate::selector::QueryOutputBatchBoxTuple;
use crate::seq::SortedSet;

/// Items that can be ordered by one of their metadata entries
pub trait MetadataSortKey {
    /// Metadata of the item, if it has any.
    fn metadata(&self) -> Option<&Metadata> {
        None
    }

    /// The value under `key`, or `None` if there is no such entry.
    fn sort_key(&self, key: &Name) -> Option<&Json> {
        self.metadata().and_then(|metadata| metadata.get(key))
    }
}

impl MetadataSortKey for Domain {
    fn metadata(&self) -> Option<&Metadata> {
        Some(&self.metadata)
    }
}

impl MetadataSortKey for Account {
    fn metadata(&self) -> Option<&Metadata> {
        Some(&self.metadata)
    }
}

impl MetadataSortKey for AssetDefinition {
    fn metadata(&self) -> Option<&Metadata> {
        Some(&self.metadata)
    }
}

impl MetadataSortKey for Asset {
    fn metadata(&self) -> Option<&Metadata> {
        match &self.value {
            AssetValue::Store(store) => Some(store),
            AssetValue::Numeric(_) => None,
        }
    }
}

impl MetadataSortKey for Role {}
impl MetadataSortKey for Permission {}
impl MetadataSortKey for PeerId {}
impl MetadataSortKey for BlockHeader {}

/// The ledger state a query is answered from
#[derive(Debug, Clone, Default)]
pub struct WorldSnapshot {
    pub domains: BTreeMap<DomainId, Domain>,
    pub accounts: BTreeMap<AccountId, Account>,
    pub asset_definitions: BTreeMap<AssetDefinitionId, AssetDefinition>,
    pub assets: BTreeMap<AssetId, Asset>,
    pub roles: BTreeMap<RoleId, Role>,
    /// Permissions granted directly to accounts
    pub account_permissions: BTreeMap<AccountId, SortedSet<Permission>>,
    pub peers: BTreeSet<PeerId>,
    /// Headers in chain order, genesis first
    pub block_headers: Vec<BlockHeader>,
}

impl WorldSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_domain(&mut self, domain: Domain) -> &mut Self {
        self.domains.insert(domain.id.clone(), domain);
        self
    }

    pub fn add_account(&mut self, account: Account) -> &mut Self {
        self.accounts.insert(account.id.clone(), account);
        self
    }

    pub fn add_asset_definition(&mut self, definition: AssetDefinition) -> &mut Self {
        self.asset_definitions.insert(definition.id.clone(), definition);
        self
    }

    pub fn add_asset(&mut self, asset: Asset) -> &mut Self {
        self.assets.insert(asset.id.clone(), asset);
        self
    }

    pub fn add_role(&mut self, role: Role) -> &mut Self {
        self.roles.insert(role.id.clone(), role);
        self
    }

    pub fn grant_permission(&mut self, account: AccountId, permission: Permission) -> &mut Self {
        self.account_permissions
            .entry(account)
            .or_default()
            .insert(permission);
        self
    }

    pub fn add_peer(&mut self, peer: PeerId) -> &mut Self {
        self.peers.insert(peer);
        self
    }

    pub fn push_block_header(&mut self, header: BlockHeader) -> &mut Self {
        self.block_headers.push(header);
        self
    }

    fn domain(&self, id: &DomainId) -> Result<&Domain, FindError> {
        self.domains
            .get(id)
            .ok_or_else(|| FindError::Domain(id.clone()))
    }

    fn account(&self, id: &AccountId) -> Result<&Account, FindError> {
        self.accounts
            .get(id)
            .ok_or_else(|| FindError::Account(id.clone()))
    }

    fn asset_definition(&self, id: &AssetDefinitionId) -> Result<&AssetDefinition, FindError> {
        self.asset_definitions
            .get(id)
            .ok_or_else(|| FindError::AssetDefinition(id.clone()))
    }

    fn asset(&self, id: &AssetId) -> Result<&Asset, FindError> {
        self.assets
            .get(id)
            .ok_or_else(|| FindError::Asset(id.clone()))
    }

    /// Answers a singular query.
    ///
    /// # Errors
    ///
    /// Fails with [`QueryExecutionFail::Find`] if the entity or metadata key
    /// is missing, and with [`QueryExecutionFail::Conversion`] if an asset
    /// holds the wrong kind of value.
    pub fn execute_singular(
        &self,
        query: &SingularQueryBox,
    ) -> Result<SingularQueryOutputBox, QueryExecutionFail> {
        match query {
            SingularQueryBox::FindAssetQuantityById(FindAssetQuantityById { id }) => {
                match &self.asset(id)?.value {
                    AssetValue::Numeric(quantity) => Ok(SingularQueryOutputBox::Numeric(*quantity)),
                    AssetValue::Store(_) => Err(QueryExecutionFail::Conversion(format!(
                        "asset `{id}` holds a store, not a quantity"
                    ))),
                }
            }
            SingularQueryBox::FindDomainMetadata(FindDomainMetadata { id, key }) => {
                lookup(&self.domain(id)?.metadata, key)
            }
            SingularQueryBox::FindAccountMetadata(FindAccountMetadata { id, key }) => {
                lookup(&self.account(id)?.metadata, key)
            }
            SingularQueryBox::FindAssetMetadata(FindAssetMetadata { id, key }) => {
                match &self.asset(id)?.value {
                    AssetValue::Store(store) => lookup(store, key),
                    AssetValue::Numeric(_) => Err(QueryExecutionFail::Conversion(format!(
                        "asset `{id}` holds a quantity, not a store"
                    ))),
                }
            }
            SingularQueryBox::FindAssetDefinitionMetadata(FindAssetDefinitionMetadata {
                id,
                key,
            }) => lookup(&self.asset_definition(id)?.metadata, key),
        }
    }
}

fn lookup(metadata: &Metadata, key: &Name) -> Result<SingularQueryOutputBox, QueryExecutionFail> {
    metadata
        .get(key)
        .cloned()
        .map(SingularQueryOutputBox::Json)
        .ok_or_else(|| FindError::MetadataKey(key.clone()).into())
}

macro_rules! list_all {
    ( $( $query:ident => $item:ty : $field:ident ),+ $(,)? ) => {
        $(
            impl IterableQuery for $query {
                type Item = $item;

                fn execute(&self, world: &WorldSnapshot) -> Result<Vec<$item>, QueryExecutionFail> {
                    Ok(world.$field.values().cloned().collect())
                }
            }
        )+
    };
}

list_all! {
    FindDomains => Domain: domains,
    FindAccounts => Account: accounts,
    FindAssets => Asset: assets,
    FindAssetsDefinitions => AssetDefinition: asset_definitions,
    FindRoles => Role: roles,
}

impl IterableQuery for FindPeers {
    type Item = PeerId;

    fn execute(&self, world: &WorldSnapshot) -> Result<Vec<PeerId>, QueryExecutionFail> {
        Ok(world.peers.iter().cloned().collect())
    }
}

impl IterableQuery for FindBlockHeaders {
    type Item = BlockHeader;

    fn execute(&self, world: &WorldSnapshot) -> Result<Vec<BlockHeader>, QueryExecutionFail> {
        Ok(world.block_headers.iter().rev().cloned().collect())
    }
}

impl IterableQuery for FindPermissionsByAccountId {
    type Item = Permission;

    fn execute(&self, world: &WorldSnapshot) -> Result<Vec<Permission>, QueryExecutionFail> {
        world.account(&self.id)?;
        Ok(world
            .account_permissions
            .get(&self.id)
            .map(|granted| granted.iter().cloned().collect())
            .unwrap_or_default())
    }
}

impl IterableQuery for FindAccountsWithAsset {
    type Item = Account;

    fn execute(&self, world: &WorldSnapshot) -> Result<Vec<Account>, QueryExecutionFail> {
        world.asset_definition(&self.asset_definition)?;
        Ok(world
            .accounts
            .values()
            .filter(|account| {
                let held = AssetId::new(self.asset_definition.clone(), account.id.clone());
                world.assets.contains_key(&held)
            })
            .cloned()
            .collect())
    }
}

/// Executes `query` in full: filter, sort, paginate, then project.
pub(crate) fn run_filtered<Q>(
    query: &FilteredQuery<Q>,
    world: &WorldSnapshot,
    params: &QueryParams,
) -> Result<QueryOutputBatchBoxTuple, QueryExecutionFail>
where
    Q: IterableQuery,
    Q::Item: MetadataSortKey,
{
    let mut items: Vec<Q::Item> = query
        .query
        .execute(world)?
        .into_iter()
        .filter(|item| query.predicate.applies(item))
        .collect();

    if let Some(key) = &params.sorting.sort_by_metadata_key {
        // stable; entries without the key keep their order, after the rest
        items.sort_by(|a, b| match (a.sort_key(key), b.sort_key(key)) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
    }

    let offset = usize::try_from(params.pagination.offset).unwrap_or(usize::MAX);
    let limit = params
        .pagination
        .limit
        .map_or(usize::MAX, |limit| usize::try_from(limit.value()).unwrap_or(usize::MAX));
    let page: Vec<Q::Item> = items.into_iter().skip(offset).take(limit).collect();

    Ok(query.selector.project_batch(&page))
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::model::crypto::{Algorithm, PublicKey};
    use crate::model::{NewAccount, NewAssetDefinition, NewDomain, Numeric};
    use crate::nonzero::NonZero;
    use crate::predicate::atoms::StringPredicateAtom;
    use crate::predicate::CompoundPredicate;
    use crate::projection::{
        AccountIdProjectionPredicate, AccountProjectionPredicate, DomainIdProjectionPredicate,
        NameProjectionPredicate,
    };
    use crate::selector::QueryOutputBatchBox;

    pub(crate) fn key(seed: u8) -> PublicKey {
        PublicKey::new(Algorithm::Ed25519, vec![seed; 32])
    }

    pub(crate) fn account_id(seed: u8, domain: &str) -> AccountId {
        AccountId::new(domain.parse().unwrap(), key(seed))
    }

    /// Two domains, three accounts, one asset definition held by `alice`.
    pub(crate) fn sample_world() -> WorldSnapshot {
        let alice = account_id(1, "wonderland");
        let bob = account_id(2, "wonderland");
        let carol = account_id(3, "garden");
        let rose: AssetDefinitionId = "rose#wonderland".parse().unwrap();

        let mut world = WorldSnapshot::new();
        world
            .add_domain(NewDomain::new("wonderland".parse().unwrap()).build(alice.clone()))
            .add_domain(NewDomain::new("garden".parse().unwrap()).build(carol.clone()))
            .add_account(NewAccount::new(alice.clone()).build())
            .add_account(NewAccount::new(bob.clone()).build())
            .add_account(NewAccount::new(carol).build())
            .add_asset_definition(NewAssetDefinition::numeric(rose.clone()).build(alice.clone()))
            .add_asset(Asset::new(AssetId::new(rose, alice.clone()), Numeric::integer(13)))
            .grant_permission(alice, Permission::new("CanMint", Json::null()));
        world
    }

    fn in_domain(name: &str) -> crate::projection::PredicateOf<Account> {
        CompoundPredicate::Atom(AccountProjectionPredicate::Id(
            AccountIdProjectionPredicate::Domain(DomainIdProjectionPredicate::Name(
                NameProjectionPredicate::Atom(StringPredicateAtom::Equals(name.into())),
            )),
        ))
    }

    #[test]
    fn filter_then_paginate() {
        let world = sample_world();
        let query = FilteredQuery::<FindAccounts>::new(FindAccounts).filter(in_domain("wonderland"));
        let all = run_filtered(&query, &world, &QueryParams::default()).unwrap();
        assert_eq!(all.len(), 2);

        let params = QueryParams::default()
            .with_offset(1)
            .with_limit(NonZero::new(5).unwrap());
        let rest = run_filtered(&query, &world, &params).unwrap();
        assert_eq!(rest.len(), 1);
        let skipped = run_filtered(&query, &world, &QueryParams::default().with_offset(9)).unwrap();
        assert_eq!(skipped.tuple[0], QueryOutputBatchBox::Account(vec![]));
    }

    #[test]
    fn sort_by_metadata_puts_missing_last() {
        let mut world = WorldSnapshot::new();
        let owner = account_id(1, "a");
        for (name, rank) in [("d1", None), ("d2", Some(2u64)), ("d3", Some(1)), ("d4", None)] {
            let mut domain = NewDomain::new(name.parse().unwrap());
            if let Some(rank) = rank {
                domain = domain.with_metadata(Metadata::from_iter([("rank".parse().unwrap(), rank.into())]));
            }
            world.add_domain(domain.build(owner.clone()));
        }
        let query = FilteredQuery::<FindDomains>::new(FindDomains);
        let params = QueryParams::default().sorted_by("rank".parse().unwrap());
        let batch = run_filtered(&query, &world, &params).unwrap();
        let order: Vec<String> = batch.tuple[0]
            .clone()
            .into_typed::<Domain>()
            .unwrap()
            .into_iter()
            .map(|d| d.id.to_string())
            .collect();
        assert_eq!(order, vec!["d3", "d2", "d1", "d4"]);
    }

    #[test]
    fn queries_that_name_entities() {
        let world = sample_world();
        let missing = FindPermissionsByAccountId {
            id: account_id(9, "wonderland"),
        };
        assert!(matches!(
            missing.execute(&world),
            Err(QueryExecutionFail::Find(FindError::Account(_)))
        ));
        let granted = FindPermissionsByAccountId {
            id: account_id(1, "wonderland"),
        };
        assert_eq!(granted.execute(&world).unwrap().len(), 1);

        let holders = FindAccountsWithAsset {
            asset_definition: "rose#wonderland".parse().unwrap(),
        }
        .execute(&world)
        .unwrap();
        assert_eq!(holders.len(), 1);
        assert_eq!(holders[0].id, account_id(1, "wonderland"));
    }

    #[test]
    fn singular_queries() {
        let world = sample_world();
        let rose: AssetDefinitionId = "rose#wonderland".parse().unwrap();
        let quantity = world
            .execute_singular(&SingularQueryBox::FindAssetQuantityById(FindAssetQuantityById {
                id: AssetId::new(rose.clone(), account_id(1, "wonderland")),
            }))
            .unwrap();
        assert_eq!(quantity, SingularQueryOutputBox::Numeric(Numeric::integer(13)));

        let no_key = world.execute_singular(&SingularQueryBox::FindDomainMetadata(FindDomainMetadata {
            id: "garden".parse().unwrap(),
            key: "motto".parse().unwrap(),
        }));
        assert_eq!(
            no_key,
            Err(QueryExecutionFail::Find(FindError::MetadataKey("motto".parse().unwrap())))
        );

        let not_store = world.execute_singular(&SingularQueryBox::FindAssetMetadata(FindAssetMetadata {
            id: AssetId::new(rose, account_id(1, "wonderland")),
            key: "motto".parse().unwrap(),
        }));
        assert!(matches!(not_store, Err(QueryExecutionFail::Conversion(_))));
    }
}
