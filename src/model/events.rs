//! Data-event subscription filters
//!
//! A subscriber selects events by entity kind, optionally narrows them to one
//! entity id, and picks the kinds of change it cares about from a bitmap set.

use super::id::{AccountId, AssetDefinitionId, AssetId, DomainId, PeerId, RoleId};
use crate::{bitmap_set, Decode, Encode};

bitmap_set! {
    pub PeerEventSet of PeerEventKind: u32 {
        Added = 1 << 0,
        Removed = 1 << 1,
    }
}

bitmap_set! {
    pub DomainEventSet of DomainEventKind: u32 {
        Created = 1 << 0,
        Deleted = 1 << 1,
        AnyAssetDefinition = 1 << 2,
        AnyAccount = 1 << 3,
        MetadataInserted = 1 << 4,
        MetadataRemoved = 1 << 5,
        OwnerChanged = 1 << 6,
    }
}

bitmap_set! {
    pub AccountEventSet of AccountEventKind: u32 {
        Created = 1 << 0,
        Deleted = 1 << 1,
        AnyAsset = 1 << 2,
        PermissionAdded = 1 << 3,
        PermissionRemoved = 1 << 4,
        RoleGranted = 1 << 5,
        RoleRevoked = 1 << 6,
        MetadataInserted = 1 << 7,
        MetadataRemoved = 1 << 8,
    }
}

bitmap_set! {
    pub AssetEventSet of AssetEventKind: u32 {
        Created = 1 << 0,
        Deleted = 1 << 1,
        Added = 1 << 2,
        Removed = 1 << 3,
        MetadataInserted = 1 << 4,
        MetadataRemoved = 1 << 5,
    }
}

bitmap_set! {
    pub AssetDefinitionEventSet of AssetDefinitionEventKind: u32 {
        Created = 1 << 0,
        Deleted = 1 << 1,
        MetadataInserted = 1 << 2,
        MetadataRemoved = 1 << 3,
        MintabilityChanged = 1 << 4,
        TotalQuantityChanged = 1 << 5,
        OwnerChanged = 1 << 6,
    }
}

bitmap_set! {
    pub RoleEventSet of RoleEventKind: u32 {
        Created = 1 << 0,
        Deleted = 1 << 1,
        PermissionAdded = 1 << 2,
        PermissionRemoved = 1 << 3,
    }
}

macro_rules! event_filter {
    ( $( $filter:ident ( $id:ty, $set:ident, $kind:ident ) ),+ $(,)? ) => {
        $(
            #[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
            pub struct $filter {
                pub id_matcher: Option<$id>,
                pub event_set: $set,
            }

            impl $filter {
                /// Matches every entity and every kind of change.
                #[must_use]
                pub fn new() -> Self {
                    Self {
                        id_matcher: None,
                        event_set: $set::all(),
                    }
                }

                #[must_use]
                pub fn for_id(mut self, id: $id) -> Self {
                    self.id_matcher = Some(id);
                    self
                }

                #[must_use]
                pub fn for_events(mut self, event_set: $set) -> Self {
                    self.event_set = event_set;
                    self
                }

                /// Returns `true` if a change of kind `kind` to entity `id` passes.
                #[must_use]
                pub fn matches(&self, id: &$id, kind: $kind) -> bool {
                    self.id_matcher.as_ref().map_or(true, |want| want == id)
                        && self.event_set.contains(kind)
                }
            }

            impl Default for $filter {
                fn default() -> Self {
                    Self::new()
                }
            }
        )+
    };
}

event_filter! {
    PeerEventFilter(PeerId, PeerEventSet, PeerEventKind),
    DomainEventFilter(DomainId, DomainEventSet, DomainEventKind),
    AccountEventFilter(AccountId, AccountEventSet, AccountEventKind),
    AssetEventFilter(AssetId, AssetEventSet, AssetEventKind),
    AssetDefinitionEventFilter(AssetDefinitionId, AssetDefinitionEventSet, AssetDefinitionEventKind),
    RoleEventFilter(RoleId, RoleEventSet, RoleEventKind),
}

/// Tags 6 (triggers), 8 (configuration) and 9 (executor) are reserved.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum DataEventFilter {
    #[codec(tag = 0)]
    Any,
    #[codec(tag = 1)]
    Peer(PeerEventFilter),
    #[codec(tag = 2)]
    Domain(DomainEventFilter),
    #[codec(tag = 3)]
    Account(AccountEventFilter),
    #[codec(tag = 4)]
    Asset(AssetEventFilter),
    #[codec(tag = 5)]
    AssetDefinition(AssetDefinitionEventFilter),
    #[codec(tag = 7)]
    Role(RoleEventFilter),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{hex, HexString};

    #[test]
    fn account_set_wire_form() {
        let set = AccountEventSet::from_iter([
            AccountEventKind::Created,
            AccountEventKind::MetadataRemoved,
        ]);
        assert_eq!(set.bits(), 0x101);
        assert_eq!(set.encode::<HexString>(), hex!("01010000"));
        assert_eq!(AccountEventSet::MASK, 0x1ff);
        assert!(AccountEventSet::try_decode::<_, crate::ByteParser>(hex!("00020000"))
            .unwrap_err()
            .is_constraint_violation());
    }

    #[test]
    fn filter_matches_id_and_kind() {
        let wonderland: DomainId = "wonderland".parse().unwrap();
        let garden: DomainId = "garden".parse().unwrap();
        let filter = DomainEventFilter::new()
            .for_id(wonderland.clone())
            .for_events(DomainEventKind::Created.into());
        assert!(filter.matches(&wonderland, DomainEventKind::Created));
        assert!(!filter.matches(&wonderland, DomainEventKind::Deleted));
        assert!(!filter.matches(&garden, DomainEventKind::Created));
        assert!(PeerEventFilter::default().event_set == PeerEventSet::all());
    }

    #[test]
    fn data_filter_tags() {
        let filter = DataEventFilter::Peer(PeerEventFilter::new().for_events(PeerEventSet::empty()));
        assert_eq!(filter.encode::<HexString>(), hex!("010000000000"));
        assert_eq!(DataEventFilter::Any.encode::<HexString>(), hex!("00"));
        assert_eq!(
            DataEventFilter::decode(hex!("02007f000000")),
            DataEventFilter::Domain(DomainEventFilter::new())
        );
    }
}
