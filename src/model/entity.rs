//! Ledger entities and their registration payloads

use std::fmt::Display;

use super::id::{AccountId, AssetDefinitionId, AssetId, DomainId, PeerId, RoleId};
use super::name::{Json, Name};
use super::primitives::{Numeric, NumericSpec};
use crate::seq::{SortedMap, SortedSet};
use crate::{Decode, Encode};

/// Key-value annotations attached to an entity, ordered by key
pub type Metadata = SortedMap<Name, Json>;

/// Content address of a logo image
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct IpfsPath(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Domain {
    pub id: DomainId,
    pub logo: Option<IpfsPath>,
    pub metadata: Metadata,
    pub owned_by: AccountId,
}

/// Registration payload of a [`Domain`]; the owner is the registering account.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct NewDomain {
    pub id: DomainId,
    pub logo: Option<IpfsPath>,
    pub metadata: Metadata,
}

impl NewDomain {
    #[must_use]
    pub fn new(id: DomainId) -> Self {
        Self {
            id,
            logo: None,
            metadata: Metadata::new(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn build(self, owned_by: AccountId) -> Domain {
        Domain {
            id: self.id,
            logo: self.logo,
            metadata: self.metadata,
            owned_by,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Account {
    pub id: AccountId,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct NewAccount {
    pub id: AccountId,
    pub metadata: Metadata,
}

impl NewAccount {
    #[must_use]
    pub fn new(id: AccountId) -> Self {
        Self {
            id,
            metadata: Metadata::new(),
        }
    }

    #[must_use]
    pub fn build(self) -> Account {
        Account {
            id: self.id,
            metadata: self.metadata,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum AssetType {
    #[codec(tag = 0)]
    Numeric(NumericSpec),
    #[codec(tag = 1)]
    Store,
}

/// How many times new units of an asset may be minted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub enum Mintable {
    #[default]
    #[codec(tag = 0)]
    Infinitely,
    #[codec(tag = 1)]
    Once,
    #[codec(tag = 2)]
    Not,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct AssetDefinition {
    pub id: AssetDefinitionId,
    pub kind: AssetType,
    pub mintable: Mintable,
    pub logo: Option<IpfsPath>,
    pub metadata: Metadata,
    pub owned_by: AccountId,
    pub total_quantity: Numeric,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct NewAssetDefinition {
    pub id: AssetDefinitionId,
    pub kind: AssetType,
    pub mintable: Mintable,
    pub logo: Option<IpfsPath>,
    pub metadata: Metadata,
}

impl NewAssetDefinition {
    #[must_use]
    pub fn numeric(id: AssetDefinitionId) -> Self {
        Self {
            id,
            kind: AssetType::Numeric(NumericSpec::default()),
            mintable: Mintable::Infinitely,
            logo: None,
            metadata: Metadata::new(),
        }
    }

    #[must_use]
    pub fn store(id: AssetDefinitionId) -> Self {
        Self {
            kind: AssetType::Store,
            ..Self::numeric(id)
        }
    }

    #[must_use]
    pub fn mintable_once(mut self) -> Self {
        self.mintable = Mintable::Once;
        self
    }

    #[must_use]
    pub fn build(self, owned_by: AccountId) -> AssetDefinition {
        AssetDefinition {
            id: self.id,
            kind: self.kind,
            mintable: self.mintable,
            logo: self.logo,
            metadata: self.metadata,
            owned_by,
            total_quantity: Numeric::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum AssetValue {
    #[codec(tag = 0)]
    Numeric(Numeric),
    #[codec(tag = 1)]
    Store(Metadata),
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Asset {
    pub id: AssetId,
    pub value: AssetValue,
}

impl Asset {
    #[must_use]
    pub fn new(id: AssetId, value: impl Into<AssetValue>) -> Self {
        Self {
            id,
            value: value.into(),
        }
    }
}

impl From<Numeric> for AssetValue {
    fn from(value: Numeric) -> Self {
        Self::Numeric(value)
    }
}

impl From<Metadata> for AssetValue {
    fn from(value: Metadata) -> Self {
        Self::Store(value)
    }
}

/// Named capability, with an executor-defined JSON payload
///
/// Permissions order by name, then by payload text; a role's permission set
/// is kept in that order on the wire.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct Permission {
    pub name: String,
    pub payload: Json,
}

impl Permission {
    #[must_use]
    pub fn new(name: impl Into<String>, payload: Json) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Role {
    pub id: RoleId,
    pub permissions: SortedSet<Permission>,
}

impl Role {
    #[must_use]
    pub fn new(id: RoleId) -> Self {
        Self {
            id,
            permissions: SortedSet::new(),
        }
    }

    #[must_use]
    pub fn add_permission(mut self, permission: Permission) -> Self {
        self.permissions.insert(permission);
        self
    }
}

/// Registration payload of a [`Role`], granted to its creator on registration
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct NewRole {
    pub inner: Role,
    pub grant_to: AccountId,
}

/// Network address of a peer
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub enum SocketAddr {
    #[codec(tag = 0)]
    Ipv4 { ip: [u8; 4], port: u16 },
    #[codec(tag = 1)]
    Ipv6 { ip: [u16; 8], port: u16 },
    #[codec(tag = 2)]
    Host { host: String, port: u16 },
}

impl From<std::net::SocketAddr> for SocketAddr {
    fn from(addr: std::net::SocketAddr) -> Self {
        match addr {
            std::net::SocketAddr::V4(v4) => Self::Ipv4 {
                ip: v4.ip().octets(),
                port: v4.port(),
            },
            std::net::SocketAddr::V6(v6) => Self::Ipv6 {
                ip: v6.ip().segments(),
                port: v6.port(),
            },
        }
    }
}

impl Display for SocketAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ipv4 { ip, port } => {
                write!(f, "{}:{port}", std::net::Ipv4Addr::from(*ip))
            }
            Self::Ipv6 { ip, port } => {
                write!(f, "[{}]:{port}", std::net::Ipv6Addr::from(*ip))
            }
            Self::Host { host, port } => write!(f, "{host}:{port}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Peer {
    pub address: SocketAddr,
    pub id: PeerId,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{hex, HexString};

    #[test]
    fn permissions_sorted_on_wire() {
        let role = Role::new("admin".parse().unwrap())
            .add_permission(Permission::new("b", Json::null()))
            .add_permission(Permission::new("a", Json::from(1u64)))
            .add_permission(Permission::new("a", Json::null()));
        let names: Vec<_> = role
            .permissions
            .iter()
            .map(|p| (p.name.as_str(), p.payload.as_str()))
            .collect();
        assert_eq!(names, vec![("a", "1"), ("a", "null"), ("b", "null")]);
        assert_eq!(Role::decode(role.to_bytes()), role);
    }

    #[test]
    fn socket_addr_variants() {
        let v4 = SocketAddr::from("127.0.0.1:1337".parse::<std::net::SocketAddr>().unwrap());
        assert_eq!(v4.encode::<HexString>(), hex!("007f0000013905"));
        assert_eq!(v4.to_string(), "127.0.0.1:1337");
        let host = SocketAddr::Host {
            host: "peer".into(),
            port: 8080,
        };
        assert_eq!(host.encode::<HexString>(), hex!("021070656572901f"));
        assert_eq!(SocketAddr::decode(hex!("021070656572901f")), host);
    }

    #[test]
    fn asset_value_tags() {
        assert_eq!(AssetValue::from(Numeric::integer(3)).encode::<HexString>(), hex!("000c00"));
        assert_eq!(AssetValue::from(Metadata::new()).encode::<HexString>(), hex!("0100"));
    }
}
