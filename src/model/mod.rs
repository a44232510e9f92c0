//! Catalogue of ledger data types
//!
//! Every type here derives or implements [`Encode`](crate::Encode) and
//! [`Decode`](crate::Decode); field order is the wire contract, and union tags
//! are fixed with `#[codec(tag = N)]`.

pub mod block;
pub mod crypto;
pub mod entity;
pub mod events;
pub mod id;
pub mod isi;
pub mod name;
pub mod primitives;
pub mod transaction;

pub use block::{
    BlockHeader, BlockPayload, BlockSignature, SignedBlock, SignedBlockV1, TransactionError,
    TransactionErrors,
};
pub use crypto::{Algorithm, PublicKey, Signature};
pub use entity::{
    Account, Asset, AssetDefinition, AssetType, AssetValue, Domain, IpfsPath, Metadata, Mintable,
    NewAccount, NewAssetDefinition, NewDomain, NewRole, Peer, Permission, Role, SocketAddr,
};
pub use id::{AccountId, AssetDefinitionId, AssetId, DomainId, PeerId, RoleId};
pub use isi::InstructionBox;
pub use name::{Json, Name};
pub use primitives::{Duration, Hash, Numeric, NumericSpec, Timestamp};
pub use transaction::{
    ChainId, Executable, SignedTransaction, TransactionPayload, TransactionRejectionReason,
};
