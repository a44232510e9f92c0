//! Query failures as they travel on the wire

use thiserror::Error as ThisError;

use crate::model::{
    AccountId, AssetDefinitionId, AssetId, DomainId, Hash, Name, PeerId, Permission, PublicKey,
    RoleId,
};
use crate::{Decode, Encode};

/// An entity named by a query or instruction does not exist.
///
/// Tag 8 (triggers) is reserved.
#[derive(Debug, Clone, PartialEq, Eq, ThisError, Encode, Decode)]
pub enum FindError {
    #[codec(tag = 0)]
    #[error("failed to find asset `{0}`")]
    Asset(AssetId),
    #[codec(tag = 1)]
    #[error("failed to find asset definition `{0}`")]
    AssetDefinition(AssetDefinitionId),
    #[codec(tag = 2)]
    #[error("failed to find account `{0}`")]
    Account(AccountId),
    #[codec(tag = 3)]
    #[error("failed to find domain `{0}`")]
    Domain(DomainId),
    #[codec(tag = 4)]
    #[error("failed to find metadata key `{0}`")]
    MetadataKey(Name),
    #[codec(tag = 5)]
    #[error("failed to find block with hash `{0}`")]
    Block(Hash),
    #[codec(tag = 6)]
    #[error("failed to find transaction with hash `{0}`")]
    Transaction(Hash),
    #[codec(tag = 7)]
    #[error("failed to find peer `{0}`")]
    Peer(PeerId),
    #[codec(tag = 9)]
    #[error("failed to find role `{0}`")]
    Role(RoleId),
    #[codec(tag = 10)]
    #[error("failed to find permission `{}`", .0.name)]
    Permission(Permission),
    #[codec(tag = 11)]
    #[error("failed to find public key `{0}`")]
    PublicKey(PublicKey),
}

/// Reasons a query request is refused by the ledger
#[derive(Debug, Clone, PartialEq, Eq, ThisError, Encode, Decode)]
pub enum QueryExecutionFail {
    #[codec(tag = 0)]
    #[error(transparent)]
    Find(FindError),
    #[codec(tag = 1)]
    #[error("conversion failed: {0}")]
    Conversion(String),
    #[codec(tag = 2)]
    #[error("query not found")]
    NotFound,
    #[codec(tag = 3)]
    #[error("cursor does not match the position of the live query")]
    CursorMismatch,
    #[codec(tag = 4)]
    #[error("live query has already been exhausted")]
    CursorDone,
    #[codec(tag = 5)]
    #[error("fetch size is too big")]
    FetchSizeTooBig,
    #[codec(tag = 6)]
    #[error("singular queries take no parameters")]
    InvalidSingularParameters,
    #[codec(tag = 7)]
    #[error("too many live queries")]
    CapacityLimit,
}

impl QueryExecutionFail {
    /// Returns `true` for failures after which the cursor must not be
    /// retried; the query has to be started again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::CursorMismatch | Self::CursorDone)
    }
}

impl From<FindError> for QueryExecutionFail {
    fn from(err: FindError) -> Self {
        Self::Find(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{hex, HexString};

    #[test]
    fn tags_and_messages() {
        assert_eq!(QueryExecutionFail::CursorDone.encode::<HexString>(), hex!("04"));
        let missing: QueryExecutionFail = FindError::Domain("garden".parse().unwrap()).into();
        assert_eq!(missing.encode::<HexString>(), hex!("00031867617264656e"));
        assert_eq!(missing.to_string(), "failed to find domain `garden`");
        assert!(QueryExecutionFail::CursorMismatch.is_terminal());
        assert!(!QueryExecutionFail::NotFound.is_terminal());
    }

    #[test]
    fn reserved_find_tag() {
        assert!(FindError::try_decode::<_, crate::ByteParser>(hex!("08"))
            .unwrap_err()
            .is_unknown_variant());
    }
}
