//! Transactions
//!
//! Signing is outside the scope of this crate: a [`SignedTransaction`] is
//! assembled from a payload and signature bytes produced elsewhere.

use super::entity::Metadata;
use super::id::AccountId;
use super::isi::InstructionBox;
use super::crypto::Signature;
use super::primitives::{Duration, Timestamp};
use crate::nonzero::NonZero;
use crate::query::fail::FindError;
use crate::{Decode, Encode};

/// Identifier of the ledger network a transaction is meant for
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct ChainId(pub String);

impl From<&str> for ChainId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct WasmSmartContract(pub Vec<u8>);

/// What a transaction runs
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum Executable {
    #[codec(tag = 0)]
    Instructions(Vec<InstructionBox>),
    #[codec(tag = 1)]
    Wasm(WasmSmartContract),
}

impl Default for Executable {
    fn default() -> Self {
        Self::Instructions(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct TransactionPayload {
    pub chain: ChainId,
    pub authority: AccountId,
    pub creation_time: Timestamp,
    pub instructions: Executable,
    pub time_to_live: Option<NonZero<Duration>>,
    pub nonce: Option<NonZero<u32>>,
    pub metadata: Metadata,
}

impl TransactionPayload {
    #[must_use]
    pub fn new(chain: ChainId, authority: AccountId, creation_time: Timestamp) -> Self {
        Self {
            chain,
            authority,
            creation_time,
            instructions: Executable::default(),
            time_to_live: None,
            nonce: None,
            metadata: Metadata::new(),
        }
    }

    #[must_use]
    pub fn with_instructions(
        mut self,
        instructions: impl IntoIterator<Item = impl Into<InstructionBox>>,
    ) -> Self {
        self.instructions =
            Executable::Instructions(instructions.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the time-to-live; a zero duration leaves it unset.
    #[must_use]
    pub fn with_time_to_live(mut self, ttl: Duration) -> Self {
        self.time_to_live = NonZero::new(ttl).ok();
        self
    }

    /// Sets the nonce; zero leaves it unset.
    #[must_use]
    pub fn with_nonce(mut self, nonce: u32) -> Self {
        self.nonce = NonZero::new(nonce).ok();
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Instant after which the transaction is no longer admissible, if bounded
    #[must_use]
    pub fn expires_at(&self) -> Option<Timestamp> {
        let ttl = self.time_to_live.as_ref()?;
        self.creation_time.checked_add(*ttl.get())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct SignedTransactionV1 {
    pub signature: Signature,
    pub payload: TransactionPayload,
}

/// Versioned envelope; version 1 is the only one defined.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum SignedTransaction {
    #[codec(tag = 1)]
    V1(SignedTransactionV1),
}

impl SignedTransaction {
    #[must_use]
    pub fn new(payload: TransactionPayload, signature: Signature) -> Self {
        Self::V1(SignedTransactionV1 { signature, payload })
    }

    #[must_use]
    pub fn payload(&self) -> &TransactionPayload {
        match self {
            Self::V1(tx) => &tx.payload,
        }
    }

    #[must_use]
    pub fn signature(&self) -> &Signature {
        match self {
            Self::V1(tx) => &tx.signature,
        }
    }

    #[must_use]
    pub fn authority(&self) -> &AccountId {
        &self.payload().authority
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct TransactionLimitError {
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct InstructionExecutionFail {
    pub instruction: InstructionBox,
    pub reason: String,
}

/// Why a transaction was not applied
///
/// Tags 2 (executor validation) and 4 (wasm execution) are reserved.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum TransactionRejectionReason {
    #[codec(tag = 0)]
    AccountDoesNotExist(FindError),
    #[codec(tag = 1)]
    LimitCheck(TransactionLimitError),
    #[codec(tag = 3)]
    InstructionExecution(Box<InstructionExecutionFail>),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::isi::{Level, Log};
    use crate::{hex, HexString};

    fn payload() -> TransactionPayload {
        let authority: AccountId =
            "ed0120CE7FA46C9DCE7EA4B125E2E36BDB63EA33073E7590AC92816AE1E861B7048B03@wonderland"
                .parse()
                .unwrap();
        TransactionPayload::new("00000000".into(), authority, Timestamp::from_millis(1_000))
    }

    #[test]
    fn optional_fields_stay_unset_on_zero() {
        let tx = payload().with_nonce(0).with_time_to_live(Duration::from_millis(0));
        assert_eq!(tx.nonce, None);
        assert_eq!(tx.expires_at(), None);
        let tx = tx.with_time_to_live(Duration::from_secs(5)).with_nonce(7);
        assert_eq!(tx.expires_at(), Some(Timestamp::from_millis(6_000)));
        assert_eq!(tx.nonce.map(|n| n.value()), Some(7));
    }

    #[test]
    fn signed_envelope_is_version_one() {
        let tx = SignedTransaction::new(
            payload().with_instructions([Log {
                level: Level::Warn,
                msg: "x".into(),
            }]),
            Signature::from_bytes(vec![0xaa]),
        );
        let bytes = tx.to_bytes();
        assert_eq!(&bytes[..3], hex!("0104aa").as_bytes());
        assert_eq!(SignedTransaction::decode(bytes.clone()), tx);

        let mut wrong_version = bytes;
        wrong_version[0] = 0;
        assert!(SignedTransaction::try_decode::<_, crate::ByteParser>(wrong_version)
            .unwrap_err()
            .is_unknown_variant());
    }

    #[test]
    fn zero_nonce_rejected_on_decode() {
        let mut tx = payload();
        tx.nonce = NonZero::new(1).ok();
        let mut bytes = tx.to_bytes();
        // nonce is `Some(1u32)` followed by an empty metadata map
        let at = bytes.len() - 6;
        assert_eq!(&bytes[at..], &[0x01, 0x01, 0x00, 0x00, 0x00, 0x00]);
        bytes[at + 1] = 0;
        assert!(TransactionPayload::try_decode::<_, crate::ByteParser>(bytes)
            .unwrap_err()
            .is_constraint_violation());
        assert_eq!(Executable::default().encode::<HexString>(), hex!("0000"));
    }
}
