//! Blocks

use std::cmp::Ordering;

use super::crypto::Signature;
use super::primitives::{Hash, Timestamp};
use super::transaction::{SignedTransaction, TransactionRejectionReason};
use crate::conv::{target::Target, Decode, Encode};
use crate::nonzero::NonZero;
use crate::parse::{ParseResult, Parser};
use crate::seq::{Comparator, SortedSet};

#[derive(Debug, Clone, PartialEq, Eq, crate::Encode, crate::Decode)]
pub struct BlockHeader {
    pub height: NonZero<u64>,
    pub prev_block_hash: Option<Hash>,
    pub transactions_hash: Hash,
    pub creation_time: Timestamp,
    pub view_change_index: u32,
}

impl BlockHeader {
    #[must_use]
    pub fn is_genesis(&self) -> bool {
        self.height.value() == 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, crate::Encode, crate::Decode)]
pub struct BlockSignature {
    pub peer_topology_index: u64,
    pub signature: Signature,
}

#[derive(Debug, Clone, PartialEq, Eq, crate::Encode, crate::Decode)]
pub struct BlockPayload {
    pub header: BlockHeader,
    pub transactions: Vec<SignedTransaction>,
}

/// Rejection of the transaction at `index` within a block
///
/// Written as the pair `(index, reason)`, so that a set of these has the
/// same wire form as a map from index to reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionError {
    pub index: u64,
    pub reason: TransactionRejectionReason,
}

impl Encode for TransactionError {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        crate::write_all_to!(self.index, self.reason => buf)
    }
}

impl Decode for TransactionError {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        Ok(Self {
            index: u64::parse(p)?,
            reason: TransactionRejectionReason::parse(p)?,
        })
    }
}

/// Orders transaction errors by position alone; at most one error is kept
/// per transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByIndex;

impl Comparator<TransactionError> for ByIndex {
    fn compare(a: &TransactionError, b: &TransactionError) -> Ordering {
        a.index.cmp(&b.index)
    }
}

pub type TransactionErrors = SortedSet<TransactionError, ByIndex>;

#[derive(Debug, Clone, PartialEq, Eq, crate::Encode, crate::Decode)]
pub struct SignedBlockV1 {
    pub signatures: Vec<BlockSignature>,
    pub payload: BlockPayload,
    pub errors: TransactionErrors,
}

/// Versioned envelope; version 1 is the only one defined.
#[derive(Debug, Clone, PartialEq, Eq, crate::Encode, crate::Decode)]
pub enum SignedBlock {
    #[codec(tag = 1)]
    V1(SignedBlockV1),
}

impl SignedBlock {
    #[must_use]
    pub fn header(&self) -> &BlockHeader {
        match self {
            Self::V1(block) => &block.payload.header,
        }
    }

    #[must_use]
    pub fn transactions(&self) -> &[SignedTransaction] {
        match self {
            Self::V1(block) => &block.payload.transactions,
        }
    }

    /// Looks up the rejection reason of the transaction at `index`.
    #[must_use]
    pub fn error(&self, index: u64) -> Option<&TransactionRejectionReason> {
        match self {
            Self::V1(block) => block
                .errors
                .iter()
                .find(|err| err.index == index)
                .map(|err| &err.reason),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::transaction::TransactionLimitError;
    use crate::seq::SortedMap;

    fn limit(index: u64, reason: &str) -> TransactionError {
        TransactionError {
            index,
            reason: TransactionRejectionReason::LimitCheck(TransactionLimitError {
                reason: reason.into(),
            }),
        }
    }

    fn header(height: u64) -> BlockHeader {
        BlockHeader {
            height: NonZero::new(height).unwrap(),
            prev_block_hash: None,
            transactions_hash: Hash::from_array([7; 32]),
            creation_time: Timestamp::from_millis(0),
            view_change_index: 0,
        }
    }

    #[test]
    fn errors_ordered_by_index_only() {
        let errors = TransactionErrors::from_iter([limit(5, "a"), limit(1, "b"), limit(5, "c")]);
        let indices: Vec<u64> = errors.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![1, 5]);
        // the first error recorded for an index is kept
        assert_eq!(errors.as_slice()[1], limit(5, "a"));
    }

    #[test]
    fn error_set_matches_map_wire_form() {
        let errors = TransactionErrors::from_iter([limit(2, "x"), limit(0, "y")]);
        let map: SortedMap<u64, TransactionRejectionReason> =
            errors.iter().map(|e| (e.index, e.reason.clone())).collect();
        assert_eq!(errors.to_bytes(), map.to_bytes());
        assert_eq!(TransactionErrors::decode(map.to_bytes()), errors);
    }

    #[test]
    fn block_round_trips() {
        let block = SignedBlock::V1(SignedBlockV1 {
            signatures: vec![BlockSignature {
                peer_topology_index: 0,
                signature: Signature::from_bytes(vec![1; 4]),
            }],
            payload: BlockPayload {
                header: header(1),
                transactions: vec![],
            },
            errors: TransactionErrors::from_iter([limit(3, "too big")]),
        });
        assert!(block.header().is_genesis());
        assert!(block.error(3).is_some());
        assert!(block.error(0).is_none());
        assert_eq!(SignedBlock::decode(block.to_bytes()), block);
    }

    #[test]
    fn zero_height_rejected() {
        let mut bytes = header(1).to_bytes();
        bytes[0] = 0;
        assert!(BlockHeader::try_decode::<_, crate::ByteParser>(bytes)
            .unwrap_err()
            .is_constraint_violation());
    }
}
