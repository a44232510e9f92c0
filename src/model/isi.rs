//! Instructions
//!
//! [`InstructionBox`] is the union of every instruction a transaction may
//! carry. Each family (register, mint, transfer, ...) is itself a union over
//! the kinds of object it applies to, and each member wraps one of the
//! generic operation records below.
//!
//! Tags 9 to 11 of `InstructionBox` belong to trigger execution, parameter
//! changes and executor upgrades, which this crate does not model; they stay
//! reserved.

use super::entity::{
    Asset, NewAccount, NewAssetDefinition, NewDomain, NewRole, Peer, Permission,
};
use super::id::{AccountId, AssetDefinitionId, AssetId, DomainId, PeerId, RoleId};
use super::name::{Json, Name};
use super::primitives::Numeric;
use crate::{Decode, Encode};

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Register<O> {
    pub object: O,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Unregister<O> {
    pub object: O,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Mint<O, D> {
    pub object: O,
    pub destination: D,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Burn<O, D> {
    pub object: O,
    pub destination: D,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Transfer<S, O, D> {
    pub source: S,
    pub object: O,
    pub destination: D,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct SetKeyValue<O> {
    pub object: O,
    pub key: Name,
    pub value: Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct RemoveKeyValue<O> {
    pub object: O,
    pub key: Name,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Grant<O, D> {
    pub object: O,
    pub destination: D,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Revoke<O, D> {
    pub object: O,
    pub destination: D,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum RegisterBox {
    #[codec(tag = 0)]
    Peer(Register<Peer>),
    #[codec(tag = 1)]
    Domain(Register<NewDomain>),
    #[codec(tag = 2)]
    Account(Register<NewAccount>),
    #[codec(tag = 3)]
    AssetDefinition(Register<NewAssetDefinition>),
    #[codec(tag = 4)]
    Asset(Register<Asset>),
    #[codec(tag = 5)]
    Role(Register<NewRole>),
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum UnregisterBox {
    #[codec(tag = 0)]
    Peer(Unregister<PeerId>),
    #[codec(tag = 1)]
    Domain(Unregister<DomainId>),
    #[codec(tag = 2)]
    Account(Unregister<AccountId>),
    #[codec(tag = 3)]
    AssetDefinition(Unregister<AssetDefinitionId>),
    #[codec(tag = 4)]
    Asset(Unregister<AssetId>),
    #[codec(tag = 5)]
    Role(Unregister<RoleId>),
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum MintBox {
    #[codec(tag = 0)]
    Asset(Mint<Numeric, AssetId>),
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum BurnBox {
    #[codec(tag = 0)]
    Asset(Burn<Numeric, AssetId>),
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum TransferBox {
    #[codec(tag = 0)]
    Domain(Transfer<AccountId, DomainId, AccountId>),
    #[codec(tag = 1)]
    AssetDefinition(Transfer<AccountId, AssetDefinitionId, AccountId>),
    #[codec(tag = 2)]
    Asset(Transfer<AssetId, Numeric, AccountId>),
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum SetKeyValueBox {
    #[codec(tag = 0)]
    Domain(SetKeyValue<DomainId>),
    #[codec(tag = 1)]
    Account(SetKeyValue<AccountId>),
    #[codec(tag = 2)]
    AssetDefinition(SetKeyValue<AssetDefinitionId>),
    #[codec(tag = 3)]
    Asset(SetKeyValue<AssetId>),
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum RemoveKeyValueBox {
    #[codec(tag = 0)]
    Domain(RemoveKeyValue<DomainId>),
    #[codec(tag = 1)]
    Account(RemoveKeyValue<AccountId>),
    #[codec(tag = 2)]
    AssetDefinition(RemoveKeyValue<AssetDefinitionId>),
    #[codec(tag = 3)]
    Asset(RemoveKeyValue<AssetId>),
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum GrantBox {
    #[codec(tag = 0)]
    Permission(Grant<Permission, AccountId>),
    #[codec(tag = 1)]
    Role(Grant<RoleId, AccountId>),
    #[codec(tag = 2)]
    RolePermission(Grant<Permission, RoleId>),
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum RevokeBox {
    #[codec(tag = 0)]
    Permission(Revoke<Permission, AccountId>),
    #[codec(tag = 1)]
    Role(Revoke<RoleId, AccountId>),
    #[codec(tag = 2)]
    RolePermission(Revoke<Permission, RoleId>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Encode, Decode)]
pub enum Level {
    #[codec(tag = 0)]
    Trace,
    #[codec(tag = 1)]
    Debug,
    #[default]
    #[codec(tag = 2)]
    Info,
    #[codec(tag = 3)]
    Warn,
    #[codec(tag = 4)]
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Log {
    pub level: Level,
    pub msg: String,
}

/// Executor-specific instruction with an opaque JSON payload
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct CustomInstruction {
    pub payload: Json,
}

/// Any instruction
///
/// `Sequence` nests instructions inside an instruction, and is the
/// self-recursive member of the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum InstructionBox {
    #[codec(tag = 0)]
    Register(RegisterBox),
    #[codec(tag = 1)]
    Unregister(UnregisterBox),
    #[codec(tag = 2)]
    Mint(MintBox),
    #[codec(tag = 3)]
    Burn(BurnBox),
    #[codec(tag = 4)]
    Transfer(TransferBox),
    #[codec(tag = 5)]
    SetKeyValue(SetKeyValueBox),
    #[codec(tag = 6)]
    RemoveKeyValue(RemoveKeyValueBox),
    #[codec(tag = 7)]
    Grant(GrantBox),
    #[codec(tag = 8)]
    Revoke(RevokeBox),
    #[codec(tag = 12)]
    Log(Log),
    #[codec(tag = 13)]
    Custom(CustomInstruction),
    #[codec(tag = 14)]
    Sequence(Vec<InstructionBox>),
}

/// Wraps each family member into its family box and into [`InstructionBox`].
macro_rules! into_instruction {
    ( $( $family:ident :: $variant:ident ( $t:ty ) ),+ $(,)? ) => {
        $(
            impl From<$t> for $family {
                fn from(isi: $t) -> Self {
                    $family::$variant(isi)
                }
            }

            impl From<$t> for InstructionBox {
                fn from(isi: $t) -> Self {
                    InstructionBox::from($family::$variant(isi))
                }
            }
        )+
    };
}

into_instruction! {
    RegisterBox::Peer(Register<Peer>),
    RegisterBox::Domain(Register<NewDomain>),
    RegisterBox::Account(Register<NewAccount>),
    RegisterBox::AssetDefinition(Register<NewAssetDefinition>),
    RegisterBox::Asset(Register<Asset>),
    RegisterBox::Role(Register<NewRole>),
    UnregisterBox::Peer(Unregister<PeerId>),
    UnregisterBox::Domain(Unregister<DomainId>),
    UnregisterBox::Account(Unregister<AccountId>),
    UnregisterBox::AssetDefinition(Unregister<AssetDefinitionId>),
    UnregisterBox::Asset(Unregister<AssetId>),
    UnregisterBox::Role(Unregister<RoleId>),
    MintBox::Asset(Mint<Numeric, AssetId>),
    BurnBox::Asset(Burn<Numeric, AssetId>),
    TransferBox::Domain(Transfer<AccountId, DomainId, AccountId>),
    TransferBox::AssetDefinition(Transfer<AccountId, AssetDefinitionId, AccountId>),
    TransferBox::Asset(Transfer<AssetId, Numeric, AccountId>),
    SetKeyValueBox::Domain(SetKeyValue<DomainId>),
    SetKeyValueBox::Account(SetKeyValue<AccountId>),
    SetKeyValueBox::AssetDefinition(SetKeyValue<AssetDefinitionId>),
    SetKeyValueBox::Asset(SetKeyValue<AssetId>),
    RemoveKeyValueBox::Domain(RemoveKeyValue<DomainId>),
    RemoveKeyValueBox::Account(RemoveKeyValue<AccountId>),
    RemoveKeyValueBox::AssetDefinition(RemoveKeyValue<AssetDefinitionId>),
    RemoveKeyValueBox::Asset(RemoveKeyValue<AssetId>),
    GrantBox::Permission(Grant<Permission, AccountId>),
    GrantBox::Role(Grant<RoleId, AccountId>),
    GrantBox::RolePermission(Grant<Permission, RoleId>),
    RevokeBox::Permission(Revoke<Permission, AccountId>),
    RevokeBox::Role(Revoke<RoleId, AccountId>),
    RevokeBox::RolePermission(Revoke<Permission, RoleId>),
}

macro_rules! family_into_instruction {
    ( $( $family:ident => $variant:ident ),+ $(,)? ) => {
        $(
            impl From<$family> for InstructionBox {
                fn from(family: $family) -> Self {
                    InstructionBox::$variant(family)
                }
            }
        )+
    };
}

family_into_instruction! {
    RegisterBox => Register,
    UnregisterBox => Unregister,
    MintBox => Mint,
    BurnBox => Burn,
    TransferBox => Transfer,
    SetKeyValueBox => SetKeyValue,
    RemoveKeyValueBox => RemoveKeyValue,
    GrantBox => Grant,
    RevokeBox => Revoke,
    Log => Log,
    CustomInstruction => Custom,
}

impl InstructionBox {
    /// Groups `instructions` into a single instruction.
    pub fn sequence(instructions: impl IntoIterator<Item = impl Into<InstructionBox>>) -> Self {
        Self::Sequence(instructions.into_iter().map(Into::into).collect())
    }

    /// Counts this instruction and every instruction nested inside it.
    #[must_use]
    pub fn len_recursive(&self) -> usize {
        match self {
            Self::Sequence(inner) => 1 + inner.iter().map(Self::len_recursive).sum::<usize>(),
            _ => 1,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::adt::Discriminant;
    use crate::{hex, HexString};

    fn log(msg: &str) -> InstructionBox {
        Log {
            level: Level::Info,
            msg: msg.into(),
        }
        .into()
    }

    #[test]
    fn tags_skip_reserved_range() {
        assert_eq!(InstructionBox::tag_of("Revoke"), Some(8));
        assert_eq!(InstructionBox::tag_of("Log"), Some(12));
        assert_eq!(InstructionBox::tag_of("Sequence"), Some(14));
        for reserved in 9u8..=11 {
            let err = InstructionBox::try_decode::<_, crate::ByteParser>(vec![reserved, 0])
                .unwrap_err();
            assert!(err.is_unknown_variant());
        }
    }

    #[test]
    fn log_wire_form() {
        assert_eq!(log("hi").encode::<HexString>(), hex!("0c02086869"));
    }

    #[test]
    fn nested_sequence_round_trips() {
        let inner = InstructionBox::sequence([log("a"), log("b")]);
        let outer = InstructionBox::sequence([inner, log("c")]);
        assert_eq!(outer.len_recursive(), 5);
        let bytes = outer.to_bytes();
        // tag 14, two elements, tag 14, two elements, ...
        assert_eq!(&bytes[..3], &[0x0e, 0x08, 0x0e]);
        assert_eq!(InstructionBox::decode(bytes), outer);
    }

    #[test]
    fn mint_routes_through_family() {
        let asset: AssetId = "rose##ed0120CE7FA46C9DCE7EA4B125E2E36BDB63EA33073E7590AC92816AE1E861B7048B03@wonderland"
            .parse()
            .unwrap();
        let isi = InstructionBox::from(Mint {
            object: Numeric::integer(1),
            destination: asset,
        });
        assert_eq!(isi.discriminant(), 2);
        assert_eq!(&isi.to_bytes()[..4], &[0x02, 0x00, 0x04, 0x00]);
        assert_eq!(InstructionBox::decode(isi.to_bytes()), isi);
    }
}
