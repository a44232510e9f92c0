//! Identifiers of ledger entities
//!
//! Every identifier has a wire form (its fields, in declaration order) and a
//! text form:
//!
//! | type                  | text                                   |
//! |-----------------------|----------------------------------------|
//! | [`DomainId`]          | `wonderland`                           |
//! | [`AccountId`]         | `<public key>@wonderland`              |
//! | [`AssetDefinitionId`] | `rose#wonderland`                      |
//! | [`AssetId`]           | `rose#wonderland#<public key>@looking_glass`, or `rose##<public key>@wonderland` when both domains coincide |
//! | [`RoleId`]            | `admin`                                |
//! | [`PeerId`]            | `<public key>`                         |

use std::fmt::Display;
use std::str::FromStr;

use super::crypto::PublicKey;
use super::name::Name;
use crate::error::ConstraintError;
use crate::{Decode, Encode};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct DomainId {
    pub name: Name,
}

impl DomainId {
    #[must_use]
    pub fn new(name: Name) -> Self {
        Self { name }
    }
}

impl Display for DomainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.name, f)
    }
}

impl FromStr for DomainId {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self::new)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct AccountId {
    pub domain: DomainId,
    pub signatory: PublicKey,
}

impl AccountId {
    #[must_use]
    pub fn new(domain: DomainId, signatory: PublicKey) -> Self {
        Self { domain, signatory }
    }
}

impl Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.signatory, self.domain)
    }
}

impl FromStr for AccountId {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (signatory, domain) = s
            .split_once('@')
            .ok_or_else(|| ConstraintError::malformed("account id", s, "expected `signatory@domain`"))?;
        Ok(Self::new(domain.parse()?, signatory.parse()?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct AssetDefinitionId {
    pub domain: DomainId,
    pub name: Name,
}

impl AssetDefinitionId {
    #[must_use]
    pub fn new(domain: DomainId, name: Name) -> Self {
        Self { domain, name }
    }
}

impl Display for AssetDefinitionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.name, self.domain)
    }
}

impl FromStr for AssetDefinitionId {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, domain) = s
            .split_once('#')
            .ok_or_else(|| ConstraintError::malformed("asset definition id", s, "expected `name#domain`"))?;
        Ok(Self::new(domain.parse()?, name.parse()?))
    }
}

/// Holding of one asset definition by one account
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct AssetId {
    pub account: AccountId,
    pub definition: AssetDefinitionId,
}

impl AssetId {
    #[must_use]
    pub fn new(definition: AssetDefinitionId, account: AccountId) -> Self {
        Self {
            account,
            definition,
        }
    }
}

impl Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.definition.domain == self.account.domain {
            write!(f, "{}##{}", self.definition.name, self.account)
        } else {
            write!(f, "{}#{}", self.definition, self.account)
        }
    }
}

impl FromStr for AssetId {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || {
            ConstraintError::malformed("asset id", s, "expected `name#domain#account` or `name##account`")
        };
        let (name, rest) = s.split_once('#').ok_or_else(malformed)?;
        let name: Name = name.parse()?;
        if let Some(account) = rest.strip_prefix('#') {
            let account: AccountId = account.parse()?;
            let definition = AssetDefinitionId::new(account.domain.clone(), name);
            return Ok(Self::new(definition, account));
        }
        let (domain, account) = rest.split_once('#').ok_or_else(malformed)?;
        Ok(Self::new(
            AssetDefinitionId::new(domain.parse()?, name),
            account.parse()?,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct RoleId {
    pub name: Name,
}

impl RoleId {
    #[must_use]
    pub fn new(name: Name) -> Self {
        Self { name }
    }
}

impl Display for RoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.name, f)
    }
}

impl FromStr for RoleId {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self::new)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct PeerId {
    pub public_key: PublicKey,
}

impl PeerId {
    #[must_use]
    pub fn new(public_key: PublicKey) -> Self {
        Self { public_key }
    }
}

impl Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.public_key, f)
    }
}

impl FromStr for PeerId {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self::new)
    }
}

/// Serializes through the text form, so that identifiers read naturally as
/// JSON strings and map keys.
#[cfg(feature = "serde_impls")]
macro_rules! impl_serde_via_str {
    ( $( $t:ty ),+ $(,)? ) => {
        $(
            impl serde::Serialize for $t {
                fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.collect_str(self)
                }
            }

            impl<'de> serde::Deserialize<'de> for $t {
                fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
                    raw.parse().map_err(serde::de::Error::custom)
                }
            }
        )+
    };
}

#[cfg(feature = "serde_impls")]
impl_serde_via_str!(
    DomainId,
    AccountId,
    AssetDefinitionId,
    AssetId,
    RoleId,
    PeerId,
    PublicKey,
);

#[cfg(test)]
mod test {
    use super::*;
    use crate::{hex, HexString};

    const ALICE_KEY: &str = "ed0120CE7FA46C9DCE7EA4B125E2E36BDB63EA33073E7590AC92816AE1E861B7048B03";

    fn alice() -> AccountId {
        format!("{ALICE_KEY}@wonderland").parse().unwrap()
    }

    #[test]
    fn account_id_text() {
        let id = alice();
        assert_eq!(id.domain.to_string(), "wonderland");
        assert_eq!(id.to_string(), format!("{ALICE_KEY}@wonderland"));
        assert!("wonderland".parse::<AccountId>().is_err());
        assert!(format!("{ALICE_KEY}@").parse::<AccountId>().is_err());
    }

    #[test]
    fn asset_id_text_elides_shared_domain() {
        let rose = format!("rose##{ALICE_KEY}@wonderland");
        let id: AssetId = rose.parse().unwrap();
        assert_eq!(id.definition.to_string(), "rose#wonderland");
        assert_eq!(id.to_string(), rose);

        let foreign = format!("rose#garden#{ALICE_KEY}@wonderland");
        let id: AssetId = foreign.parse().unwrap();
        assert_eq!(id.definition.domain.to_string(), "garden");
        assert_eq!(id.to_string(), foreign);

        assert!("rose".parse::<AssetId>().is_err());
        assert!(format!("rose#garden{ALICE_KEY}").parse::<AssetId>().is_err());
    }

    #[test]
    fn wire_order_is_field_order() {
        let def: AssetDefinitionId = "xor#d".parse().unwrap();
        // domain first, then name
        assert_eq!(def.encode::<HexString>(), hex!("04640c786f72"));
        assert_eq!(AssetDefinitionId::decode(def.to_bytes()), def);

        let id = alice();
        let bytes = id.to_bytes();
        assert_eq!(&bytes[..11], hex!("28776f6e6465726c616e64").as_bytes());
        assert_eq!(AccountId::decode(bytes), id);
    }
}
