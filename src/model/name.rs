//! Validated names and opaque JSON values

use std::fmt::Display;
use std::str::FromStr;

use crate::conv::{target::Target, Decode, Encode};
use crate::error::ConstraintError;
use crate::parse::{ParseResult, Parser};

/// Identifier fragment used for domains, asset definitions, roles and
/// metadata keys.
///
/// A `Name` is non-empty and contains neither whitespace, nor `@` (which
/// separates a signatory from its domain), nor `#` (which separates an asset
/// name from its domain). The wire form is that of a `String`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(String);

impl Name {
    pub fn new(name: impl Into<String>) -> Result<Self, ConstraintError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConstraintError::EmptyName);
        }
        if let Some(ch) = name
            .chars()
            .find(|&ch| ch.is_whitespace() || ch == '@' || ch == '#')
        {
            return Err(ConstraintError::ForbiddenChar { name, ch });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Name {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Name {
    type Error = ConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Encode for Name {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.0.write_to(buf)
    }
}

impl Decode for Name {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        Ok(Self::new(String::parse(p)?)?)
    }
}

#[cfg(feature = "serde_impls")]
impl serde::Serialize for Name {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde_impls")]
impl<'de> serde::Deserialize<'de> for Name {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// JSON document carried as its serialized text
///
/// The ledger treats JSON payloads (metadata values, permission payloads,
/// custom instructions) as strings on the wire; parsing happens only when a
/// caller asks for the value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Json(String);

impl Json {
    /// Serializes `value` into a new `Json`.
    pub fn new(value: &serde_json::Value) -> Self {
        Self(value.to_string())
    }

    /// The JSON literal `null`
    pub fn null() -> Self {
        Self(String::from("null"))
    }

    /// Wraps text that is already known to be JSON, without validating it.
    pub fn from_string_unchecked(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the carried text.
    pub fn value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.0)
    }

    /// Deserializes the carried text into `T`.
    #[cfg(feature = "serde_impls")]
    pub fn try_into_any<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.0)
    }

    /// Compares two documents by value, so that formatting differences such
    /// as whitespace or key order do not matter.
    ///
    /// Falls back to textual comparison if either side is not valid JSON.
    pub fn same_value(&self, other: &Self) -> bool {
        match (self.value(), other.value()) {
            (Ok(a), Ok(b)) => a == b,
            _ => self.0 == other.0,
        }
    }
}

impl From<serde_json::Value> for Json {
    fn from(value: serde_json::Value) -> Self {
        Self::new(&value)
    }
}

impl From<u64> for Json {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for Json {
    fn from(value: &str) -> Self {
        Self::new(&serde_json::Value::from(value))
    }
}

impl Display for Json {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Json {
    type Err = serde_json::Error;

    /// Validates `s` as JSON and stores it verbatim.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str::<serde_json::Value>(s)?;
        Ok(Self(s.to_owned()))
    }
}

impl Encode for Json {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.0.write_to(buf)
    }
}

impl Decode for Json {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        String::parse(p).map(Self)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parse::ByteParser;
    use crate::{hex, HexString};

    #[test]
    fn name_validation() {
        assert!(Name::new("wonderland").is_ok());
        assert_eq!(Name::new(""), Err(ConstraintError::EmptyName));
        assert_eq!(
            Name::new("alice@wonderland"),
            Err(ConstraintError::ForbiddenChar {
                name: "alice@wonderland".into(),
                ch: '@'
            })
        );
        assert!("rose#wonderland".parse::<Name>().is_err());
        assert!("white rabbit".parse::<Name>().is_err());
    }

    #[test]
    fn name_decode_validates() {
        let name: Name = "alice".parse().unwrap();
        assert_eq!(name.encode::<HexString>(), hex!("14616c696365"));
        assert_eq!(Name::decode(hex!("14616c696365")), name);
        // "a b"
        let err = Name::try_decode::<_, ByteParser>(hex!("0c612062")).unwrap_err();
        assert!(err.is_constraint_violation());
        let err = Name::try_decode::<_, ByteParser>(hex!("00")).unwrap_err();
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn json_compares_by_value() {
        let a: Json = r#"{"a": 1, "b": [true]}"#.parse().unwrap();
        let b = Json::new(&serde_json::json!({"b": [true], "a": 1}));
        assert_ne!(a, b);
        assert!(a.same_value(&b));
        assert!("{oops".parse::<Json>().is_err());
        assert_eq!(Json::from("x").as_str(), "\"x\"");
        assert_eq!(Json::null().value().unwrap(), serde_json::Value::Null);
    }
}
