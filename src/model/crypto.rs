//! Public keys and signatures
//!
//! Keys and signatures are opaque byte payloads here; no signing or
//! verification is performed. A [`PublicKey`] has a textual *multihash*
//! form: the varint code of its algorithm, the varint length of the payload,
//! then the payload, all hex-encoded (`ed0120` + 32 bytes for ed25519).

use std::fmt::{Debug, Display};
use std::str::FromStr;

use crate::error::ConstraintError;
use crate::hexstring::util::{bytes_of_hex, hex_of_bytes};
use crate::{Decode, Encode};

/// Signature scheme of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Encode, Decode)]
pub enum Algorithm {
    #[default]
    #[codec(tag = 0)]
    Ed25519,
    #[codec(tag = 1)]
    Secp256k1,
    #[codec(tag = 2)]
    BlsNormal,
    #[codec(tag = 3)]
    BlsSmall,
}

impl Algorithm {
    /// Multicodec identifier used in the multihash text form
    #[must_use]
    pub const fn multicodec(self) -> u64 {
        match self {
            Algorithm::Ed25519 => 0xed,
            Algorithm::Secp256k1 => 0xe7,
            Algorithm::BlsNormal => 0xea,
            Algorithm::BlsSmall => 0xeb,
        }
    }

    #[must_use]
    pub const fn from_multicodec(code: u64) -> Option<Self> {
        match code {
            0xed => Some(Algorithm::Ed25519),
            0xe7 => Some(Algorithm::Secp256k1),
            0xea => Some(Algorithm::BlsNormal),
            0xeb => Some(Algorithm::BlsSmall),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Algorithm::Ed25519 => "ed25519",
            Algorithm::Secp256k1 => "secp256k1",
            Algorithm::BlsNormal => "bls_normal",
            Algorithm::BlsSmall => "bls_small",
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn write_varint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let low = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(low);
            return;
        }
        out.push(low | 0x80);
    }
}

/// Reads an unsigned LEB128 integer, returning it with the number of bytes used.
fn read_varint(bytes: &[u8]) -> Option<(u64, usize)> {
    let mut value = 0u64;
    for (ix, &byte) in bytes.iter().enumerate().take(10) {
        value |= u64::from(byte & 0x7f) << (7 * ix);
        if byte & 0x80 == 0 {
            return Some((value, ix + 1));
        }
    }
    None
}

/// Public half of a key pair
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct PublicKey {
    algorithm: Algorithm,
    payload: Vec<u8>,
}

impl PublicKey {
    #[must_use]
    pub fn new(algorithm: Algorithm, payload: Vec<u8>) -> Self {
        Self { algorithm, payload }
    }

    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Renders the multihash form: lower-case prefix, upper-case payload.
    #[must_use]
    pub fn to_multihash(&self) -> String {
        let mut prefix = Vec::with_capacity(4);
        write_varint(self.algorithm.multicodec(), &mut prefix);
        write_varint(self.payload.len() as u64, &mut prefix);
        let mut out = hex_of_bytes(&prefix);
        out.push_str(&hex_of_bytes(&self.payload).to_uppercase());
        out
    }

    /// Parses the multihash form, in either case.
    pub fn from_multihash(s: &str) -> Result<Self, ConstraintError> {
        const KIND: &str = "public key";
        let bytes =
            bytes_of_hex(s).map_err(|_| ConstraintError::malformed(KIND, s, "not a hex string"))?;
        let (code, used) = read_varint(&bytes)
            .ok_or_else(|| ConstraintError::malformed(KIND, s, "truncated algorithm code"))?;
        let algorithm = Algorithm::from_multicodec(code)
            .ok_or_else(|| ConstraintError::malformed(KIND, s, "unknown algorithm code"))?;
        let rest = &bytes[used..];
        let (len, used) = read_varint(rest)
            .ok_or_else(|| ConstraintError::malformed(KIND, s, "truncated payload length"))?;
        let payload = &rest[used..];
        if payload.len() as u64 != len {
            return Err(ConstraintError::malformed(KIND, s, "payload length mismatch"));
        }
        Ok(Self::new(algorithm, payload.to_vec()))
    }
}

impl Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_multihash()).finish()
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_multihash())
    }
}

impl FromStr for PublicKey {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_multihash(s)
    }
}

/// Opaque signature bytes
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Encode, Decode)]
pub struct Signature(Vec<u8>);

impl Signature {
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", hex_of_bytes(&self.0))
    }
}
