//! Data model and binary codecs for a distributed-ledger client
//!
//! # Overview
//!
//! This crate defines the values a ledger client exchanges with a ledger
//! network (identifiers, accounts and assets, instructions, transactions,
//! blocks and queries) together with the SCALE-style binary form each of them
//! takes on the wire.
//!
//! The high-level traits [`Encode`] and [`Decode`] are the keystones of the
//! library. Primitive types (fixed-width and compact integers, booleans,
//! strings, byte sequences) implement them directly; composite types
//! (structs, tagged unions, tuples, options, sequences, ordered collections)
//! implement them structurally, usually through the derive macros of the same
//! names. Tags of union variants are fixed with `#[codec(tag = N)]` and are
//! part of the wire contract.
//!
//! # Layout
//!
//! - [`conv`], [`parse`]: the transcoding traits, serialization targets and
//!   parsers, with their error types.
//! - [`prim`], [`compact`], [`fixed`], [`nonzero`], [`seq`], [`bitmap`],
//!   [`adt`]: codecs for primitive and generic composite types.
//! - [`model`]: the ledger data catalogue.
//! - [`predicate`], [`selector`], [`projection`]: filters and projections
//!   that can be sent to the ledger as part of a query.
//! - [`query`]: query envelopes, the cursor protocol, an in-memory ledger stub
//!   and a client driver.
//! - [`schema`]: runtime registry of discriminant tables.
//!
//! # Example
//!
//! ```
//! use ledger_model::model::isi::{InstructionBox, Level, Log};
//! use ledger_model::{hex, Decode, Encode, HexString};
//!
//! let log = InstructionBox::from(Log {
//!     level: Level::Info,
//!     msg: "hi".into(),
//! });
//! assert_eq!(log.encode::<HexString>(), hex!("0c02086869"));
//! assert_eq!(InstructionBox::decode(hex!("0c02086869")), log);
//! ```

extern crate self as ledger_model;

extern crate decode_derive;
extern crate encode_derive;

pub mod adt;
pub mod bitmap;
pub mod compact;
pub mod conv;
pub mod error;
pub mod fixed;
pub mod hexstring;
pub mod model;
pub mod nonzero;
pub mod parse;
pub mod predicate;
pub mod prim;
pub mod projection;
pub mod query;
pub mod schema;
pub mod selector;
pub mod seq;

pub use crate::compact::Compact;
pub use crate::conv::{error::DecodeError, target::Target, Decode, Encode, EncodeLength};
pub use crate::error::ConstraintError;
pub use crate::fixed::FixedBytes;
pub use crate::hexstring::HexString;
pub use crate::nonzero::NonZero;
pub use crate::parse::{
    error::ParseError, ByteParser, DecodeLimits, ParseResult, Parser, SliceParser, TryIntoParser,
};
pub use crate::seq::{Comparator, NaturalOrder, SortedMap, SortedSet};

pub use ::decode_derive::Decode;
pub use ::encode_derive::Encode;
