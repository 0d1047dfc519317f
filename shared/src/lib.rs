//! # Event Log Protocol
//!
//! Runtime-free pieces of the log relay: everything needed to turn the text
//! a game server plugin writes to its UDP log stream into JSON-ready events.
//!
//! ## Wire Grammar
//!
//! ```text
//! HW-><command>-><version>-><field1>-><field2>->...->
//! ```
//!
//! Positions are `x,y,z`, orientations `a,b,c`, health/armour `h,a`; every
//! other field is a bare token. The layout of the fields is chosen by
//! command and version through the [`ParserTable`].
//!
//! ## Example
//!
//! ```rust
//! use shared::LineParser;
//!
//! let parser = LineParser::default();
//! let event = parser
//!     .parse("HW->player_jump->1->77->12.5,-3.0,64.0->90,0,0->")
//!     .unwrap();
//! assert_eq!(event.command(), "player_jump");
//! assert_eq!(event.get("originator").unwrap()["clientId"], "77");
//! ```
//!
//! ## Modules
//!
//! - `tokenizer`: lazy cursor over `->`-delimited tokens
//! - `extract`: field extractors
//! - `parser`: the versioned parser table and line parser
//! - `event`: structured events and deep merge
//! - `map`: overview calibration and the map notification
//! - `datagram`: Source log packet framing
//! - `entities`: entity lump extraction for the map tooling

pub mod datagram;
pub mod entities;
pub mod error;
pub mod event;
pub mod extract;
pub mod map;
pub mod parser;
pub mod tokenizer;

pub use datagram::decode_datagram;
pub use entities::extract_entities;
pub use error::{EntityError, ParseError};
pub use event::{deep_merge, Fragment, StructuredEvent};
pub use extract::FieldExtractor;
pub use map::{parse_calibration, MapInfo};
pub use parser::{LineParser, ParserTable, STANDARD_PARSERS};
pub use tokenizer::Tokens;

/// Marks a log line as belonging to the event protocol.
pub const PROTOCOL_PREFIX: &str = "HW->";
/// Closes every token, including the last one.
pub const FIELD_DELIMITER: &str = "->";
