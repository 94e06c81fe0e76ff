//! Parsing for the Zephyr engine.
//!
//! Three independent grammars live here:
//! - the candidate grammar (`hocus:underline`, `md:-m-[4px]!`, `[color:red]`),
//! - the entry stylesheet's directive surface (`@import`, `@source`,
//!   `@config`, `@plugin`, `@theme`, `@utilities`),
//! - the declarative plugin-file registration list (`@variant name (...)`).

pub mod candidate;
pub mod error;
pub mod plugin;
pub mod stylesheet;

pub use candidate::{
    parse_candidate, CandidateKind, ParsedCandidate, VariantApplication, VariantLookup,
};
pub use error::{ParseError, ParseResult};
pub use plugin::{parse_plugin, PluginPayload, PluginRegistration};
pub use stylesheet::{parse_stylesheet, Node, StylesheetDocument};
