//! Link configuration
//!
//! Board-agnostic settings for one device's end of a bit-link, and a parser
//! for the TOML subset the firmware embeds.

pub mod parse;
pub mod types;

pub use parse::parse_config;
pub use types::*;
