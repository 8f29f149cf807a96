//! Scheduler configuration
//!
//! All tunables of the request scheduler, defaulting to the reference
//! cadence. Can be built from a small TOML document.

pub mod toml;
pub mod types;

pub use self::toml::{parse_config, ParseError};
pub use types::*;
