//! Watch/companion message contract
//!
//! This crate defines the key/value messages exchanged between the watch and
//! the companion app running on the paired phone. The companion does the
//! network and GPS work; the watch only asks and displays.
//!
//! # Message Overview
//!
//! A message is a small dictionary of numbered keys:
//! ```text
//! ┌──────┬───────────┬─────────────────────────────────────┐
//! │ ID   │ KEY       │ VALUE                               │
//! ├──────┼───────────┼─────────────────────────────────────┤
//! │ 0x0  │ METAR     │ text, raw weather report            │
//! │ 0x1  │ REQUEST   │ text, "init" | "location" | "metar" │
//! │ 0x2  │ STATION   │ text, ICAO station identifier       │
//! │ 0x3  │ STATUS    │ integer, reserved                   │
//! │ 0x4  │ INIT      │ any, companion (re)initialised      │
//! │ 0x5  │ LOCATION  │ 1 searching, 0 idle, -1 failed      │
//! │ 0x6  │ NET       │ 1 fetching, 0 idle                  │
//! │ 0x7  │ CLOUDS    │ text, IMC alert                     │
//! │ 0x8  │ BAT       │ 0/1 battery saving                  │
//! │ 0x9  │ LARGEFONT │ 0/1                                 │
//! │ 0xa  │ SECONDS   │ 0/1                                 │
//! │ 0xb  │ UPDATED   │ epoch seconds the report was issued │
//! └──────┴───────────┴─────────────────────────────────────┘
//! ```
//!
//! How a message travels over the radio is the transport's business; this
//! crate only fixes the keys and the shape of their values.

#![no_std]
#![deny(unsafe_code)]

pub mod inbound;
pub mod keys;
pub mod message;
pub mod request;

pub use inbound::{Inbound, LocationStatus};
pub use keys::{Key, KeySet};
pub use message::{Message, MessageError, Value, MAX_ENTRIES, MAX_TEXT_LEN};
pub use request::Request;
