//! Companion request scheduling core for the METAR watchface
//!
//! The watch cannot reach the network itself. It asks the companion app on
//! the paired phone for its location and for the latest weather report, and
//! has to notice when the companion stops answering. This crate contains
//! that logic, independent of the watch toolkit:
//!
//! - Single-slot timer table (delayed UI changes and request watchdogs)
//! - Radio link and companion reachability
//! - Polling interval policy
//! - Init / location / weather request flows with watchdog recovery
//! - Minute-driven update loop
//! - Event dispatch controller and collaborator traits

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod controller;
pub mod link;
pub mod policy;
pub mod scheduler;
pub mod state;
pub mod timer;
pub mod traits;
pub mod update;

#[cfg(test)]
mod mock;

pub use controller::Controller;
pub use state::{Event, Fault};
