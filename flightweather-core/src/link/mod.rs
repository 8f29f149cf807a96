//! Radio link and companion reachability

pub mod connection;

pub use connection::{ConnectionState, LinkTransition, Reachability};
