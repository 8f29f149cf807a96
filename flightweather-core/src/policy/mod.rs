//! Weather polling policy

pub mod interval;

pub use interval::{elapsed_minutes, IntervalPolicy, PollingMode};
