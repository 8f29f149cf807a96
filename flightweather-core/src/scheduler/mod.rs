//! Companion request scheduling
//!
//! Three request flows (init, location, weather), each with at most one
//! outstanding watchdog. An expired watchdog re-runs Init, so the link
//! heals itself whenever the transport recovers.

pub mod flow;
pub mod records;
pub mod request;

pub use flow::{Continuation, Flow, FlowRecord, Slot, SLOTS};
pub use records::{
    same_fingerprint, Snapshot, Station, StoredStation, StoredWeather, WeatherRecord,
    MAX_STATION_LEN,
};
pub use request::{Fired, Received, RequestOutcome, RequestScheduler};
