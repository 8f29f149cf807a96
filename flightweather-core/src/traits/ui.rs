//! Notifications to the watch UI
//!
//! The core never renders. It tells the UI what changed and the UI decides
//! how to show it.

use crate::scheduler::WeatherRecord;

/// UI elements whose visibility the core controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Indicator {
    /// GPS lookup in progress
    Gps,
    /// Companion fetching from the network
    Net,
    /// IMC alert dialog
    Alert,
}

/// Status icon state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusIcons {
    /// Radio link to the phone is up
    pub link: bool,
    /// Companion app is answering
    pub companion: bool,
    /// Current report indicates instrument conditions
    pub imc: bool,
}

/// Display settings pushed by the companion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplaySettings {
    /// Keep the large report font even if the text overflows
    pub large_font: bool,
    /// Show seconds and the date line
    pub seconds: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            large_font: false,
            seconds: true,
        }
    }
}

/// Age of the displayed report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MetarAge {
    /// No issue time known
    Unknown,
    /// Issued this many whole minutes ago
    Minutes(u32),
    /// Issued more than this many hours ago
    OverHours(u32),
}

/// Haptic patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pulse {
    /// Radio link lost
    Double,
    /// IMC conditions started
    Short,
}

/// Trait for the UI notification sink
pub trait UiSink {
    /// Make an indicator visible
    fn show(&mut self, indicator: Indicator);

    /// Hide an indicator
    fn hide(&mut self, indicator: Indicator);

    /// Update the status icons
    fn set_status(&mut self, status: StatusIcons);

    /// A materially new weather report arrived; re-layout
    fn weather_changed(&mut self, record: &WeatherRecord);

    /// Replace the alert dialog content (shown via `Indicator::Alert`)
    fn alert(&mut self, title: &str, message: &str);

    /// Display settings changed
    fn settings_changed(&mut self, settings: DisplaySettings);

    /// Report age for the age line, refreshed every tick
    fn metar_age(&mut self, age: MetarAge);

    /// Trigger a haptic pattern
    fn pulse(&mut self, pulse: Pulse);
}
