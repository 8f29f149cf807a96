//! Minimal TOML parser for scheduler configuration
//!
//! Handles only the subset the scheduler needs and does not allocate.
//! Keys not mentioned in the document keep their defaults.
//!
//! ```toml
//! follow_up_ms = 100
//!
//! [polling]
//! fast_min = 1
//! slow_min = 14
//!
//! [watchdog]
//! init_s = 5
//! ```
//!
//! Supported:
//! - Key = integer pairs
//! - `[polling]`, `[watchdog]`, `[location]`, `[ui]` section headers
//! - Comments (# ...)
//!
//! NOT supported: strings, arrays, tables of tables, dotted keys.

use super::types::{ConfigError, SchedulerConfig};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not valid in the current section
    UnknownKey,
    /// Value is not a non-negative integer of the right size
    InvalidValue,
    /// Parsed configuration failed validation
    Invalid(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Invalid(e)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Polling,
    Watchdog,
    Location,
    Ui,
}

/// Parse TOML configuration into SchedulerConfig
pub fn parse_config(input: &str) -> Result<SchedulerConfig, ParseError> {
    let mut config = SchedulerConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidValue)?;
        apply(&mut config, section, key, value)?;
    }

    config.validate()?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "polling" => Ok(Section::Polling),
        "watchdog" => Ok(Section::Watchdog),
        "location" => Ok(Section::Location),
        "ui" => Ok(Section::Ui),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply(
    config: &mut SchedulerConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Root, "follow_up_ms") => config.follow_up_ms = parse_int(value)?,
        (Section::Root, "fingerprint_len") => config.fingerprint_len = parse_int(value)?,

        (Section::Polling, "fast_min") => config.polling.fast_min = parse_int(value)?,
        (Section::Polling, "slow_min") => config.polling.slow_min = parse_int(value)?,
        (Section::Polling, "bootstrap_min") => config.polling.bootstrap_min = parse_int(value)?,
        (Section::Polling, "power_save_min") => config.polling.power_save_min = parse_int(value)?,
        (Section::Polling, "band_low_min") => config.polling.band_low_min = parse_int(value)?,
        (Section::Polling, "band_high_min") => config.polling.band_high_min = parse_int(value)?,
        (Section::Polling, "bootstrap_updates") => {
            config.polling.bootstrap_updates = parse_int(value)?
        }

        (Section::Watchdog, "init_s") => config.watchdog.init_s = parse_int(value)?,
        (Section::Watchdog, "location_s") => config.watchdog.location_s = parse_int(value)?,
        (Section::Watchdog, "weather_s") => config.watchdog.weather_s = parse_int(value)?,

        (Section::Location, "max_age_min") => config.location_max_age_min = parse_int(value)?,

        (Section::Ui, "indicator_hide_s") => config.ui.indicator_hide_s = parse_int(value)?,
        (Section::Ui, "alert_hide_s") => config.ui.alert_hide_s = parse_int(value)?,

        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

/// Remove a trailing comment
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Split a `key = value` line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse an integer value, allowing `_` digit separators
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    let mut digits = heapless::String::<20>::new();
    for c in value.chars().filter(|c| *c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, SchedulerConfig::default());
    }

    #[test]
    fn test_sections_and_comments() {
        let input = "
            # faster recovery for bench testing
            follow_up_ms = 250

            [polling]
            slow_min = 20   # quieter outside the band
            band_high_min = 40

            [watchdog]
            init_s = 10

            [location]
            max_age_min = 30

            [ui]
            alert_hide_s = 1_200
        ";

        let config = parse_config(input).unwrap();
        assert_eq!(config.follow_up_ms, 250);
        assert_eq!(config.polling.slow_min, 20);
        assert_eq!(config.polling.band_high_min, 40);
        assert_eq!(config.polling.fast_min, 1);
        assert_eq!(config.watchdog.init_s, 10);
        assert_eq!(config.watchdog.weather_s, 60);
        assert_eq!(config.location_max_age_min, 30);
        assert_eq!(config.ui.alert_hide_s, 1200);
    }

    #[test]
    fn test_unknown_section() {
        assert_eq!(parse_config("[radio]"), Err(ParseError::InvalidSection));
    }

    #[test]
    fn test_key_in_wrong_section() {
        let input = "[ui]\ninit_s = 5";
        assert_eq!(parse_config(input), Err(ParseError::UnknownKey));
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            parse_config("[polling]\nfast_min = fast"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[polling]\nbootstrap_updates = 300"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(parse_config("[polling]\nfast_min ="), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_validation_applies() {
        assert_eq!(
            parse_config("[watchdog]\nweather_s = 0"),
            Err(ParseError::Invalid(ConfigError::ZeroTimeout))
        );
    }
}
