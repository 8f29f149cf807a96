//! Typed view of messages received from the companion
//!
//! Decoding works key by key. A key with the wrong value shape is recorded
//! in [`Inbound::malformed`] and skipped; it never invalidates the rest of
//! the message.

use crate::keys::{Key, KeySet};
use crate::message::{Message, Value};

/// GPS lookup state reported under LOCATION
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LocationStatus {
    /// Companion has started a GPS lookup
    Searching,
    /// Lookup finished; a STATION follows
    Idle,
    /// Lookup failed; the configured station (if any) follows
    Failed,
}

impl LocationStatus {
    /// Parse from the wire value
    ///
    /// -1 may arrive sign-extended or as an unsigned byte.
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(LocationStatus::Searching),
            0 => Some(LocationStatus::Idle),
            -1 | 0xff => Some(LocationStatus::Failed),
            _ => None,
        }
    }

    /// Returns true while the GPS is active
    pub fn is_searching(&self) -> bool {
        matches!(self, LocationStatus::Searching)
    }
}

/// Decoded inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Inbound<'a> {
    /// INIT present: the companion answered an init request
    pub init: bool,
    /// LARGEFONT setting
    pub large_font: Option<bool>,
    /// BAT (battery saving) setting
    pub power_save: Option<bool>,
    /// SECONDS setting
    pub seconds: Option<bool>,
    /// LOCATION progress
    pub location: Option<LocationStatus>,
    /// NET progress (true while the companion is fetching)
    pub net: Option<bool>,
    /// UPDATED: issue time of the report, epoch seconds
    pub updated: Option<u32>,
    /// METAR text
    pub metar: Option<&'a str>,
    /// CLOUDS (IMC alert) text
    pub clouds: Option<&'a str>,
    /// STATION identifier
    pub station: Option<&'a str>,
    /// Keys that were present but could not be decoded
    pub malformed: KeySet,
}

impl<'a> Inbound<'a> {
    /// Decode a received message
    pub fn decode(message: &'a Message) -> Self {
        let mut inbound = Inbound {
            init: message.contains(Key::Init),
            ..Default::default()
        };
        let malformed = &mut inbound.malformed;

        inbound.large_font = field(message, Key::LargeFont, malformed, Value::as_flag);
        inbound.power_save = field(message, Key::Bat, malformed, Value::as_flag);
        inbound.seconds = field(message, Key::Seconds, malformed, Value::as_flag);
        inbound.location = field(message, Key::Location, malformed, |v| {
            v.as_int().and_then(LocationStatus::from_value)
        });
        inbound.net = field(message, Key::Net, malformed, |v| v.as_int().map(|n| n == 1));
        inbound.updated = field(message, Key::Updated, malformed, |v| {
            v.as_int().and_then(|n| u32::try_from(n).ok())
        });
        inbound.metar = field(message, Key::Metar, malformed, Value::as_str);
        inbound.clouds = field(message, Key::Clouds, malformed, Value::as_str);
        inbound.station = field(message, Key::Station, malformed, |v| {
            v.as_str().filter(|s| !s.trim().is_empty())
        });

        inbound
    }
}

/// Decode one key, recording it as malformed if present with the wrong shape
fn field<'a, T>(
    message: &'a Message,
    key: Key,
    malformed: &mut KeySet,
    decode: impl FnOnce(&'a Value) -> Option<T>,
) -> Option<T> {
    let value = message.get(key)?;
    let decoded = decode(value);
    if decoded.is_none() {
        malformed.insert(key);
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MAX_TEXT_LEN;
    use proptest::prelude::*;

    #[test]
    fn test_decode_init_with_settings() {
        let msg = Message::new()
            .with(Key::Init, Value::Int(1))
            .with(Key::Bat, Value::UInt(1))
            .with(Key::Seconds, Value::UInt(0));

        let inbound = Inbound::decode(&msg);
        assert!(inbound.init);
        assert_eq!(inbound.power_save, Some(true));
        assert_eq!(inbound.seconds, Some(false));
        assert_eq!(inbound.large_font, None);
        assert!(inbound.malformed.is_empty());
    }

    #[test]
    fn test_decode_weather_answer() {
        let msg = Message::new()
            .with_text(Key::Metar, "ESSA 121250Z 24008KT 9999 FEW030 12/04 Q1012")
            .unwrap()
            .with(Key::Updated, Value::UInt(1_700_000_000))
            .with_text(Key::Clouds, "BKN004")
            .unwrap();

        let inbound = Inbound::decode(&msg);
        assert!(inbound.metar.is_some());
        assert_eq!(inbound.station, None);
        assert_eq!(inbound.updated, Some(1_700_000_000));
        assert_eq!(inbound.clouds, Some("BKN004"));
    }

    #[test]
    fn test_location_values() {
        for (raw, expected) in [
            (Value::Int(1), LocationStatus::Searching),
            (Value::Int(0), LocationStatus::Idle),
            (Value::Int(-1), LocationStatus::Failed),
            (Value::UInt(255), LocationStatus::Failed),
        ] {
            let msg = Message::new().with(Key::Location, raw);
            assert_eq!(Inbound::decode(&msg).location, Some(expected));
        }
    }

    #[test]
    fn test_malformed_field_does_not_spoil_others() {
        let msg = Message::new()
            .with(Key::Metar, Value::Int(7))
            .with(Key::Location, Value::Int(9))
            .with(Key::Updated, Value::Int(-5))
            .with_text(Key::Station, "LFPG")
            .unwrap();

        let inbound = Inbound::decode(&msg);
        assert_eq!(inbound.metar, None);
        assert_eq!(inbound.location, None);
        assert_eq!(inbound.updated, None);
        assert_eq!(inbound.station, Some("LFPG"));

        assert!(inbound.malformed.contains(Key::Metar));
        assert!(inbound.malformed.contains(Key::Location));
        assert!(inbound.malformed.contains(Key::Updated));
        assert!(!inbound.malformed.contains(Key::Station));
    }

    #[test]
    fn test_blank_station_is_malformed() {
        let msg = Message::new().with_text(Key::Station, "  ").unwrap();
        let inbound = Inbound::decode(&msg);
        assert_eq!(inbound.station, None);
        assert!(inbound.malformed.contains(Key::Station));
    }

    fn any_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<i32>().prop_map(Value::Int),
            any::<u32>().prop_map(Value::UInt),
            "[ -~]{0,64}".prop_map(|s| Value::text(&s[..s.len().min(MAX_TEXT_LEN)]).unwrap()),
        ]
    }

    proptest! {
        #[test]
        fn prop_decode_accounts_for_every_key(
            entries in proptest::collection::vec((0u32..12, any_value()), 0..16)
        ) {
            let mut msg = Message::new();
            for (id, value) in entries {
                msg.insert(Key::from_id(id).unwrap(), value);
            }

            let inbound = Inbound::decode(&msg);

            // Malformed keys are always keys that were actually sent
            for key in inbound.malformed.iter() {
                prop_assert!(msg.contains(key));
            }
            // A text field is either decoded or reported, never silently lost
            for (key, decoded) in [
                (Key::Metar, inbound.metar.is_some()),
                (Key::Clouds, inbound.clouds.is_some()),
                (Key::Station, inbound.station.is_some()),
            ] {
                if msg.contains(key) {
                    prop_assert!(decoded ^ inbound.malformed.contains(key));
                } else {
                    prop_assert!(!decoded);
                }
            }
            prop_assert_eq!(inbound.init, msg.contains(Key::Init));
        }
    }
}
