//! Message keys and key sets

/// Keys of the companion message dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    /// Raw METAR text
    Metar,
    /// Request kind sent by the watch
    Request,
    /// Station identifier
    Station,
    /// Reserved status value
    Status,
    /// Companion (re)initialised
    Init,
    /// GPS lookup state
    Location,
    /// Network fetch state
    Net,
    /// IMC alert text
    Clouds,
    /// Battery saving setting
    Bat,
    /// Large font setting
    LargeFont,
    /// Seconds display setting
    Seconds,
    /// Issue time of the METAR (epoch seconds)
    Updated,
}

// Wire identifiers
const KEY_METAR: u32 = 0x0;
const KEY_REQUEST: u32 = 0x1;
const KEY_STATION: u32 = 0x2;
const KEY_STATUS: u32 = 0x3;
const KEY_INIT: u32 = 0x4;
const KEY_LOCATION: u32 = 0x5;
const KEY_NET: u32 = 0x6;
const KEY_CLOUDS: u32 = 0x7;
const KEY_BAT: u32 = 0x8;
const KEY_LARGEFONT: u32 = 0x9;
const KEY_SECONDS: u32 = 0xa;
const KEY_UPDATED: u32 = 0xb;

impl Key {
    /// Every key, in wire order
    pub const ALL: [Key; 12] = [
        Key::Metar,
        Key::Request,
        Key::Station,
        Key::Status,
        Key::Init,
        Key::Location,
        Key::Net,
        Key::Clouds,
        Key::Bat,
        Key::LargeFont,
        Key::Seconds,
        Key::Updated,
    ];

    /// Parse a key from its wire identifier
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            KEY_METAR => Some(Key::Metar),
            KEY_REQUEST => Some(Key::Request),
            KEY_STATION => Some(Key::Station),
            KEY_STATUS => Some(Key::Status),
            KEY_INIT => Some(Key::Init),
            KEY_LOCATION => Some(Key::Location),
            KEY_NET => Some(Key::Net),
            KEY_CLOUDS => Some(Key::Clouds),
            KEY_BAT => Some(Key::Bat),
            KEY_LARGEFONT => Some(Key::LargeFont),
            KEY_SECONDS => Some(Key::Seconds),
            KEY_UPDATED => Some(Key::Updated),
            _ => None,
        }
    }

    /// Convert to wire identifier
    pub fn id(self) -> u32 {
        match self {
            Key::Metar => KEY_METAR,
            Key::Request => KEY_REQUEST,
            Key::Station => KEY_STATION,
            Key::Status => KEY_STATUS,
            Key::Init => KEY_INIT,
            Key::Location => KEY_LOCATION,
            Key::Net => KEY_NET,
            Key::Clouds => KEY_CLOUDS,
            Key::Bat => KEY_BAT,
            Key::LargeFont => KEY_LARGEFONT,
            Key::Seconds => KEY_SECONDS,
            Key::Updated => KEY_UPDATED,
        }
    }

    /// Returns true if this key carries a user setting
    pub fn is_setting(&self) -> bool {
        matches!(self, Key::Bat | Key::LargeFont | Key::Seconds)
    }

    /// Returns true if this key only reports companion progress
    pub fn is_status(&self) -> bool {
        matches!(self, Key::Location | Key::Net | Key::Status)
    }
}

/// A compact set of keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeySet(u16);

impl KeySet {
    /// Create an empty set
    pub const fn new() -> Self {
        Self(0)
    }

    /// Add a key
    pub fn insert(&mut self, key: Key) {
        self.0 |= 1 << key.id();
    }

    /// Check membership
    pub fn contains(&self, key: Key) -> bool {
        self.0 & (1 << key.id()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate the keys in wire order
    pub fn iter(&self) -> impl Iterator<Item = Key> + '_ {
        Key::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ids_are_stable() {
        assert_eq!(Key::Metar.id(), 0x0);
        assert_eq!(Key::Init.id(), 0x4);
        assert_eq!(Key::Updated.id(), 0xb);
        assert_eq!(Key::from_id(0x7), Some(Key::Clouds));
        assert_eq!(Key::from_id(0xc), None);
    }

    #[test]
    fn test_key_roundtrip_all() {
        for key in Key::ALL {
            assert_eq!(Key::from_id(key.id()), Some(key));
        }
    }

    #[test]
    fn test_key_categories() {
        assert!(Key::Bat.is_setting());
        assert!(Key::Seconds.is_setting());
        assert!(!Key::Metar.is_setting());
        assert!(Key::Net.is_status());
        assert!(!Key::Station.is_status());
    }

    #[test]
    fn test_key_set() {
        let mut set = KeySet::new();
        assert!(set.is_empty());

        set.insert(Key::Updated);
        set.insert(Key::Metar);
        set.insert(Key::Metar);

        assert_eq!(set.len(), 2);
        assert!(set.contains(Key::Metar));
        assert!(!set.contains(Key::Station));

        let mut keys = set.iter();
        assert_eq!(keys.next(), Some(Key::Metar));
        assert_eq!(keys.next(), Some(Key::Updated));
        assert_eq!(keys.next(), None);
    }
}
