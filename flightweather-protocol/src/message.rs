//! Key/value message dictionary
//!
//! A message holds at most one value per key. Values are either text or
//! integers; the companion side of the contract sends flags as small
//! integers and reports as text.

use heapless::{LinearMap, String};

use crate::keys::Key;

/// Maximum text value length in bytes
pub const MAX_TEXT_LEN: usize = 256;

/// Maximum entries per message (one per key)
pub const MAX_ENTRIES: usize = Key::ALL.len();

/// Errors that can occur while building a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageError {
    /// Text value exceeds `MAX_TEXT_LEN`
    TextTooLong,
}

/// A single message value
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Value {
    /// UTF-8 text
    Text(String<MAX_TEXT_LEN>),
    /// Signed integer
    Int(i32),
    /// Unsigned integer
    UInt(u32),
}

impl Value {
    /// Create a text value
    pub fn text(text: &str) -> Result<Self, MessageError> {
        String::try_from(text)
            .map(Value::Text)
            .map_err(|_| MessageError::TextTooLong)
    }

    /// Borrow the text, if this is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Integer view of the value (signed and unsigned both widen)
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v as i64),
            Value::UInt(v) => Some(*v as i64),
            Value::Text(_) => None,
        }
    }

    /// Flag view of the value: any non-zero integer is set
    pub fn as_flag(&self) -> Option<bool> {
        self.as_int().map(|v| v != 0)
    }
}

/// A companion message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    entries: LinearMap<Key, Value, MAX_ENTRIES>,
}

impl Message {
    /// Create an empty message
    pub fn new() -> Self {
        Self {
            entries: LinearMap::new(),
        }
    }

    /// Set the value for a key, returning the previous value
    pub fn insert(&mut self, key: Key, value: Value) -> Option<Value> {
        // One slot per key exists, so a full map always holds `key` already
        match self.entries.insert(key, value) {
            Ok(previous) => previous,
            Err(_) => None,
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: Key, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder-style insert of a text value
    pub fn with_text(self, key: Key, text: &str) -> Result<Self, MessageError> {
        Ok(self.with(key, Value::text(text)?))
    }

    /// Look up a key
    pub fn get(&self, key: Key) -> Option<&Value> {
        self.entries.get(&key)
    }

    /// Check if a key is present
    pub fn contains(&self, key: Key) -> bool {
        self.entries.contains_key(&key)
    }

    /// Remove a key
    pub fn remove(&mut self, key: Key) -> Option<Value> {
        self.entries.remove(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Message {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Message{{");
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                defmt::write!(f, ", ");
            }
            defmt::write!(f, "{}: {}", key, value);
        }
        defmt::write!(f, "}}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_value() {
        let mut msg = Message::new();
        assert_eq!(msg.insert(Key::Net, Value::Int(1)), None);
        assert_eq!(msg.insert(Key::Net, Value::Int(0)), Some(Value::Int(1)));
        assert_eq!(msg.len(), 1);
        assert_eq!(msg.get(Key::Net), Some(&Value::Int(0)));
    }

    #[test]
    fn test_all_keys_fit() {
        let mut msg = Message::new();
        for key in Key::ALL {
            msg.insert(key, Value::UInt(key.id()));
        }
        assert_eq!(msg.len(), MAX_ENTRIES);

        // Replacing in a full message must still work
        msg.insert(Key::Updated, Value::UInt(42));
        assert_eq!(msg.get(Key::Updated), Some(&Value::UInt(42)));
    }

    #[test]
    fn test_text_too_long() {
        let long = [b'A'; MAX_TEXT_LEN + 1];
        let text = core::str::from_utf8(&long).unwrap();
        assert_eq!(Value::text(text), Err(MessageError::TextTooLong));
        assert!(Value::text(&text[..MAX_TEXT_LEN]).is_ok());
    }

    #[test]
    fn test_value_views() {
        assert_eq!(Value::Int(-1).as_int(), Some(-1));
        assert_eq!(Value::UInt(255).as_int(), Some(255));
        assert_eq!(Value::UInt(0).as_flag(), Some(false));
        assert_eq!(Value::Int(3).as_flag(), Some(true));

        let text = Value::text("EGLL").unwrap();
        assert_eq!(text.as_str(), Some("EGLL"));
        assert_eq!(text.as_int(), None);
        assert_eq!(text.as_flag(), None);
    }

    #[test]
    fn test_builder() {
        let msg = Message::new()
            .with(Key::Init, Value::Int(1))
            .with_text(Key::Station, "ESSA")
            .unwrap();

        assert!(msg.contains(Key::Init));
        assert_eq!(msg.get(Key::Station).and_then(Value::as_str), Some("ESSA"));
        assert!(!msg.contains(Key::Metar));
    }
}
