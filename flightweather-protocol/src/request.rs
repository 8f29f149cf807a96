//! Requests sent from the watch to the companion

use crate::keys::Key;
use crate::message::{Message, MessageError, Value};

// REQUEST values
pub const REQUEST_INIT: &str = "init";
pub const REQUEST_LOCATION: &str = "location";
pub const REQUEST_METAR: &str = "metar";

/// Outbound requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Request<'a> {
    /// (Re)initialise the companion; it answers with INIT and its settings
    Init,
    /// Look up the nearest station; answered with LOCATION progress and STATION
    Location,
    /// Fetch the latest report for a station; answered with METAR
    Metar {
        station: &'a str,
    },
}

impl<'a> Request<'a> {
    /// The REQUEST value for this request
    pub fn as_str(&self) -> &'static str {
        match self {
            Request::Init => REQUEST_INIT,
            Request::Location => REQUEST_LOCATION,
            Request::Metar { .. } => REQUEST_METAR,
        }
    }

    /// Encode this request into a message
    pub fn to_message(&self) -> Result<Message, MessageError> {
        let msg = Message::new().with_text(Key::Request, self.as_str())?;
        match self {
            Request::Metar { station } => msg.with_text(Key::Station, station),
            _ => Ok(msg),
        }
    }

    /// Parse a request from a message (for testing or simulation)
    pub fn from_message(message: &'a Message) -> Option<Self> {
        match message.get(Key::Request).and_then(Value::as_str)? {
            REQUEST_INIT => Some(Request::Init),
            REQUEST_LOCATION => Some(Request::Location),
            REQUEST_METAR => {
                let station = message.get(Key::Station).and_then(Value::as_str)?;
                Some(Request::Metar { station })
            }
            _ => None,
        }
    }
}
