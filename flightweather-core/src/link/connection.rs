//! Connection state tracking
//!
//! Two layers are tracked separately: the radio link to the phone and the
//! companion app on top of it. Requests are only worth sending when both
//! are up.

use crate::state::Fault;

/// Combined reachability of the companion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reachability {
    /// Radio up and companion answering
    Confirmed,
    /// Radio up but the companion has not answered (needs Init)
    AppUnresponsive,
    /// Radio down
    LinkDown,
}

impl Reachability {
    /// The fault this state represents, if any
    pub fn fault(self) -> Option<Fault> {
        match self {
            Reachability::Confirmed => None,
            Reachability::AppUnresponsive => Some(Fault::AppUnresponsive),
            Reachability::LinkDown => Some(Fault::LinkDown),
        }
    }
}

/// Result of a link state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkTransition {
    /// Link came up
    Up,
    /// Link was lost; the only transition that warrants a haptic alert
    Down,
    /// Repeated report of the current state
    Unchanged,
}

/// Link-layer and application-layer reachability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectionState {
    link_up: bool,
    app_up: bool,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionState {
    /// Link assumed up, companion not yet heard from
    pub const fn new() -> Self {
        Self {
            link_up: true,
            app_up: false,
        }
    }

    /// Radio connect/disconnect
    ///
    /// Does not touch outstanding watchdogs; those keep running.
    pub fn on_link_changed(&mut self, up: bool) -> LinkTransition {
        let transition = match (self.link_up, up) {
            (true, false) => LinkTransition::Down,
            (false, true) => LinkTransition::Up,
            _ => LinkTransition::Unchanged,
        };
        self.link_up = up;
        transition
    }

    /// Any message from the companion proves it is alive
    pub fn on_message_received(&mut self) {
        self.app_up = true;
    }

    /// A request watchdog expired without an answer
    pub fn on_watchdog_expired(&mut self) {
        self.app_up = false;
    }

    /// Current reachability
    ///
    /// `app_up` without `link_up` should not happen; it reads as link down.
    pub fn reachability(&self) -> Reachability {
        match (self.link_up, self.app_up) {
            (false, _) => Reachability::LinkDown,
            (true, false) => Reachability::AppUnresponsive,
            (true, true) => Reachability::Confirmed,
        }
    }

    /// Both layers up
    ///
    /// Pure check. The corrective Init for an unresponsive companion is
    /// issued by `RequestScheduler::confirm`.
    pub fn is_confirmed(&self) -> bool {
        self.reachability() == Reachability::Confirmed
    }

    pub fn link_up(&self) -> bool {
        self.link_up
    }

    pub fn app_up(&self) -> bool {
        self.app_up
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cold_start_needs_companion() {
        let conn = ConnectionState::new();
        assert!(conn.link_up());
        assert_eq!(conn.reachability(), Reachability::AppUnresponsive);
        assert!(!conn.is_confirmed());
    }

    #[test]
    fn test_message_confirms() {
        let mut conn = ConnectionState::new();
        conn.on_message_received();
        assert!(conn.is_confirmed());

        conn.on_watchdog_expired();
        assert_eq!(conn.reachability(), Reachability::AppUnresponsive);
    }

    #[test]
    fn test_link_transitions() {
        let mut conn = ConnectionState::new();
        assert_eq!(conn.on_link_changed(true), LinkTransition::Unchanged);
        assert_eq!(conn.on_link_changed(false), LinkTransition::Down);
        assert_eq!(conn.on_link_changed(false), LinkTransition::Unchanged);
        assert_eq!(conn.on_link_changed(true), LinkTransition::Up);
    }

    #[test]
    fn test_app_up_without_link_is_not_confirmed() {
        let mut conn = ConnectionState::new();
        conn.on_message_received();
        conn.on_link_changed(false);

        assert!(conn.app_up());
        assert_eq!(conn.reachability(), Reachability::LinkDown);
        assert_eq!(conn.reachability().fault(), Some(Fault::LinkDown));
    }

    #[derive(Debug, Clone, Copy)]
    enum Input {
        Link(bool),
        Message,
        Expired,
    }

    fn input() -> impl Strategy<Value = Input> {
        prop_oneof![
            any::<bool>().prop_map(Input::Link),
            Just(Input::Message),
            Just(Input::Expired),
        ]
    }

    proptest! {
        #[test]
        fn prop_confirmed_iff_link_up_and_heard_since_expiry(
            inputs in proptest::collection::vec(input(), 0..48)
        ) {
            let mut conn = ConnectionState::new();
            let mut last_link = true;
            let mut heard_since_expiry = false;

            for input in inputs {
                match input {
                    Input::Link(up) => {
                        conn.on_link_changed(up);
                        last_link = up;
                    }
                    Input::Message => {
                        conn.on_message_received();
                        heard_since_expiry = true;
                    }
                    Input::Expired => {
                        conn.on_watchdog_expired();
                        heard_since_expiry = false;
                    }
                }
                prop_assert_eq!(conn.is_confirmed(), last_link && heard_since_expiry);
            }
        }
    }
}
