//! Recording platform for tests

extern crate std;

use std::string::String;
use std::vec::Vec;

use embassy_time::{Duration, Instant};
use flightweather_protocol::{Message, Request};

use crate::scheduler::WeatherRecord;
use crate::traits::{
    DisplaySettings, Indicator, MetarAge, Pulse, SendError, StatusIcons, TimerFacility, TimerId,
    Transport, UiSink,
};

/// A UI notification as recorded by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCall {
    Show(Indicator),
    Hide(Indicator),
    Status(StatusIcons),
    WeatherChanged(String),
    Alert(String, String),
    Settings(DisplaySettings),
    Age(MetarAge),
    Pulse(Pulse),
}

#[derive(Debug, Clone, Copy)]
struct MockTimer {
    id: TimerId,
    due: Instant,
}

/// Transport, timer service and UI in one recorder
pub struct MockPlatform {
    clock: Instant,
    next_id: u32,
    timers: Vec<MockTimer>,
    cancelled: Vec<TimerId>,
    /// Every message handed to `send`, including failed ones
    pub sent: Vec<Message>,
    /// Result returned by the next sends
    pub send_result: Result<(), SendError>,
    pub ui: Vec<UiCall>,
}

impl MockPlatform {
    pub fn new(clock: Instant) -> Self {
        Self {
            clock,
            next_id: 1,
            timers: Vec::new(),
            cancelled: Vec::new(),
            sent: Vec::new(),
            send_result: Ok(()),
            ui: Vec::new(),
        }
    }

    pub fn now(&self) -> Instant {
        self.clock
    }

    /// Ids of registered timers that have neither fired nor been cancelled
    pub fn pending_ids(&self) -> Vec<TimerId> {
        self.timers.iter().map(|t| t.id).collect()
    }

    pub fn was_cancelled(&self, id: TimerId) -> bool {
        self.cancelled.contains(&id)
    }

    /// Requests sent so far, decoded
    pub fn requests(&self) -> Vec<Request<'_>> {
        self.sent.iter().filter_map(Request::from_message).collect()
    }

    /// Number of sent requests of the given kind ("init", "location", "metar")
    pub fn count_requests(&self, kind: &str) -> usize {
        self.requests().iter().filter(|r| r.as_str() == kind).count()
    }

    pub fn clear_sent(&mut self) {
        self.sent.clear();
    }

    pub fn clear_ui(&mut self) {
        self.ui.clear();
    }

    pub fn ui_contains(&self, call: &UiCall) -> bool {
        self.ui.contains(call)
    }

    /// Advance the clock to `until`, firing due timers in deadline order
    ///
    /// `fire` receives the platform, the firing instant and the timer id.
    pub fn run_until<F>(&mut self, until: Instant, mut fire: F)
    where
        F: FnMut(&mut MockPlatform, Instant, TimerId),
    {
        while let Some((at, id)) = self.pop_due(until) {
            self.clock = at;
            fire(self, at, id);
        }
        self.clock = until;
    }

    /// Advance by `delay`, firing due timers
    pub fn advance<F>(&mut self, delay: Duration, fire: F)
    where
        F: FnMut(&mut MockPlatform, Instant, TimerId),
    {
        let until = self.clock + delay;
        self.run_until(until, fire);
    }

    fn pop_due(&mut self, until: Instant) -> Option<(Instant, TimerId)> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.id.0))
            .map(|(i, _)| i)?;
        let timer = self.timers.remove(index);
        Some((timer.due, timer.id))
    }
}

impl Transport for MockPlatform {
    fn send(&mut self, message: &Message) -> Result<(), SendError> {
        self.sent.push(message.clone());
        self.send_result
    }
}

impl TimerFacility for MockPlatform {
    fn register(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(MockTimer {
            id,
            due: self.clock + delay,
        });
        id
    }

    fn cancel(&mut self, id: TimerId) {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        if self.timers.len() != before {
            self.cancelled.push(id);
        }
    }
}

impl UiSink for MockPlatform {
    fn show(&mut self, indicator: Indicator) {
        self.ui.push(UiCall::Show(indicator));
    }

    fn hide(&mut self, indicator: Indicator) {
        self.ui.push(UiCall::Hide(indicator));
    }

    fn set_status(&mut self, status: StatusIcons) {
        self.ui.push(UiCall::Status(status));
    }

    fn weather_changed(&mut self, record: &WeatherRecord) {
        self.ui.push(UiCall::WeatherChanged(record.raw.as_str().into()));
    }

    fn alert(&mut self, title: &str, message: &str) {
        self.ui.push(UiCall::Alert(title.into(), message.into()));
    }

    fn settings_changed(&mut self, settings: DisplaySettings) {
        self.ui.push(UiCall::Settings(settings));
    }

    fn metar_age(&mut self, age: MetarAge) {
        self.ui.push(UiCall::Age(age));
    }

    fn pulse(&mut self, pulse: Pulse) {
        self.ui.push(UiCall::Pulse(pulse));
    }
}
