//! Request scheduler
//!
//! Owns the three request flows, the connection state and the current
//! station and report. Every request passes the `confirm` gate first. A
//! companion that stopped answering is re-initialised from there.

use embassy_time::{Duration, Instant};
use flightweather_protocol::{Inbound, Request};

use super::flow::{Continuation, Flow, FlowRecord, Slot, SLOTS};
use super::records::{same_fingerprint, Snapshot, Station, WeatherRecord};
use crate::config::SchedulerConfig;
use crate::link::{ConnectionState, LinkTransition, Reachability};
use crate::policy::elapsed_minutes;
use crate::state::{Fault, FlowState};
use crate::timer::{PendingTimer, TimerTable};
use crate::traits::{SendError, TimerFacility, TimerId, Transport};

/// What a request operation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestOutcome {
    /// Handed to the transport, watchdog armed
    Sent,
    /// Transport refused it; the watchdog is armed all the same
    SendFailed(SendError),
    /// Another flow has to run first and was started instead
    Delegated(Flow),
    /// Nothing sent
    Blocked(Fault),
}

impl RequestOutcome {
    /// The fault behind an unsuccessful outcome
    pub fn fault(&self) -> Option<Fault> {
        match *self {
            RequestOutcome::SendFailed(err) => Some(Fault::SendFailed(err)),
            RequestOutcome::Blocked(fault) => Some(fault),
            RequestOutcome::Sent | RequestOutcome::Delegated(_) => None,
        }
    }
}

/// Effects of one inbound message on the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Received {
    /// INIT answer processed
    pub init: bool,
    /// A report arrived (changed or not)
    pub weather: bool,
    /// The report changed by fingerprint
    pub weather_changed: bool,
    /// The station changed by fingerprint
    pub station_changed: bool,
}

/// A scheduler timer fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fired {
    /// What the timer was for
    pub continuation: Continuation,
    /// Result of the flow it started
    pub outcome: RequestOutcome,
}

impl Fired {
    /// The fault this timer reports, if any
    ///
    /// An expired watchdog is a timeout whatever its fallback achieved.
    pub fn fault(&self) -> Option<Fault> {
        match self.continuation {
            Continuation::Fallback { expired, .. } => Some(Fault::RequestTimeout(expired)),
            Continuation::Run(_) => self.outcome.fault(),
        }
    }
}

/// Request flows, connection state and the data they maintain
#[derive(Debug, Clone)]
pub struct RequestScheduler {
    config: SchedulerConfig,
    connection: ConnectionState,
    flows: [FlowRecord; 3],
    timers: TimerTable<Slot, Continuation, SLOTS>,
    station: Option<Station>,
    report: Option<WeatherRecord>,
    bootstrap: u8,
    power_save: bool,
    last_weather_check: Instant,
}

impl RequestScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            connection: ConnectionState::new(),
            flows: [FlowRecord::default(); 3],
            timers: TimerTable::new(),
            station: None,
            report: None,
            bootstrap: config.polling.bootstrap_updates,
            power_save: false,
            last_weather_check: Instant::MIN,
        }
    }

    /// Start from persisted station and report
    pub fn with_snapshot(config: SchedulerConfig, snapshot: &Snapshot) -> Self {
        let mut scheduler = Self::new(config);
        scheduler.station = snapshot.station.as_ref().map(Station::from);
        scheduler.report = snapshot.weather.as_ref().map(WeatherRecord::from);
        scheduler
    }

    /// State to persist at shutdown
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            station: self.station.as_ref().map(Into::into),
            weather: self.report.as_ref().map(Into::into),
        }
    }

    // --- gate ---

    /// Check that a request is worth sending now
    ///
    /// Link up and companion answering: true. Link up but companion silent:
    /// issues Init and returns false. Link down: false, nothing else.
    pub fn confirm<P>(&mut self, now: Instant, io: &mut P) -> bool
    where
        P: Transport + TimerFacility,
    {
        self.gate(now, io).is_ok()
    }

    fn gate<P>(&mut self, now: Instant, io: &mut P) -> Result<(), Fault>
    where
        P: Transport + TimerFacility,
    {
        let reachability = self.connection.reachability();
        let Some(fault) = reachability.fault() else {
            return Ok(());
        };

        if reachability == Reachability::AppUnresponsive {
            debug!("companion not confirmed, initialising");
            self.request_init(now, io);
        } else {
            trace!("link down, request suppressed");
        }
        Err(fault)
    }

    // --- requests ---

    /// Ask the companion to initialise
    ///
    /// Not gated on the companion (that is what it establishes). While the
    /// link is down nothing is sent, but the watchdog is still armed so the
    /// retry loop carries on and resends once the link returns.
    pub fn request_init<P>(&mut self, now: Instant, io: &mut P) -> RequestOutcome
    where
        P: Transport + TimerFacility,
    {
        if !self.connection.link_up() {
            debug!("link down, init deferred");
            self.arm_watchdog(Flow::Init, now, io);
            return RequestOutcome::Blocked(Fault::LinkDown);
        }
        self.send(Flow::Init, Request::Init, now, io)
    }

    /// Ask the companion for the nearest station
    pub fn request_location<P>(&mut self, now: Instant, io: &mut P) -> RequestOutcome
    where
        P: Transport + TimerFacility,
    {
        if let Err(fault) = self.gate(now, io) {
            return RequestOutcome::Blocked(fault);
        }
        self.send(Flow::Location, Request::Location, now, io)
    }

    /// Ask the companion for the current report of the current station
    ///
    /// Without a fresh station this requests a location instead; a location
    /// request the transport refused is reported as `SendFailed`.
    pub fn request_weather<P>(&mut self, now: Instant, io: &mut P) -> RequestOutcome
    where
        P: Transport + TimerFacility,
    {
        if let Err(fault) = self.gate(now, io) {
            return RequestOutcome::Blocked(fault);
        }

        let fresh = self.station_is_fresh(now);
        let Some(station) = self
            .station
            .as_ref()
            .filter(|_| fresh)
            .map(|s| s.id.clone())
        else {
            debug!("station unknown or stale, locating first");
            return match self.request_location(now, io) {
                RequestOutcome::SendFailed(err) => RequestOutcome::SendFailed(err),
                _ => RequestOutcome::Delegated(Flow::Location),
            };
        };

        self.last_weather_check = now;
        self.send(
            Flow::Weather,
            Request::Metar {
                station: station.as_str(),
            },
            now,
            io,
        )
    }

    /// Run the request operation of `flow`
    pub fn run<P>(&mut self, flow: Flow, now: Instant, io: &mut P) -> RequestOutcome
    where
        P: Transport + TimerFacility,
    {
        match flow {
            Flow::Init => self.request_init(now, io),
            Flow::Location => self.request_location(now, io),
            Flow::Weather => self.request_weather(now, io),
        }
    }

    fn send<P>(
        &mut self,
        flow: Flow,
        request: Request<'_>,
        now: Instant,
        io: &mut P,
    ) -> RequestOutcome
    where
        P: Transport + TimerFacility,
    {
        let result = match request.to_message() {
            Ok(message) => io.send(&message),
            Err(_) => Err(SendError::TooLarge),
        };
        self.flows[flow.index()].sent(now);
        self.arm_watchdog(flow, now, io);

        match result {
            Ok(()) => {
                debug!("{:?} request sent", flow);
                RequestOutcome::Sent
            }
            Err(err) => {
                warn!("{:?} request not sent: {:?}", flow, err);
                RequestOutcome::SendFailed(err)
            }
        }
    }

    // --- external events ---

    /// Radio connect/disconnect
    ///
    /// Outstanding watchdogs are left alone.
    pub fn on_link_changed(&mut self, up: bool) -> LinkTransition {
        let transition = self.connection.on_link_changed(up);
        match transition {
            LinkTransition::Up => info!("link up"),
            LinkTransition::Down => warn!("link down"),
            LinkTransition::Unchanged => {}
        }
        transition
    }

    /// Apply the scheduling-relevant parts of a decoded message
    pub fn on_message<P>(&mut self, now: Instant, inbound: &Inbound<'_>, io: &mut P) -> Received
    where
        P: Transport + TimerFacility,
    {
        self.connection.on_message_received();
        let mut received = Received::default();

        if inbound.init {
            self.acknowledge(Flow::Init, io);
            self.bootstrap = self.config.polling.bootstrap_updates;
            self.schedule_follow_up(now, io);
            received.init = true;
            info!("companion initialised");
        }

        if let Some(power_save) = inbound.power_save {
            if power_save != self.power_save {
                info!("power save {}", power_save);
            }
            self.power_save = power_save;
        }

        let issued_at = inbound
            .updated
            .map(|secs| Instant::from_secs(secs as u64))
            .or(self.report.as_ref().and_then(|r| r.issued_at));

        if let Some(raw) = inbound.metar {
            self.acknowledge(Flow::Weather, io);
            received.weather = true;
            received.weather_changed = self.apply_report(raw, issued_at, now);
        } else if let Some(report) = self.report.as_mut() {
            report.issued_at = issued_at;
        }

        if let Some(id) = inbound.station {
            self.acknowledge(Flow::Location, io);
            received.station_changed = self.apply_station(id, now);
            self.schedule_follow_up(now, io);
        }

        received
    }

    /// A platform timer fired
    ///
    /// Returns None if the timer is not one of the scheduler's.
    pub fn on_timer<P>(&mut self, now: Instant, id: TimerId, io: &mut P) -> Option<Fired>
    where
        P: Transport + TimerFacility,
    {
        let (_, continuation) = self.timers.fire_id(id)?;

        let outcome = match continuation {
            Continuation::Fallback { expired, then } => {
                warn!("{:?} request timed out", expired);
                self.flows[expired.index()].timed_out();
                self.connection.on_watchdog_expired();
                self.run(then, now, io)
            }
            Continuation::Run(flow) => self.run(flow, now, io),
        };

        Some(Fired {
            continuation,
            outcome,
        })
    }

    /// Restart the weather-check clock
    pub fn stamp_weather_check(&mut self, now: Instant) {
        self.last_weather_check = now;
    }

    fn arm_watchdog<P: TimerFacility>(&mut self, flow: Flow, now: Instant, io: &mut P) {
        let continuation = Continuation::Fallback {
            expired: flow,
            then: flow.fallback(),
        };
        let timeout = flow.timeout(&self.config);
        if self
            .timers
            .schedule(io, now, Slot::Watchdog(flow), timeout, continuation)
            .is_err()
        {
            warn!("no timer slot for {:?} watchdog", flow);
        }
    }

    fn acknowledge<P: TimerFacility>(&mut self, flow: Flow, io: &mut P) {
        self.timers.cancel(io, Slot::Watchdog(flow));
        self.flows[flow.index()].acked();
    }

    fn schedule_follow_up<P: TimerFacility>(&mut self, now: Instant, io: &mut P) {
        let delay = self.config.follow_up_delay();
        if self
            .timers
            .schedule(io, now, Slot::FollowUp, delay, Continuation::Run(Flow::Weather))
            .is_err()
        {
            warn!("no timer slot for follow-up request");
        }
    }

    fn apply_report(&mut self, raw: &str, issued_at: Option<Instant>, now: Instant) -> bool {
        let fingerprint_len = self.config.fingerprint_len;
        if let Some(report) = self.report.as_mut() {
            if report.matches(raw, fingerprint_len) {
                trace!("report unchanged");
                report.issued_at = issued_at;
                return false;
            }
        }

        match WeatherRecord::new(raw, issued_at, now) {
            Some(report) => {
                self.report = Some(report);
                self.bootstrap = self.bootstrap.saturating_sub(1);
                info!("new report, bootstrap {}", self.bootstrap);
                true
            }
            None => {
                warn!("report too long, ignored");
                false
            }
        }
    }

    fn apply_station(&mut self, id: &str, now: Instant) -> bool {
        let fingerprint_len = self.config.fingerprint_len;
        if let Some(station) = &self.station {
            if same_fingerprint(station.as_str(), id, fingerprint_len) {
                return false;
            }
        }

        match Station::new(id, now) {
            Some(station) => {
                info!("station changed");
                self.station = Some(station);
                self.bootstrap = self.config.polling.bootstrap_updates;
                true
            }
            None => {
                warn!("station id too long, ignored");
                false
            }
        }
    }

    // --- queries ---

    /// Check if the station was located recently enough
    ///
    /// Age counts from the last location request, not from the answer.
    pub fn station_is_fresh(&self, now: Instant) -> bool {
        match self.flows[Flow::Location.index()].last_sent {
            Some(sent) => elapsed_minutes(now, sent) <= self.config.location_max_age_min as u64,
            None => false,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    pub fn station(&self) -> Option<&Station> {
        self.station.as_ref()
    }

    pub fn report(&self) -> Option<&WeatherRecord> {
        self.report.as_ref()
    }

    /// When the report last changed materially
    pub fn last_update(&self) -> Option<Instant> {
        self.report.as_ref().map(|r| r.received_at)
    }

    /// Remaining bootstrap updates
    pub fn bootstrap(&self) -> u8 {
        self.bootstrap
    }

    pub fn power_save(&self) -> bool {
        self.power_save
    }

    pub fn last_weather_check(&self) -> Instant {
        self.last_weather_check
    }

    pub fn flow_state(&self, flow: Flow) -> FlowState {
        self.flows[flow.index()].state
    }

    pub fn last_sent(&self, flow: Flow) -> Option<Instant> {
        self.flows[flow.index()].last_sent
    }

    /// Outstanding watchdog of `flow`
    pub fn watchdog(&self, flow: Flow) -> Option<&PendingTimer<Slot, Continuation>> {
        self.timers.get(Slot::Watchdog(flow))
    }

    /// Deadline of the pending follow-up request
    pub fn follow_up_due(&self) -> Option<Instant> {
        self.timers.get(Slot::FollowUp).map(|t| t.fires_at)
    }

    /// Time until the watchdog of `flow` expires
    pub fn watchdog_remaining(&self, flow: Flow, now: Instant) -> Option<Duration> {
        self.watchdog(flow)
            .map(|t| t.fires_at.saturating_duration_since(now))
    }
}
