//! Event dispatch
//!
//! The controller owns all core state and is the only entry point the
//! platform calls. Each external event is handled to completion, then the
//! status icons are republished.
//!
//! Every `now` passed in must come from a clock counting seconds since the
//! Unix epoch: report issue times (UPDATED) arrive as epoch seconds and are
//! compared against it directly.

use embassy_time::{Duration, Instant};
use flightweather_protocol::{Inbound, Message};

use crate::config::{SchedulerConfig, UI_TIMERS};
use crate::link::LinkTransition;
use crate::policy::IntervalPolicy;
use crate::scheduler::{RequestScheduler, Snapshot};
use crate::state::{Event, Fault};
use crate::timer::TimerTable;
use crate::traits::{DisplaySettings, Indicator, Platform, Pulse, StatusIcons, TimerId};
use crate::update::{Tick, UpdateLoop};

/// Title of the IMC alert dialog
pub const ALERT_TITLE: &str = "IMC Alert";

/// Delayed UI change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UiAction {
    /// Hide the indicator the timer belongs to
    Hide,
}

/// Scheduling core of the watchface
#[derive(Debug, Clone)]
pub struct Controller {
    scheduler: RequestScheduler,
    update: UpdateLoop,
    ui_timers: TimerTable<Indicator, UiAction, UI_TIMERS>,
    settings: DisplaySettings,
    imc: bool,
}

impl Controller {
    /// Create a controller from configuration and persisted state
    pub fn new(config: SchedulerConfig, snapshot: &Snapshot) -> Self {
        Self {
            scheduler: RequestScheduler::with_snapshot(config, snapshot),
            update: UpdateLoop::new(IntervalPolicy::new(config.polling)),
            ui_timers: TimerTable::new(),
            settings: DisplaySettings::default(),
            imc: false,
        }
    }

    /// Cold start
    ///
    /// # Arguments
    /// - `now`: current time on the epoch-based platform clock
    /// - `link_up`: radio state at launch
    pub fn start<P: Platform>(&mut self, now: Instant, link_up: bool, io: &mut P) {
        info!("starting, link up {}", link_up);
        self.scheduler.on_link_changed(link_up);

        if let Some(report) = self.scheduler.report() {
            io.weather_changed(report);
        }

        self.scheduler.stamp_weather_check(now);
        self.tick(now, io);
        self.scheduler.request_init(now, io);
        self.publish_status(io);
    }

    /// Handle one external event
    ///
    /// `now` is the current time on the same epoch-based clock as `start`.
    pub fn handle<P: Platform>(&mut self, now: Instant, event: Event<'_>, io: &mut P) {
        match event {
            Event::Tick => {
                self.tick(now, io);
            }
            Event::LinkChanged(up) => {
                if self.scheduler.on_link_changed(up) == LinkTransition::Down {
                    io.pulse(Pulse::Double);
                }
            }
            Event::Received(message) => self.on_received(now, message, io),
            Event::Dropped => warn!("inbound message dropped"),
            Event::Sent => trace!("message delivered"),
            Event::SendFailed(err) => debug!("message not delivered: {:?}", err),
            Event::TimerFired(id) => self.on_timer(now, id, io),
            Event::Tapped => self.dismiss_alert(io),
        }

        self.publish_status(io);
    }

    /// State to persist at shutdown
    pub fn snapshot(&self) -> Snapshot {
        self.scheduler.snapshot()
    }

    fn tick<P: Platform>(&mut self, now: Instant, io: &mut P) -> Tick {
        let tick = self.update.tick(now, &mut self.scheduler, io);
        io.metar_age(tick.age);
        tick
    }

    fn on_received<P: Platform>(&mut self, now: Instant, message: &Message, io: &mut P) {
        let inbound = Inbound::decode(message);
        for key in inbound.malformed.iter() {
            warn!("{:?} ignored", Fault::MalformedPayload(key));
        }

        let imc_before = self.imc;
        let received = self.scheduler.on_message(now, &inbound, io);

        // Display settings
        if inbound.large_font.is_some() || inbound.seconds.is_some() {
            if let Some(large_font) = inbound.large_font {
                self.settings.large_font = large_font;
            }
            if let Some(seconds) = inbound.seconds {
                self.settings.seconds = seconds;
            }
            io.settings_changed(self.settings);
        }

        // Companion progress
        if let Some(location) = inbound.location {
            self.indicate(Indicator::Gps, location.is_searching(), now, io);
        }
        if let Some(active) = inbound.net {
            self.indicate(Indicator::Net, active, now, io);
        }

        // Report
        if received.weather {
            self.imc = false;
        }
        if received.weather_changed {
            if let Some(report) = self.scheduler.report() {
                io.weather_changed(report);
            }
        }

        // IMC alert
        if let Some(clouds) = inbound.clouds {
            io.alert(ALERT_TITLE, clouds);
            if received.weather_changed {
                io.show(Indicator::Alert);
                let delay = self.scheduler.config().alert_hide_delay();
                self.hide_after(Indicator::Alert, delay, now, io);
            }
            if !imc_before {
                info!("instrument conditions");
                io.pulse(Pulse::Short);
            }
            self.imc = true;
        }
    }

    fn on_timer<P: Platform>(&mut self, now: Instant, id: TimerId, io: &mut P) {
        if let Some(fired) = self.scheduler.on_timer(now, id, io) {
            if let Some(fault) = fired.fault() {
                debug!("timer {}: {:?}", id.0, fault);
            }
            return;
        }

        match self.ui_timers.fire_id(id) {
            Some((indicator, UiAction::Hide)) => io.hide(indicator),
            None => trace!("stale timer {}", id.0),
        }
    }

    /// Show an indicator while active; hide it a little after it stops
    fn indicate<P: Platform>(
        &mut self,
        indicator: Indicator,
        active: bool,
        now: Instant,
        io: &mut P,
    ) {
        if active {
            self.ui_timers.cancel(io, indicator);
            io.show(indicator);
        } else {
            let delay = self.scheduler.config().indicator_hide_delay();
            self.hide_after(indicator, delay, now, io);
        }
    }

    fn hide_after<P: Platform>(
        &mut self,
        indicator: Indicator,
        delay: Duration,
        now: Instant,
        io: &mut P,
    ) {
        if self
            .ui_timers
            .schedule(io, now, indicator, delay, UiAction::Hide)
            .is_err()
        {
            warn!("no timer slot to hide {:?}", indicator);
        }
    }

    fn dismiss_alert<P: Platform>(&mut self, io: &mut P) {
        self.ui_timers.cancel(io, Indicator::Alert);
        io.hide(Indicator::Alert);
    }

    fn publish_status<P: Platform>(&self, io: &mut P) {
        let connection = self.scheduler.connection();
        io.set_status(StatusIcons {
            link: connection.link_up(),
            companion: connection.app_up(),
            imc: self.imc,
        });
    }

    // --- queries ---

    pub fn scheduler(&self) -> &RequestScheduler {
        &self.scheduler
    }

    pub fn settings(&self) -> DisplaySettings {
        self.settings
    }

    /// Check if the current report indicates instrument conditions
    pub fn is_imc(&self) -> bool {
        self.imc
    }

    /// Check if a delayed hide is pending for `indicator`
    pub fn hide_pending(&self, indicator: Indicator) -> bool {
        self.ui_timers.is_pending(indicator)
    }
}
