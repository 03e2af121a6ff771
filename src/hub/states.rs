//! The port state machine.
//!
//! Exactly one state is current. ADC-driven events arrive periodically;
//! everything else is edge-triggered. An event the current state does not
//! handle is discarded, never forwarded.
//!
//! | state         | waits for                                            |
//! |---------------|------------------------------------------------------|
//! | DetermineHost | host presence on the tried port, toggling every ~1 s |
//! | Suspended     | bus resume, or a switchover request                  |
//! | ExtraDisabled | a sink on the extra CC, or a manual enable           |
//! | ExtraEnabled  | sink removal, brownout grace expiry, suspend         |

use embassy_time::Duration;

use super::PortId;
use crate::adc::{self, V5vLevel, STABLE};
use crate::config::{
    DEBUG_LED_BLINK_PERIOD, GRACE_TIME_TO_CUT_EXTRA, KEEP_CHARGING_EXTRA_DEVICE_DURING_SUSPEND,
};
use crate::hub::HubEvent;

/// Effects the state machine exerts on the world. The hub agent implements
/// this over the controller, the ADC channels, the settings store and its
/// own deadline bookkeeping; tests implement it over recorders.
#[allow(async_fn_in_trait)]
pub trait HubIo {
    /// One blocking conversion on a CC channel.
    async fn measure_con(&mut self, port: PortId) -> u16;
    /// Latest sample from the periodic CC schedule.
    fn con_reading(&self, port: PortId) -> u16;
    /// Latest classified 5 V level.
    fn v5v_level(&self) -> V5vLevel;

    async fn select_host_port(&mut self, port: PortId);
    fn disable_all_ports(&mut self);
    fn set_extra_port(&mut self, port: PortId, enable: bool);
    fn is_configured_as_source(&self, port: PortId) -> bool;

    fn led(&mut self, on: bool);
    fn led_toggle(&mut self);

    /// Choose which CC channel the periodic schedule measures, or stop it.
    fn schedule_con(&mut self, port: Option<PortId>);

    /// Arm the state's single timeout; a later call re-arms it.
    fn set_state_timeout(&mut self, after: Duration);
    fn cancel_state_timeout(&mut self);

    fn load_last_host_port(&mut self) -> PortId;
    fn store_last_host_port(&mut self, port: PortId);
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortState {
    DetermineHost,
    Suspended,
    ExtraDisabled,
    ExtraEnabled,
}

pub struct PortSm {
    state: PortState,
    host: PortId,
    extra: PortId,
    /// Cleared when the host CC looked dead at acquisition time; a damaged
    /// receptacle would otherwise bounce us between ports forever.
    automatic_switchover: bool,
    /// Latched after a brownout cut the extra port. Cleared on device
    /// removal, suspend, or manual enable.
    panic_disabled: bool,
    enabled_manually: bool,
    grace_armed: bool,
}

impl PortSm {
    /// Enter DetermineHost and start probing for a host.
    pub async fn start(io: &mut impl HubIo) -> Self {
        let mut sm = Self {
            state: PortState::DetermineHost,
            host: PortId::Port1,
            extra: PortId::Port2,
            automatic_switchover: false,
            panic_disabled: false,
            enabled_manually: false,
            grace_armed: false,
        };
        sm.enter_determine_host(io).await;
        sm
    }

    pub fn state(&self) -> PortState {
        self.state
    }

    pub fn host(&self) -> PortId {
        self.host
    }

    pub fn extra(&self) -> PortId {
        self.extra
    }

    pub fn panic_disabled(&self) -> bool {
        self.panic_disabled
    }

    pub fn enabled_manually(&self) -> bool {
        self.enabled_manually
    }

    pub async fn handle(&mut self, io: &mut impl HubIo, event: HubEvent) {
        match self.state {
            PortState::DetermineHost => self.handle_determine_host(io, event).await,
            PortState::Suspended => self.handle_suspended(io, event).await,
            PortState::ExtraDisabled => self.handle_extra_disabled(io, event).await,
            PortState::ExtraEnabled => self.handle_extra_enabled(io, event).await,
        }
    }

    // DetermineHost

    async fn enter_determine_host(&mut self, io: &mut impl HubIo) {
        log::debug!("USBHUB: determine host");
        self.state = PortState::DetermineHost;
        io.led(true);
        io.set_state_timeout(DEBUG_LED_BLINK_PERIOD);
        io.schedule_con(None);

        // Breaking the upstream data line; the suspend this provokes is
        // ignored while in this state.
        io.disable_all_ports();

        let desired = io.load_last_host_port();
        log::debug!("USBHUB: try port {} first", desired.number());
        io.select_host_port(desired).await;
        self.host = desired;
        self.extra = desired.other();

        // This is the one state that measures the host side periodically.
        io.schedule_con(Some(self.host));
    }

    async fn handle_determine_host(&mut self, io: &mut impl HubIo, event: HubEvent) {
        match event {
            HubEvent::ConReport => {
                if self.host_connected_latest(io) {
                    io.schedule_con(None);
                    log::debug!("USBHUB: determined host port {}", self.host.number());
                }
            }
            HubEvent::Timeout => {
                io.led_toggle();
                io.set_state_timeout(DEBUG_LED_BLINK_PERIOD);
                if !self.host_connected_latest(io) {
                    io.schedule_con(None);
                    let desired = self.extra;
                    log::debug!("USBHUB: switchover to port {}", desired.number());
                    io.select_host_port(desired).await;
                    core::mem::swap(&mut self.host, &mut self.extra);
                    io.schedule_con(Some(self.host));
                }
            }
            HubEvent::UsbResume => {
                self.exit_determine_host(io);
                self.resume_to_extra_state(io).await;
            }
            HubEvent::Switchover => self.help_switchover(io).await,
            _ => {}
        }
    }

    fn exit_determine_host(&mut self, io: &mut impl HubIo) {
        io.led(false);
        io.cancel_state_timeout();
        io.schedule_con(None);

        // The acquired host is remembered only out of this state.
        io.store_last_host_port(self.host);

        self.automatic_switchover = self.host_connected_latest(io);
        if !self.automatic_switchover {
            log::warn!("USBHUB: automatic switchover disabled");
        }

        io.schedule_con(Some(self.extra));
    }

    // Suspended

    fn enter_suspended(&mut self, io: &mut impl HubIo) {
        log::debug!("USBHUB: suspended");
        self.state = PortState::Suspended;
        io.led(true);
        io.set_state_timeout(DEBUG_LED_BLINK_PERIOD);
        // Neither side is measured while suspended.
        io.schedule_con(None);
    }

    async fn handle_suspended(&mut self, io: &mut impl HubIo, event: HubEvent) {
        match event {
            HubEvent::Timeout => {
                io.led_toggle();
                io.set_state_timeout(DEBUG_LED_BLINK_PERIOD);
            }
            HubEvent::UsbResume => {
                self.exit_suspended(io).await;
                self.resume_to_extra_state(io).await;
            }
            HubEvent::Switchover => self.help_switchover(io).await,
            _ => {}
        }
    }

    async fn exit_suspended(&mut self, io: &mut impl HubIo) {
        io.led(false);
        io.cancel_state_timeout();

        let raw = io.measure_con(self.host).await;
        self.automatic_switchover = self.host_connected(io, raw);
        if !self.automatic_switchover {
            log::warn!("USBHUB: automatic switchover disabled");
        }

        io.schedule_con(Some(self.extra));
    }

    /// Reassign the two port roles while the bus is quiet.
    async fn perform_switchover(&mut self, io: &mut impl HubIo) {
        let desired = self.extra;
        log::debug!("USBHUB: switchover to port {}", desired.number());
        io.select_host_port(desired).await;
        core::mem::swap(&mut self.host, &mut self.extra);
    }

    // ExtraDisabled

    fn enter_extra_disabled(&mut self, io: &mut impl HubIo) {
        log::debug!("USBHUB: extra disabled");
        self.state = PortState::ExtraDisabled;
        io.set_extra_port(self.extra, false);
    }

    async fn handle_extra_disabled(&mut self, io: &mut impl HubIo, event: HubEvent) {
        match event {
            HubEvent::ConReport => {
                if adc::is_device_connected(self.extra, io.con_reading(self.extra)) {
                    if !self.panic_disabled {
                        log::info!(
                            "USBHUB: extra device is connected to port {}",
                            self.extra.number()
                        );
                        self.exit_extra_disabled();
                        self.enter_extra_enabled(io);
                    }
                } else if self.panic_disabled {
                    // Physical removal clears the latch.
                    self.panic_disabled = false;
                    log::info!(
                        "USBHUB: extra device is disconnected from port {}",
                        self.extra.number()
                    );
                }
            }
            HubEvent::ExtraEnableManual => {
                self.exit_extra_disabled();
                self.enter_extra_enabled(io);
                self.enabled_manually = true;
                log::info!("USBHUB: extra port is enabled manually");
            }
            HubEvent::UsbSuspend => {
                self.exit_extra_disabled();
                self.help_suspend(io).await;
            }
            HubEvent::Switchover => self.help_switchover(io).await,
            _ => {}
        }
    }

    fn exit_extra_disabled(&mut self) {
        self.panic_disabled = false;
    }

    // ExtraEnabled

    fn enter_extra_enabled(&mut self, io: &mut impl HubIo) {
        log::debug!("USBHUB: extra enabled");
        self.state = PortState::ExtraEnabled;
        self.enabled_manually = false;
        self.grace_armed = false;
        io.set_extra_port(self.extra, true);
    }

    async fn handle_extra_enabled(&mut self, io: &mut impl HubIo, event: HubEvent) {
        match event {
            HubEvent::V5vReport => {
                if self.grace_armed {
                    if io.v5v_level() >= STABLE {
                        io.cancel_state_timeout();
                        self.grace_armed = false;
                    }
                } else if io.v5v_level() < STABLE {
                    io.set_state_timeout(GRACE_TIME_TO_CUT_EXTRA);
                    self.grace_armed = true;
                }
            }
            HubEvent::ConReport => {
                if !adc::is_device_connected(self.extra, io.con_reading(self.extra))
                    && !self.enabled_manually
                {
                    log::info!(
                        "USBHUB: extra device is disconnected from port {}",
                        self.extra.number()
                    );
                    self.exit_extra_enabled(io);
                    self.enter_extra_disabled(io);
                }
            }
            HubEvent::ExtraEnableManual => {
                if !self.enabled_manually {
                    self.enabled_manually = true;
                    log::info!("USBHUB: extra port is enabled manually");
                }
            }
            HubEvent::ExtraBackToAutomatic => {
                if self.enabled_manually {
                    self.enabled_manually = false;
                    log::info!("USBHUB: extra port is back to automatic");
                    if !adc::is_device_connected(self.extra, io.con_reading(self.extra)) {
                        self.exit_extra_enabled(io);
                        self.enter_extra_disabled(io);
                    }
                }
            }
            HubEvent::Timeout => {
                // The 5 V rail sat below STABLE for the whole grace period.
                log::warn!("USBHUB: extra port is panic disabled");
                self.exit_extra_enabled(io);
                self.enter_extra_disabled(io);
                self.panic_disabled = true;
            }
            HubEvent::UsbSuspend => {
                self.exit_extra_enabled(io);
                self.help_suspend(io).await;
            }
            HubEvent::Switchover => self.help_switchover(io).await,
            _ => {}
        }
    }

    fn exit_extra_enabled(&mut self, io: &mut impl HubIo) {
        io.cancel_state_timeout();
        self.grace_armed = false;
        self.enabled_manually = false;
        if !KEEP_CHARGING_EXTRA_DEVICE_DURING_SUSPEND {
            io.set_extra_port(self.extra, false);
        }
    }

    // Shared transitions

    /// Bus resume lands in one of the extra states depending on whether a
    /// device sits on the extra port right now.
    async fn resume_to_extra_state(&mut self, io: &mut impl HubIo) {
        log::debug!("USBHUB: acquired host port {}", self.host.number());
        let raw = io.measure_con(self.extra).await;
        if adc::is_device_connected(self.extra, raw) {
            self.enter_extra_enabled(io);
        } else {
            self.enter_extra_disabled(io);
        }
    }

    /// Bus suspend; a dead host CC at this moment means the cable broke, and
    /// the roles swap so the other port can take over.
    async fn help_suspend(&mut self, io: &mut impl HubIo) {
        let raw = io.measure_con(self.host).await;
        let cable_ok = self.host_connected(io, raw);
        self.enter_suspended(io);
        if self.automatic_switchover && !cable_ok {
            self.perform_switchover(io).await;
        }
    }

    /// A switchover lands on the extra port, so it is refused while a
    /// device sits there; the user decides everything else.
    async fn help_switchover(&mut self, io: &mut impl HubIo) {
        let raw = io.measure_con(self.extra).await;
        if adc::is_device_connected(self.extra, raw) {
            log::warn!("USBHUB: switchover not allowed to extra device!");
            return;
        }
        match self.state {
            PortState::DetermineHost => self.exit_determine_host(io),
            PortState::Suspended => {}
            PortState::ExtraDisabled => self.exit_extra_disabled(),
            PortState::ExtraEnabled => self.exit_extra_enabled(io),
        }
        self.enter_suspended(io);
        self.perform_switchover(io).await;
    }

    fn host_connected(&self, io: &impl HubIo, raw: u16) -> bool {
        adc::is_host_connected(self.host, raw, io.is_configured_as_source(self.host))
    }

    fn host_connected_latest(&self, io: &impl HubIo) -> bool {
        self.host_connected(io, io.con_reading(self.host))
    }
}
