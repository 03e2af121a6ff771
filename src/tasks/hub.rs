//! The hub agent.
//!
//! Brings the rail and the hub chip up, then runs the port state machine
//! against three periodic sources: the 5 V measurement (which also paces the
//! brightness controller and the settings flush), the CC measurement on
//! whichever side the machine scheduled, and the state's armed timeout.

use embassy_futures::select::{select4, Either4};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Timer};

use super::{at_or_never, rgb};
use crate::adc::{classify_v5v, AdcSense, V5vLevel};
use crate::config::{EXTRA_PORT_MEASURING_PERIOD, RGB_GCR_CHANGE_PERIOD};
use crate::drivers::{AdcBus, HubConfigPort, NvmBytes, SrBus, StatusLed, SystemControl};
use crate::hub::controller::HubController;
use crate::hub::states::{HubIo, PortSm};
use crate::hub::{HubEvent, PortId};
use crate::persist::{Settings, LAST_HOST_PORT};
use crate::rgb::FxEvent;

/// Edge-triggered events toward the port state machine: bus suspend/resume
/// from the USB agent, switchover and extra-port requests from the keymap
/// agent.
pub static HUB_EVENTS: Channel<CriticalSectionRawMutex, HubEvent, 8> = Channel::new();

/// The state machine's effects, implemented over the real drivers plus the
/// agent's own deadline bookkeeping.
struct Hw<A, S, P, L, N>
where
    A: AdcBus,
    S: SrBus,
    P: HubConfigPort,
    L: StatusLed,
    N: NvmBytes,
{
    adc: A,
    sense: AdcSense,
    ctrl: HubController<S, P>,
    led: L,
    settings: Settings<N>,
    con_sched: Option<PortId>,
    con_at: Option<Instant>,
    state_deadline: Option<Instant>,
}

impl<A, S, P, L, N> HubIo for Hw<A, S, P, L, N>
where
    A: AdcBus,
    S: SrBus,
    P: HubConfigPort,
    L: StatusLed,
    N: NvmBytes,
{
    async fn measure_con(&mut self, port: PortId) -> u16 {
        self.sense.con(port).measure(&mut self.adc).await
    }

    fn con_reading(&self, port: PortId) -> u16 {
        self.sense.con(port).read()
    }

    fn v5v_level(&self) -> V5vLevel {
        classify_v5v(self.sense.v5v.read())
    }

    async fn select_host_port(&mut self, port: PortId) {
        self.ctrl.select_host_port(port).await;
    }

    fn disable_all_ports(&mut self) {
        self.ctrl.disable_all_ports();
    }

    fn set_extra_port(&mut self, port: PortId, enable: bool) {
        self.ctrl.set_extra_port(port, enable);
    }

    fn is_configured_as_source(&self, port: PortId) -> bool {
        self.ctrl.is_configured_as_source(port)
    }

    fn led(&mut self, on: bool) {
        self.led.set(on);
    }

    fn led_toggle(&mut self) {
        self.led.toggle();
    }

    fn schedule_con(&mut self, port: Option<PortId>) {
        self.con_sched = port;
        self.con_at = port.map(|_| Instant::now() + EXTRA_PORT_MEASURING_PERIOD);
    }

    fn set_state_timeout(&mut self, after: Duration) {
        self.state_deadline = Some(Instant::now() + after);
    }

    fn cancel_state_timeout(&mut self) {
        self.state_deadline = None;
    }

    fn load_last_host_port(&mut self) -> PortId {
        self.settings
            .get_u8(LAST_HOST_PORT)
            .and_then(PortId::from_number)
            .unwrap_or(PortId::Port1)
    }

    fn store_last_host_port(&mut self, port: PortId) {
        self.settings.set_u8(LAST_HOST_PORT, port.number());
    }
}

pub async fn hub_agent<A, S, P, L, N, Y>(
    mut adc: A,
    mut ctrl: HubController<S, P>,
    settings: Settings<N>,
    led: L,
    system: &Y,
) -> !
where
    A: AdcBus,
    S: SrBus,
    P: HubConfigPort,
    L: StatusLed,
    N: NvmBytes,
    Y: SystemControl,
{
    let sense = AdcSense::new();

    // The hub chip must not come up on a collapsing rail.
    sense.wait_for_stable_5v(&mut adc).await;
    ctrl.bring_up(system.factory_serial()).await;

    let mut hw = Hw {
        adc,
        sense,
        ctrl,
        led,
        settings,
        con_sched: None,
        con_at: None,
        state_deadline: None,
    };

    let mut sm = PortSm::start(&mut hw).await;

    // The 5 V rail is monitored continuously from here on.
    let mut v5v_at = Instant::now() + RGB_GCR_CHANGE_PERIOD;

    loop {
        match select4(
            HUB_EVENTS.receive(),
            Timer::at(v5v_at),
            at_or_never(hw.con_at),
            at_or_never(hw.state_deadline),
        )
        .await
        {
            Either4::First(event) => {
                sm.handle(&mut hw, event).await;
            }
            Either4::Second(()) => {
                v5v_at += RGB_GCR_CHANGE_PERIOD;
                let raw = hw.sense.v5v.measure(&mut hw.adc).await;
                let level = classify_v5v(raw);
                // The one hub->RGB signal: the brightness controller steps
                // once per report.
                rgb::send_fx(FxEvent::V5v(level));
                sm.handle(&mut hw, HubEvent::V5vReport).await;
                hw.settings.poll_flush(Instant::now());
            }
            Either4::Third(()) => {
                if let Some(port) = hw.con_sched {
                    hw.sense.con(port).measure(&mut hw.adc).await;
                    hw.con_at = Some(Instant::now() + EXTRA_PORT_MEASURING_PERIOD);
                    sm.handle(&mut hw, HubEvent::ConReport).await;
                } else {
                    hw.con_at = None;
                }
            }
            Either4::Fourth(()) => {
                hw.state_deadline = None;
                sm.handle(&mut hw, HubEvent::Timeout).await;
            }
        }
    }
}
