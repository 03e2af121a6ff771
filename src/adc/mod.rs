//! ADC channels and the sense model built on them.
//!
//! Three lines share one ADC block: the 5 V rail and the two CC-sense
//! dividers. Each channel keeps its latest 12-bit sample in an atomic so any
//! agent can read it without touching the peripheral, and serialises actual
//! conversions through a mutex. The 5 V rail additionally classifies into a
//! level used by the hub state machine and the brightness controller.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use portable_atomic::{AtomicU16, Ordering};

use crate::config::{
    ADC_5V_HIGH, ADC_5V_LOW, ADC_5V_PANIC, ADC_5V_START_LEVEL, ADC_CON1_NOMINAL,
    ADC_CON2_NOMINAL, ADC_CON_HOST_CONNECTED, ADC_CON_NOMINAL_CHANGE_THR, V5V_STABILITY_COUNT,
};
use crate::drivers::AdcBus;
use crate::hub::PortId;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcLine {
    V5v,
    Con1,
    Con2,
}

impl AdcLine {
    pub const fn for_port(port: PortId) -> Self {
        match port {
            PortId::Port1 => AdcLine::Con1,
            PortId::Port2 => AdcLine::Con2,
        }
    }
}

/// Classified level of the 5 V rail. `STABLE` is the threshold the hub state
/// machine watches; levels order from collapsed to solid.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum V5vLevel {
    Panic,
    Unstable,
    Low,
    Mid,
    High,
}

/// The lowest level at which the rail counts as usable.
pub const STABLE: V5vLevel = V5vLevel::Low;

/// Map a raw 12-bit 5 V sample onto its level.
pub fn classify_v5v(raw: u16) -> V5vLevel {
    if raw >= ADC_5V_HIGH {
        V5vLevel::High
    } else if raw >= ADC_5V_LOW {
        V5vLevel::Mid
    } else if raw >= ADC_5V_START_LEVEL {
        V5vLevel::Low
    } else if raw >= ADC_5V_PANIC {
        V5vLevel::Unstable
    } else {
        V5vLevel::Panic
    }
}

/// Nominal no-device reading of a CC-sense divider.
pub const fn nominal(port: PortId) -> u16 {
    match port {
        PortId::Port1 => ADC_CON1_NOMINAL,
        PortId::Port2 => ADC_CON2_NOMINAL,
    }
}

/// A sink is pulling the CC line below nominal. Only meaningful while the
/// port is not advertising source.
pub fn is_device_connected(port: PortId, raw: u16) -> bool {
    raw < nominal(port).saturating_sub(ADC_CON_NOMINAL_CHANGE_THR)
}

/// Is a host attached? In source mode the CC line simply has to sit above a
/// floor; otherwise a rival source shows as a rise above nominal. A
/// physically damaged receptacle can read false forever, which is why the
/// hub machine treats this as advisory.
pub fn is_host_connected(port: PortId, raw: u16, configured_as_source: bool) -> bool {
    if configured_as_source {
        raw >= ADC_CON_HOST_CONNECTED
    } else {
        raw >= nominal(port) + ADC_CON_NOMINAL_CHANGE_THR
    }
}

/// One logical ADC channel: latest sample plus the conversion lock.
pub struct AdcChannel {
    line: AdcLine,
    last: AtomicU16,
    lock: Mutex<CriticalSectionRawMutex, ()>,
}

impl AdcChannel {
    pub const fn new(line: AdcLine) -> Self {
        Self { line, last: AtomicU16::new(0), lock: Mutex::new(()) }
    }

    pub fn line(&self) -> AdcLine {
        self.line
    }

    /// Latest completed sample, readable from any context.
    pub fn read(&self) -> u16 {
        self.last.load(Ordering::Relaxed)
    }

    /// Run one conversion. The channel mutex serialises issuance so two
    /// agents can't interleave conversions on the same line.
    pub async fn measure(&self, bus: &mut impl AdcBus) -> u16 {
        let _guard = self.lock.lock().await;
        let raw = bus.convert(self.line).await;
        self.last.store(raw, Ordering::Relaxed);
        raw
    }
}

/// The three channels, wired once at init.
pub struct AdcSense {
    pub v5v: AdcChannel,
    pub con1: AdcChannel,
    pub con2: AdcChannel,
}

impl AdcSense {
    pub const fn new() -> Self {
        Self {
            v5v: AdcChannel::new(AdcLine::V5v),
            con1: AdcChannel::new(AdcLine::Con1),
            con2: AdcChannel::new(AdcLine::Con2),
        }
    }

    pub fn con(&self, port: PortId) -> &AdcChannel {
        match port {
            PortId::Port1 => &self.con1,
            PortId::Port2 => &self.con2,
        }
    }

    /// Block until the 5 V rail has measured at or above `STABLE` for
    /// several consecutive samples. Called once at power-up before the hub
    /// is configured; a rail that never settles keeps us here until the
    /// watchdog gives up.
    pub async fn wait_for_stable_5v(&self, bus: &mut impl AdcBus) {
        let mut repeat = 0;
        while repeat < V5V_STABILITY_COUNT {
            let raw = self.v5v.measure(bus).await;
            if classify_v5v(raw) < STABLE {
                repeat = 0;
            } else {
                repeat += 1;
            }
        }
        log::debug!("ADC: v_5v stabilized");
    }
}

impl Default for AdcSense {
    fn default() -> Self {
        Self::new()
    }
}
