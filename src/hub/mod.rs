//! USB hub port management.
//!
//! Two USB-C receptacles share one upstream mux: one is the host uplink,
//! the other powers and measures an extra downstream device. The state
//! machine in [`states`] decides the roles; [`shift_register`] mirrors the
//! control word that actually routes the ports, and [`controller`] brings
//! the hub chip up and translates role decisions into control-word updates.

pub mod controller;
pub mod shift_register;
pub mod states;

/// Physical receptacle identity. Host/extra are roles, not identities; the
/// state machine maps roles onto ports and swaps them on switchover.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortId {
    Port1,
    Port2,
}

impl PortId {
    /// Wire/persistence encoding: 1 or 2.
    pub const fn number(self) -> u8 {
        match self {
            PortId::Port1 => 1,
            PortId::Port2 => 2,
        }
    }

    pub const fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(PortId::Port1),
            2 => Some(PortId::Port2),
            _ => None,
        }
    }

    pub const fn other(self) -> Self {
        match self {
            PortId::Port1 => PortId::Port2,
            PortId::Port2 => PortId::Port1,
        }
    }
}

/// Requests the keymap layer can raise toward the hub agent.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HubRequest {
    ExtraEnableManually,
    ExtraBackToAutomatic,
}

/// Everything the port state machine reacts to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HubEvent {
    UsbSuspend,
    UsbResume,
    /// User-requested switchover, already gated on keyboard idleness by the
    /// keymap agent.
    Switchover,
    /// A fresh periodic 5 V measurement is available.
    V5vReport,
    /// A fresh periodic CC-sense measurement is available.
    ConReport,
    ExtraEnableManual,
    ExtraBackToAutomatic,
    /// The state's armed timeout fired (retry, blink or brownout grace).
    Timeout,
}

impl From<HubRequest> for HubEvent {
    fn from(req: HubRequest) -> Self {
        match req {
            HubRequest::ExtraEnableManually => HubEvent::ExtraEnableManual,
            HubRequest::ExtraBackToAutomatic => HubEvent::ExtraBackToAutomatic,
        }
    }
}
