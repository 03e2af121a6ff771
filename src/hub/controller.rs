//! Hub chip bring-up and port routing.
//!
//! The USB2422 takes its configuration block over SMBus after each reset
//! pulse. Power-up with the cable already in a host port occasionally
//! corrupts that upload, so it retries until the chip accepts it. Port
//! routing afterwards is pure shift-register work.

use embassy_time::Timer;

use super::shift_register::{self as sr, ShiftRegister};
use super::PortId;
use crate::drivers::{HubConfigPort, SrBus};

pub struct HubController<B: SrBus, P: HubConfigPort> {
    sr: ShiftRegister<B>,
    cfg: P,
}

impl<B: SrBus, P: HubConfigPort> HubController<B, P> {
    pub fn new(sr_bus: B, cfg: P) -> Self {
        Self { sr: ShiftRegister::new(sr_bus), cfg }
    }

    /// Reset the hub, upload its configuration until it sticks, then release
    /// the LED drivers from reset/shutdown. Both ports stay disabled.
    pub async fn bring_up(&mut self, serial: Option<&[u8]>) {
        self.sr.write(sr::HUB_CONNECT, 0);

        loop {
            self.reset_pulse().await;
            match self.cfg.upload_config(serial) {
                Ok(()) => break,
                Err(e) => {
                    log::warn!("USBHUB: configuration upload failed: {e:?}");
                    Timer::after_millis(1).await;
                }
            }
        }

        // LED drivers out of reset and hardware shutdown; brightness stays
        // gated by the software-shutdown bit until the GCR ramps up.
        self.sr.write(sr::SDB_N, sr::IRST);
        log::debug!("USBHUB: hub configured");
    }

    async fn reset_pulse(&mut self) {
        self.sr.write(0, sr::HUB_RESET_N);
        // t1 >= 1 us per the datasheet.
        Timer::after_micros(2).await;
        self.sr.write(sr::HUB_RESET_N, 0);
        Timer::after_micros(10).await;
    }

    pub fn is_active(&self) -> bool {
        self.cfg.is_active()
    }

    /// Break both data paths and stop advertising source on either CC.
    /// The extra port's power line is left alone.
    pub fn disable_all_ports(&mut self) {
        self.sr.write(sr::E_UP_N | sr::E_DN1_N, sr::SRC_1 | sr::SRC_2);
    }

    /// Route the upstream to `port` and the downstream mux to the other
    /// side. Advertising source on the host CC is what lets the attached
    /// host see us.
    pub async fn select_host_port(&mut self, port: PortId) {
        match port {
            PortId::Port1 => self.sr.write(
                sr::S_DN1 | sr::SRC_1,
                sr::E_UP_N | sr::S_UP | sr::SRC_2,
            ),
            PortId::Port2 => self.sr.write(
                sr::S_UP | sr::SRC_2,
                sr::E_UP_N | sr::S_DN1 | sr::SRC_1,
            ),
        }
        // Let the muxes settle before anything measures the CC lines.
        Timer::after_micros(10).await;
    }

    /// Gate the extra port's data path and 5 V switch together.
    pub fn set_extra_port(&mut self, port: PortId, enable: bool) {
        let vbus = match port {
            PortId::Port1 => sr::E_VBUS_1,
            PortId::Port2 => sr::E_VBUS_2,
        };
        if enable {
            self.sr.write(vbus, sr::E_DN1_N);
        } else {
            self.sr.write(sr::E_DN1_N, vbus);
        }
    }

    pub fn host_port(&self) -> Option<PortId> {
        self.sr.host_port()
    }

    pub fn extra_port(&self) -> Option<PortId> {
        self.sr.extra_port()
    }

    pub fn is_configured_as_source(&self, port: PortId) -> bool {
        self.sr.is_configured_as_source(port)
    }

    pub fn sr_word(&self) -> u16 {
        self.sr.word()
    }
}
