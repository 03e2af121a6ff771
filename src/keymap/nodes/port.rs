use super::{Behavior, Engine};

/// Requests a host-port switchover. The engine parks the request until the
/// event queue is drained, no deferrer is active and the matrix is idle,
/// then hands it to the hub agent.
#[derive(Clone, Copy, Default, Debug)]
pub struct PortSwitch;

impl Behavior for PortSwitch {
    fn on_press(&mut self, cx: &mut Engine, _slot: u8) {
        cx.request_switchover();
    }

    fn on_release(&mut self, _cx: &mut Engine, _slot: u8) {}
}

/// Force-enables the extra port's power while held; releasing hands control
/// back to automatic device detection.
#[derive(Clone, Copy, Default, Debug)]
pub struct ExtraHold;

impl Behavior for ExtraHold {
    fn on_press(&mut self, cx: &mut Engine, _slot: u8) {
        cx.enable_extra_manually();
    }

    fn on_release(&mut self, cx: &mut Engine, _slot: u8) {
        cx.extra_back_to_automatic();
    }
}
