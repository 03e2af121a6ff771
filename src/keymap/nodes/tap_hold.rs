use embassy_time::Duration;

use super::{Behavior, Engine};
use crate::config::TAPPING_TERM;

/// How the hold decision is reached.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TapHoldFlavor {
    /// Hold once the term expires or any other key is *pressed* within it.
    HoldPreferred,
    /// Hold once the term expires or another key is pressed *and released*
    /// within it. Other presses are deferred, not just observed, so a press
    /// with no release inside the window stays a tap.
    Balanced,
}

/// Tap for one keycode, hold for another.
pub struct TapHold {
    code_tap: u8,
    code_hold: u8,
    term: Duration,
    flavor: TapHoldFlavor,
    holding: bool,
}

impl TapHold {
    pub const fn new(code_tap: u8, code_hold: u8, flavor: TapHoldFlavor) -> Self {
        Self { code_tap, code_hold, term: TAPPING_TERM, flavor, holding: false }
    }

    pub const fn with_term(mut self, term: Duration) -> Self {
        self.term = term;
        self
    }

    fn decide_hold(&mut self, cx: &mut Engine) {
        log::debug!("TapHold: decide hold (0x{:02x})", self.code_hold);
        // Disarming an already-fired timer does no harm.
        cx.disarm_timer();
        cx.stop_defer();
        self.holding = true;
        cx.send_press(self.code_hold);
    }
}

impl Behavior for TapHold {
    fn on_press(&mut self, cx: &mut Engine, slot: u8) {
        cx.arm_timer(slot, self.term);
        cx.start_defer(slot);
        if self.holding {
            log::warn!("TapHold: spurious holding (0x{:02x})", self.code_tap);
        }
    }

    fn on_release(&mut self, cx: &mut Engine, _slot: u8) {
        if self.holding {
            self.holding = false;
            cx.send_release(self.code_hold);
        } else {
            // The release arrived before any hold trigger: this was a tap.
            log::debug!("TapHold: decide tap (0x{:02x})", self.code_tap);
            cx.disarm_timer();
            cx.stop_defer();
            cx.send_press(self.code_tap);
            cx.send_release(self.code_tap);
        }
    }

    fn on_other_press(&mut self, cx: &mut Engine, _other: u8) -> bool {
        match self.flavor {
            TapHoldFlavor::HoldPreferred => {
                self.decide_hold(cx);
                true
            }
            TapHoldFlavor::Balanced => false,
        }
    }

    fn on_other_release(&mut self, cx: &mut Engine, other: u8) -> bool {
        if self.flavor == TapHoldFlavor::Balanced
            && cx.is_deferred(crate::KeyEvent::press(other))
        {
            // Press and release of another key both inside the window.
            self.decide_hold(cx);
        }
        false
    }

    fn on_timeout(&mut self, cx: &mut Engine, _slot: u8) {
        self.decide_hold(cx);
    }
}
