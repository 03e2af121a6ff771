use embassy_time::Duration;

use super::{Behavior, Engine};
use crate::config::TAPPING_TERM;
use crate::keymap::NodeId;

/// Double-tap dance: the `once` child when tapped once, the `twice` child on
/// the second tap. The dance finishes when the tapping term elapses or any
/// other key is pressed; other keys are never held back, they execute
/// immediately and merely end the dance.
pub struct TapDance {
    once: NodeId,
    twice: NodeId,
    term: Duration,
    step: u8,
    finished: bool,
}

impl TapDance {
    pub const fn new(once: NodeId, twice: NodeId) -> Self {
        Self { once, twice, term: TAPPING_TERM, step: 0, finished: true }
    }

    pub const fn with_term(mut self, term: Duration) -> Self {
        self.term = term;
        self
    }

    fn finish(&mut self, cx: &mut Engine) {
        cx.disarm_timer();
        cx.stop_defer();
        self.finished = true;
    }
}

impl Behavior for TapDance {
    fn on_press(&mut self, cx: &mut Engine, slot: u8) {
        if self.finished {
            self.step = 0;
            self.finished = false;
        }
        self.step += 1;
        cx.arm_timer(slot, self.term);
        cx.start_defer(slot);

        if self.step == 1 {
            cx.press_node(self.once, slot);
        } else {
            if cx.is_node_pressed(self.once) {
                cx.release_node(self.once, slot);
            }
            cx.press_node(self.twice, slot);
            self.finish(cx);
        }
    }

    fn on_release(&mut self, cx: &mut Engine, slot: u8) {
        if self.step == 1 {
            cx.release_node(self.once, slot);
        } else {
            cx.release_node(self.twice, slot);
        }
        if self.finished {
            self.step = 0;
        }
    }

    fn on_other_press(&mut self, cx: &mut Engine, _other: u8) -> bool {
        self.finish(cx);
        true
    }

    fn on_other_release(&mut self, _cx: &mut Engine, _other: u8) -> bool {
        true
    }

    fn on_timeout(&mut self, cx: &mut Engine, _slot: u8) {
        self.finish(cx);
    }
}
