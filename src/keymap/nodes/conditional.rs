use super::{Behavior, Engine};
use crate::keymap::NodeId;

/// Predicate evaluated at press time; sees the engine's read-only state
/// (lamp bits, node press states).
pub type Predicate = fn(&Engine) -> bool;

/// Selects one of two children by a predicate. Like [`Modified`], the
/// outcome is latched until release.
///
/// [`Modified`]: super::Modified
pub struct Conditional {
    cond: Predicate,
    when_true: NodeId,
    when_false: NodeId,
    was_false: bool,
}

impl Conditional {
    pub const fn new(cond: Predicate, when_true: NodeId, when_false: NodeId) -> Self {
        Self { cond, when_true, when_false, was_false: false }
    }
}

impl Behavior for Conditional {
    fn on_press(&mut self, cx: &mut Engine, slot: u8) {
        if (self.cond)(cx) {
            cx.press_node(self.when_true, slot);
        } else {
            self.was_false = true;
            cx.press_node(self.when_false, slot);
        }
    }

    fn on_release(&mut self, cx: &mut Engine, slot: u8) {
        if self.was_false {
            self.was_false = false;
            cx.release_node(self.when_false, slot);
        } else {
            cx.release_node(self.when_true, slot);
        }
    }
}
