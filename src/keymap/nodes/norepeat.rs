use super::{Behavior, Engine};
use crate::keymap::NodeId;

/// Pulses its child with an immediate press+release on press, so holding the
/// physical key never produces host-side auto-repeat.
pub struct NoRepeat {
    child: NodeId,
}

impl NoRepeat {
    pub const fn new(child: NodeId) -> Self {
        Self { child }
    }
}

impl Behavior for NoRepeat {
    fn on_press(&mut self, cx: &mut Engine, slot: u8) {
        cx.press_node(self.child, slot);
        cx.release_node(self.child, slot);
    }

    fn on_release(&mut self, _cx: &mut Engine, _slot: u8) {}
}
