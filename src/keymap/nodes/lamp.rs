use super::{Behavior, Engine};
use crate::keymap::NodeId;

/// Wraps a child and associates the slot with one of the host lamp bits
/// (num/caps/scroll/compose/kana). The engine collects these associations
/// into its sparse lamp map at construction; when the host flips a lamp the
/// slot's LED is driven accordingly.
pub struct LampIndicator {
    child: NodeId,
    lamp_bit: u8,
}

impl LampIndicator {
    pub const fn new(child: NodeId, lamp_bit: u8) -> Self {
        Self { child, lamp_bit }
    }

    pub const fn lamp_bit(&self) -> u8 {
        self.lamp_bit
    }
}

impl Behavior for LampIndicator {
    fn on_press(&mut self, cx: &mut Engine, slot: u8) {
        cx.press_node(self.child, slot);
    }

    fn on_release(&mut self, cx: &mut Engine, slot: u8) {
        cx.release_node(self.child, slot);
    }
}
