use super::{Behavior, Engine};
use crate::keymap::NodeId;

/// Chooses between two children depending on whether a modifier node is
/// held at press time. The choice is latched so the matching child gets the
/// release even if the modifier state changed in between.
pub struct Modified {
    modifier: NodeId,
    plain: NodeId,
    modded: NodeId,
    was_modified: bool,
}

impl Modified {
    pub const fn new(modifier: NodeId, plain: NodeId, modded: NodeId) -> Self {
        Self { modifier, plain, modded, was_modified: false }
    }
}

impl Behavior for Modified {
    fn on_press(&mut self, cx: &mut Engine, slot: u8) {
        if cx.is_node_pressed(self.modifier) {
            self.was_modified = true;
            cx.press_node(self.modded, slot);
        } else {
            cx.press_node(self.plain, slot);
        }
    }

    fn on_release(&mut self, cx: &mut Engine, slot: u8) {
        if self.was_modified {
            self.was_modified = false;
            cx.release_node(self.modded, slot);
        } else {
            cx.release_node(self.plain, slot);
        }
    }
}
