//! Default keymap for the 5x15 board.
//!
//! Nodes live in one flat table; the slot table and every composite node
//! reference them by id. The default layout is a 65% arrangement with the
//! firmware-level extras wired in: grave-escape on Esc, Esc/Ctrl tap-hold
//! behind the caps-lamp indicator, a double-tap caps on right shift, and the
//! hub controls on the bottom row.

use heapless::Vec;

use super::nodes::{
    Conditional, ExtraHold, LampIndicator, Literal, Modified, NoOp, NoRepeat, Node, PortSwitch,
    TapDance, TapHold, TapHoldFlavor,
};
use super::{Engine, NodeId, MAX_NODES};
use crate::config::NUM_SLOTS;
use crate::hid::lamp;
use crate::keycodes::*;

pub struct Layout {
    pub nodes: Vec<Node, MAX_NODES>,
    pub slots: [NodeId; NUM_SLOTS],
}

struct Builder {
    nodes: Vec<Node, MAX_NODES>,
}

impl Builder {
    fn add(&mut self, node: impl Into<Node>) -> NodeId {
        let id = self.nodes.len() as NodeId;
        if self.nodes.push(node.into()).is_err() {
            // The table is sized for every layout this crate ships.
            log::error!("Keymap: node table overflow");
        }
        id
    }

    fn lit(&mut self, code: u8) -> NodeId {
        self.add(Literal::new(code))
    }
}

fn caps_lamp_lit(e: &Engine) -> bool {
    e.is_lamp_lit(lamp::CAPS_LOCK)
}

pub fn default_layout() -> Layout {
    let mut b = Builder { nodes: Vec::new() };

    let no = b.add(NoOp);
    let lshift = b.lit(KC_LSHIFT);

    // Esc doubles as grave while either shift is held.
    let esc_plain = b.lit(KC_ESCAPE);
    let esc_grave = b.lit(KC_GRAVE);
    let esc = b.add(Modified::new(lshift, esc_plain, esc_grave));

    // Caps slot: tap Esc / hold Ctrl, carrying the caps lock lamp.
    let caps_tap = b.add(TapHold::new(KC_ESCAPE, KC_LCTRL, TapHoldFlavor::HoldPreferred));
    let caps = b.add(LampIndicator::new(caps_tap, lamp::CAPS_LOCK));

    // Right shift: tap for shift, double-tap for caps lock.
    let rshift_once = b.lit(KC_RSHIFT);
    let rshift_twice = b.lit(KC_CAPSLOCK);
    let rshift = b.add(TapDance::new(rshift_once, rshift_twice));

    // Right alt: balanced tap-hold, menu on tap.
    let ralt = b.add(TapHold::new(KC_APPLICATION, KC_RALT, TapHoldFlavor::Balanced));

    // Fn: put caps lock within reach while its lamp is lit, menu otherwise.
    let fn_caps = b.lit(KC_CAPSLOCK);
    let fn_menu = b.lit(KC_MENU);
    let fn_key = b.add(Conditional::new(caps_lamp_lit, fn_caps, fn_menu));

    let mute = b.lit(KC_MUTE);
    let mute_pulse = b.add(NoRepeat::new(mute));

    let portsw = b.add(PortSwitch);
    let extra = b.add(ExtraHold);

    let mut k = |code: u8| -> NodeId {
        let id = b.nodes.len() as NodeId;
        let _ = b.nodes.push(Node::Literal(Literal::new(code)));
        id
    };

    #[rustfmt::skip]
    let slots: [NodeId; NUM_SLOTS] = [
        // Row 0
        esc, k(KC_1), k(KC_2), k(KC_3), k(KC_4), k(KC_5), k(KC_6), k(KC_7),
        k(KC_8), k(KC_9), k(KC_0), k(KC_MINUS), k(KC_EQUAL), k(KC_BSPACE), k(KC_DELETE),
        // Row 1
        k(KC_TAB), k(KC_Q), k(KC_W), k(KC_E), k(KC_R), k(KC_T), k(KC_Y), k(KC_U),
        k(KC_I), k(KC_O), k(KC_P), k(KC_LBRACKET), k(KC_RBRACKET), k(KC_BSLASH), k(KC_HOME),
        // Row 2
        caps, k(KC_A), k(KC_S), k(KC_D), k(KC_F), k(KC_G), k(KC_H), k(KC_J),
        k(KC_K), k(KC_L), k(KC_SCOLON), k(KC_QUOTE), k(KC_ENTER), no, k(KC_PGUP),
        // Row 3
        lshift, k(KC_Z), k(KC_X), k(KC_C), k(KC_V), k(KC_B), k(KC_N), k(KC_M),
        k(KC_COMMA), k(KC_DOT), k(KC_SLASH), rshift, k(KC_UP), k(KC_END), k(KC_PGDN),
        // Row 4
        k(KC_LCTRL), k(KC_LGUI), k(KC_LALT), mute_pulse, no, k(KC_SPACE), no, no,
        ralt, fn_key, portsw, k(KC_LEFT), k(KC_DOWN), k(KC_RIGHT), extra,
    ];

    Layout { nodes: b.nodes, slots }
}
