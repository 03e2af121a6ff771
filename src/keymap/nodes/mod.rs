//! Keymap node variants.
//!
//! A node reacts to press/release of the slot it is assigned to, may preview
//! other keys' events while it defers (tap-hold and friends), and may own a
//! one-shot timer. Composite nodes reference their children by id; the slot
//! table holds ids as well, so nodes never own each other.

mod conditional;
mod lamp;
mod literal;
mod modified;
mod norepeat;
mod port;
mod tap_dance;
mod tap_hold;

pub use conditional::{Conditional, Predicate};
pub use lamp::LampIndicator;
pub use literal::Literal;
pub use modified::Modified;
pub use norepeat::NoRepeat;
pub use port::{ExtraHold, PortSwitch};
pub use tap_dance::TapDance;
pub use tap_hold::{TapHold, TapHoldFlavor};

use enum_dispatch::enum_dispatch;

use super::Engine;

/// Hooks every node kind implements. `on_press`/`on_release` run when the
/// node's own slot changes (guarded by the engine's press counting);
/// `on_other_*` run while the node is the active deferrer and decide whether
/// the previewed event executes immediately (`true`) or stays deferred;
/// `on_timeout` runs when the node's one-shot timer fires expectedly.
#[enum_dispatch]
pub trait Behavior {
    fn on_press(&mut self, cx: &mut Engine, slot: u8);

    fn on_release(&mut self, cx: &mut Engine, slot: u8);

    fn on_other_press(&mut self, cx: &mut Engine, other: u8) -> bool {
        let _ = (cx, other);
        false
    }

    fn on_other_release(&mut self, cx: &mut Engine, other: u8) -> bool {
        let _ = (cx, other);
        false
    }

    fn on_timeout(&mut self, cx: &mut Engine, slot: u8) {
        let _ = (cx, slot);
    }
}

/// A key that does nothing. Also stands in for a node while its real value
/// is checked out for dispatch.
#[derive(Clone, Copy, Default, Debug)]
pub struct NoOp;

impl Behavior for NoOp {
    fn on_press(&mut self, _cx: &mut Engine, _slot: u8) {}

    fn on_release(&mut self, _cx: &mut Engine, _slot: u8) {}
}

#[enum_dispatch(Behavior)]
pub enum Node {
    Literal,
    TapHold,
    Modified,
    Conditional,
    TapDance,
    NoRepeat,
    LampIndicator,
    PortSwitch,
    ExtraHold,
    NoOp,
}
