//! Key matrix scanning.
//!
//! The scanner converts raw column sweeps into debounced logical levels and
//! tracks which slots still owe a report to the keymap agent. The matrix
//! agent in `tasks::matrix` owns the scan cadence: interrupt-based sleep
//! while idle, a burst of back-to-back scans right after wake-up to catch a
//! definite press through ringing, then periodic scans until every key has
//! settled released.

pub mod debounce;

use crate::config::NUM_SLOTS;
use crate::drivers::MatrixBus;
use debounce::KeyFilter;

pub struct Scanner {
    filters: [KeyFilter; NUM_SLOTS],
}

impl Scanner {
    pub const fn new() -> Self {
        Self { filters: [KeyFilter::new(); NUM_SLOTS] }
    }

    /// Sweep the matrix once, feeding every slot's instantaneous level into
    /// its filter.
    pub fn scan(&mut self, bus: &mut impl MatrixBus) {
        let filters = &mut self.filters;
        bus.scan(&mut |slot, level| {
            if slot < NUM_SLOTS {
                filters[slot].sample(level);
            }
        });
    }

    /// Slots whose debounced level differs from what was last reported.
    pub fn pending(&self) -> impl Iterator<Item = (usize, bool)> + '_ {
        self.filters
            .iter()
            .enumerate()
            .filter(|(_, f)| f.needs_commit())
            .map(|(slot, f)| (slot, f.pressing()))
    }

    /// Mark a slot's change as delivered.
    pub fn commit(&mut self, slot: usize) {
        self.filters[slot].commit();
    }

    /// Any slot debounced down, or still owing a report?
    pub fn any_active(&self) -> bool {
        self.filters.iter().any(|f| f.pressing() || f.needs_commit())
    }

    /// Any slot reported pressed upstream?
    pub fn any_pressed(&self) -> bool {
        self.filters.iter().any(|f| f.pressed())
    }

    pub fn is_pressed(&self, slot: usize) -> bool {
        self.filters[slot].pressed()
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}
