//! Per-key asymmetric integrator debouncing.
//!
//! The counter runs in [0, DEBOUNCE_RELEASE_MS]. A sustained high level
//! commits a press after DEBOUNCE_PRESS_MS ticks and locks the counter at
//! the top; a sustained low level must walk the counter all the way back to
//! zero before the release commits. Press detection is therefore fast while
//! release confirmation tolerates bounce.

use crate::config::{DEBOUNCE_PRESS_MS, DEBOUNCE_RELEASE_MS};

#[derive(Debug, Copy, Clone, Default)]
pub struct KeyFilter {
    counter: u8,
    /// The filter's current belief.
    pressing: bool,
    /// The last value committed upstream.
    pressed: bool,
}

impl KeyFilter {
    pub const fn new() -> Self {
        Self { counter: 0, pressing: false, pressed: false }
    }

    /// Feed one instantaneous sample from a scan.
    pub fn sample(&mut self, level: bool) {
        if level {
            if self.counter < DEBOUNCE_RELEASE_MS {
                self.counter += 1;
                if !self.pressing && self.counter >= DEBOUNCE_PRESS_MS {
                    self.pressing = true;
                    self.counter = DEBOUNCE_RELEASE_MS;
                }
            }
        } else if self.counter > 0 {
            self.counter -= 1;
            if self.pressing && self.counter == 0 {
                self.pressing = false;
            }
        }
    }

    /// The debounced level the filter currently believes in.
    pub fn pressing(&self) -> bool {
        self.pressing
    }

    /// The level last committed to the key-event queue.
    pub fn pressed(&self) -> bool {
        self.pressed
    }

    /// Does the believed level differ from what was committed upstream?
    pub fn needs_commit(&self) -> bool {
        self.pressing != self.pressed
    }

    /// Record that `pressing` was reported upstream successfully. Only the
    /// matrix agent calls this, and only right after a successful enqueue.
    pub fn commit(&mut self) {
        self.pressed = self.pressing;
    }
}
