//! Adaptive brightness: the global current control register.
//!
//! One 8-bit current value tracks toward a desired value, one step per 5 V
//! measurement report, so the ramp is paced by the measurement cadence and
//! needs no timer of its own. The rail gates upward movement: below MID the
//! current only falls. Software shutdown is slaved to the value, asserted
//! exactly while it is zero.

use crate::adc::V5vLevel;
use crate::config::RGB_LED_GCR_MAX;

/// One step's worth of register work, applied in field order.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct GcrStep {
    /// Release software shutdown before raising the current from zero.
    pub release_ssd: bool,
    /// New value for the global current register.
    pub gcr: u8,
    /// Assert software shutdown after the current reached zero.
    pub assert_ssd: bool,
}

pub struct GcrControl {
    enabled: bool,
    current: u8,
    desired: u8,
}

impl GcrControl {
    pub const fn new() -> Self {
        Self { enabled: false, current: 0, desired: RGB_LED_GCR_MAX }
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Turn the controller off and return the step that forces the drivers
    /// dark, if it was running.
    pub fn disable(&mut self) -> Option<GcrStep> {
        if !self.enabled {
            return None;
        }
        self.enabled = false;
        self.current = 0;
        Some(GcrStep { release_ssd: false, gcr: 0, assert_ssd: true })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Target value; the ramp approaches it one step per report.
    pub fn set_desired(&mut self, desired: u8) {
        self.desired = desired.min(RGB_LED_GCR_MAX);
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    pub fn desired(&self) -> u8 {
        self.desired
    }

    /// One 5 V report arrived; emit at most one register step.
    pub fn on_v5v_report(&mut self, level: V5vLevel) -> Option<GcrStep> {
        if !self.enabled {
            return None;
        }

        if self.current > self.desired || level < V5vLevel::Mid {
            if self.current == 0 {
                return None;
            }
            self.current -= 1;
            Some(GcrStep {
                release_ssd: false,
                gcr: self.current,
                assert_ssd: self.current == 0,
            })
        } else if self.current < self.desired {
            let release_ssd = self.current == 0;
            self.current += 1;
            Some(GcrStep { release_ssd, gcr: self.current, assert_ssd: false })
        } else {
            None
        }
    }
}

impl Default for GcrControl {
    fn default() -> Self {
        Self::new()
    }
}
