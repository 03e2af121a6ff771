//! Effect rendering.
//!
//! Three field effects plus the indicator overlay. Frame pacing comes from
//! the RGB agent; everything here is a pure function of frame count and the
//! key events fed in, so the renderer tests run on the host.

use heapless::Vec;

use super::{Hsv, Rgb, EFFECT_BASE_COLOR, INDICATOR_COLOR};
use crate::config::NUM_SLOTS;

/// Active tracers for the finger-trace effect.
pub const EFFECT_FINGER_TRACE_MAX_TRACERS: usize = 16;

/// Frames a tracer takes to fade out completely.
const TRACE_LIFETIME_FRAMES: u16 = 48;

/// Full breathing cycle length in frames (~4 s at 60 fps).
const BREATHE_PERIOD_FRAMES: u16 = 240;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EffectKind {
    Off,
    /// The base colour on every key.
    Solid,
    /// The base colour swelling and fading over the whole field.
    Breathing,
    /// Dim field; each keypress leaves a bright trace that cools off.
    FingerTrace,
}

#[derive(Clone, Copy, Debug)]
struct Tracer {
    slot: u8,
    age: u16,
}

pub struct Effects {
    kind: EffectKind,
    frame: u16,
    tracers: Vec<Tracer, EFFECT_FINGER_TRACE_MAX_TRACERS>,
    indicator_on: [bool; NUM_SLOTS],
}

impl Effects {
    pub const fn new() -> Self {
        Self {
            kind: EffectKind::FingerTrace,
            frame: 0,
            tracers: Vec::new(),
            indicator_on: [false; NUM_SLOTS],
        }
    }

    pub fn set_effect(&mut self, kind: EffectKind) {
        self.kind = kind;
        self.tracers.clear();
    }

    pub fn effect(&self) -> EffectKind {
        self.kind
    }

    /// A key executed in the keymap layer; presses seed a tracer.
    pub fn key_event(&mut self, slot: u8, pressed: bool) {
        if !pressed || self.kind != EffectKind::FingerTrace {
            return;
        }
        if let Some(t) = self.tracers.iter_mut().find(|t| t.slot == slot) {
            t.age = 0;
        } else if self.tracers.is_full() {
            // Recycle the coldest tracer.
            if let Some(oldest) = self
                .tracers
                .iter_mut()
                .max_by_key(|t| t.age)
            {
                *oldest = Tracer { slot, age: 0 };
            }
        } else {
            let _ = self.tracers.push(Tracer { slot, age: 0 });
        }
    }

    pub fn set_indicator(&mut self, slot: u8, on: bool) {
        if let Some(i) = self.indicator_on.get_mut(slot as usize) {
            *i = on;
        }
    }

    /// Advance one frame and produce each slot's colour.
    pub fn render(&mut self, mut out: impl FnMut(usize, Rgb)) {
        self.frame = self.frame.wrapping_add(1);
        for t in self.tracers.iter_mut() {
            t.age = t.age.saturating_add(1);
        }
        let mut i = 0;
        while i < self.tracers.len() {
            if self.tracers[i].age >= TRACE_LIFETIME_FRAMES {
                self.tracers.swap_remove(i);
            } else {
                i += 1;
            }
        }

        let indicator = INDICATOR_COLOR.to_rgb();
        for slot in 0..NUM_SLOTS {
            let color = if self.indicator_on[slot] {
                indicator
            } else {
                self.field_color(slot)
            };
            out(slot, color);
        }
    }

    fn field_color(&self, slot: usize) -> Rgb {
        let base = EFFECT_BASE_COLOR;
        match self.kind {
            EffectKind::Off => Rgb::OFF,
            EffectKind::Solid => base.to_rgb(),
            EffectKind::Breathing => {
                // Triangle wave over the value channel.
                let phase = self.frame % BREATHE_PERIOD_FRAMES;
                let half = BREATHE_PERIOD_FRAMES / 2;
                let ramp = if phase < half { phase } else { BREATHE_PERIOD_FRAMES - phase };
                let v = (base.v as u32 * ramp as u32 / half as u32) as u8;
                Hsv::new(base.h, base.s, v).to_rgb()
            }
            EffectKind::FingerTrace => {
                match self.tracers.iter().find(|t| t.slot as usize == slot) {
                    Some(t) => {
                        // Hot at first, cooling toward the dim field.
                        let heat =
                            255 - (t.age as u32 * 255 / TRACE_LIFETIME_FRAMES as u32) as u8;
                        Hsv::new(base.h, 255 - heat / 2, base.v.max(heat)).to_rgb()
                    }
                    None => Hsv::new(base.h, base.s, base.v / 3).to_rgb(),
                }
            }
        }
    }
}

impl Default for Effects {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_of(fx: &mut Effects) -> [Rgb; NUM_SLOTS] {
        let mut out = [Rgb::OFF; NUM_SLOTS];
        fx.render(|slot, c| out[slot] = c);
        out
    }

    #[test]
    fn off_is_dark_except_indicators() {
        let mut fx = Effects::new();
        fx.set_effect(EffectKind::Off);
        fx.set_indicator(3, true);
        let frame = frame_of(&mut fx);
        assert_eq!(frame[0], Rgb::OFF);
        assert_ne!(frame[3], Rgb::OFF);
    }

    #[test]
    fn finger_trace_cools_off() {
        let mut fx = Effects::new();
        fx.key_event(10, true);
        let hot = frame_of(&mut fx)[10];
        for _ in 0..TRACE_LIFETIME_FRAMES / 2 {
            frame_of(&mut fx);
        }
        let warm = frame_of(&mut fx)[10];
        assert!(warm.r <= hot.r && warm.g <= hot.g && warm.b <= hot.b);
        assert_ne!(hot, warm);

        // Fully cooled: back to the dim field colour.
        for _ in 0..TRACE_LIFETIME_FRAMES {
            frame_of(&mut fx);
        }
        let field = frame_of(&mut fx);
        assert_eq!(field[10], field[11]);
    }

    #[test]
    fn tracer_pool_recycles_the_coldest() {
        let mut fx = Effects::new();
        for slot in 0..EFFECT_FINGER_TRACE_MAX_TRACERS as u8 {
            fx.key_event(slot, true);
            frame_of(&mut fx);
        }
        // Slot 0 holds the coldest tracer; a fresh press takes its place.
        fx.key_event(70, true);
        let frame = frame_of(&mut fx);
        let field = frame[20];
        assert_eq!(frame[0], field);
        assert_ne!(frame[70], field);
    }

    #[test]
    fn releases_do_not_seed_tracers() {
        let mut fx = Effects::new();
        fx.key_event(10, false);
        let frame = frame_of(&mut fx);
        assert_eq!(frame[10], frame[11]);
    }
}
