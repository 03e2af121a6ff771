//! The RGB agent.
//!
//! Renders the effect frame at ~60 fps and owns the brightness controller.
//! Each 5 V level report from the hub agent advances the GCR ramp by one
//! step; suspend drives the target to zero so the drivers go dark through
//! the same ramp. Driver errors are logged and retried at the next cadence.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Instant, Timer};

use crate::config::{RGB_DISABLE_WHEN_USB_SUSPENDS, RGB_LED_GCR_MAX, RGB_UPDATE_PERIOD};
use crate::drivers::Is31Bus;
use crate::rgb::gcr::{GcrControl, GcrStep};
use crate::rgb::{Effects, FxEvent};

/// Events toward the RGB agent. Senders use [`send_fx`]; dropping an event
/// under pressure costs one frame of eye candy at worst.
pub static RGB_EVENTS: Channel<CriticalSectionRawMutex, FxEvent, 16> = Channel::new();

pub fn send_fx(ev: FxEvent) {
    let _ = RGB_EVENTS.try_send(ev);
}

pub async fn rgb_agent(mut is31: impl Is31Bus) -> ! {
    let mut gcr = GcrControl::new();
    let mut fx = Effects::new();
    gcr.enable();

    log::info!("Rgb: agent started");

    let mut frame_at = Instant::now() + RGB_UPDATE_PERIOD;
    loop {
        match select(RGB_EVENTS.receive(), Timer::at(frame_at)).await {
            Either::First(ev) => match ev {
                FxEvent::Key { slot, pressed } => fx.key_event(slot, pressed),
                FxEvent::Lamp { slot, on } => fx.set_indicator(slot, on),
                FxEvent::V5v(level) => {
                    if let Some(step) = gcr.on_v5v_report(level) {
                        apply_step(&mut is31, step);
                    }
                }
                FxEvent::Suspend => {
                    if RGB_DISABLE_WHEN_USB_SUSPENDS {
                        gcr.set_desired(0);
                    }
                }
                FxEvent::Resume => gcr.set_desired(RGB_LED_GCR_MAX),
            },
            Either::Second(()) => {
                frame_at += RGB_UPDATE_PERIOD;
                if gcr.current() == 0 {
                    // Shut down; no point staging PWM data.
                    continue;
                }
                let mut failure = false;
                fx.render(|slot, color| {
                    if is31.set_color(slot as u8, color.r, color.g, color.b).is_err() {
                        failure = true;
                    }
                });
                if !failure {
                    failure = is31.flush().is_err();
                }
                if failure {
                    log::warn!("Rgb: frame update failed, retrying next frame");
                }
            }
        }
    }
}

/// Apply one GCR ramp step in register order: shutdown release first, the
/// current value, then shutdown assert once the ramp bottomed out.
fn apply_step(is31: &mut impl Is31Bus, step: GcrStep) {
    if step.release_ssd {
        if let Err(e) = is31.set_software_shutdown(false) {
            log::warn!("Rgb: failed to release software shutdown: {e:?}");
            return;
        }
    }
    if let Err(e) = is31.set_gcr(step.gcr) {
        log::warn!("Rgb: failed to write GCR: {e:?}");
        return;
    }
    if step.assert_ssd {
        if let Err(e) = is31.set_software_shutdown(true) {
            log::warn!("Rgb: failed to assert software shutdown: {e:?}");
        }
    }
}
