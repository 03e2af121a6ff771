//! The keymap agent.
//!
//! Services, in priority order: due node timers, generic events (host lamp
//! changes), then one key event per iteration so timers are never starved by
//! a burst of typing. When everything is drained and nothing is pressed, a
//! parked switchover request is finally handed to the hub agent.

use embassy_futures::select::{select3, Either3};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::Instant;
use portable_atomic::Ordering;

use super::{at_or_never, hub::HUB_EVENTS, matrix::ANY_PRESSED, rgb, usb};
use crate::hub::HubEvent;
use crate::keymap::queue::KeyEventQueue;
use crate::keymap::Engine;

/// Matrix -> keymap queue; also the defer window for tap-hold decisions.
pub static KEY_EVENTS: KeyEventQueue = KeyEventQueue::new();

/// Generic (non-key) events toward the keymap agent.
pub static GENERIC_EVENTS: Channel<CriticalSectionRawMutex, KeymapEvent, 8> = Channel::new();

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeymapEvent {
    /// Host rewrote the lamp bitset.
    LampState(u8),
}

pub async fn keymap_agent(mut engine: Engine<'static>) -> ! {
    log::info!("Keymap: agent started");

    loop {
        engine.poll_timers(Instant::now());

        while let Ok(ev) = GENERIC_EVENTS.try_receive() {
            handle_generic(&mut engine, ev);
        }

        // Key events are lower priority and processed one per iteration.
        let had_key = match KEY_EVENTS.next_event() {
            Some(ev) => {
                engine.on_key_event(ev);
                true
            }
            None => false,
        };
        flush_outputs(&mut engine).await;
        if had_key {
            continue;
        }

        // Queue drained, no deferrer: a pending switchover may go out once
        // the matrix is quiet too.
        if engine.take_switchover_if_idle(!ANY_PRESSED.load(Ordering::Relaxed)) {
            HUB_EVENTS.send(HubEvent::Switchover).await;
        }

        match select3(
            GENERIC_EVENTS.receive(),
            KEY_EVENTS.ready(),
            at_or_never(engine.next_deadline()),
        )
        .await
        {
            Either3::First(ev) => {
                handle_generic(&mut engine, ev);
                flush_outputs(&mut engine).await;
            }
            Either3::Second(()) | Either3::Third(()) => {}
        }
    }
}

fn handle_generic(engine: &mut Engine<'_>, ev: KeymapEvent) {
    match ev {
        KeymapEvent::LampState(state) => engine.on_lamp_state(state),
    }
}

/// Push everything the nodes produced toward the other agents. The HID path
/// awaits ring space, which is the backpressure that paces this agent
/// against the endpoint.
async fn flush_outputs(engine: &mut Engine<'_>) {
    while let Some(ev) = engine.pop_hid() {
        usb::report_event(ev).await;
    }
    while let Some(ev) = engine.pop_fx() {
        rgb::send_fx(ev);
    }
    while let Some(req) = engine.pop_hub() {
        HUB_EVENTS.send(req.into()).await;
    }
}
