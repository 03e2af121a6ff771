//! The matrix agent.
//!
//! Sleeps on the row interrupts while the board is quiet, bursts a handful
//! of back-to-back scans on wake-up to catch a definite press through the
//! ringing, then scans on the fixed period until every key has debounced
//! released and been reported. Scan deadlines are absolute so one late wake
//! never stretches the following periods.

use embassy_time::{Instant, Timer};
use portable_atomic::{AtomicBool, Ordering};

use super::keymap::KEY_EVENTS;
use crate::config::{MATRIX_FIRST_SCAN_MAX_COUNT, MATRIX_SCAN_PERIOD};
use crate::drivers::{MatrixBus, SystemControl};
use crate::matrix::Scanner;
use crate::press_or_release;
use crate::KeyEvent;

/// Published after every commit pass; the keymap agent gates switchover
/// delivery on it.
pub static ANY_PRESSED: AtomicBool = AtomicBool::new(false);

pub async fn matrix_agent(mut bus: impl MatrixBus, system: &impl SystemControl) -> ! {
    let mut scanner = Scanner::new();
    log::info!("Matrix: scanner started");

    loop {
        // Zzz. All columns asserted, rows armed as interrupts.
        bus.wait_for_key().await;

        // The first scans after the interrupt are unreliable while the
        // contacts ring; scan flat out until a press commits or the burst
        // count runs out on a spike.
        let mut burst = 0;
        while burst < MATRIX_FIRST_SCAN_MAX_COUNT {
            scanner.scan(&mut bus);
            commit_changes(&mut scanner, system).await;
            if scanner.any_active() {
                break;
            }
            burst += 1;
        }

        // Periodic scan until all keys are back up and reported.
        let mut next = Instant::now() + MATRIX_SCAN_PERIOD;
        while scanner.any_active() {
            Timer::at(next).await;
            next += MATRIX_SCAN_PERIOD;
            scanner.scan(&mut bus);
            commit_changes(&mut scanner, system).await;
        }
        log::debug!("Matrix: all released, back to sleep");
    }
}

/// Report every slot whose debounced level changed. A slot's `pressed` view
/// commits only on successful enqueue; on timeout the slot stays pending and
/// retries next tick, unless the queue is wedged full of deferred events,
/// which no amount of waiting can fix.
async fn commit_changes(scanner: &mut Scanner, system: &impl SystemControl) {
    loop {
        let Some((slot, pressing)) = scanner.pending().next() else {
            break;
        };
        let event = KeyEvent { slot: slot as u8, is_press: pressing };
        log::debug!("Matrix: {} [{slot}]", press_or_release(pressing));

        match KEY_EVENTS.push(event, MATRIX_SCAN_PERIOD).await {
            Ok(()) => scanner.commit(slot),
            Err(_) => {
                if KEY_EVENTS.full_of_deferred() {
                    log::error!("Matrix: key event queue full of deferred events");
                    system.reset();
                }
                break;
            }
        }
    }
    ANY_PRESSED.store(scanner.any_pressed(), Ordering::Relaxed);
}
