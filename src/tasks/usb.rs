//! The USB agent.
//!
//! Owns the report pipeline and the endpoint. Everything reaching it comes
//! through two funnels: bus events from the device-stack glue and key
//! events from the keymap agent's ring. The pipeline's frame rules decide
//! when the report buffer goes on the wire; an unacknowledged transfer is
//! written off after one polling interval plus margin.

use embassy_futures::select::{select4, Either4};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::{with_timeout, Duration, Instant, Timer};
use portable_atomic::{AtomicBool, AtomicU8, Ordering};

use super::keymap::{KeymapEvent, GENERIC_EVENTS};
use super::{at_or_never, hub::HUB_EVENTS, rgb};
use crate::config::{
    DELAY_USB_ACCESSIBLE_AFTER_RESUMED, DFU_RESET_DELAY, KEYBOARD_REPORT_INTERVAL_MS,
    SUSPENDED_KEY_EVENT_LIFETIME, TRANSFER_TIMEOUT_MARGIN,
};
use crate::dfu::{DfuOutcome, DfuRequest, DfuRuntime};
use crate::drivers::{BusEvent, HidConn, SystemControl};
use crate::hid::pipeline::{ReportPipeline, TryReport};
use crate::hid::report::{Protocol, NKRO_REPORT_SIZE};
use crate::hid::ring::EventRing;
use crate::hid::HidEvent;
use crate::hub::HubEvent;
use crate::rgb::FxEvent;

/// Events from the device-stack glue (reset/suspend/resume, SET_PROTOCOL,
/// lamp OUT reports, DFU detach).
pub static BUS_EVENTS: Channel<CriticalSectionRawMutex, BusEvent, 8> = Channel::new();

/// Keymap -> USB key event ring.
pub static REPORT_RING: EventRing = EventRing::new();

/// Last lamp bitset written by the host; single writer (this agent).
pub static LAMP_STATE: AtomicU8 = AtomicU8::new(0);

static ACCESSIBLE: AtomicBool = AtomicBool::new(false);
static REMOTE_WAKE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Hand one key transition to the USB agent. While the bus is accessible
/// the ring exerts backpressure; while it is not, events are buffered with
/// evict-oldest semantics and a press asks for remote wakeup.
pub async fn report_event(ev: HidEvent) {
    if ACCESSIBLE.load(Ordering::Relaxed) {
        REPORT_RING.push(ev).await;
    } else {
        log::debug!("USB_HID: key event while inaccessible");
        if ev.is_press {
            REMOTE_WAKE.signal(());
        }
        REPORT_RING.push_evict(ev);
    }
}

/// Is the bus up and past the post-resume settling delay?
pub fn is_accessible() -> bool {
    ACCESSIBLE.load(Ordering::Relaxed)
}

pub async fn usb_agent(mut conn: impl HidConn, system: &impl SystemControl) -> ! {
    let mut pipe = ReportPipeline::new();
    let mut dfu = DfuRuntime::new();
    let mut frame = [0u8; NKRO_REPORT_SIZE];
    let mut suspended = false;
    // Deadline for flipping ACCESSIBLE after resume (or first host data).
    let mut access_at: Option<Instant> = None;
    // Deadline for dropping stale suspend-buffered events.
    let mut purge_at: Option<Instant> = None;

    let transfer_timeout =
        Duration::from_millis(KEYBOARD_REPORT_INTERVAL_MS as u64) + TRANSFER_TIMEOUT_MARGIN;

    log::info!("USB_HID: agent started");

    loop {
        // Bound into a local so the select's borrows end before the arms run.
        let wakeup = select4(
            BUS_EVENTS.receive(),
            async {
                if pipe.in_flight() {
                    with_timeout(transfer_timeout, conn.transfer_complete()).await
                } else {
                    core::future::pending().await
                }
            },
            REPORT_RING.ready(),
            async {
                // Rare housekeeping wake-ups share one select slot.
                embassy_futures::select::select3(
                    at_or_never(access_at),
                    at_or_never(purge_at),
                    REMOTE_WAKE.wait(),
                )
                .await
            },
        )
        .await;
        match wakeup {
            Either4::First(ev) => match ev {
                BusEvent::Reset => {
                    log::info!("USB_HID: bus reset");
                    pipe.on_reset();
                    REPORT_RING.clear();
                    ACCESSIBLE.store(false, Ordering::Relaxed);
                    suspended = false;
                    access_at = None;
                    purge_at = None;
                }
                BusEvent::Suspend => {
                    log::info!("USB_HID: bus suspend");
                    ACCESSIBLE.store(false, Ordering::Relaxed);
                    suspended = true;
                    access_at = None;
                    pipe.reset_frame();
                    HUB_EVENTS.send(HubEvent::UsbSuspend).await;
                    rgb::send_fx(FxEvent::Suspend);
                }
                BusEvent::Resume => {
                    log::info!("USB_HID: bus resume");
                    suspended = false;
                    access_at = Some(Instant::now() + DELAY_USB_ACCESSIBLE_AFTER_RESUMED);
                    HUB_EVENTS.send(HubEvent::UsbResume).await;
                    rgb::send_fx(FxEvent::Resume);
                }
                BusEvent::SetProtocol(p) => {
                    let protocol = if p == 0 { Protocol::Boot } else { Protocol::Report };
                    log::info!("USB_HID: set protocol {protocol:?}");
                    pipe.set_protocol(protocol);
                }
                BusEvent::LampState(state) => {
                    log::debug!("USB_HID: set lamp state 0x{state:02x}");
                    LAMP_STATE.store(state, Ordering::Relaxed);
                    GENERIC_EVENTS.send(KeymapEvent::LampState(state)).await;
                    // First host data after attach or resume starts the
                    // accessibility countdown.
                    if !ACCESSIBLE.load(Ordering::Relaxed) && !suspended {
                        access_at =
                            Some(Instant::now() + DELAY_USB_ACCESSIBLE_AFTER_RESUMED);
                    }
                }
                BusEvent::DfuDetach => {
                    if let DfuOutcome::Detach = dfu.handle(DfuRequest::Detach) {
                        // Let the status stage finish on the wire first.
                        Timer::after(DFU_RESET_DELAY).await;
                        system.reset_to_bootloader();
                    }
                }
            },
            Either4::Second(result) => {
                let ok = result.is_ok();
                if !ok {
                    log::warn!("USB_HID: transfer timeout, dropping frame");
                }
                if pipe.on_transfer_complete(ok) {
                    let len = pipe.serialize(&mut frame);
                    conn.submit(&frame[..len]);
                }
                drain_ring(&mut pipe, &mut conn, &mut frame);
            }
            Either4::Third(()) => {
                if ACCESSIBLE.load(Ordering::Relaxed) {
                    drain_ring(&mut pipe, &mut conn, &mut frame);
                } else if suspended {
                    // Buffered events only survive a bounded suspend.
                    purge_at = Some(Instant::now() + SUSPENDED_KEY_EVENT_LIFETIME);
                }
            }
            Either4::Fourth(housekeeping) => match housekeeping {
                embassy_futures::select::Either3::First(()) => {
                    log::debug!("USB_HID: USB accessible");
                    ACCESSIBLE.store(true, Ordering::Relaxed);
                    access_at = None;
                    purge_at = None;
                    pipe.reset_frame();
                    drain_ring(&mut pipe, &mut conn, &mut frame);
                }
                embassy_futures::select::Either3::Second(()) => {
                    purge_at = None;
                    REPORT_RING.clear();
                }
                embassy_futures::select::Either3::Third(()) => {
                    if suspended {
                        log::info!("USB_HID: requesting remote wakeup");
                        conn.request_remote_wakeup();
                    }
                }
            },
        }
    }
}

/// Feed ring events into the current frame as far as the pipeline rules
/// allow; stop at the first event that must wait for the next frame.
fn drain_ring(pipe: &mut ReportPipeline, conn: &mut impl HidConn, frame: &mut [u8; NKRO_REPORT_SIZE]) {
    while let Some(ev) = REPORT_RING.peek() {
        match pipe.try_report_event(ev.keycode, ev.is_press) {
            TryReport::Busy => break,
            TryReport::Accepted { submit } => {
                REPORT_RING.pop();
                if submit {
                    let len = pipe.serialize(frame);
                    conn.submit(&frame[..len]);
                }
            }
        }
    }
}
