//! Low-latency report submission.
//!
//! The ground rules, enforced per packet frame:
//!  - no two presses are reported in the same frame, and
//!  - a press and its own release are never collapsed into one frame.
//!
//! 1. The first key event in a frame updates the report and submits it
//!    immediately.
//! 2. A second event may still update the submitted-but-unacknowledged
//!    buffer in place; it will go out at the start of the next frame.
//! 3. Any further press is held back, as is the release of a press that has
//!    not been on the wire yet, and any modifier release while such a press
//!    is pending. Held-back events stay in the event ring.
//! 4. On transfer acknowledge: if the buffer gained updates after
//!    submission, resubmit it (that is the first report of the new frame),
//!    then drain the ring as far as rule 3 allows.
//! 5. On transfer timeout the frame is treated as complete but
//!    unsuccessful; nothing is resent, the next event resynchronises.

use super::report::{KeyboardReport, Protocol, ReportError, NKRO_REPORT_SIZE};
use crate::keycodes::{self, is_modifier};
use crate::press_or_release;

/// What became of an offered key event.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TryReport {
    /// Consumed. `submit` asks the caller to put the serialised report on
    /// the wire now.
    Accepted { submit: bool },
    /// The frame cannot take this event; keep it queued and stop draining.
    Busy,
}

pub struct ReportPipeline {
    report: KeyboardReport,
    /// 0 = idle, 1 = submitted, 2+ = submitted and updated further.
    updated: u8,
    /// A press updated into the buffer but not yet on the wire.
    press_yet_to_submit: Option<u8>,
}

impl ReportPipeline {
    pub const fn new() -> Self {
        Self { report: KeyboardReport::new(), updated: 0, press_yet_to_submit: None }
    }

    pub fn report(&self) -> &KeyboardReport {
        &self.report
    }

    pub fn protocol(&self) -> Protocol {
        self.report.protocol()
    }

    /// Host-driven protocol select.
    pub fn set_protocol(&mut self, protocol: Protocol) {
        self.report.set_protocol(protocol);
    }

    /// A transfer is on the wire and unacknowledged.
    pub fn in_flight(&self) -> bool {
        self.updated > 0
    }

    /// Offer one key event to the current frame.
    ///
    /// Must not be called again for the same frame once it returned `Busy`;
    /// the ring drain order guarantees that.
    pub fn try_report_event(&mut self, keycode: u8, is_press: bool) -> TryReport {
        if self.updated > 1 {
            let held_press = self.press_yet_to_submit;
            if is_press
                || held_press == Some(keycode)
                || (held_press.is_some() && is_modifier(keycode))
            {
                return TryReport::Busy;
            }
        }

        match self.report.update(keycode, is_press) {
            Ok(()) => {
                self.updated += 1;
                if self.updated == 1 {
                    log::debug!(
                        "USB_HID: register {} (0x{keycode:02x} {})",
                        press_or_release(is_press),
                        keycodes::name(keycode)
                    );
                    TryReport::Accepted { submit: true }
                } else {
                    log::debug!(
                        "USB_HID: defer {} (0x{keycode:02x} {})",
                        press_or_release(is_press),
                        keycodes::name(keycode)
                    );
                    if is_press {
                        self.press_yet_to_submit = Some(keycode);
                    }
                    TryReport::Accepted { submit: false }
                }
            }
            Err(e) => {
                // Protocol error: drop the event, leave the report intact.
                match e {
                    ReportError::Overflow => {
                        log::warn!("USB_HID: no room to report key press (0x{keycode:02x})")
                    }
                    ReportError::OutOfRange => {
                        log::warn!("USB_HID: key (0x{keycode:02x}) out of report range")
                    }
                    ReportError::AlreadyPressed => {
                        log::error!("USB_HID: key (0x{keycode:02x}) is already pressed")
                    }
                    ReportError::AlreadyReleased => {
                        log::error!("USB_HID: key (0x{keycode:02x}) is already released")
                    }
                }
                TryReport::Accepted { submit: false }
            }
        }
    }

    /// The frame ended: the host acknowledged the transfer, or the wait for
    /// the acknowledge timed out. Returns true when the caller must submit
    /// the buffer again right away (rule 4).
    pub fn on_transfer_complete(&mut self, was_successful: bool) -> bool {
        let resubmit = was_successful && self.updated > 1;
        self.updated = if resubmit { 1 } else { 0 };
        self.press_yet_to_submit = None;
        resubmit
    }

    /// Forget the in-flight bookkeeping, e.g. when the bus reset or just
    /// became accessible again.
    pub fn reset_frame(&mut self) {
        self.updated = 0;
        self.press_yet_to_submit = None;
    }

    /// Bus reset: boot semantics revert to the report protocol.
    pub fn on_reset(&mut self) {
        self.report.set_protocol(Protocol::Report);
        self.reset_frame();
    }

    pub fn serialize(&self, frame: &mut [u8; NKRO_REPORT_SIZE]) -> usize {
        self.report.serialize(frame)
    }
}

impl Default for ReportPipeline {
    fn default() -> Self {
        Self::new()
    }
}
