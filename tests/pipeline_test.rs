// Host-side tests for the low-latency submission rules and the event ring.

use hubkey::config::USB_EVENT_RING_SIZE;
use hubkey::hid::pipeline::{ReportPipeline, TryReport};
use hubkey::hid::ring::EventRing;
use hubkey::hid::HidEvent;
use hubkey::keycodes::*;

fn accepted(submit: bool) -> TryReport {
    TryReport::Accepted { submit }
}

#[test]
fn first_event_submits_immediately() {
    let mut p = ReportPipeline::new();
    assert_eq!(p.try_report_event(KC_A, true), accepted(true));
    assert!(p.in_flight());
}

#[test]
fn second_event_updates_in_place_without_submitting() {
    let mut p = ReportPipeline::new();
    assert_eq!(p.try_report_event(KC_A, true), accepted(true));
    assert_eq!(p.try_report_event(KC_B, true), accepted(false));
    // Third press in the same frame must wait.
    assert_eq!(p.try_report_event(KC_C, true), TryReport::Busy);
}

#[test]
fn release_of_unsubmitted_press_waits() {
    let mut p = ReportPipeline::new();
    assert_eq!(p.try_report_event(KC_A, true), accepted(true));
    assert_eq!(p.try_report_event(KC_B, true), accepted(false));
    // B's press has not been on the wire; collapsing it would hide the
    // transition from the host.
    assert_eq!(p.try_report_event(KC_B, false), TryReport::Busy);
    // A modifier release would jump past the held-back press.
    assert_eq!(p.try_report_event(KC_LSHIFT, false), TryReport::Busy);
    // A release of an already-reported key is fine.
    assert_eq!(p.try_report_event(KC_A, false), accepted(false));
}

#[test]
fn ack_resubmits_when_updated_further() {
    let mut p = ReportPipeline::new();
    assert_eq!(p.try_report_event(KC_A, true), accepted(true));
    assert_eq!(p.try_report_event(KC_B, true), accepted(false));

    // The resubmission counts as the first report of the next frame.
    assert!(p.on_transfer_complete(true));
    assert!(p.in_flight());
    // And the frame accepts a second update again.
    assert_eq!(p.try_report_event(KC_B, false), accepted(false));
}

#[test]
fn ack_without_updates_goes_idle() {
    let mut p = ReportPipeline::new();
    assert_eq!(p.try_report_event(KC_A, true), accepted(true));
    assert!(!p.on_transfer_complete(true));
    assert!(!p.in_flight());
    assert_eq!(p.try_report_event(KC_A, false), accepted(true));
}

#[test]
fn timeout_drops_the_frame_without_resend() {
    let mut p = ReportPipeline::new();
    assert_eq!(p.try_report_event(KC_A, true), accepted(true));
    assert_eq!(p.try_report_event(KC_B, true), accepted(false));

    // Lost transfer: nothing is resent on its own.
    assert!(!p.on_transfer_complete(false));
    assert!(!p.in_flight());

    // The next event resynchronises the host with the buffer content.
    assert_eq!(p.try_report_event(KC_C, true), accepted(true));
    assert!(p.report().is_pressed(KC_A));
    assert!(p.report().is_pressed(KC_B));
    assert!(p.report().is_pressed(KC_C));
}

#[test]
fn protocol_errors_consume_without_submitting() {
    let mut p = ReportPipeline::new();
    assert_eq!(p.try_report_event(KC_A, true), accepted(true));
    assert!(!p.on_transfer_complete(true));

    // Double press: consumed, dropped, no new transfer.
    assert_eq!(p.try_report_event(KC_A, true), accepted(false));
    assert!(!p.in_flight());
}

#[test]
fn ring_backpressure_and_eviction() {
    let ring = EventRing::new();
    for i in 0..USB_EVENT_RING_SIZE {
        ring.push_evict(HidEvent::press(i as u8));
    }
    assert_eq!(ring.len(), USB_EVENT_RING_SIZE);

    // One more evicts the oldest.
    ring.push_evict(HidEvent::press(0xAA));
    assert_eq!(ring.len(), USB_EVENT_RING_SIZE);
    assert_eq!(ring.peek(), Some(HidEvent::press(1)));

    ring.clear();
    assert!(ring.is_empty());
    assert_eq!(ring.peek(), None);
    assert!(!ring.pop());
}

#[test]
fn ring_drain_respects_frame_rules() {
    // The usb agent's drain loop: feed ring events into the pipeline until
    // one must wait for the next frame.
    let ring = EventRing::new();
    let mut p = ReportPipeline::new();
    ring.push_evict(HidEvent::press(KC_A));
    ring.push_evict(HidEvent::press(KC_B));
    ring.push_evict(HidEvent::press(KC_C));

    let mut submits = 0;
    while let Some(ev) = ring.peek() {
        match p.try_report_event(ev.keycode, ev.is_press) {
            TryReport::Busy => break,
            TryReport::Accepted { submit } => {
                ring.pop();
                if submit {
                    submits += 1;
                }
            }
        }
    }
    // A went on the wire, B rode along as the frame's second update, C waits.
    assert_eq!(submits, 1);
    assert_eq!(ring.len(), 1);
    assert_eq!(ring.peek(), Some(HidEvent::press(KC_C)));

    // Frame boundary: resubmit happens, then C drains.
    assert!(p.on_transfer_complete(true));
    assert!(!p.on_transfer_complete(true));
    assert_eq!(p.try_report_event(KC_C, true), accepted(true));
}
