// Host-side tests for the keymap engine: dispatch, press counting, defer
// windows, tap-hold in both flavours, tap dance, and the composite nodes.

use embassy_time::{Duration, Instant};
use hubkey::config::{NUM_SLOTS, TAPPING_TERM};
use hubkey::hid::{lamp, HidEvent};
use hubkey::hub::HubRequest;
use hubkey::keycodes::*;
use hubkey::keymap::nodes::{
    Conditional, ExtraHold, LampIndicator, Literal, Modified, NoOp, NoRepeat, Node, PortSwitch,
    TapDance, TapHold, TapHoldFlavor,
};
use hubkey::keymap::queue::KeyEventQueue;
use hubkey::keymap::{Engine, NodeId};
use hubkey::rgb::FxEvent;
use hubkey::KeyEvent;

fn slots_with(assign: &[(usize, NodeId)], default: NodeId) -> [NodeId; NUM_SLOTS] {
    let mut slots = [default; NUM_SLOTS];
    for &(slot, id) in assign {
        slots[slot] = id;
    }
    slots
}

/// Feed queued events through the engine the way the agent does.
fn pump(engine: &mut Engine<'_>, q: &KeyEventQueue) {
    while let Some(ev) = q.next_event() {
        engine.on_key_event(ev);
    }
}

fn drain_hid(engine: &mut Engine<'_>) -> Vec<HidEvent> {
    let mut out = Vec::new();
    while let Some(ev) = engine.pop_hid() {
        out.push(ev);
    }
    out
}

fn fire_timers(engine: &mut Engine<'_>) {
    engine.poll_timers(Instant::now() + TAPPING_TERM + Duration::from_millis(5));
}

#[test]
fn literal_press_and_release() {
    let mut nodes = vec![Node::NoOp(NoOp), Node::Literal(Literal::new(KC_A))];
    let slots = slots_with(&[(0, 1)], 0);
    let q = KeyEventQueue::new();
    let mut e = Engine::new(&mut nodes, &slots, &q);

    q.try_push(KeyEvent::press(0));
    q.try_push(KeyEvent::release(0));
    pump(&mut e, &q);

    assert_eq!(drain_hid(&mut e), vec![HidEvent::press(KC_A), HidEvent::release(KC_A)]);
}

#[test]
fn shared_node_registers_once() {
    // Two slots share one literal; the keycode must press once and release
    // only when both slots are up.
    let mut nodes = vec![Node::NoOp(NoOp), Node::Literal(Literal::new(KC_LSHIFT))];
    let slots = slots_with(&[(0, 1), (1, 1)], 0);
    let q = KeyEventQueue::new();
    let mut e = Engine::new(&mut nodes, &slots, &q);

    q.try_push(KeyEvent::press(0));
    q.try_push(KeyEvent::press(1));
    q.try_push(KeyEvent::release(0));
    pump(&mut e, &q);
    assert_eq!(drain_hid(&mut e), vec![HidEvent::press(KC_LSHIFT)]);
    assert!(e.is_node_pressed(1));

    q.try_push(KeyEvent::release(1));
    pump(&mut e, &q);
    assert_eq!(drain_hid(&mut e), vec![HidEvent::release(KC_LSHIFT)]);
    assert!(!e.is_node_pressed(1));
}

#[test]
fn release_of_unheld_node_is_dropped() {
    let mut nodes = vec![Node::NoOp(NoOp), Node::Literal(Literal::new(KC_A))];
    let slots = slots_with(&[(0, 1)], 0);
    let q = KeyEventQueue::new();
    let mut e = Engine::new(&mut nodes, &slots, &q);

    q.try_push(KeyEvent::release(0));
    pump(&mut e, &q);
    assert!(drain_hid(&mut e).is_empty());
}

fn tap_hold_engine(nodes: &mut Vec<Node>, flavor: TapHoldFlavor) -> [NodeId; NUM_SLOTS] {
    *nodes = vec![
        Node::NoOp(NoOp),
        Node::TapHold(TapHold::new(KC_ESCAPE, KC_LCTRL, flavor)),
        Node::Literal(Literal::new(KC_A)),
    ];
    slots_with(&[(0, 1), (1, 2)], 0)
}

#[test]
fn tap_hold_immediate_tap() {
    let mut nodes = Vec::new();
    let slots = tap_hold_engine(&mut nodes, TapHoldFlavor::HoldPreferred);
    let q = KeyEventQueue::new();
    let mut e = Engine::new(&mut nodes, &slots, &q);

    q.try_push(KeyEvent::press(0));
    q.try_push(KeyEvent::release(0));
    pump(&mut e, &q);

    // Released before the term with no other activity: tap fires on release.
    assert_eq!(
        drain_hid(&mut e),
        vec![HidEvent::press(KC_ESCAPE), HidEvent::release(KC_ESCAPE)]
    );
    assert!(q.deferrer().is_none());
    assert!(q.is_empty());
}

#[test]
fn tap_hold_holds_on_timeout() {
    let mut nodes = Vec::new();
    let slots = tap_hold_engine(&mut nodes, TapHoldFlavor::HoldPreferred);
    let q = KeyEventQueue::new();
    let mut e = Engine::new(&mut nodes, &slots, &q);

    q.try_push(KeyEvent::press(0));
    pump(&mut e, &q);
    assert!(drain_hid(&mut e).is_empty());

    fire_timers(&mut e);
    assert_eq!(drain_hid(&mut e), vec![HidEvent::press(KC_LCTRL)]);

    q.try_push(KeyEvent::release(0));
    pump(&mut e, &q);
    assert_eq!(drain_hid(&mut e), vec![HidEvent::release(KC_LCTRL)]);
}

#[test]
fn hold_preferred_decides_on_other_press() {
    let mut nodes = Vec::new();
    let slots = tap_hold_engine(&mut nodes, TapHoldFlavor::HoldPreferred);
    let q = KeyEventQueue::new();
    let mut e = Engine::new(&mut nodes, &slots, &q);

    q.try_push(KeyEvent::press(0));
    q.try_push(KeyEvent::press(1));
    q.try_push(KeyEvent::release(1));
    q.try_push(KeyEvent::release(0));
    pump(&mut e, &q);

    // The other press triggers hold and then executes immediately.
    assert_eq!(
        drain_hid(&mut e),
        vec![
            HidEvent::press(KC_LCTRL),
            HidEvent::press(KC_A),
            HidEvent::release(KC_A),
            HidEvent::release(KC_LCTRL),
        ]
    );
    assert!(q.is_empty());
}

#[test]
fn balanced_defers_press_and_decides_on_pair() {
    let mut nodes = Vec::new();
    let slots = tap_hold_engine(&mut nodes, TapHoldFlavor::Balanced);
    let q = KeyEventQueue::new();
    let mut e = Engine::new(&mut nodes, &slots, &q);

    q.try_push(KeyEvent::press(0));
    q.try_push(KeyEvent::press(1));
    pump(&mut e, &q);
    // The other press alone decides nothing and stays deferred.
    assert!(drain_hid(&mut e).is_empty());
    assert_eq!(q.deferred_len(), 1);

    q.try_push(KeyEvent::release(1));
    pump(&mut e, &q);
    // Press+release pair inside the window: hold, then the pair replays.
    assert_eq!(
        drain_hid(&mut e),
        vec![
            HidEvent::press(KC_LCTRL),
            HidEvent::press(KC_A),
            HidEvent::release(KC_A),
        ]
    );

    q.try_push(KeyEvent::release(0));
    pump(&mut e, &q);
    assert_eq!(drain_hid(&mut e), vec![HidEvent::release(KC_LCTRL)]);
}

#[test]
fn balanced_press_without_release_is_a_tap() {
    let mut nodes = Vec::new();
    let slots = tap_hold_engine(&mut nodes, TapHoldFlavor::Balanced);
    let q = KeyEventQueue::new();
    let mut e = Engine::new(&mut nodes, &slots, &q);

    q.try_push(KeyEvent::press(0));
    q.try_push(KeyEvent::press(1));
    pump(&mut e, &q);
    assert!(drain_hid(&mut e).is_empty());

    // The tap-hold key comes up first: tap wins, the deferred press replays
    // after it.
    q.try_push(KeyEvent::release(0));
    pump(&mut e, &q);
    assert_eq!(
        drain_hid(&mut e),
        vec![
            HidEvent::press(KC_ESCAPE),
            HidEvent::release(KC_ESCAPE),
            HidEvent::press(KC_A),
        ]
    );

    q.try_push(KeyEvent::release(1));
    pump(&mut e, &q);
    assert_eq!(drain_hid(&mut e), vec![HidEvent::release(KC_A)]);
}

#[test]
fn balanced_holds_on_timeout_with_press_pending() {
    let mut nodes = Vec::new();
    let slots = tap_hold_engine(&mut nodes, TapHoldFlavor::Balanced);
    let q = KeyEventQueue::new();
    let mut e = Engine::new(&mut nodes, &slots, &q);

    q.try_push(KeyEvent::press(0));
    q.try_push(KeyEvent::press(1));
    pump(&mut e, &q);

    fire_timers(&mut e);
    assert_eq!(drain_hid(&mut e), vec![HidEvent::press(KC_LCTRL)]);

    // The deferred press replays once defer mode ended.
    pump(&mut e, &q);
    assert_eq!(drain_hid(&mut e), vec![HidEvent::press(KC_A)]);
}

#[test]
fn tap_dance_single_and_double() {
    let mut nodes = vec![
        Node::NoOp(NoOp),
        Node::Literal(Literal::new(KC_RSHIFT)),
        Node::Literal(Literal::new(KC_CAPSLOCK)),
        Node::TapDance(TapDance::new(1, 2)),
    ];
    let slots = slots_with(&[(0, 3)], 0);
    let q = KeyEventQueue::new();
    let mut e = Engine::new(&mut nodes, &slots, &q);

    // Single tap: the once-child fires right away; the timeout just closes
    // the dance.
    q.try_push(KeyEvent::press(0));
    q.try_push(KeyEvent::release(0));
    pump(&mut e, &q);
    assert_eq!(
        drain_hid(&mut e),
        vec![HidEvent::press(KC_RSHIFT), HidEvent::release(KC_RSHIFT)]
    );
    fire_timers(&mut e);
    assert!(drain_hid(&mut e).is_empty());

    // Double tap within the term switches to the twice-child.
    q.try_push(KeyEvent::press(0));
    q.try_push(KeyEvent::release(0));
    q.try_push(KeyEvent::press(0));
    q.try_push(KeyEvent::release(0));
    pump(&mut e, &q);
    assert_eq!(
        drain_hid(&mut e),
        vec![
            HidEvent::press(KC_RSHIFT),
            HidEvent::release(KC_RSHIFT),
            HidEvent::press(KC_CAPSLOCK),
            HidEvent::release(KC_CAPSLOCK),
        ]
    );
}

#[test]
fn modified_latches_choice_until_release() {
    let mut nodes = vec![
        Node::NoOp(NoOp),
        Node::Literal(Literal::new(KC_LSHIFT)),
        Node::Literal(Literal::new(KC_ESCAPE)),
        Node::Literal(Literal::new(KC_GRAVE)),
        Node::Modified(Modified::new(1, 2, 3)),
    ];
    let slots = slots_with(&[(0, 1), (1, 4)], 0);
    let q = KeyEventQueue::new();
    let mut e = Engine::new(&mut nodes, &slots, &q);

    // Plain: escape.
    q.try_push(KeyEvent::press(1));
    q.try_push(KeyEvent::release(1));
    pump(&mut e, &q);
    assert_eq!(
        drain_hid(&mut e),
        vec![HidEvent::press(KC_ESCAPE), HidEvent::release(KC_ESCAPE)]
    );

    // With shift held: grave, and the release goes to grave even though
    // shift came up in between.
    q.try_push(KeyEvent::press(0));
    q.try_push(KeyEvent::press(1));
    q.try_push(KeyEvent::release(0));
    q.try_push(KeyEvent::release(1));
    pump(&mut e, &q);
    assert_eq!(
        drain_hid(&mut e),
        vec![
            HidEvent::press(KC_LSHIFT),
            HidEvent::press(KC_GRAVE),
            HidEvent::release(KC_LSHIFT),
            HidEvent::release(KC_GRAVE),
        ]
    );
}

#[test]
fn conditional_follows_lamp_state() {
    fn caps_lit(e: &Engine) -> bool {
        e.is_lamp_lit(lamp::CAPS_LOCK)
    }
    let mut nodes = vec![
        Node::NoOp(NoOp),
        Node::Literal(Literal::new(KC_CAPSLOCK)),
        Node::Literal(Literal::new(KC_MENU)),
        Node::Conditional(Conditional::new(caps_lit, 1, 2)),
    ];
    let slots = slots_with(&[(0, 3)], 0);
    let q = KeyEventQueue::new();
    let mut e = Engine::new(&mut nodes, &slots, &q);

    q.try_push(KeyEvent::press(0));
    q.try_push(KeyEvent::release(0));
    pump(&mut e, &q);
    assert_eq!(
        drain_hid(&mut e),
        vec![HidEvent::press(KC_MENU), HidEvent::release(KC_MENU)]
    );

    e.on_lamp_state(1 << lamp::CAPS_LOCK);
    q.try_push(KeyEvent::press(0));
    q.try_push(KeyEvent::release(0));
    pump(&mut e, &q);
    assert_eq!(
        drain_hid(&mut e),
        vec![HidEvent::press(KC_CAPSLOCK), HidEvent::release(KC_CAPSLOCK)]
    );
}

#[test]
fn norepeat_pulses_once() {
    let mut nodes = vec![
        Node::NoOp(NoOp),
        Node::Literal(Literal::new(KC_MUTE)),
        Node::NoRepeat(NoRepeat::new(1)),
    ];
    let slots = slots_with(&[(0, 2)], 0);
    let q = KeyEventQueue::new();
    let mut e = Engine::new(&mut nodes, &slots, &q);

    q.try_push(KeyEvent::press(0));
    q.try_push(KeyEvent::release(0));
    pump(&mut e, &q);
    assert_eq!(
        drain_hid(&mut e),
        vec![HidEvent::press(KC_MUTE), HidEvent::release(KC_MUTE)]
    );
}

#[test]
fn lamp_indicator_fans_out_to_fx() {
    let mut nodes = vec![
        Node::NoOp(NoOp),
        Node::Literal(Literal::new(KC_CAPSLOCK)),
        Node::LampIndicator(LampIndicator::new(1, lamp::CAPS_LOCK)),
    ];
    let slots = slots_with(&[(5, 2)], 0);
    let q = KeyEventQueue::new();
    let mut e = Engine::new(&mut nodes, &slots, &q);

    e.on_lamp_state(1 << lamp::CAPS_LOCK);
    let mut fx = Vec::new();
    while let Some(ev) = e.pop_fx() {
        fx.push(ev);
    }
    assert!(fx.contains(&FxEvent::Lamp { slot: 5, on: true }));

    e.on_lamp_state(0);
    let mut fx = Vec::new();
    while let Some(ev) = e.pop_fx() {
        fx.push(ev);
    }
    assert!(fx.contains(&FxEvent::Lamp { slot: 5, on: false }));
}

#[test]
fn switchover_waits_for_idle() {
    let mut nodes = vec![Node::NoOp(NoOp), Node::PortSwitch(PortSwitch)];
    let slots = slots_with(&[(0, 1)], 0);
    let q = KeyEventQueue::new();
    let mut e = Engine::new(&mut nodes, &slots, &q);

    q.try_push(KeyEvent::press(0));
    pump(&mut e, &q);
    assert!(e.switchover_pending());

    // Still pressed on the matrix: the request stays parked.
    assert!(!e.take_switchover_if_idle(false));
    assert!(e.switchover_pending());

    q.try_push(KeyEvent::release(0));
    pump(&mut e, &q);
    assert!(e.take_switchover_if_idle(true));
    // Delivered exactly once.
    assert!(!e.take_switchover_if_idle(true));
}

#[test]
fn extra_hold_raises_hub_requests() {
    let mut nodes = vec![Node::NoOp(NoOp), Node::ExtraHold(ExtraHold)];
    let slots = slots_with(&[(0, 1)], 0);
    let q = KeyEventQueue::new();
    let mut e = Engine::new(&mut nodes, &slots, &q);

    q.try_push(KeyEvent::press(0));
    q.try_push(KeyEvent::release(0));
    pump(&mut e, &q);

    assert_eq!(e.pop_hub(), Some(HubRequest::ExtraEnableManually));
    assert_eq!(e.pop_hub(), Some(HubRequest::ExtraBackToAutomatic));
    assert_eq!(e.pop_hub(), None);
}
