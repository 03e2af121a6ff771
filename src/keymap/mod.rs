//! The keymap layer: node table, dispatch engine, defer handling.
//!
//! The engine consumes debounced key events, drives the node hooks, and
//! collects everything the nodes want done into small output queues that the
//! keymap agent then pushes to the other agents. Keeping the engine free of
//! await points means every spec-level property of the dispatch logic can be
//! exercised on the host.

pub mod layout;
pub mod nodes;
pub mod queue;
pub mod timers;

use core::mem;

use embassy_time::{Duration, Instant};
use heapless::{Deque, FnvIndexMap};

use crate::config::NUM_SLOTS;
use crate::hid::HidEvent;
use crate::hub::HubRequest;
use crate::press_or_release;
use crate::rgb::FxEvent;
use crate::KeyEvent;
use nodes::{Behavior, NoOp, Node};
use queue::KeyEventQueue;
use timers::NodeTimers;

/// Index into the node table. The slot table and composite nodes reference
/// nodes by id; nothing owns a node but the table itself.
pub type NodeId = u8;

/// Upper bound on the node table size.
pub const MAX_NODES: usize = 128;

pub struct Engine<'a> {
    nodes: &'a mut [Node],
    slots: &'a [NodeId; NUM_SLOTS],
    queue: &'a KeyEventQueue,
    /// Net press count per node; a node's `on_press`/`on_release` fire only
    /// on the 0->1 and 1->0 edges, so simultaneous presses of one keymap
    /// from several slots register once.
    press_count: [u8; MAX_NODES],
    timers: NodeTimers,
    /// Node currently checked out for dispatch; timer operations from node
    /// hooks attach to it.
    current: NodeId,
    lamp_state: u8,
    /// lamp bit -> slot carrying the indicator.
    lamps: FnvIndexMap<u8, u8, 8>,
    switchover_pending: bool,
    hid_out: Deque<HidEvent, 16>,
    fx_out: Deque<FxEvent, 16>,
    hub_out: Deque<HubRequest, 4>,
}

impl<'a> Engine<'a> {
    pub fn new(
        nodes: &'a mut [Node],
        slots: &'a [NodeId; NUM_SLOTS],
        queue: &'a KeyEventQueue,
    ) -> Self {
        debug_assert!(nodes.len() <= MAX_NODES);
        let mut lamps = FnvIndexMap::new();
        for (slot, &id) in slots.iter().enumerate() {
            if let Node::LampIndicator(l) = &nodes[id as usize] {
                let _ = lamps.insert(l.lamp_bit(), slot as u8);
            }
        }
        Self {
            nodes,
            slots,
            queue,
            press_count: [0; MAX_NODES],
            timers: NodeTimers::new(),
            current: 0,
            lamp_state: 0,
            lamps,
            switchover_pending: false,
            hid_out: Deque::new(),
            fx_out: Deque::new(),
            hub_out: Deque::new(),
        }
    }

    /// Check a node out of the table, run `f` with the engine as context,
    /// put it back. A `NoOp` stands in meanwhile, so pathological self
    /// references dispatch to nothing instead of aliasing.
    fn with_node<R>(&mut self, id: NodeId, f: impl FnOnce(&mut Node, &mut Self) -> R) -> R {
        let saved = self.current;
        self.current = id;
        let mut node = mem::replace(&mut self.nodes[id as usize], Node::NoOp(NoOp));
        let result = f(&mut node, self);
        self.nodes[id as usize] = node;
        self.current = saved;
        result
    }

    // Dispatch entry points, called from the keymap agent.

    /// Handle one key event from the queue, honouring an active deferrer.
    pub fn on_key_event(&mut self, ev: KeyEvent) {
        let target = self.slots[ev.slot as usize];
        match self.queue.deferrer() {
            None => {
                log::debug!("Keymap: [{}] handle {}", ev.slot, press_or_release(ev.is_press));
                self.execute(target, ev);
            }
            Some(d) if d == ev.slot => {
                // The deferrer's own further events are always immediate.
                log::debug!(
                    "Keymap: [{}] handle deferrer {}",
                    ev.slot,
                    press_or_release(ev.is_press)
                );
                self.execute(target, ev);
                self.queue.discard_last_deferred();
            }
            Some(d) => {
                log::debug!(
                    "Keymap: [{d}] handle other {} [{}]",
                    press_or_release(ev.is_press),
                    ev.slot
                );
                let deferrer = self.slots[d as usize];
                let proceed = if ev.is_press {
                    self.with_node(deferrer, |n, cx| n.on_other_press(cx, ev.slot))
                } else {
                    self.with_node(deferrer, |n, cx| n.on_other_release(cx, ev.slot))
                };
                if proceed {
                    // The deferrer let the event through; run it now and take
                    // it out of the deferred window.
                    log::debug!(
                        "Keymap: [{}] execute immediate {}",
                        ev.slot,
                        press_or_release(ev.is_press)
                    );
                    self.execute(target, ev);
                    self.queue.discard_last_deferred();
                }
            }
        }
    }

    fn execute(&mut self, node: NodeId, ev: KeyEvent) {
        self.push_fx(FxEvent::Key { slot: ev.slot, pressed: ev.is_press });
        if ev.is_press {
            self.press_node(node, ev.slot);
        } else {
            self.release_node(node, ev.slot);
        }
    }

    /// Fire every expectedly-due node timer.
    pub fn poll_timers(&mut self, now: Instant) {
        while let Some((node, slot)) = self.timers.take_due(now) {
            self.with_node(node, |n, cx| n.on_timeout(cx, slot));
        }
    }

    /// Earliest pending timer deadline, for the agent's select loop.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// New lamp bitset from the host; fans out to subscribed indicators.
    pub fn on_lamp_state(&mut self, state: u8) {
        let changed = self.lamp_state ^ state;
        self.lamp_state = state;
        let mut flips: heapless::Vec<FxEvent, 8> = heapless::Vec::new();
        for (&bit, &slot) in &self.lamps {
            if changed & (1 << bit) != 0 {
                let _ = flips.push(FxEvent::Lamp { slot, on: state & (1 << bit) != 0 });
            }
        }
        for ev in flips {
            self.push_fx(ev);
        }
    }

    /// Hand out a parked switchover request once everything is idle: queue
    /// drained, no deferrer, nothing pressed on the matrix.
    pub fn take_switchover_if_idle(&mut self, matrix_idle: bool) -> bool {
        if self.switchover_pending
            && matrix_idle
            && self.queue.is_empty()
            && self.queue.deferrer().is_none()
        {
            self.switchover_pending = false;
            return true;
        }
        false
    }

    pub fn switchover_pending(&self) -> bool {
        self.switchover_pending
    }

    // Node context API, used from Behavior implementations.

    /// Register a press against a node; the hook runs on the 0->1 edge only.
    pub fn press_node(&mut self, id: NodeId, slot: u8) {
        let count = &mut self.press_count[id as usize];
        *count += 1;
        if *count == 1 {
            self.with_node(id, |n, cx| n.on_press(cx, slot));
        }
    }

    /// Register a release; the hook runs on the 1->0 edge. A release against
    /// an unheld node is a protocol error: logged and dropped.
    pub fn release_node(&mut self, id: NodeId, slot: u8) {
        let count = &mut self.press_count[id as usize];
        if *count == 0 {
            log::warn!("Keymap: release of unheld node {id}");
            return;
        }
        *count -= 1;
        if *count == 0 {
            self.with_node(id, |n, cx| n.on_release(cx, slot));
        }
    }

    pub fn is_node_pressed(&self, id: NodeId) -> bool {
        self.press_count[id as usize] > 0
    }

    pub fn send_press(&mut self, keycode: u8) {
        self.push_hid(HidEvent { keycode, is_press: true });
    }

    pub fn send_release(&mut self, keycode: u8) {
        self.push_hid(HidEvent { keycode, is_press: false });
    }

    pub fn arm_timer(&mut self, slot: u8, after: Duration) {
        self.timers.arm(self.current, slot, after);
    }

    pub fn disarm_timer(&mut self) {
        self.timers.disarm(self.current);
    }

    /// Enter defer mode for `slot`. Re-entering for the same slot is a
    /// no-op so nodes that re-trigger while already deferring stay sane.
    pub fn start_defer(&mut self, slot: u8) {
        match self.queue.deferrer() {
            None => self.queue.start_defer(slot),
            Some(s) if s == slot => {}
            Some(s) => log::error!("Keymap: [{slot}] defer denied, [{s}] is deferring"),
        }
    }

    pub fn stop_defer(&mut self) {
        if self.queue.deferrer().is_some() {
            self.queue.stop_defer();
        }
    }

    pub fn is_deferred(&self, ev: KeyEvent) -> bool {
        self.queue.is_deferred(ev)
    }

    pub fn request_switchover(&mut self) {
        log::info!("Keymap: switchover requested");
        self.switchover_pending = true;
    }

    pub fn enable_extra_manually(&mut self) {
        if self.hub_out.push_back(HubRequest::ExtraEnableManually).is_err() {
            log::error!("Keymap: hub request queue overflow");
        }
    }

    pub fn extra_back_to_automatic(&mut self) {
        if self.hub_out.push_back(HubRequest::ExtraBackToAutomatic).is_err() {
            log::error!("Keymap: hub request queue overflow");
        }
    }

    pub fn is_lamp_lit(&self, bit: u8) -> bool {
        self.lamp_state & (1 << bit) != 0
    }

    pub fn lamp_state(&self) -> u8 {
        self.lamp_state
    }

    // Output drains, consumed by the keymap agent after each dispatch.

    pub fn pop_hid(&mut self) -> Option<HidEvent> {
        self.hid_out.pop_front()
    }

    pub fn pop_fx(&mut self) -> Option<FxEvent> {
        self.fx_out.pop_front()
    }

    pub fn pop_hub(&mut self) -> Option<HubRequest> {
        self.hub_out.pop_front()
    }

    fn push_hid(&mut self, ev: HidEvent) {
        if self.hid_out.push_back(ev).is_err() {
            log::error!("Keymap: dropped HID event (0x{:02x})", ev.keycode);
        }
    }

    fn push_fx(&mut self, ev: FxEvent) {
        // Effects are advisory; overflow is not worth a log line.
        let _ = self.fx_out.push_back(ev);
    }
}
