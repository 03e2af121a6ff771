//! One-shot timers owned by keymap nodes.
//!
//! A node may have at most one armed timer. Deadlines are raced in the
//! keymap agent's select loop rather than fired from interrupt context, but
//! the disarm-versus-expiry race still exists: a deadline can elapse while
//! the agent is busy with an event that disarms it. The `expected` latch is
//! cleared by disarm so such a stale wake-up is skipped, never dispatched.

use embassy_time::{Duration, Instant};
use heapless::Vec;

use super::NodeId;

const MAX_ARMED: usize = 8;

#[derive(Clone, Copy, Debug)]
struct Armed {
    node: NodeId,
    slot: u8,
    deadline: Instant,
    expected: bool,
}

pub struct NodeTimers {
    entries: Vec<Armed, MAX_ARMED>,
}

impl NodeTimers {
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Arm (or re-arm) the node's one-shot timer.
    pub fn arm(&mut self, node: NodeId, slot: u8, after: Duration) {
        let deadline = Instant::now() + after;
        let armed = Armed { node, slot, deadline, expected: true };
        if let Some(e) = self.entries.iter_mut().find(|e| e.node == node) {
            *e = armed;
        } else if self.entries.push(armed).is_err() {
            log::error!("Keymap: out of timer slots for node {node}");
        }
    }

    /// Disarm the node's timer. Harmless when it is not armed.
    pub fn disarm(&mut self, node: NodeId) {
        if let Some(e) = self.entries.iter_mut().find(|e| e.node == node) {
            e.expected = false;
        }
    }

    pub fn is_armed(&self, node: NodeId) -> bool {
        self.entries.iter().any(|e| e.node == node && e.expected)
    }

    /// Earliest expected deadline, for the agent's select loop.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().filter(|e| e.expected).map(|e| e.deadline).min()
    }

    /// Remove and return one due timer; disarmed leftovers are dropped
    /// silently on the way.
    pub fn take_due(&mut self, now: Instant) -> Option<(NodeId, u8)> {
        loop {
            let idx = self.entries.iter().position(|e| !e.expected || e.deadline <= now)?;
            let e = self.entries.swap_remove(idx);
            if e.expected {
                return Some((e.node, e.slot));
            }
            log::debug!("Keymap: spurious timeout for node {}", e.node);
        }
    }
}

impl Default for NodeTimers {
    fn default() -> Self {
        Self::new()
    }
}
