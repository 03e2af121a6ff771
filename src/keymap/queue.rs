//! Matrix-to-keymap event queue with a defer window.
//!
//! The queue is a bounded FIFO with three cursors, `pop <= peek <= push`.
//! Events between `pop` and `peek` are *deferred*: previewed by a deferrer
//! but not yet executed. In normal mode `next_event` pops; while a deferrer
//! is active it peeks, so the same events replay to the deferrer until it
//! decides. Stopping defer mode replays the whole window through subsequent
//! pops unless individual events were discarded in place.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{with_deadline, Duration, Instant};

use crate::config::KEY_EVENT_QUEUE_SIZE;
use crate::KeyEvent;

const N: usize = KEY_EVENT_QUEUE_SIZE;
const MASK: usize = N - 1;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PushTimeout;

struct State {
    buf: [KeyEvent; N],
    // Monotonic cursors; buffer access is masked.
    pop: usize,
    peek: usize,
    push: usize,
    /// Slot of the node that started defer mode, if any.
    deferrer: Option<u8>,
}

pub struct KeyEventQueue {
    state: Mutex<CriticalSectionRawMutex, RefCell<State>>,
    /// Signaled whenever an entry is freed.
    space: Signal<CriticalSectionRawMutex, ()>,
    /// Signaled whenever an entry is pushed.
    ready: Signal<CriticalSectionRawMutex, ()>,
}

impl KeyEventQueue {
    pub const fn new() -> Self {
        const {
            assert!(N.is_power_of_two());
        }
        Self {
            state: Mutex::new(RefCell::new(State {
                buf: [KeyEvent { slot: 0, is_press: false }; N],
                pop: 0,
                peek: 0,
                push: 0,
                deferrer: None,
            })),
            space: Signal::new(),
            ready: Signal::new(),
        }
    }

    /// Push a key event, waiting up to `timeout` for a free entry. Every
    /// successful push wakes the consumer.
    pub async fn push(&self, event: KeyEvent, timeout: Duration) -> Result<(), PushTimeout> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.try_push(event) {
                self.ready.signal(());
                return Ok(());
            }
            if with_deadline(deadline, self.space.wait()).await.is_err() {
                return Err(PushTimeout);
            }
        }
    }

    /// Non-blocking push; false when full.
    pub fn try_push(&self, event: KeyEvent) -> bool {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            if s.push - s.pop == N {
                return false;
            }
            let at = s.push & MASK;
            s.buf[at] = event;
            s.push += 1;
            true
        })
    }

    /// Next event to process: a pop in normal mode, a peek while a deferrer
    /// is active.
    pub fn next_event(&self) -> Option<KeyEvent> {
        let (event, freed) = self.state.lock(|s| {
            let mut s = s.borrow_mut();
            if s.deferrer.is_some() {
                if s.peek == s.push {
                    return (None, false);
                }
                let ev = s.buf[s.peek & MASK];
                s.peek += 1;
                (Some(ev), false)
            } else {
                if s.pop == s.push {
                    return (None, false);
                }
                let ev = s.buf[s.pop & MASK];
                s.pop += 1;
                s.peek = s.pop;
                (Some(ev), true)
            }
        });
        if freed {
            self.space.signal(());
        }
        event
    }

    /// Enter defer mode on behalf of the node sitting on `slot`. At most one
    /// deferrer may be active.
    pub fn start_defer(&self, slot: u8) {
        log::debug!("Keymap: start defer [{slot}]");
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            debug_assert!(s.deferrer.is_none());
            s.deferrer = Some(slot);
        });
    }

    /// Leave defer mode. Events still in the window replay through `next_event`.
    pub fn stop_defer(&self) {
        log::debug!("Keymap: stop defer");
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            debug_assert!(s.deferrer.is_some());
            s.deferrer = None;
        });
    }

    pub fn deferrer(&self) -> Option<u8> {
        self.state.lock(|s| s.borrow().deferrer)
    }

    /// Was this exact event peeked but not yet popped?
    pub fn is_deferred(&self, event: KeyEvent) -> bool {
        self.state.lock(|s| {
            let s = s.borrow();
            (s.pop..s.peek).any(|i| s.buf[i & MASK] == event)
        })
    }

    /// Remove the most recently peeked event in place, keeping the rest of
    /// the window intact.
    pub fn discard_last_deferred(&self) {
        let discarded = self.state.lock(|s| {
            let mut s = s.borrow_mut();
            if s.pop < s.peek {
                let mut i = s.peek - 1;
                while i > s.pop {
                    s.buf[i & MASK] = s.buf[(i - 1) & MASK];
                    i -= 1;
                }
                s.pop += 1;
                true
            } else {
                false
            }
        });
        if discarded {
            self.space.signal(());
        }
    }

    /// The unrecoverable contract violation: every entry is occupied and
    /// every one of them sits inside the defer window.
    pub fn full_of_deferred(&self) -> bool {
        self.state.lock(|s| {
            let s = s.borrow();
            s.push - s.pop == N && s.peek == s.push
        })
    }

    /// Resolve once at least one event has been pushed since the last call.
    pub async fn ready(&self) {
        self.ready.wait().await;
    }

    pub fn len(&self) -> usize {
        self.state.lock(|s| {
            let s = s.borrow();
            s.push - s.pop
        })
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn deferred_len(&self) -> usize {
        self.state.lock(|s| {
            let s = s.borrow();
            s.peek - s.pop
        })
    }
}

impl Default for KeyEventQueue {
    fn default() -> Self {
        Self::new()
    }
}
