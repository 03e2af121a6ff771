//! The keymap-to-USB event ring.
//!
//! Single producer (the keymap agent), single consumer (the USB agent).
//! While the bus is accessible the producer awaits free space, which is the
//! backpressure that paces the keymap agent against the endpoint. While the
//! bus is suspended events are buffered with evict-oldest semantics instead,
//! so a long suspend can never wedge the keymap agent.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use super::HidEvent;
use crate::config::USB_EVENT_RING_SIZE;

const N: usize = USB_EVENT_RING_SIZE;
const MASK: usize = N - 1;

struct State {
    buf: [HidEvent; N],
    begin: usize,
    end: usize,
}

impl State {
    fn len(&self) -> usize {
        self.end - self.begin
    }
}

pub struct EventRing {
    state: Mutex<CriticalSectionRawMutex, RefCell<State>>,
    space: Signal<CriticalSectionRawMutex, ()>,
    ready: Signal<CriticalSectionRawMutex, ()>,
}

impl EventRing {
    pub const fn new() -> Self {
        const {
            assert!(N.is_power_of_two());
        }
        Self {
            state: Mutex::new(RefCell::new(State {
                buf: [HidEvent { keycode: 0, is_press: false }; N],
                begin: 0,
                end: 0,
            })),
            space: Signal::new(),
            ready: Signal::new(),
        }
    }

    /// Push, evicting the oldest entry when full. Used during suspend.
    pub fn push_evict(&self, ev: HidEvent) {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            let at = s.end & MASK;
            s.buf[at] = ev;
            s.end += 1;
            if s.len() > N {
                s.begin = s.end - N;
            }
        });
        self.ready.signal(());
    }

    /// Push, waiting for a free entry. Used while the bus is accessible.
    pub async fn push(&self, ev: HidEvent) {
        loop {
            let pushed = self.state.lock(|s| {
                let mut s = s.borrow_mut();
                if s.len() == N {
                    return false;
                }
                let at = s.end & MASK;
                s.buf[at] = ev;
                s.end += 1;
                true
            });
            if pushed {
                self.ready.signal(());
                return;
            }
            self.space.wait().await;
        }
    }

    pub fn peek(&self) -> Option<HidEvent> {
        self.state.lock(|s| {
            let s = s.borrow();
            if s.begin == s.end {
                None
            } else {
                Some(s.buf[s.begin & MASK])
            }
        })
    }

    pub fn pop(&self) -> bool {
        let popped = self.state.lock(|s| {
            let mut s = s.borrow_mut();
            if s.begin == s.end {
                false
            } else {
                s.begin += 1;
                true
            }
        });
        if popped {
            self.space.signal(());
        }
        popped
    }

    pub fn clear(&self) {
        log::debug!("USB_HID: clear key event queue");
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            s.begin = s.end;
        });
        self.space.signal(());
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock(|s| {
            let s = s.borrow();
            s.begin == s.end
        })
    }

    pub fn len(&self) -> usize {
        self.state.lock(|s| s.borrow().len())
    }

    /// Resolve once something has been pushed since the last take.
    pub async fn ready(&self) {
        self.ready.wait().await;
    }
}

impl Default for EventRing {
    fn default() -> Self {
        Self::new()
    }
}
