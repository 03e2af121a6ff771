// Host-side tests for the settings store over an in-memory NVM.

use std::cell::Cell;
use std::rc::Rc;

use embassy_time::Duration;
use hubkey::drivers::NvmBytes;
use hubkey::persist::{Settings, LAST_HOST_PORT};

struct MemNvm {
    data: Vec<u8>,
    flushes: Rc<Cell<usize>>,
}

impl MemNvm {
    fn erased(capacity: usize) -> (Self, Rc<Cell<usize>>) {
        let flushes = Rc::new(Cell::new(0));
        (Self { data: vec![0xFF; capacity], flushes: flushes.clone() }, flushes)
    }
}

impl NvmBytes for MemNvm {
    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn read(&self, offset: usize, buf: &mut [u8]) {
        buf.copy_from_slice(&self.data[offset..offset + buf.len()]);
    }

    fn write(&mut self, offset: usize, data: &[u8]) {
        self.data[offset..offset + data.len()].copy_from_slice(data);
    }

    fn flush(&mut self) {
        self.flushes.set(self.flushes.get() + 1);
    }
}

#[test]
fn formats_erased_region_and_seeds_host_port() {
    let (nvm, _) = MemNvm::erased(4096);
    let store = Settings::new(nvm);
    assert_eq!(store.get_u8(LAST_HOST_PORT), Some(1));
}

#[test]
fn set_get_roundtrip_and_overwrite() {
    let (nvm, _) = MemNvm::erased(4096);
    let mut store = Settings::new(nvm);

    assert!(store.set("effect", &[3, 7]));
    let mut buf = [0u8; 8];
    assert_eq!(store.get("effect", &mut buf), Some(2));
    assert_eq!(&buf[..2], &[3, 7]);

    // Same-size update rewrites in place.
    assert!(store.set("effect", &[9, 1]));
    assert_eq!(store.get("effect", &mut buf), Some(2));
    assert_eq!(&buf[..2], &[9, 1]);

    // Resize relocates the entry without losing the others.
    assert!(store.set("effect", &[1, 2, 3, 4]));
    assert_eq!(store.get("effect", &mut buf), Some(4));
    assert_eq!(store.get_u8(LAST_HOST_PORT), Some(1));
}

#[test]
fn remove_compacts_the_tail() {
    let (nvm, _) = MemNvm::erased(4096);
    let mut store = Settings::new(nvm);
    store.set("alpha", &[1]);
    store.set("beta", &[2]);
    store.set("gamma", &[3]);

    assert!(store.remove("beta"));
    assert!(!store.remove("beta"));

    assert_eq!(store.get_u8("alpha"), Some(1));
    assert_eq!(store.get_u8("gamma"), Some(3));
    assert_eq!(store.get_u8("beta"), None);

    let mut names = Vec::new();
    store.names(|n| names.push(n.to_string()));
    assert_eq!(names, vec![LAST_HOST_PORT.to_string(), "alpha".into(), "gamma".into()]);
}

#[test]
fn remove_all_leaves_an_empty_store() {
    let (nvm, _) = MemNvm::erased(4096);
    let mut store = Settings::new(nvm);
    store.set("alpha", &[1]);
    store.remove_all();

    let mut count = 0;
    store.names(|_| count += 1);
    assert_eq!(count, 0);
    assert_eq!(store.get_u8(LAST_HOST_PORT), None);
}

#[test]
fn writes_flush_after_idle_period() {
    let (nvm, flushes) = MemNvm::erased(4096);
    let mut store = Settings::new(nvm);
    let flushed_at_init = flushes.get();

    store.set_u8(LAST_HOST_PORT, 2);
    let deadline = store.flush_deadline().expect("dirty store must have a deadline");

    // Not yet due.
    store.poll_flush(deadline - Duration::from_millis(500));
    assert_eq!(flushes.get(), flushed_at_init);

    store.poll_flush(deadline);
    assert_eq!(flushes.get(), flushed_at_init + 1);
    assert_eq!(store.flush_deadline(), None);
    assert_eq!(store.get_u8(LAST_HOST_PORT), Some(2));
}

#[test]
fn oversized_and_overflowing_entries_are_refused() {
    let (nvm, _) = MemNvm::erased(64);
    let mut store = Settings::new(nvm);

    let big = [0u8; 250];
    assert!(!store.set("too-big-for-one-entry", &big));

    // Fill the tiny region up.
    assert!(store.set("a", &[0u8; 16]));
    assert!(!store.set("b", &[0u8; 32]));
}
