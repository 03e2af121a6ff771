//! Name-keyed settings in a byte-addressable NVM region.
//!
//! Layout: a 2-byte occupancy header, then name-value entries stored
//! back-to-back with no alignment:
//!
//! ```text
//! +0: occupied (u16 LE)      total bytes in use, header included
//! +2: len (u8)               bytes in this entry after the len byte
//! +3: name, NUL-terminated
//!  ..: value bytes
//!  ..: next entry
//! ```
//!
//! Entries are removed by tail compaction, so the region never fragments.
//! Writes go through the driver's buffer and are committed after the store
//! has been idle for `NVM_WRITE_DELAY`, or immediately on `flush_now`.
//!
//! The bootloader reads `last_host_port` before this firmware runs, and
//! expects it to be the first entry written into a freshly formatted region.

use embassy_time::Instant;

use crate::config::NVM_WRITE_DELAY;
use crate::drivers::NvmBytes;
use crate::hub::PortId;

const HEADER_SIZE: usize = 2;
const MAX_NAME: usize = 32;

pub const LAST_HOST_PORT: &str = "last_host_port";

pub struct Settings<N: NvmBytes> {
    nvm: N,
    dirty_since: Option<Instant>,
}

impl<N: NvmBytes> Settings<N> {
    /// Open the region, formatting it (and seeding `last_host_port`) when it
    /// reads as erased or corrupt.
    pub fn new(nvm: N) -> Self {
        let mut store = Self { nvm, dirty_since: None };
        let occupied = store.occupied();
        if occupied < HEADER_SIZE || occupied > store.nvm.capacity() {
            log::info!("NVM: formatting settings region");
            store.set_occupied(HEADER_SIZE);
            store.set(LAST_HOST_PORT, &[PortId::Port1.number()]);
        }
        store
    }

    fn occupied(&self) -> usize {
        let mut raw = [0u8; 2];
        self.nvm.read(0, &mut raw);
        u16::from_le_bytes(raw) as usize
    }

    fn set_occupied(&mut self, occupied: usize) {
        self.nvm.write(0, &(occupied as u16).to_le_bytes());
    }

    /// Locate `name`; returns (entry offset, entry len, value offset, value len).
    fn find(&self, name: &str) -> Option<(usize, usize, usize, usize)> {
        let occupied = self.occupied();
        let mut off = HEADER_SIZE;
        while off + 1 < occupied {
            let mut len_byte = [0u8; 1];
            self.nvm.read(off, &mut len_byte);
            let len = len_byte[0] as usize;
            if len == 0 || off + 1 + len > occupied {
                log::error!("NVM: corrupt entry at {off}");
                return None;
            }
            let mut stored = [0u8; MAX_NAME];
            let name_span = len.min(MAX_NAME);
            self.nvm.read(off + 1, &mut stored[..name_span]);
            if let Some(nul) = stored[..name_span].iter().position(|&b| b == 0) {
                if &stored[..nul] == name.as_bytes() {
                    let value_off = off + 1 + nul + 1;
                    let value_len = len - nul - 1;
                    return Some((off, len, value_off, value_len));
                }
            }
            off += 1 + len;
        }
        None
    }

    /// Copy the value for `name` into `out`, returning how many bytes the
    /// entry holds. `out` may be shorter; the copy is truncated.
    pub fn get(&self, name: &str, out: &mut [u8]) -> Option<usize> {
        let (_, _, value_off, value_len) = self.find(name)?;
        let take = value_len.min(out.len());
        self.nvm.read(value_off, &mut out[..take]);
        Some(value_len)
    }

    /// Create or update an entry. A same-size update rewrites the value in
    /// place; a resize removes and re-appends.
    pub fn set(&mut self, name: &str, value: &[u8]) -> bool {
        let name_len = name.len();
        if name_len == 0 || name_len >= MAX_NAME || name_len + 1 + value.len() > u8::MAX as usize {
            log::error!("NVM: entry \"{name}\" does not fit");
            return false;
        }

        if let Some((_, _, value_off, value_len)) = self.find(name) {
            if value_len == value.len() {
                self.nvm.write(value_off, value);
                self.mark_dirty();
                return true;
            }
            self.remove(name);
        }

        let len = 1 + name_len + 1 + value.len();
        let occupied = self.occupied();
        if occupied + len > self.nvm.capacity() {
            log::error!("NVM: out of space for \"{name}\"");
            return false;
        }

        let mut off = occupied;
        self.nvm.write(off, &[(name_len + 1 + value.len()) as u8]);
        off += 1;
        self.nvm.write(off, name.as_bytes());
        off += name_len;
        self.nvm.write(off, &[0]);
        off += 1;
        self.nvm.write(off, value);
        self.set_occupied(occupied + len);
        self.mark_dirty();
        true
    }

    /// Remove an entry, compacting the tail over it.
    pub fn remove(&mut self, name: &str) -> bool {
        let Some((entry_off, entry_len, _, _)) = self.find(name) else {
            return false;
        };
        let occupied = self.occupied();
        let hole = 1 + entry_len;
        let mut src = entry_off + hole;
        let mut dst = entry_off;
        let mut chunk = [0u8; 32];
        while src < occupied {
            let take = (occupied - src).min(chunk.len());
            self.nvm.read(src, &mut chunk[..take]);
            self.nvm.write(dst, &chunk[..take]);
            src += take;
            dst += take;
        }
        self.set_occupied(occupied - hole);
        self.mark_dirty();
        true
    }

    pub fn remove_all(&mut self) {
        self.set_occupied(HEADER_SIZE);
        self.mark_dirty();
    }

    /// Walk the stored names in order.
    pub fn names(&self, mut visit: impl FnMut(&str)) {
        let occupied = self.occupied();
        let mut off = HEADER_SIZE;
        while off + 1 < occupied {
            let mut len_byte = [0u8; 1];
            self.nvm.read(off, &mut len_byte);
            let len = len_byte[0] as usize;
            if len == 0 || off + 1 + len > occupied {
                return;
            }
            let mut stored = [0u8; MAX_NAME];
            let name_span = len.min(MAX_NAME);
            self.nvm.read(off + 1, &mut stored[..name_span]);
            if let Some(nul) = stored[..name_span].iter().position(|&b| b == 0) {
                if let Ok(name) = core::str::from_utf8(&stored[..nul]) {
                    visit(name);
                }
            }
            off += 1 + len;
        }
    }

    pub fn get_u8(&self, name: &str) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.get(name, &mut byte) {
            Some(n) if n >= 1 => Some(byte[0]),
            _ => None,
        }
    }

    pub fn set_u8(&mut self, name: &str, value: u8) -> bool {
        self.set(name, &[value])
    }

    fn mark_dirty(&mut self) {
        self.dirty_since = Some(Instant::now());
    }

    /// When the buffered writes are due for commit.
    pub fn flush_deadline(&self) -> Option<Instant> {
        self.dirty_since.map(|t| t + NVM_WRITE_DELAY)
    }

    /// Commit buffered writes once the store has been idle long enough.
    pub fn poll_flush(&mut self, now: Instant) {
        if let Some(deadline) = self.flush_deadline() {
            if now >= deadline {
                self.flush_now();
            }
        }
    }

    pub fn flush_now(&mut self) {
        self.dirty_since = None;
        self.nvm.flush();
    }
}
