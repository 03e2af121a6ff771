//! Runtime-mode DFU.
//!
//! The application advertises a DFU 1.1 runtime interface whose only job is
//! to accept DFU_DETACH and reboot into the bootloader; download, upload and
//! the rest of the protocol live on the other side of that reboot. The
//! device sets bmWillDetach, so the host does not have to reset the bus, and
//! is manifestation tolerant so USB stays attached after a download.

use crate::config::{DFU_DETACH_TIMEOUT_MS, DFU_RESET_DELAY};

pub const DFU_VERSION_BCD: u16 = 0x0110;

const ATTR_CAN_DNLOAD: u8 = 1 << 0;
const ATTR_CAN_UPLOAD: u8 = 1 << 1;
const ATTR_MANIFEST_TOLERANT: u8 = 1 << 2;
const ATTR_WILL_DETACH: u8 = 1 << 3;

/// wTransferSize granted to the bootloader's download phase.
pub const TRANSFER_SIZE: u16 = 1024;

/// The DFU functional descriptor appended to the runtime interface.
pub fn functional_descriptor() -> [u8; 9] {
    let attrs = ATTR_WILL_DETACH | ATTR_MANIFEST_TOLERANT | ATTR_CAN_DNLOAD | ATTR_CAN_UPLOAD;
    let detach = DFU_DETACH_TIMEOUT_MS.to_le_bytes();
    let xfer = TRANSFER_SIZE.to_le_bytes();
    let bcd = DFU_VERSION_BCD.to_le_bytes();
    [9, 0x21, attrs, detach[0], detach[1], xfer[0], xfer[1], bcd[0], bcd[1]]
}

/// Runtime (application-mode) DFU states, numbered as DFU 1.1 defines them.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DfuState {
    AppIdle = 0,
    AppDetach = 1,
}

/// Class requests the glue can see on the DFU interface.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DfuRequest {
    Detach,
    GetStatus,
    GetState,
    ClrStatus,
    Abort,
    Dnload,
    Upload,
}

/// What the control pipe should do with a request.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DfuOutcome {
    /// ACK, then reboot into the bootloader after `DFU_RESET_DELAY` so the
    /// status stage completes on the wire first.
    Detach,
    /// Respond with the first `len` bytes of `data`.
    Reply { data: [u8; 6], len: usize },
    /// Request not served in application mode.
    Stall,
}

pub struct DfuRuntime {
    state: DfuState,
}

impl DfuRuntime {
    pub const fn new() -> Self {
        Self { state: DfuState::AppIdle }
    }

    pub fn state(&self) -> DfuState {
        self.state
    }

    pub fn handle(&mut self, request: DfuRequest) -> DfuOutcome {
        match request {
            DfuRequest::Detach => {
                log::info!("DFU: detach, rebooting to bootloader in {}ms", DFU_RESET_DELAY.as_millis());
                self.state = DfuState::AppDetach;
                DfuOutcome::Detach
            }
            DfuRequest::GetStatus => {
                // status OK, bwPollTimeout, state, iString
                let data = [0, 10, 0, 0, self.state as u8, 0];
                DfuOutcome::Reply { data, len: 6 }
            }
            DfuRequest::GetState => {
                let mut data = [0u8; 6];
                data[0] = self.state as u8;
                DfuOutcome::Reply { data, len: 1 }
            }
            // Download/upload and status manipulation belong to the
            // bootloader side of the detach.
            DfuRequest::ClrStatus | DfuRequest::Abort | DfuRequest::Dnload | DfuRequest::Upload => {
                DfuOutcome::Stall
            }
        }
    }
}

impl Default for DfuRuntime {
    fn default() -> Self {
        Self::new()
    }
}
