//! Interfaces required from the external collaborators.
//!
//! The peripheral drivers, the USB device stack, the LED driver chips, the
//! hub configuration port and the bootloader are not part of this core; the
//! traits here state exactly what the agents need from each of them. Board
//! crates implement them over the real peripherals, the test suite over
//! mocks.

use crate::adc::AdcLine;

/// Electrical access to the key matrix.
#[allow(async_fn_in_trait)]
pub trait MatrixBus {
    /// Walk all columns once, reporting each slot's instantaneous level
    /// through `sample(slot_index, level)`. Level is true while the switch
    /// conducts.
    fn scan(&mut self, sample: &mut dyn FnMut(usize, bool));

    /// Configure the rows as level interrupts with all columns asserted and
    /// resolve once any key is driven high. Interrupts are disabled again
    /// before this returns.
    async fn wait_for_key(&mut self);
}

/// One conversion at a time on the shared ADC block.
#[allow(async_fn_in_trait)]
pub trait AdcBus {
    /// Start a conversion on `line` and resolve with the 12-bit result.
    async fn convert(&mut self, line: AdcLine) -> u16;
}

/// The 16-bit output shift register. Implementations latch the word on the
/// trailing edge of the push, so a single call is atomic as far as the
/// outputs are concerned.
pub trait SrBus {
    fn push_word(&mut self, word: u16);
}

/// The pair of LED driver chips, presented as one logical device. Channel
/// numbering spans both chips.
pub trait Is31Bus {
    type Error: core::fmt::Debug;

    /// Write the global current control register on both chips.
    fn set_gcr(&mut self, gcr: u8) -> Result<(), Self::Error>;

    /// Assert or release software shutdown on both chips. Registers remain
    /// accessible while shut down.
    fn set_software_shutdown(&mut self, shutdown: bool) -> Result<(), Self::Error>;

    /// Stage one LED's colour in the chip-side PWM registers.
    fn set_color(&mut self, led: u8, r: u8, g: u8, b: u8) -> Result<(), Self::Error>;

    /// Push all staged PWM values out.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// SMBus side of the USB2422 hub controller.
pub trait HubConfigPort {
    type Error: core::fmt::Debug;

    /// Upload the configuration block, optionally substituting a factory
    /// serial number, and issue the attach command.
    fn upload_config(&mut self, serial: Option<&[u8]>) -> Result<(), Self::Error>;

    /// Level of the hub's ACTIVE pin.
    fn is_active(&self) -> bool;
}

/// Byte-addressable non-volatile region backing the settings store. Writes
/// may be buffered; `flush` commits them.
pub trait NvmBytes {
    fn capacity(&self) -> usize;
    fn read(&self, offset: usize, buf: &mut [u8]);
    fn write(&mut self, offset: usize, data: &[u8]);
    fn flush(&mut self);
}

/// The keyboard's interrupt-IN endpoint plus the device-level controls the
/// USB agent needs. The stack behind it owns enumeration and descriptors.
#[allow(async_fn_in_trait)]
pub trait HidConn {
    /// Hand `report` to the endpoint for the next IN token. Non-blocking;
    /// must only be called while no transfer is in flight.
    fn submit(&mut self, report: &[u8]);

    /// Resolve when the in-flight transfer is acknowledged by the host.
    /// Pends forever if nothing is in flight. Must be cancel-safe: dropping
    /// the future and calling again later still observes the completion.
    async fn transfer_complete(&mut self);

    /// Ask the stack to signal remote wakeup on the bus.
    fn request_remote_wakeup(&mut self);
}

/// Status LED next to the USB receptacles.
pub trait StatusLed {
    fn set(&mut self, on: bool);
    fn toggle(&mut self);
}

/// Reset paths and factory data. Methods take `&self` so one instance can
/// be shared across the agents that may need to pull the cord.
pub trait SystemControl {
    /// Plain MCU reset.
    fn reset(&self) -> !;

    /// Reset with the magic that lands in the bootloader's DFU mode.
    fn reset_to_bootloader(&self) -> !;

    /// Factory-programmed serial number from the NVM user page, if present.
    fn factory_serial(&self) -> Option<&[u8]>;
}

/// Hardware watchdog; feeding must happen faster than the hardware window.
pub trait WatchdogFeeder {
    fn feed(&mut self);
}

/// Events delivered by the USB device stack to the USB agent.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusEvent {
    Reset,
    Suspend,
    Resume,
    /// SET_PROTOCOL from the host: 0 = boot, 1 = report.
    SetProtocol(u8),
    /// The one-byte lamp bitset written by the host.
    LampState(u8),
    /// DFU_DETACH on the runtime DFU interface.
    DfuDetach,
}

