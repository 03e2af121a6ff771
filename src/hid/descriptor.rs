//! Report descriptors handed to the device-stack glue.
//!
//! The boot-compatible descriptor is usbd-hid's stock keyboard report; the
//! NKRO descriptor carries the modifier bits, the host lamp bits and a
//! 240-bit keycode set matching `report::NKRO_REPORT_SIZE`.

use usbd_hid::descriptor::generator_prelude::*;

pub use usbd_hid::descriptor::KeyboardReport as BootReportDesc;

#[gen_hid_descriptor(
    (collection = APPLICATION, usage_page = GENERIC_DESKTOP, usage = KEYBOARD) = {
        (usage_page = KEYBOARD, usage_min = 0xE0, usage_max = 0xE7) = {
            #[packed_bits 8] #[item_settings data,variable,absolute] modifier=input;
        };
        (usage_page = LEDS, usage_min = 0x01, usage_max = 0x05) = {
            #[packed_bits 5] #[item_settings data,variable,absolute] leds=output;
        };
        (usage_page = KEYBOARD, usage_min = 0x00, usage_max = 0xEF) = {
            #[packed_bits 240] #[item_settings data,variable,absolute] keys=input;
        };
    }
)]
#[derive(Default)]
pub struct NkroReportDesc {
    pub modifier: u8,
    pub leds: u8,
    pub keys: [u8; 30],
}
