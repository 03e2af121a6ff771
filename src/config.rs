//! Compile-time settings for the firmware core.
//!
//! Everything a board integrator may want to tune lives here; the agents pull
//! their cadences and thresholds from these constants only.

use embassy_time::Duration;

// Key matrix geometry. Slots are indexed row-major in [0, NUM_SLOTS).
pub const MATRIX_ROWS: usize = 5;
pub const MATRIX_COLS: usize = 15;
pub const NUM_SLOTS: usize = MATRIX_ROWS * MATRIX_COLS;

/// Keyboard matrix scan rate while operating in timer-based scan mode.
/// Slightly under 1 ms so the scan never beats against the 1 ms USB frame.
pub const MATRIX_SCAN_PERIOD: Duration = Duration::from_micros(997);

/// If no press is detected during the first scan burst for this many
/// back-to-back scans, the matrix agent goes back to interrupt-based sleep.
pub const MATRIX_FIRST_SCAN_MAX_COUNT: u32 = 8;

/// A key level sustained high for this many scan ticks makes a debounced
/// press. Must be >= 1.
pub const DEBOUNCE_PRESS_MS: u8 = 3;

/// A key level sustained low for this many scan ticks makes a debounced
/// release. Must be >= 1.
pub const DEBOUNCE_RELEASE_MS: u8 = 8;

/// Maximum time from press to release to be counted as a tap.
pub const TAPPING_TERM: Duration = Duration::from_millis(200);

/// Interrupt-IN endpoint polling interval. Keyboard changes are reported to
/// the host no faster than this. In Boot protocol the host polls at 10 ms.
pub const KEYBOARD_REPORT_INTERVAL_MS: u8 = 10;

/// Margin on top of the polling interval before an unacknowledged transfer
/// is treated as lost.
pub const TRANSFER_TIMEOUT_MARGIN: Duration = Duration::from_millis(1);

/// While USB is suspended key events are buffered to take effect once USB
/// reconnects. They stay in the ring only for this long, which should exceed
/// the typical switchover time (~1 second).
pub const SUSPENDED_KEY_EVENT_LIFETIME: Duration = Duration::from_secs(4);

/// Wait before USB becomes accessible after resumption. Too short and key
/// events buffered during suspend can be lost on replay.
pub const DELAY_USB_ACCESSIBLE_AFTER_RESUMED: Duration = Duration::from_millis(500);

/// If false, power to the extra port is cut while USB suspends.
pub const KEEP_CHARGING_EXTRA_DEVICE_DURING_SUSPEND: bool = true;

/// Extra port (con1/con2) measurement period.
pub const EXTRA_PORT_MEASURING_PERIOD: Duration = Duration::from_millis(5);

/// When the 5 V rail stays below STABLE for this long the extra device is
/// cut off.
pub const GRACE_TIME_TO_CUT_EXTRA: Duration = Duration::from_secs(1);

/// Status LED blink period while the host port is being determined or while
/// USB is suspended. Also paces the host-retry toggle during power-up.
pub const DEBUG_LED_BLINK_PERIOD: Duration = Duration::from_secs(1);

/// GCR ramps gracefully, changing by 1 per 5 V measurement report.
pub const RGB_GCR_CHANGE_PERIOD: Duration = Duration::from_millis(32);

/// Rate for updating RGB leds to show effects. 17 ms corresponds to ~60 fps.
pub const RGB_UPDATE_PERIOD: Duration = Duration::from_millis(17);

/// Max Global Current Control Register value; limits total LED brightness to
/// bound the power draw on the 5 V rail.
pub const RGB_LED_GCR_MAX: u8 = 255;

/// Turn off all LEDs while USB is suspended.
pub const RGB_DISABLE_WHEN_USB_SUSPENDS: bool = true;

/// Buffered NVM writes are committed after this period of idleness.
pub const NVM_WRITE_DELAY: Duration = Duration::from_millis(1000);

/// Watchdog feed period; the hardware window must be comfortably larger.
pub const WATCHDOG_FEED_INTERVAL: Duration = Duration::from_secs(1);

// ADC calibration, fixed at assembly time. All values are raw 12-bit counts.

/// 5 V rail level at which the supply is considered usable at power-up.
pub const ADC_5V_START_LEVEL: u16 = 2365;
/// Above this the rail is mid-level; LED current may ramp up.
pub const ADC_5V_LOW: u16 = 2480;
/// Above this the rail is solid.
pub const ADC_5V_HIGH: u16 = 2540;
/// Below this the rail is collapsing.
pub const ADC_5V_PANIC: u16 = 2200;

/// Nominal CC-sense reading for each port with no device attached.
pub const ADC_CON1_NOMINAL: u16 = 1840;
pub const ADC_CON2_NOMINAL: u16 = 1170;
/// Deviation from nominal that indicates a sink (below) or a rival source
/// (above) on the CC line.
pub const ADC_CON_NOMINAL_CHANGE_THR: u16 = 250;
/// Minimum CC level for a port configured as source to count as hosted.
pub const ADC_CON_HOST_CONNECTED: u16 = 100;

/// Consecutive in-range 5 V samples required at boot before the hub is
/// brought up.
pub const V5V_STABILITY_COUNT: u32 = 5;

// Queue capacities.

/// Matrix -> keymap event queue (with the defer window).
pub const KEY_EVENT_QUEUE_SIZE: usize = 16;
/// Keymap -> USB event ring. Must be a power of two.
pub const USB_EVENT_RING_SIZE: usize = 32;

// USB identity, reported through the device-stack glue.
pub const USB_VID: u16 = 0x16c0;
pub const USB_PID: u16 = 0x27dd;
pub const USB_MANUFACTURER: &str = "hubkey";
pub const USB_PRODUCT: &str = "hubkey two-port keyboard";

/// wDetachTimeOut advertised in the DFU functional descriptor.
pub const DFU_DETACH_TIMEOUT_MS: u16 = 255;

/// For Control transfers with no Data stage the Status stage must complete
/// within 50 ms of Setup; delay the detach reset at least this long so the
/// host sees the ACK.
pub const DFU_RESET_DELAY: Duration = Duration::from_millis(50);
