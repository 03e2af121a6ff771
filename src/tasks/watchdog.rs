//! Watchdog feeding.
//!
//! The hardware window is configured by the board well above the feed
//! interval; if the executor wedges hard enough that this task starves, the
//! watchdog resets the MCU into the bootloader for recovery.

use embassy_time::Timer;

use crate::config::WATCHDOG_FEED_INTERVAL;
use crate::drivers::WatchdogFeeder;

pub async fn watchdog_task(mut watchdog: impl WatchdogFeeder) -> ! {
    log::info!("Watchdog: feeding every {}s", WATCHDOG_FEED_INTERVAL.as_secs());

    loop {
        watchdog.feed();
        Timer::after(WATCHDOG_FEED_INTERVAL).await;
    }
}
