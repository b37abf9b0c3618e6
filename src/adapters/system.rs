//! ESP32 system adapter.
//!
//! Implements [`SystemPort`]: monotonic uptime, blocking delay and warm
//! restart.
//!
//! - **`target_os = "espidf"`**: `esp_timer_get_time()`, FreeRTOS delay
//!   and `esp_restart()`.
//! - **`not(target_os = "espidf")`**: `std::time::Instant` and
//!   `std::thread::sleep`; restart is recorded instead of performed.

use log::info;

use crate::app::ports::SystemPort;

pub struct Esp32System {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
    #[cfg(not(target_os = "espidf"))]
    restart_requested: bool,
}

impl Default for Esp32System {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32System {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
            #[cfg(not(target_os = "espidf"))]
            restart_requested: false,
        }
    }

    /// Whether [`SystemPort::restart`] was called (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn restart_requested(&self) -> bool {
        self.restart_requested
    }
}

impl SystemPort for Esp32System {
    #[cfg(target_os = "espidf")]
    fn uptime_ms(&self) -> u32 {
        // Truncation wraps every ~49 days; consumers use wrapping arithmetic.
        ((unsafe { esp_idf_svc::sys::esp_timer_get_time() }) / 1_000) as u32
    }

    #[cfg(not(target_os = "espidf"))]
    fn uptime_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }

    #[cfg(target_os = "espidf")]
    fn delay_ms(&mut self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }

    #[cfg(target_os = "espidf")]
    fn restart(&mut self) {
        info!("SYS: restarting");
        // SAFETY: esp_restart has no preconditions and does not return.
        unsafe { esp_idf_svc::sys::esp_restart() };
    }

    #[cfg(not(target_os = "espidf"))]
    fn restart(&mut self) {
        info!("SYS(sim): restart requested");
        self.restart_requested = true;
    }
}
