//! Indicator LED patterns and pin drivers.
//!
//! ## Patterns
//!
//! | Pattern    | LEDs   | Timing                    | When                  |
//! |------------|--------|---------------------------|-----------------------|
//! | Boot       | both   | 3 × (100 ms on, 100 ms off) | after advertising starts |
//! | Commit ack | right  | 5 × (50 ms on, 50 ms off)   | before restart        |
//! | Heartbeat  | left   | 2000 ms on, 1000 ms off     | forever, main loop    |
//!
//! Bursts block the caller. The heartbeat is polled and never blocks, so
//! radio events keep flowing while it runs.

use embedded_hal::digital::OutputPin;

use crate::app::ports::{IndicatorPort, SystemPort};
use crate::config::{HEARTBEAT_OFF_MS, HEARTBEAT_ON_MS};

/// Which LED(s) a burst drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Left,
    Right,
    Both,
}

fn set<H: IndicatorPort>(hw: &mut H, which: Indicator, on: bool) {
    match which {
        Indicator::Left => hw.set_left(on),
        Indicator::Right => hw.set_right(on),
        Indicator::Both => {
            hw.set_left(on);
            hw.set_right(on);
        }
    }
}

/// Blink `which` `count` times, `period_ms` on then `period_ms` off.
/// Leaves the LED(s) off.
pub fn blink_burst<H: IndicatorPort + SystemPort>(
    hw: &mut H,
    which: Indicator,
    count: u8,
    period_ms: u32,
) {
    for _ in 0..count {
        set(hw, which, true);
        hw.delay_ms(period_ms);
        set(hw, which, false);
        hw.delay_ms(period_ms);
    }
}

/// Cooperative on/off blinker for the left LED.
#[derive(Debug, Clone)]
pub struct Heartbeat {
    on_ms: u32,
    off_ms: u32,
    lit: bool,
    since_ms: Option<u32>,
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self::new(HEARTBEAT_ON_MS, HEARTBEAT_OFF_MS)
    }
}

impl Heartbeat {
    pub fn new(on_ms: u32, off_ms: u32) -> Self {
        Self {
            on_ms,
            off_ms,
            lit: false,
            since_ms: None,
        }
    }

    /// Advance to `now_ms`. Returns the new LED level when it changes.
    ///
    /// The first poll switches the LED on. Uptime wrap-around is handled.
    pub fn poll(&mut self, now_ms: u32) -> Option<bool> {
        let Some(since) = self.since_ms else {
            self.since_ms = Some(now_ms);
            self.lit = true;
            return Some(true);
        };
        let hold = if self.lit { self.on_ms } else { self.off_ms };
        if now_ms.wrapping_sub(since) < hold {
            return None;
        }
        self.lit = !self.lit;
        self.since_ms = Some(now_ms);
        Some(self.lit)
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

// ───────────────────────────────────────────────────────────────
// Pin drivers
// ───────────────────────────────────────────────────────────────

/// Two LEDs on separate output pins (active high).
pub struct PinIndicators<L, R> {
    left: L,
    right: R,
}

impl<L: OutputPin, R: OutputPin> PinIndicators<L, R> {
    pub fn new(left: L, right: R) -> Self {
        Self { left, right }
    }
}

impl<L: OutputPin, R: OutputPin> IndicatorPort for PinIndicators<L, R> {
    fn set_left(&mut self, on: bool) {
        let _ = drive(&mut self.left, on);
    }

    fn set_right(&mut self, on: bool) {
        let _ = drive(&mut self.right, on);
    }
}

/// Both logical LEDs wired to one pin. The most recent write wins, so a
/// burst on one LED stays visible while the other is lit.
pub struct SinglePinIndicator<P> {
    pin: P,
}

impl<P: OutputPin> SinglePinIndicator<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: OutputPin> IndicatorPort for SinglePinIndicator<P> {
    fn set_left(&mut self, on: bool) {
        let _ = drive(&mut self.pin, on);
    }

    fn set_right(&mut self, on: bool) {
        let _ = drive(&mut self.pin, on);
    }
}

fn drive<P: OutputPin>(pin: &mut P, on: bool) -> Result<(), P::Error> {
    if on { pin.set_high() } else { pin.set_low() }
}
