//! GPIO assignments for the beacon board.
//!
//! Single source of truth for pin numbers. The shipped board wires both
//! indicator LEDs to the same pin; `main` detects that and drives them
//! through one shared output.

/// Left indicator LED (heartbeat).
pub const LEFT_LED_GPIO: i32 = 8;
/// Right indicator LED (commit acknowledgment).
pub const RIGHT_LED_GPIO: i32 = 8;

/// Whether both indicators share one physical pin.
pub const fn indicators_share_pin() -> bool {
    LEFT_LED_GPIO == RIGHT_LED_GPIO
}
