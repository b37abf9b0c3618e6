//! Radio event bridge.
//!
//! Events are produced by the BLE stack callbacks (Bluedroid task on
//! ESP-IDF) and consumed by the main loop, which handles them one at a
//! time and to completion. The provisioning state machine therefore never
//! sees two events concurrently and needs no locking.
//!
//! A full queue drops connects and writes (the GATT layer reports the
//! write as failed). A disconnect is never dropped: it is latched and
//! delivered once the queue has drained, because advertising only
//! resumes when the main loop sees it.
//!
//! ```text
//! ┌─────────────┐     ┌───────────────┐     ┌──────────────┐
//! │ GAP/GATTS   │────▶│ RADIO_EVENTS  │────▶│  Main Loop   │
//! │ callbacks   │     │ (bounded, 8)  │     │  (consumer)  │
//! └─────────────┘     └───────────────┘     └──────────────┘
//! ```

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};

/// Connection handle assigned by the radio stack.
pub type ConnHandle = u16;

/// Largest single characteristic write (negotiated MTU payload).
pub const MAX_WRITE_LEN: usize = 512;

/// Queue depth. A burst larger than this drops connects and writes.
pub const EVENT_QUEUE_DEPTH: usize = 8;

/// Disconnects held back while the queue is full. Matches the
/// controller's connection limit.
const LATCHED_DISCONNECTS: usize = 4;

/// Fixed-capacity payload of one characteristic write.
pub type WriteData = heapless::Vec<u8, MAX_WRITE_LEN>;

/// Events delivered by the radio stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioEvent {
    /// A central connected.
    Connected { conn: ConnHandle },
    /// A central disconnected; the stack has stopped advertising.
    Disconnected { conn: ConnHandle },
    /// Bytes written to the provisioning characteristic.
    Write { conn: ConnHandle, data: WriteData },
}

impl RadioEvent {
    /// Build a write event, or `None` if `bytes` exceeds [`MAX_WRITE_LEN`].
    pub fn write(conn: ConnHandle, bytes: &[u8]) -> Option<Self> {
        let data = WriteData::from_slice(bytes).ok()?;
        Some(Self::Write { conn, data })
    }
}

static RADIO_EVENTS: Channel<CriticalSectionRawMutex, RadioEvent, EVENT_QUEUE_DEPTH> =
    Channel::new();

static DISCONNECT_LATCH: Mutex<
    CriticalSectionRawMutex,
    RefCell<heapless::Deque<ConnHandle, LATCHED_DISCONNECTS>>,
> = Mutex::new(RefCell::new(heapless::Deque::new()));

/// Push an event into the queue.
///
/// Returns `false` if the event was dropped. A disconnect that does not
/// fit is latched instead and only lost when the latch is full too.
pub fn push_event(event: RadioEvent) -> bool {
    match RADIO_EVENTS.try_send(event) {
        Ok(()) => true,
        Err(TrySendError::Full(RadioEvent::Disconnected { conn })) => {
            DISCONNECT_LATCH.lock(|latch| latch.borrow_mut().push_back(conn).is_ok())
        }
        Err(TrySendError::Full(_)) => false,
    }
}

/// Pop the next event, or `None` if nothing is pending. Latched
/// disconnects follow everything that was queued before them.
pub fn pop_event() -> Option<RadioEvent> {
    if let Ok(event) = RADIO_EVENTS.try_receive() {
        return Some(event);
    }
    DISCONNECT_LATCH
        .lock(|latch| latch.borrow_mut().pop_front())
        .map(|conn| RadioEvent::Disconnected { conn })
}

/// Drain all pending events into a callback, in FIFO order.
pub fn drain_events(mut handler: impl FnMut(RadioEvent)) {
    while let Some(event) = pop_event() {
        handler(event);
    }
}

/// Number of pending events, latched disconnects included.
pub fn queue_len() -> usize {
    RADIO_EVENTS.len() + DISCONNECT_LATCH.lock(|latch| latch.borrow().len())
}

/// Serialises tests that touch the process-wide queue.
#[cfg(test)]
pub(crate) fn queue_test_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
