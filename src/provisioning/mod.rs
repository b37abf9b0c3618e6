//! Provisioning state machine.
//!
//! ```text
//!            connect            write             valid document
//!   Idle ────────────▶ Connected ─────▶ Accumulating ─────────────▶ Committing
//!    ▲                     │                 │                     (terminal)
//!    └──── disconnect ─────┴─────────────────┘
//! ```
//!
//! One session at a time, keyed by the connection handle that opened it.
//! Writes from any other handle are dropped. A write that arrives before
//! its connect event opens the session implicitly.
//!
//! After every write the buffer is assessed. Incomplete documents wait
//! for more bytes without a timeout. A complete but invalid document is
//! reported and left in the buffer; only a disconnect starts over. A
//! valid document is saved and the device acknowledges, settles and
//! restarts. Once `Committing`, every event is ignored.

pub mod document;
pub mod reassembly;

use log::{error, info, warn};

use crate::advertiser::AdvertiserController;
use crate::app::events::BeaconEvent;
use crate::app::ports::{EventSink, IndicatorPort, RadioPort, StoragePort, SystemPort};
use crate::config::{BeaconConfig, COMMIT_BLINK_COUNT, COMMIT_BLINK_MS, COMMIT_SETTLE_MS};
use crate::config_store::ConfigStore;
use crate::drivers::indicator::{self, Indicator};
use crate::events::ConnHandle;

use document::{Assessment, Rejection};
use reassembly::ReassemblyBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningState {
    /// No central connected; advertising.
    Idle,
    /// A session is open, nothing buffered.
    Connected,
    /// Fragments are buffered.
    Accumulating,
    /// A new config was saved; restart is under way.
    Committing,
}

/// What a single write led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Dropped: foreign connection, or already committing.
    Ignored,
    /// Appended; the document is not complete yet.
    Buffered,
    /// The buffer holds a complete document that was rejected.
    Rejected(Rejection),
    /// The bound was exceeded and the pending bytes were discarded.
    Overflowed,
    /// The config was saved and the restart sequence ran.
    Committed,
    /// The config could not be saved; the session stays open.
    SaveFailed,
}

pub struct ProvisioningMachine {
    state: ProvisioningState,
    session: Option<ConnHandle>,
    buffer: ReassemblyBuffer,
    last_rejection: Option<Rejection>,
    advertiser: AdvertiserController,
}

impl ProvisioningMachine {
    pub fn new(advertiser: AdvertiserController) -> Self {
        Self {
            state: ProvisioningState::Idle,
            session: None,
            buffer: ReassemblyBuffer::new(),
            last_rejection: None,
            advertiser,
        }
    }

    pub fn state(&self) -> ProvisioningState {
        self.state
    }

    /// Handle of the connection that owns the session.
    pub fn session(&self) -> Option<ConnHandle> {
        self.session
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Reason the most recent complete document was rejected, if the
    /// current session has seen one.
    pub fn last_rejection(&self) -> Option<Rejection> {
        self.last_rejection
    }

    pub fn advertiser(&self) -> &AdvertiserController {
        &self.advertiser
    }

    pub fn on_connect(&mut self, conn: ConnHandle, sink: &mut impl EventSink) {
        match (self.state, self.session) {
            (ProvisioningState::Committing, _) => {
                info!("PROV: connect {} ignored while committing", conn);
            }
            (_, Some(owner)) if owner != conn => {
                warn!("PROV: connect {} ignored, session owned by {}", conn, owner);
            }
            (_, Some(_)) => {}
            (_, None) => {
                info!("PROV: session opened by {}", conn);
                self.session = Some(conn);
                self.transition(ProvisioningState::Connected, sink);
            }
        }
    }

    /// End the session and advertise again.
    pub fn on_disconnect(
        &mut self,
        conn: ConnHandle,
        config: &BeaconConfig,
        radio: &mut impl RadioPort,
        sink: &mut impl EventSink,
    ) {
        if self.state == ProvisioningState::Committing {
            info!("PROV: disconnect {} ignored while committing", conn);
            return;
        }
        if let Some(owner) = self.session {
            if owner != conn {
                info!("PROV: disconnect {} does not own the session, ignored", conn);
                return;
            }
        }
        if !self.buffer.is_empty() {
            info!("PROV: discarding {} buffered bytes", self.buffer.len());
        }
        self.buffer.clear();
        self.session = None;
        self.last_rejection = None;
        self.transition(ProvisioningState::Idle, sink);
        self.advertiser.start(config, radio, sink);
    }

    pub fn on_write<H, S>(
        &mut self,
        conn: ConnHandle,
        data: &[u8],
        hw: &mut H,
        store: &mut ConfigStore<S>,
        sink: &mut impl EventSink,
    ) -> WriteOutcome
    where
        H: IndicatorPort + SystemPort,
        S: StoragePort,
    {
        if self.state == ProvisioningState::Committing {
            info!("PROV: write from {} ignored while committing", conn);
            return WriteOutcome::Ignored;
        }
        match self.session {
            None => {
                info!("PROV: write before connect, session opened by {}", conn);
                self.session = Some(conn);
                self.transition(ProvisioningState::Connected, sink);
            }
            Some(owner) if owner != conn => {
                warn!(
                    "PROV: dropped {} bytes from {}, session owned by {}",
                    data.len(),
                    conn,
                    owner
                );
                sink.emit(&BeaconEvent::ForeignWriteDropped { conn });
                return WriteOutcome::Ignored;
            }
            Some(_) => {}
        }

        if let Err(overflow) = self.buffer.append(data) {
            warn!(
                "PROV: document exceeds {} bytes, discarded {}",
                reassembly::MAX_DOCUMENT_LEN,
                overflow.discarded
            );
            sink.emit(&BeaconEvent::BufferOverflow {
                discarded: overflow.discarded,
            });
            self.transition(ProvisioningState::Connected, sink);
            return WriteOutcome::Overflowed;
        }
        self.transition(ProvisioningState::Accumulating, sink);

        let assessment = match self.buffer.text() {
            Some(text) => document::assess(text),
            None => Assessment::Incomplete,
        };
        match assessment {
            Assessment::Incomplete => WriteOutcome::Buffered,
            Assessment::Invalid(reason) => {
                warn!("PROV: document rejected: {}", reason);
                self.last_rejection = Some(reason);
                sink.emit(&BeaconEvent::DocumentRejected(reason));
                WriteOutcome::Rejected(reason)
            }
            Assessment::Valid(config) => self.commit(config, hw, store, sink),
        }
    }

    /// Persist `config`, acknowledge, settle and restart.
    fn commit<H, S>(
        &mut self,
        config: BeaconConfig,
        hw: &mut H,
        store: &mut ConfigStore<S>,
        sink: &mut impl EventSink,
    ) -> WriteOutcome
    where
        H: IndicatorPort + SystemPort,
        S: StoragePort,
    {
        self.buffer.clear();
        if let Err(e) = store.save(&config) {
            error!("PROV: saving config failed: {}", e);
            self.transition(ProvisioningState::Connected, sink);
            return WriteOutcome::SaveFailed;
        }

        info!(
            "PROV: committed mac={} adv_hex={}",
            config.mac, config.adv_hex
        );
        self.transition(ProvisioningState::Committing, sink);
        sink.emit(&BeaconEvent::Committed(config));

        indicator::blink_burst(hw, Indicator::Right, COMMIT_BLINK_COUNT, COMMIT_BLINK_MS);
        hw.delay_ms(COMMIT_SETTLE_MS);
        info!("PROV: restarting to apply new config");
        hw.restart();
        WriteOutcome::Committed
    }

    fn transition(&mut self, to: ProvisioningState, sink: &mut impl EventSink) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        info!("PROV: {:?} -> {:?}", from, to);
        sink.emit(&BeaconEvent::StateChanged { from, to });
    }
}
