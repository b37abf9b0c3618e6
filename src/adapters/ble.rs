//! BLE radio adapter.
//!
//! Implements [`RadioPort`] on top of the Bluedroid host stack.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: Bluedroid GAP/GATTS via raw `esp_idf_svc::sys` calls.
//! - **all other targets**: simulation backend that records what it was asked to do.
//!
//! ## GATT Service Layout
//!
//! | Characteristic | UUID                                   | Perms               |
//! |----------------|----------------------------------------|---------------------|
//! | Configuration  | `6E400002-B5A3-F393-E0A9-E50E24DCCA9E` | Write, Write w/o rsp |
//!
//! Callbacks translate stack events into [`RadioEvent`]s on the bridge
//! queue and nothing else; all provisioning logic runs in the main loop.
//! Long (prepared) writes are collected here and delivered as a single
//! write on execute. A write is acknowledged only after it has been
//! queued; a full queue or an oversized value is reported back to the
//! client as a GATT error so it can resend.

use core::fmt;
use log::{info, warn};

use crate::app::ports::{AdvertisingParams, RadioError, RadioPort};
use crate::events::{ConnHandle, MAX_WRITE_LEN, RadioEvent, WriteData};
use crate::mac::MacAddress;

#[cfg(target_os = "espidf")]
use crate::config::{CONFIG_CHAR_UUID, SERVICE_UUID};

/// `ESP_ERR_INVALID_ARG`, reported by the simulation for oversized data.
#[cfg(not(target_os = "espidf"))]
const SIM_ERR_INVALID_ARG: i32 = 0x102;
/// `ESP_ERR_INVALID_STATE`, reported by the simulation when not activated.
#[cfg(not(target_os = "espidf"))]
const SIM_ERR_INVALID_STATE: i32 = 0x103;
#[cfg(not(target_os = "espidf"))]
const LEGACY_ADV_LEN: usize = crate::config::MAX_ADV_DATA_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BleState {
    /// Controller not started.
    Idle,
    /// Stack up, not advertising.
    Ready,
    Advertising,
    Failed,
}

// ───────────────────────────────────────────────────────────────
// Prepared (long) writes
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepareError {
    /// Fragment offset does not continue the queued value.
    InvalidOffset,
    /// Queued value would exceed [`MAX_WRITE_LEN`].
    TooLong,
}

impl fmt::Display for PrepareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOffset => write!(f, "prepared write offset out of sequence"),
            Self::TooLong => write!(f, "prepared write exceeds {} bytes", MAX_WRITE_LEN),
        }
    }
}

/// Queue for one connection's prepared write. Fixed capacity so the
/// GATTS callback never allocates.
#[derive(Debug)]
pub struct PreparedWrite {
    conn: Option<ConnHandle>,
    value: WriteData,
}

impl Default for PreparedWrite {
    fn default() -> Self {
        Self::new()
    }
}

impl PreparedWrite {
    pub const fn new() -> Self {
        Self {
            conn: None,
            value: heapless::Vec::new(),
        }
    }

    /// Queue a fragment. A fragment from a different connection starts a
    /// new queue. On error the queue is dropped.
    pub fn prepare(
        &mut self,
        conn: ConnHandle,
        offset: u16,
        data: &[u8],
    ) -> Result<(), PrepareError> {
        if self.conn != Some(conn) {
            self.cancel();
            self.conn = Some(conn);
        }
        if usize::from(offset) != self.value.len() {
            self.cancel();
            return Err(PrepareError::InvalidOffset);
        }
        if self.value.extend_from_slice(data).is_err() {
            self.cancel();
            return Err(PrepareError::TooLong);
        }
        Ok(())
    }

    /// Take the queued value for `conn`, if any.
    pub fn execute(&mut self, conn: ConnHandle) -> Option<WriteData> {
        if self.conn != Some(conn) || self.value.is_empty() {
            self.cancel();
            return None;
        }
        let value = core::mem::take(&mut self.value);
        self.conn = None;
        Some(value)
    }

    pub fn cancel(&mut self) {
        self.conn = None;
        self.value.clear();
    }
}

/// Why an event could not be handed to the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    /// The write does not fit one [`RadioEvent`].
    TooLong(usize),
    /// The bridge queue is full.
    QueueFull,
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong(len) => write!(f, "{}-byte write exceeds {} bytes", len, MAX_WRITE_LEN),
            Self::QueueFull => write!(f, "event queue full"),
        }
    }
}

/// Push onto the bridge queue.
pub fn deliver(event: RadioEvent) -> Result<(), DeliveryError> {
    if crate::events::push_event(event) {
        Ok(())
    } else {
        Err(DeliveryError::QueueFull)
    }
}

/// Queue a characteristic write. A write that needs a response is only
/// acknowledged once this has succeeded.
pub fn deliver_write(conn: ConnHandle, data: &[u8]) -> Result<(), DeliveryError> {
    let event = RadioEvent::write(conn, data).ok_or(DeliveryError::TooLong(data.len()))?;
    deliver(event)
}

/// Push a connection event, logging drops.
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
fn forward(event: RadioEvent) {
    if let Err(e) = deliver(event) {
        warn!("BLE: {}, event dropped", e);
    }
}

/// GATT status reported for a write that could not be queued.
#[cfg(target_os = "espidf")]
fn delivery_status(result: Result<(), DeliveryError>) -> esp_idf_svc::sys::esp_gatt_status_t {
    use esp_idf_svc::sys::*;
    match result {
        Ok(()) => esp_gatt_status_t_ESP_GATT_OK,
        Err(e) => {
            warn!("BLE GATTS: {}, write refused", e);
            match e {
                DeliveryError::TooLong(_) => esp_gatt_status_t_ESP_GATT_INVALID_ATTR_LEN,
                DeliveryError::QueueFull => esp_gatt_status_t_ESP_GATT_NO_RESOURCES,
            }
        }
    }
}

// ── ESP-IDF BLE static state ──────────────────────────────────
//
// Bluedroid callbacks are C function pointers that cannot capture Rust
// closures. These statics bridge the callback context to the adapter.

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicU8, AtomicU32, Ordering as AtomicOrdering};

#[cfg(target_os = "espidf")]
static BLE_GATTS_IF: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_CONFIG_CHAR_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_ADV_INTERVAL_UNITS: AtomicU32 = AtomicU32::new(0x00A0);

/// Raw advertising data / scan response configuration still in flight.
/// Advertising starts once both completions have arrived.
#[cfg(target_os = "espidf")]
static BLE_ADV_PENDING: AtomicU8 = AtomicU8::new(0);
#[cfg(target_os = "espidf")]
const ADV_DATA_PENDING: u8 = 0b01;
#[cfg(target_os = "espidf")]
const SCAN_RSP_PENDING: u8 = 0b10;

// GATTS callbacks run in the Bluedroid task (not ISR), so std Mutex is safe.
#[cfg(target_os = "espidf")]
static BLE_PREPARED: std::sync::Mutex<PreparedWrite> = std::sync::Mutex::new(PreparedWrite::new());

#[cfg(target_os = "espidf")]
fn uuid128_to_esp(uuid: u128) -> esp_idf_svc::sys::esp_bt_uuid_t {
    let mut t: esp_idf_svc::sys::esp_bt_uuid_t = unsafe { core::mem::zeroed() };
    t.len = 16;
    t.uuid.uuid128 = uuid.to_le_bytes();
    t
}

/// Clear one pending bit; start advertising when none remain.
#[cfg(target_os = "espidf")]
fn adv_config_done(bit: u8) {
    let prev = BLE_ADV_PENDING.fetch_and(!bit, AtomicOrdering::AcqRel);
    if prev & bit != 0 && prev & !bit == 0 {
        start_advertising_now();
    }
}

#[cfg(target_os = "espidf")]
fn start_advertising_now() {
    use esp_idf_svc::sys::*;
    let units = BLE_ADV_INTERVAL_UNITS.load(AtomicOrdering::Relaxed) as u16;
    let mut adv_params = esp_ble_adv_params_t {
        adv_int_min: units,
        adv_int_max: units,
        adv_type: esp_ble_adv_type_t_ADV_TYPE_IND,
        own_addr_type: esp_ble_addr_type_t_BLE_ADDR_TYPE_PUBLIC,
        channel_map: esp_ble_adv_channel_t_ADV_CHNL_ALL,
        adv_filter_policy: esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_ANY_CON_ANY,
        ..unsafe { core::mem::zeroed() }
    };
    let ret = unsafe { esp_ble_gap_start_advertising(&mut adv_params) };
    if ret != ESP_OK as i32 {
        warn!("BLE GAP: start_advertising failed ({})", ret);
    }
}

#[cfg(target_os = "espidf")]
unsafe fn send_response(
    gatts_if: esp_idf_svc::sys::esp_gatt_if_t,
    conn_id: u16,
    trans_id: u32,
    status: esp_idf_svc::sys::esp_gatt_status_t,
    rsp: *mut esp_idf_svc::sys::esp_gatt_rsp_t,
) {
    let ret = unsafe {
        esp_idf_svc::sys::esp_ble_gatts_send_response(gatts_if, conn_id, trans_id, status, rsp)
    };
    if ret != esp_idf_svc::sys::ESP_OK as i32 {
        warn!("BLE GATTS: send_response failed ({})", ret);
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gap_event_handler(
    event: esp_idf_svc::sys::esp_gap_ble_cb_event_t,
    param: *mut esp_idf_svc::sys::esp_ble_gap_cb_param_t,
) {
    use esp_idf_svc::sys::*;
    match event {
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_DATA_RAW_SET_COMPLETE_EVT => {
            adv_config_done(ADV_DATA_PENDING);
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_SCAN_RSP_DATA_RAW_SET_COMPLETE_EVT => {
            adv_config_done(SCAN_RSP_PENDING);
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_START_COMPLETE_EVT => {
            let status = unsafe { (*param).adv_start_cmpl.status };
            if status == esp_bt_status_t_ESP_BT_STATUS_SUCCESS {
                info!("BLE GAP: advertising started");
            } else {
                warn!("BLE GAP: advertising start failed (status={})", status);
            }
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_STOP_COMPLETE_EVT => {
            info!("BLE GAP: advertising stopped");
        }
        _ => {}
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gatts_event_handler(
    event: esp_idf_svc::sys::esp_gatts_cb_event_t,
    gatts_if: esp_idf_svc::sys::esp_gatt_if_t,
    param: *mut esp_idf_svc::sys::esp_ble_gatts_cb_param_t,
) {
    use esp_idf_svc::sys::*;

    match event {
        esp_gatts_cb_event_t_ESP_GATTS_REG_EVT => {
            BLE_GATTS_IF.store(gatts_if as u32, AtomicOrdering::Relaxed);
            info!("BLE GATTS: app registered (if={})", gatts_if);
            let mut svc_id = esp_gatt_srvc_id_t {
                id: esp_gatt_id_t {
                    uuid: uuid128_to_esp(SERVICE_UUID),
                    inst_id: 0,
                },
                is_primary: true,
            };
            // Service declaration + characteristic declaration + value.
            unsafe { esp_ble_gatts_create_service(gatts_if, &mut svc_id, 4) };
        }
        esp_gatts_cb_event_t_ESP_GATTS_CREATE_EVT => {
            let svc_handle = unsafe { (*param).create.service_handle };
            info!("BLE GATTS: service created (handle={})", svc_handle);
            let mut char_uuid = uuid128_to_esp(CONFIG_CHAR_UUID);
            unsafe {
                esp_ble_gatts_start_service(svc_handle);
                esp_ble_gatts_add_char(
                    svc_handle,
                    &mut char_uuid,
                    ESP_GATT_PERM_WRITE as esp_gatt_perm_t,
                    (ESP_GATT_CHAR_PROP_BIT_WRITE | ESP_GATT_CHAR_PROP_BIT_WRITE_NR)
                        as esp_gatt_char_prop_t,
                    core::ptr::null_mut(),
                    core::ptr::null_mut(),
                );
            }
        }
        esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_EVT => {
            let handle = unsafe { (*param).add_char.attr_handle };
            BLE_CONFIG_CHAR_HANDLE.store(handle as u32, AtomicOrdering::Relaxed);
            info!("BLE GATTS: config char (handle={})", handle);
        }
        esp_gatts_cb_event_t_ESP_GATTS_CONNECT_EVT => {
            let conn = unsafe { (*param).connect.conn_id };
            info!("BLE GATTS: client connected (conn_id={})", conn);
            forward(RadioEvent::Connected { conn });
        }
        esp_gatts_cb_event_t_ESP_GATTS_DISCONNECT_EVT => {
            let conn = unsafe { (*param).disconnect.conn_id };
            info!("BLE GATTS: client disconnected (conn_id={})", conn);
            if let Ok(mut q) = BLE_PREPARED.lock() {
                q.cancel();
            }
            forward(RadioEvent::Disconnected { conn });
        }
        esp_gatts_cb_event_t_ESP_GATTS_MTU_EVT => {
            let p = unsafe { &(*param).mtu };
            info!("BLE GATTS: MTU {} (conn_id={})", p.mtu, p.conn_id);
        }
        esp_gatts_cb_event_t_ESP_GATTS_WRITE_EVT => {
            let p = unsafe { &(*param).write };
            let data = unsafe { core::slice::from_raw_parts(p.value, p.len as usize) };

            if u32::from(p.handle) != BLE_CONFIG_CHAR_HANDLE.load(AtomicOrdering::Relaxed) {
                if p.need_rsp {
                    unsafe {
                        send_response(
                            gatts_if,
                            p.conn_id,
                            p.trans_id,
                            esp_gatt_status_t_ESP_GATT_WRITE_NOT_PERMIT,
                            core::ptr::null_mut(),
                        );
                    }
                }
                return;
            }

            if p.is_prep {
                let status = match BLE_PREPARED.lock() {
                    Ok(mut q) => match q.prepare(p.conn_id, p.offset, data) {
                        Ok(()) => esp_gatt_status_t_ESP_GATT_OK,
                        Err(e) => {
                            warn!("BLE GATTS: {}", e);
                            match e {
                                PrepareError::InvalidOffset => esp_gatt_status_t_ESP_GATT_INVALID_OFFSET,
                                PrepareError::TooLong => esp_gatt_status_t_ESP_GATT_INVALID_ATTR_LEN,
                            }
                        }
                    },
                    Err(_) => esp_gatt_status_t_ESP_GATT_ERROR,
                };
                // Prepare-write responses echo the fragment back.
                let mut rsp: esp_gatt_rsp_t = unsafe { core::mem::zeroed() };
                unsafe {
                    rsp.attr_value.handle = p.handle;
                    rsp.attr_value.offset = p.offset;
                    rsp.attr_value.len = p.len;
                    rsp.attr_value.auth_req = ESP_GATT_AUTH_REQ_NONE as u8;
                    let n = data.len().min(rsp.attr_value.value.len());
                    rsp.attr_value.value[..n].copy_from_slice(&data[..n]);
                    send_response(gatts_if, p.conn_id, p.trans_id, status, &mut rsp);
                }
                return;
            }

            let status = delivery_status(deliver_write(p.conn_id, data));
            if p.need_rsp {
                unsafe {
                    send_response(gatts_if, p.conn_id, p.trans_id, status, core::ptr::null_mut());
                }
            }
        }
        esp_gatts_cb_event_t_ESP_GATTS_EXEC_WRITE_EVT => {
            let p = unsafe { &(*param).exec_write };
            let status = match BLE_PREPARED.lock() {
                Ok(mut q) if u32::from(p.exec_write_flag) == ESP_GATT_PREP_WRITE_EXEC => {
                    match q.execute(p.conn_id) {
                        Some(data) => delivery_status(deliver(RadioEvent::Write {
                            conn: p.conn_id,
                            data,
                        })),
                        None => esp_gatt_status_t_ESP_GATT_OK,
                    }
                }
                Ok(mut q) => {
                    q.cancel();
                    esp_gatt_status_t_ESP_GATT_OK
                }
                Err(_) => esp_gatt_status_t_ESP_GATT_ERROR,
            };
            unsafe {
                send_response(gatts_if, p.conn_id, p.trans_id, status, core::ptr::null_mut());
            }
        }
        _ => {}
    }
}

// ───────────────────────────────────────────────────────────────
// BLE adapter
// ───────────────────────────────────────────────────────────────

pub struct BleAdapter {
    state: BleState,
    base: Option<MacAddress>,
    mtu: Option<u16>,
    advertising_starts: u32,
    #[cfg(not(target_os = "espidf"))]
    last_params: Option<AdvertisingParams>,
}

impl Default for BleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl BleAdapter {
    pub fn new() -> Self {
        Self {
            state: BleState::Idle,
            base: None,
            mtu: None,
            advertising_starts: 0,
            #[cfg(not(target_os = "espidf"))]
            last_params: None,
        }
    }

    pub fn state(&self) -> BleState {
        self.state
    }

    /// Base address programmed this boot.
    pub fn base_address(&self) -> Option<MacAddress> {
        self.base
    }

    pub fn local_mtu(&self) -> Option<u16> {
        self.mtu
    }

    pub fn advertising_starts(&self) -> u32 {
        self.advertising_starts
    }

    /// Parameters of the most recent successful advertising start.
    #[cfg(not(target_os = "espidf"))]
    pub fn last_params(&self) -> Option<&AdvertisingParams> {
        self.last_params.as_ref()
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_set_base(&mut self, base: MacAddress) -> Result<(), RadioError> {
        use esp_idf_svc::sys::*;
        let octets = base.octets();
        let ret = unsafe { esp_base_mac_addr_set(octets.as_ptr()) };
        if ret != ESP_OK as i32 {
            return Err(RadioError::BaseAddressRejected(ret));
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_set_base(&mut self, base: MacAddress) -> Result<(), RadioError> {
        info!("BLE(sim): base address {}", base);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_activate(&mut self) -> Result<(), RadioError> {
        use esp_idf_svc::sys::*;
        let check = |ret: i32, what: &str| {
            if ret == ESP_OK as i32 {
                Ok(())
            } else {
                log::error!("BLE: {} failed ({})", what, ret);
                Err(RadioError::InitFailed(ret))
            }
        };
        unsafe {
            // Release classic BT memory (BLE-only mode saves ~30 KB).
            esp_bt_controller_mem_release(esp_bt_mode_t_ESP_BT_MODE_CLASSIC_BT);

            let mut bt_cfg = esp_bt_controller_config_t::default();
            check(esp_bt_controller_init(&mut bt_cfg), "bt_controller_init")?;
            check(
                esp_bt_controller_enable(esp_bt_mode_t_ESP_BT_MODE_BLE),
                "bt_controller_enable",
            )?;
            check(esp_bluedroid_init(), "bluedroid_init")?;
            check(esp_bluedroid_enable(), "bluedroid_enable")?;

            check(
                esp_ble_gap_register_callback(Some(ble_gap_event_handler)),
                "gap_register_callback",
            )?;
            check(
                esp_ble_gatts_register_callback(Some(ble_gatts_event_handler)),
                "gatts_register_callback",
            )?;
            check(esp_ble_gatts_app_register(0), "gatts_app_register")?;
        }
        info!("BLE(espidf): Bluedroid stack initialised");
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_activate(&mut self) -> Result<(), RadioError> {
        info!("BLE(sim): stack up");
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_set_mtu(&mut self, mtu: u16) -> Result<(), RadioError> {
        let ret = unsafe { esp_idf_svc::sys::esp_ble_gatt_set_local_mtu(mtu) };
        if ret != esp_idf_svc::sys::ESP_OK as i32 {
            return Err(RadioError::MtuRejected(ret));
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_set_mtu(&mut self, mtu: u16) -> Result<(), RadioError> {
        info!("BLE(sim): local MTU {}", mtu);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_advertise(&mut self, params: &AdvertisingParams) -> Result<(), RadioError> {
        use esp_idf_svc::sys::*;
        let units = crate::advertiser::interval_units(params.interval_us);
        BLE_ADV_INTERVAL_UNITS.store(u32::from(units), AtomicOrdering::Relaxed);

        unsafe {
            // Not advertising is reported as an error here; nothing to undo.
            esp_ble_gap_stop_advertising();

            BLE_ADV_PENDING.store(ADV_DATA_PENDING | SCAN_RSP_PENDING, AtomicOrdering::Release);
            // Bluedroid copies both buffers before returning.
            let ret = esp_ble_gap_config_adv_data_raw(
                params.adv_data.as_ptr() as *mut u8,
                params.adv_data.len() as u32,
            );
            if ret != ESP_OK as i32 {
                BLE_ADV_PENDING.store(0, AtomicOrdering::Release);
                return Err(RadioError::AdvertisingFailed(ret));
            }
            let ret = esp_ble_gap_config_scan_rsp_data_raw(
                params.scan_response.as_ptr() as *mut u8,
                params.scan_response.len() as u32,
            );
            if ret != ESP_OK as i32 {
                BLE_ADV_PENDING.store(0, AtomicOrdering::Release);
                return Err(RadioError::AdvertisingFailed(ret));
            }
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_advertise(&mut self, params: &AdvertisingParams) -> Result<(), RadioError> {
        if self.state == BleState::Idle {
            return Err(RadioError::AdvertisingFailed(SIM_ERR_INVALID_STATE));
        }
        if params.adv_data.len() > LEGACY_ADV_LEN || params.scan_response.len() > LEGACY_ADV_LEN {
            return Err(RadioError::AdvertisingFailed(SIM_ERR_INVALID_ARG));
        }
        info!(
            "BLE(sim): advertising {} + {} bytes",
            params.adv_data.len(),
            params.scan_response.len()
        );
        self.last_params = Some(params.clone());
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// RadioPort implementation
// ───────────────────────────────────────────────────────────────

impl RadioPort for BleAdapter {
    fn set_base_address(&mut self, base: MacAddress) -> Result<(), RadioError> {
        if self.state != BleState::Idle {
            warn!("BLE: base address changed after activation, effect undefined");
        }
        self.platform_set_base(base)?;
        self.base = Some(base);
        info!("BLE: base address set to {}", base);
        Ok(())
    }

    fn activate(&mut self) -> Result<(), RadioError> {
        match self.platform_activate() {
            Ok(()) => {
                self.state = BleState::Ready;
                Ok(())
            }
            Err(e) => {
                self.state = BleState::Failed;
                Err(e)
            }
        }
    }

    fn set_local_mtu(&mut self, mtu: u16) -> Result<(), RadioError> {
        self.platform_set_mtu(mtu)?;
        self.mtu = Some(mtu);
        Ok(())
    }

    fn start_advertising(&mut self, params: &AdvertisingParams) -> Result<(), RadioError> {
        self.platform_advertise(params)?;
        self.state = BleState::Advertising;
        self.advertising_starts += 1;
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
