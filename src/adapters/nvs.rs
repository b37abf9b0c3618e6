//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`StoragePort`] on the default NVS partition. Values are
//! stored as blobs; each subsystem uses its own namespace.
//!
//! - **`target_os = "espidf"`**: ESP-IDF `nvs_*` API. Every write is
//!   followed by `nvs_commit()`.
//! - **all other targets**: in-memory map for host-side tests.

use crate::app::ports::{StorageError, StoragePort};
use log::info;

#[cfg(target_os = "espidf")]
use log::warn;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// NVS namespace and key names are limited to 15 characters.
#[cfg(target_os = "espidf")]
const NVS_NAME_MAX: usize = 15;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Initialise NVS flash.
    ///
    /// On first boot or after a layout version change the partition is
    /// erased and re-initialised.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from the main task before any other NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as i32 || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as i32
            {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK as i32 {
                    return Err(StorageError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK as i32 {
                    return Err(StorageError::IoError);
                }
            } else if ret != ESP_OK as i32 {
                return Err(StorageError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// NUL-terminated copy of a namespace or key name, truncated to the
    /// NVS limit.
    #[cfg(target_os = "espidf")]
    fn c_name(name: &str) -> [u8; NVS_NAME_MAX + 1] {
        let mut buf = [0u8; NVS_NAME_MAX + 1];
        let bytes = name.as_bytes();
        let len = bytes.len().min(NVS_NAME_MAX);
        buf[..len].copy_from_slice(&bytes[..len]);
        buf
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let ns = Self::c_name(namespace);
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    #[cfg(target_os = "espidf")]
    fn map_err(ret: i32) -> StorageError {
        if ret == ESP_ERR_NVS_NOT_FOUND as i32 {
            StorageError::NotFound
        } else if ret == ESP_ERR_NVS_NOT_ENOUGH_SPACE as i32 {
            StorageError::Full
        } else {
            StorageError::IoError
        }
    }
}

impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            match self.store.borrow().get(&composite) {
                Some(data) if data.len() > buf.len() => Err(StorageError::IoError),
                Some(data) => {
                    buf[..data.len()].copy_from_slice(data);
                    Ok(data.len())
                }
                None => Err(StorageError::NotFound),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let key = Self::c_name(key);
            Self::with_nvs_handle(namespace, false, |handle| {
                let mut size = buf.len();
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key.as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                Ok(size)
            })
            .map_err(Self::map_err)
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow_mut().insert(composite, data.to_vec());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let name = key;
            let key = Self::c_name(name);
            Self::with_nvs_handle(namespace, true, |handle| {
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        key.as_ptr() as *const _,
                        data.as_ptr() as *const _,
                        data.len(),
                    )
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                Ok(())
            })
            .map_err(|e| {
                warn!("NVS: write {}/{} failed ({})", namespace, name, e);
                Self::map_err(e)
            })
        }
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow_mut().remove(&composite);
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let key = Self::c_name(key);
            let result = Self::with_nvs_handle(namespace, true, |handle| {
                let ret = unsafe { nvs_erase_key(handle, key.as_ptr() as *const _) };
                if ret != ESP_OK as i32 && ret != ESP_ERR_NVS_NOT_FOUND as i32 {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                Ok(())
            });
            match result {
                // A namespace that was never written has nothing to delete.
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND as i32 => Ok(()),
                other => other.map_err(Self::map_err),
            }
        }
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow().contains_key(&composite)
        }

        #[cfg(target_os = "espidf")]
        {
            let key = Self::c_name(key);
            Self::with_nvs_handle(namespace, false, |handle| {
                let ret = unsafe {
                    nvs_find_key(handle, key.as_ptr() as *const _, core::ptr::null_mut())
                };
                Ok(ret == ESP_OK as i32)
            })
            .unwrap_or(false)
        }
    }
}

impl Default for NvsAdapter {
    /// An adapter without flash initialisation. On hardware every
    /// operation then fails, which callers already treat as "no record".
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }
}
