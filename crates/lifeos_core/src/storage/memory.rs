//! In-process key-value slots.
//!
//! Mirrors browser storage failure modes: it can be switched off and can
//! carry a byte quota over the sum of stored values.

use super::{KeyValueStorage, StorageError, StorageResult};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: RefCell<HashMap<String, String>>,
    quota_bytes: Option<usize>,
    unavailable: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the total byte length of stored values.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// Makes every subsequent call fail with `Unavailable` (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    /// Returns the raw slot value, bypassing availability checks.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }

    fn ensure_available(&self) -> StorageResult<()> {
        if self.unavailable.get() {
            return Err(StorageError::Unavailable);
        }
        Ok(())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.ensure_available()?;
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.ensure_available()?;
        let mut slots = self.slots.borrow_mut();

        if let Some(quota) = self.quota_bytes {
            let used_elsewhere: usize = slots
                .iter()
                .filter(|(slot_key, _)| slot_key.as_str() != key)
                .map(|(_, slot_value)| slot_value.len())
                .sum();
            let available = quota.saturating_sub(used_elsewhere);
            if value.len() > available {
                return Err(StorageError::QuotaExceeded {
                    needed: value.len(),
                    available,
                });
            }
        }

        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.ensure_available()?;
        self.slots.borrow_mut().remove(key);
        Ok(())
    }
}
