// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Deterministic daily item assignment.
//!
//! Given a pool of interchangeable items and a date, every call that day
//! returns the same item, across restarts, because the first call persists
//! the choice.

use rand::Rng;

use crate::error::Error;
use crate::error::Fallible;
use crate::keylock::KeyLocks;
use crate::store::Store;
use crate::types::date::Date;
use crate::types::pool::PoolItem;

/// Picks an index uniformly at random from a non-empty pool. Injected so
/// tests can force a choice.
pub trait Picker: Send + Sync {
    fn pick(&self, len: usize) -> usize;
}

pub struct RandomPicker;

impl Picker for RandomPicker {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Always picks the given index (modulo pool size).
pub struct FixedPicker(pub usize);

impl Picker for FixedPicker {
    fn pick(&self, len: usize) -> usize {
        self.0 % len
    }
}

/// The daily assignment selector. One instance serves every domain; the
/// lock registry serializes the read-modify-write per (domain, date).
pub struct DailySelector {
    picker: Box<dyn Picker>,
    locks: KeyLocks,
}

impl DailySelector {
    pub fn new(picker: Box<dyn Picker>) -> Self {
        Self {
            picker,
            locks: KeyLocks::new(),
        }
    }

    /// Return the item assigned to `(domain, date)`, selecting and
    /// persisting one if the date has no usable assignment yet.
    ///
    /// An existing entry is reused only while its item is still in the
    /// pool, so the day's item is stable even if the pool grows. An empty
    /// pool fails with `EmptyPool` and leaves the store unmodified.
    pub fn get_or_assign(
        &self,
        store: &dyn Store,
        domain: &str,
        date: Date,
        pool: &[PoolItem],
    ) -> Fallible<PoolItem> {
        let key = format!("{domain}:{date}");
        let _guard = self.locks.lock(&key);

        let existing = store.get_assignment(domain, date)?;
        if let Some(id) = &existing {
            if let Some(item) = pool.iter().find(|item| &item.id == id) {
                return Ok(item.clone());
            }
            log::debug!("Assignment {domain}/{date} -> {id} is stale, reselecting.");
        }
        if pool.is_empty() {
            return Err(Error::EmptyPool(domain.to_string()));
        }
        let picked = &pool[self.picker.pick(pool.len())];
        let winner = store.record_assignment(domain, date, &picked.id, existing.as_deref())?;
        match pool.iter().find(|item| item.id == winner) {
            Some(item) => Ok(item.clone()),
            // A concurrent writer persisted an id this caller's pool does
            // not contain.
            None => Err(Error::corrupt_state(format!(
                "assignment {domain}/{date} refers to unknown item '{winner}'"
            ))),
        }
    }
}
