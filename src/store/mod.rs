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

//! The persistence port: a named collection of cards keyed by id, and one
//! date-to-item map per assignment domain. The contract is store-agnostic;
//! the production backend is SQLite and the test double is in memory.

pub mod memory;
pub mod sqlite;

use crate::error::Fallible;
use crate::types::card::MemoryCard;
use crate::types::card_id::CardId;
use crate::types::date::Date;

pub trait Store: Send + Sync {
    /// Insert a new card. Fails with `Conflict` if the id already exists.
    fn insert_card(&self, card: &MemoryCard) -> Fallible<()>;

    /// Load a card by id, or `None` if absent.
    fn get_card(&self, id: &CardId) -> Fallible<Option<MemoryCard>>;

    /// Overwrite an existing card. Fails with `NotFound` if the id is
    /// absent.
    fn update_card(&self, card: &MemoryCard) -> Fallible<()>;

    /// All cards, in creation order.
    fn all_cards(&self) -> Fallible<Vec<MemoryCard>>;

    /// The item id assigned to `(domain, date)`, if any.
    fn get_assignment(&self, domain: &str, date: Date) -> Fallible<Option<String>>;

    /// Record `date -> item_id` for a domain, or replace a stale entry.
    ///
    /// `previous` is the entry the caller observed before selecting:
    /// `None` to write only if the slot is still vacant, `Some(old)` to
    /// replace only that id. Returns the entry that ended up persisted, which
    /// is the existing one if another writer got there first. Atomic with
    /// respect to concurrent callers.
    fn record_assignment(
        &self,
        domain: &str,
        date: Date,
        item_id: &str,
        previous: Option<&str>,
    ) -> Fallible<String>;
}
