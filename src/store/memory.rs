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

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::error::Error;
use crate::error::Fallible;
use crate::store::Store;
use crate::types::card::MemoryCard;
use crate::types::card_id::CardId;
use crate::types::date::Date;

/// An in-memory persistence port. The test double, also usable as an
/// ephemeral backend. Cards keep insertion order.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    cards: Vec<MemoryCard>,
    assignments: HashMap<(String, String), String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn acquire(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// The number of persisted assignment entries, across all domains.
    /// Test-facing: lets assertions check a failed selection wrote nothing.
    pub fn assignment_count(&self) -> usize {
        self.acquire().assignments.len()
    }
}

impl Store for MemoryStore {
    fn insert_card(&self, card: &MemoryCard) -> Fallible<()> {
        let mut inner = self.acquire();
        if inner.cards.iter().any(|c| c.id == card.id) {
            return Err(Error::conflict(format!(
                "a card with id '{}' already exists",
                card.id
            )));
        }
        inner.cards.push(card.clone());
        Ok(())
    }

    fn get_card(&self, id: &CardId) -> Fallible<Option<MemoryCard>> {
        let inner = self.acquire();
        Ok(inner.cards.iter().find(|c| &c.id == id).cloned())
    }

    fn update_card(&self, card: &MemoryCard) -> Fallible<()> {
        let mut inner = self.acquire();
        match inner.cards.iter_mut().find(|c| c.id == card.id) {
            Some(slot) => {
                *slot = card.clone();
                Ok(())
            }
            None => Err(Error::not_found(format!("no card with id '{}'", card.id))),
        }
    }

    fn all_cards(&self) -> Fallible<Vec<MemoryCard>> {
        Ok(self.acquire().cards.clone())
    }

    fn get_assignment(&self, domain: &str, date: Date) -> Fallible<Option<String>> {
        let inner = self.acquire();
        let key = (domain.to_string(), date.to_string());
        Ok(inner.assignments.get(&key).cloned())
    }

    fn record_assignment(
        &self,
        domain: &str,
        date: Date,
        item_id: &str,
        previous: Option<&str>,
    ) -> Fallible<String> {
        let mut inner = self.acquire();
        let key = (domain.to_string(), date.to_string());
        match (inner.assignments.get(&key), previous) {
            // Vacant slot, first writer wins.
            (None, None) => {
                inner.assignments.insert(key, item_id.to_string());
                Ok(item_id.to_string())
            }
            // Guarded replacement of a stale entry.
            (Some(current), Some(old)) if current == old => {
                inner.assignments.insert(key, item_id.to_string());
                Ok(item_id.to_string())
            }
            // Somebody else got there first; their entry stands.
            (Some(current), _) => Ok(current.clone()),
            // The observed entry vanished; treat as a lost race.
            (None, Some(_)) => {
                inner.assignments.insert(key, item_id.to_string());
                Ok(item_id.to_string())
            }
        }
    }
}
