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

//! The collection facade: the single entry point the boundary layer calls.
//!
//! Owns input validation, id generation, and the composition of the review
//! scheduler, the daily selector, and the persistence port.

use std::collections::HashMap;
use std::sync::Arc;

use crate::clock::Clock;
use crate::daily::DailySelector;
use crate::error::Error;
use crate::error::Fallible;
use crate::ident::IdSource;
use crate::keylock::KeyLocks;
use crate::scheduler;
use crate::store::Store;
use crate::types::card::CreateCard;
use crate::types::card::MemoryCard;
use crate::types::card_id::CardId;
use crate::types::date::Date;
use crate::types::pool::PoolItem;
use crate::types::quality::Quality;

pub struct Collection {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdSource>,
    daily: DailySelector,
    pools: HashMap<String, Vec<PoolItem>>,
    card_locks: KeyLocks,
}

impl Collection {
    pub fn new(
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdSource>,
        daily: DailySelector,
        pools: HashMap<String, Vec<PoolItem>>,
    ) -> Self {
        Self {
            store,
            clock,
            ids,
            daily,
            pools,
            card_locks: KeyLocks::new(),
        }
    }

    /// Today per the injected clock. The boundary computes this once per
    /// request.
    pub fn today(&self) -> Date {
        self.clock.today()
    }

    /// Validate, initialize, and persist a new card.
    pub fn create_card(&self, req: CreateCard) -> Fallible<MemoryCard> {
        if req.title.trim().is_empty() {
            return Err(Error::invalid_input("title must not be empty"));
        }
        if req.content.trim().is_empty() {
            return Err(Error::invalid_input("content must not be empty"));
        }
        let now = self.clock.now();
        let id = self.ids.generate(now);
        let card = scheduler::initialize_card(id, req, now.local_date(), now);
        self.store.insert_card(&card)?;
        log::debug!("Created card {}.", card.id);
        Ok(card)
    }

    /// Apply a review outcome to a card and persist the new state.
    ///
    /// Serialized per card id so two concurrent reviews of the same card
    /// cannot lose an update to repetitions or ease.
    pub fn review(&self, card_id: &CardId, quality: i64) -> Fallible<MemoryCard> {
        let quality = Quality::new(quality)?;
        let _guard = self.card_locks.lock(card_id.as_str());
        let card = self
            .store
            .get_card(card_id)?
            .ok_or_else(|| Error::not_found(format!("no card with id '{card_id}'")))?;
        card.check_invariants()?;
        let updated = scheduler::apply_review(&card, quality, self.clock.today());
        self.store.update_card(&updated)?;
        log::debug!(
            "Reviewed card {} with quality {}, next due {}.",
            updated.id,
            quality.value(),
            updated.due
        );
        Ok(updated)
    }

    /// The cards due on `date`, defaulting to today, in creation order.
    pub fn due(&self, date: Option<Date>) -> Fallible<Vec<MemoryCard>> {
        let date = date.unwrap_or_else(|| self.clock.today());
        let cards = self.store.all_cards()?;
        for card in &cards {
            card.check_invariants()?;
        }
        Ok(scheduler::due_cards(&cards, date))
    }

    /// The item assigned to a domain for `date`, defaulting to today.
    pub fn daily_item(&self, domain: &str, date: Option<Date>) -> Fallible<PoolItem> {
        let pool = self
            .pools
            .get(domain)
            .ok_or_else(|| Error::not_found(format!("no assignment domain '{domain}'")))?;
        let date = date.unwrap_or_else(|| self.clock.today());
        self.daily
            .get_or_assign(self.store.as_ref(), domain, date, pool)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::clock::FixedClock;
    use crate::daily::FixedPicker;
    use crate::ident::SequentialIdSource;
    use crate::store::memory::MemoryStore;
    use crate::types::card::Source;
    use crate::types::timestamp::Timestamp;

    fn fixed_now() -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
    }

    fn collection_with(pools: HashMap<String, Vec<PoolItem>>) -> (Arc<MemoryStore>, Collection) {
        let store = Arc::new(MemoryStore::new());
        let collection = Collection::new(
            store.clone(),
            Arc::new(FixedClock(fixed_now())),
            Arc::new(SequentialIdSource::new("card")),
            DailySelector::new(Box::new(FixedPicker(0))),
            pools,
        );
        (store, collection)
    }

    fn collection() -> (Arc<MemoryStore>, Collection) {
        collection_with(HashMap::new())
    }

    fn request() -> CreateCard {
        CreateCard {
            title: "Photosynthesis".to_string(),
            content: "Light reactions produce ATP and NADPH.".to_string(),
            source: Source::Highlight,
            question: Some("What do the light reactions produce?".to_string()),
            answer: Some("ATP and NADPH.".to_string()),
            source_id: None,
            source_metadata: None,
            tags: vec!["biology".to_string()],
        }
    }

    #[test]
    fn test_create_card_initializes_scheduling_state() {
        let (_store, collection) = collection();
        let card = collection.create_card(request()).unwrap();
        assert_eq!(card.id.as_str(), "card-0");
        assert_eq!(card.interval, 1);
        assert_eq!(card.repetitions, 0);
        assert_eq!(card.ease_factor, 2.5);
        assert_eq!(card.due, fixed_now().local_date());
    }

    #[test]
    fn test_create_card_rejects_blank_fields() {
        let (_store, collection) = collection();
        let mut req = request();
        req.title = "   ".to_string();
        assert!(matches!(
            collection.create_card(req).unwrap_err(),
            Error::InvalidInput(_)
        ));
        let mut req = request();
        req.content = String::new();
        assert!(matches!(
            collection.create_card(req).unwrap_err(),
            Error::InvalidInput(_)
        ));
    }

    #[test]
    fn test_create_card_id_collision_is_conflict() {
        let (store, collection) = collection();
        let card = collection.create_card(request()).unwrap();
        // Force the next generated id to collide.
        let mut duplicate = card.clone();
        duplicate.id = CardId::new("card-1");
        store.insert_card(&duplicate).unwrap();
        assert!(matches!(
            collection.create_card(request()).unwrap_err(),
            Error::Conflict(_)
        ));
    }

    #[test]
    fn test_review_updates_and_persists() {
        let (store, collection) = collection();
        let card = collection.create_card(request()).unwrap();
        let updated = collection.review(&card.id, 5).unwrap();
        assert_eq!(updated.repetitions, 1);
        assert!(updated.ease_factor > 2.5);
        let loaded = store.get_card(&card.id).unwrap().unwrap();
        assert_eq!(loaded.repetitions, 1);
    }

    #[test]
    fn test_review_unknown_card_is_not_found() {
        let (_store, collection) = collection();
        let err = collection.review(&CardId::new("ghost"), 4).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_review_invalid_quality() {
        let (_store, collection) = collection();
        let card = collection.create_card(request()).unwrap();
        assert!(matches!(
            collection.review(&card.id, 6).unwrap_err(),
            Error::InvalidInput(_)
        ));
        assert!(matches!(
            collection.review(&card.id, -1).unwrap_err(),
            Error::InvalidInput(_)
        ));
    }

    #[test]
    fn test_review_surfaces_corrupt_state() {
        let (store, collection) = collection();
        let card = collection.create_card(request()).unwrap();
        let mut corrupted = card.clone();
        corrupted.ease_factor = 1.0;
        store.update_card(&corrupted).unwrap();
        let err = collection.review(&card.id, 4).unwrap_err();
        assert!(matches!(err, Error::CorruptState(_)));
    }

    #[test]
    fn test_due_surfaces_corrupt_state() {
        let (store, collection) = collection();
        let card = collection.create_card(request()).unwrap();
        let mut corrupted = card.clone();
        corrupted.ease_factor = 1.0;
        store.update_card(&corrupted).unwrap();
        let err = collection.due(None).unwrap_err();
        assert!(matches!(err, Error::CorruptState(_)));
    }

    #[test]
    fn test_due_defaults_to_today_and_respects_date() {
        let (_store, collection) = collection();
        let card = collection.create_card(request()).unwrap();
        assert_eq!(collection.due(None).unwrap().len(), 1);
        collection.review(&card.id, 5).unwrap();
        // Now due tomorrow, not today.
        assert_eq!(collection.due(None).unwrap().len(), 0);
        let tomorrow = fixed_now().local_date().plus_days(1);
        assert_eq!(collection.due(Some(tomorrow)).unwrap().len(), 1);
    }

    #[test]
    fn test_due_preserves_creation_order() {
        let (_store, collection) = collection();
        collection.create_card(request()).unwrap();
        collection.create_card(request()).unwrap();
        collection.create_card(request()).unwrap();
        let ids: Vec<String> = collection
            .due(None)
            .unwrap()
            .iter()
            .map(|c| c.id.to_string())
            .collect();
        assert_eq!(ids, vec!["card-0", "card-1", "card-2"]);
    }

    #[test]
    fn test_daily_item_unknown_domain() {
        let (_store, collection) = collection();
        let err = collection.daily_item("puzzle", None).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_daily_item_is_idempotent() {
        let mut pools = HashMap::new();
        pools.insert(
            "puzzle".to_string(),
            vec![PoolItem::new("p-1"), PoolItem::new("p-2")],
        );
        let (_store, collection) = collection_with(pools);
        let first = collection.daily_item("puzzle", None).unwrap();
        let again = collection.daily_item("puzzle", None).unwrap();
        assert_eq!(first.id, again.id);
    }

    #[test]
    fn test_daily_item_empty_pool() {
        let mut pools = HashMap::new();
        pools.insert("puzzle".to_string(), Vec::new());
        let (store, collection) = collection_with(pools);
        let err = collection.daily_item("puzzle", None).unwrap_err();
        assert!(matches!(err, Error::EmptyPool(_)));
        assert_eq!(store.assignment_count(), 0);
    }
}
