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

//! The SM-2 review scheduler.
//!
//! Pure functions over card state: no I/O, no clock access, no persistence.
//! The facade supplies "today" and writes the result back through the
//! persistence port.

use crate::types::card::CreateCard;
use crate::types::card::MemoryCard;
use crate::types::card_id::CardId;
use crate::types::date::Date;
use crate::types::quality::Quality;
use crate::types::timestamp::Timestamp;

/// The floor below which a card's ease factor never drops. A card that is
/// merely hard should still grow its interval, just slowly.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// The ease factor assigned to every new card.
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// Build a fully-formed card from its content fields.
///
/// New cards are due immediately: `interval = 1`, `repetitions = 0`,
/// `ease_factor = 2.5`, `due = today`.
pub fn initialize_card(
    id: CardId,
    seed: CreateCard,
    today: Date,
    created_at: Timestamp,
) -> MemoryCard {
    MemoryCard {
        id,
        title: seed.title,
        content: seed.content,
        question: seed.question,
        answer: seed.answer,
        source: seed.source,
        source_id: seed.source_id,
        source_metadata: seed.source_metadata,
        tags: seed.tags,
        due: today,
        interval: 1,
        repetitions: 0,
        ease_factor: INITIAL_EASE_FACTOR,
        last_reviewed: None,
        created_at,
    }
}

/// Apply a review outcome to a card, returning the new state.
///
/// Quality below 3 revokes trust in long intervals: repetitions and interval
/// reset. Quality 3 and above compounds the interval by the ease factor. In
/// both branches the ease factor is updated from the original quality and
/// original ease, then clamped to [`MIN_EASE_FACTOR`].
pub fn apply_review(card: &MemoryCard, quality: Quality, today: Date) -> MemoryCard {
    let mut card = card.clone();

    if quality.is_pass() {
        card.repetitions += 1;
        card.interval = match card.repetitions {
            1 => 1,
            2 => 6,
            _ => (card.interval as f64 * card.ease_factor).round() as i64,
        };
    } else {
        card.repetitions = 0;
        card.interval = 1;
    }

    // EF' = EF + (0.1 - (5 - q)(0.08 + (5 - q) * 0.02))
    let q = quality.value() as f64;
    let ease = card.ease_factor + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02));
    card.ease_factor = ease.max(MIN_EASE_FACTOR);

    card.due = today.plus_days(card.interval);
    card.last_reviewed = Some(today);
    card
}

/// The subset of `cards` due on `date`, i.e. those with `due <= date`, in
/// the order given (the caller passes creation order). Never mutates input:
/// viewing the due list is distinct from reviewing a card.
pub fn due_cards(cards: &[MemoryCard], date: Date) -> Vec<MemoryCard> {
    cards
        .iter()
        .filter(|card| card.due <= date)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::card::Source;

    fn seed() -> CreateCard {
        CreateCard {
            title: "Chapter 3".to_string(),
            content: "The mitochondria is the powerhouse of the cell.".to_string(),
            source: Source::Highlight,
            question: None,
            answer: None,
            source_id: None,
            source_metadata: None,
            tags: vec![],
        }
    }

    fn fresh_card(today: Date) -> MemoryCard {
        initialize_card(CardId::new("c-1"), seed(), today, Timestamp::now())
    }

    fn q(raw: i64) -> Quality {
        Quality::new(raw).unwrap()
    }

    fn today() -> Date {
        Date::parse("2024-03-01").unwrap()
    }

    #[test]
    fn test_initialization() {
        let card = fresh_card(today());
        assert_eq!(card.interval, 1);
        assert_eq!(card.repetitions, 0);
        assert_eq!(card.ease_factor, INITIAL_EASE_FACTOR);
        assert_eq!(card.due, today());
        assert!(card.last_reviewed.is_none());
    }

    #[test]
    fn test_first_review_quality_five() {
        let card = fresh_card(today());
        let card = apply_review(&card, q(5), today());
        assert_eq!(card.repetitions, 1);
        assert_eq!(card.interval, 1);
        assert!(card.ease_factor > INITIAL_EASE_FACTOR);
        assert_eq!(card.due, today().plus_days(1));
        assert_eq!(card.last_reviewed, Some(today()));
    }

    #[test]
    fn test_three_consecutive_quality_four_reviews() {
        let mut card = fresh_card(today());

        card = apply_review(&card, q(4), today());
        assert_eq!(card.repetitions, 1);
        assert_eq!(card.interval, 1);

        card = apply_review(&card, q(4), today());
        assert_eq!(card.repetitions, 2);
        assert_eq!(card.interval, 6);
        let ease_after_second = card.ease_factor;

        card = apply_review(&card, q(4), today());
        assert_eq!(card.repetitions, 3);
        assert_eq!(card.interval, (6.0 * ease_after_second).round() as i64);
    }

    #[test]
    fn test_failure_resets_progress() {
        let mut card = fresh_card(today());
        card.repetitions = 5;
        card.interval = 30;

        let before = card.ease_factor;
        let card = apply_review(&card, q(1), today());
        assert_eq!(card.repetitions, 0);
        assert_eq!(card.interval, 1);
        assert_eq!(card.due, today().plus_days(1));
        assert!(card.ease_factor < before);
        assert!(card.ease_factor >= MIN_EASE_FACTOR);
    }

    #[test]
    fn test_every_failure_quality_resets() {
        for raw in 0..3 {
            let mut card = fresh_card(today());
            card.repetitions = 4;
            card.interval = 20;
            let card = apply_review(&card, q(raw), today());
            assert_eq!(card.repetitions, 0);
            assert_eq!(card.interval, 1);
        }
    }

    #[test]
    fn test_quality_three_shrinks_ease() {
        let card = fresh_card(today());
        let card = apply_review(&card, q(3), today());
        assert!(card.ease_factor < INITIAL_EASE_FACTOR);
    }

    #[test]
    fn test_ease_floor_under_arbitrary_sequences() {
        // A long run of worst-case reviews never drags ease below the floor.
        let mut card = fresh_card(today());
        for raw in [0, 0, 1, 2, 0, 1, 0, 2, 1, 0, 3, 0, 0, 0] {
            card = apply_review(&card, q(raw), today());
            assert!(card.ease_factor >= MIN_EASE_FACTOR);
        }
    }

    #[test]
    fn test_ease_has_no_ceiling() {
        let mut card = fresh_card(today());
        for _ in 0..20 {
            card = apply_review(&card, q(5), today());
        }
        assert!(card.ease_factor > 4.0);
    }

    #[test]
    fn test_interval_compounds_on_success() {
        let mut card = fresh_card(today());
        let mut previous = 0;
        for _ in 0..6 {
            card = apply_review(&card, q(4), today());
            assert!(card.interval >= previous);
            previous = card.interval;
        }
        assert!(card.interval > 6);
    }

    #[test]
    fn test_due_cards_boundary() {
        let date = today();
        let mut early = fresh_card(date);
        early.due = date.plus_days(0);
        let mut on_date = fresh_card(date.plus_days(1));
        on_date.id = CardId::new("c-2");
        on_date.due = date.plus_days(1);
        let mut later = fresh_card(date);
        later.id = CardId::new("c-3");
        later.due = date.plus_days(2);

        let cards = vec![early.clone(), on_date.clone(), later.clone()];
        let due = due_cards(&cards, date.plus_days(1));
        let ids: Vec<&str> = due.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c-1", "c-2"]);

        // The input is untouched.
        assert_eq!(cards.len(), 3);
    }

    #[test]
    fn test_due_cards_is_idempotent() {
        let cards = vec![fresh_card(today())];
        let a = due_cards(&cards, today());
        let b = due_cards(&cards, today());
        assert_eq!(a.len(), b.len());
        assert_eq!(a[0].due, b[0].due);
    }

    #[test]
    fn test_apply_review_does_not_mutate_input() {
        let card = fresh_card(today());
        let _ = apply_review(&card, q(5), today());
        assert_eq!(card.repetitions, 0);
        assert_eq!(card.interval, 1);
    }
}
