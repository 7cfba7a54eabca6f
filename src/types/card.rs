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

use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;
use crate::error::Fallible;
use crate::scheduler::MIN_EASE_FACTOR;
use crate::types::card_id::CardId;
use crate::types::date::Date;
use crate::types::timestamp::Timestamp;

/// The subsystem a card originated from. Never interpreted by the scheduler;
/// carried as a tag for the caller's benefit.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Highlight,
    Note,
    Chapter,
    Puzzle,
    Lesson,
    Mentor,
    Manual,
}

/// A unit of knowledge to be retained.
///
/// The content fields are an opaque payload. The scheduling fields are owned
/// exclusively by the review scheduler: nothing else may write them.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryCard {
    pub id: CardId,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// The next date on which the card should be presented.
    pub due: Date,
    /// Days until the next review. Always at least 1.
    pub interval: i64,
    /// Count of consecutive successful reviews.
    pub repetitions: u32,
    /// Difficulty multiplier. Never below [`MIN_EASE_FACTOR`].
    pub ease_factor: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<Date>,
    pub created_at: Timestamp,
}

impl MemoryCard {
    /// Check the scheduling invariants of a card loaded from storage.
    ///
    /// A violation means the persisted state was corrupted outside the
    /// scheduler. It is surfaced, never silently repaired.
    pub fn check_invariants(&self) -> Fallible<()> {
        if self.ease_factor < MIN_EASE_FACTOR {
            return Err(Error::corrupt_state(format!(
                "card {}: ease factor {} is below the floor {}",
                self.id, self.ease_factor, MIN_EASE_FACTOR
            )));
        }
        if self.interval < 1 {
            return Err(Error::corrupt_state(format!(
                "card {}: interval {} is below 1",
                self.id, self.interval
            )));
        }
        Ok(())
    }
}

/// The body of a card-creation request. Content fields only: the scheduling
/// state is initialized by the scheduler, and the id by the facade.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateCard {
    pub title: String,
    pub content: String,
    pub source: Source,
    pub question: Option<String>,
    pub answer: Option<String>,
    pub source_id: Option<String>,
    pub source_metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub tags: Vec<String>,
}
