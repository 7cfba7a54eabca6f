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

use rand::Rng;

use crate::types::card_id::CardId;
use crate::types::timestamp::Timestamp;

/// Generates card identifiers. Injected so tests can produce predictable
/// ids; a collision on insert is surfaced as `Conflict` by the store.
pub trait IdSource: Send + Sync {
    fn generate(&self, now: Timestamp) -> CardId;
}

/// Millisecond timestamp plus a random hex suffix. Monotonic per host
/// within clock resolution; the suffix covers same-millisecond creates.
pub struct RandomIdSource;

impl IdSource for RandomIdSource {
    fn generate(&self, now: Timestamp) -> CardId {
        let suffix: u32 = rand::thread_rng().r#gen();
        CardId::new(format!("card-{}-{:08x}", now.timestamp_millis(), suffix))
    }
}

/// Hands out `prefix-0`, `prefix-1`, ... in order.
pub struct SequentialIdSource {
    prefix: String,
    next: std::sync::atomic::AtomicU64,
}

impl SequentialIdSource {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: std::sync::atomic::AtomicU64::new(0),
        }
    }
}

impl IdSource for SequentialIdSource {
    fn generate(&self, _now: Timestamp) -> CardId {
        let n = self
            .next
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        CardId::new(format!("{}-{}", self.prefix, n))
    }
}
