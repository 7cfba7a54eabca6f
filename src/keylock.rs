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

use std::collections::HashSet;
use std::sync::Condvar;
use std::sync::Mutex;

/// Scoped critical sections keyed by string.
///
/// Two holders of different keys never block each other; two holders of the
/// same key serialize. Used for per-card-id review updates and for
/// per-(domain, date) daily assignment, where a lost update would let two
/// callers disagree about the day's item.
#[derive(Default)]
pub struct KeyLocks {
    held: Mutex<HashSet<String>>,
    released: Condvar,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `key` is free, then hold it until the guard drops.
    pub fn lock(&self, key: &str) -> KeyGuard<'_> {
        let mut held = self.held.lock().unwrap();
        while held.contains(key) {
            held = self.released.wait(held).unwrap();
        }
        held.insert(key.to_string());
        KeyGuard {
            locks: self,
            key: key.to_string(),
        }
    }
}

pub struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: String,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        let mut held = self.locks.held.lock().unwrap();
        held.remove(&self.key);
        self.locks.released.notify_all();
    }
}
