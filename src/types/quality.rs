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

use serde::Serialize;

use crate::error::Error;
use crate::error::Fallible;

/// A review quality score in the closed range [0, 5].
///
/// 0-2 denote failure to recall (in increasing severity), 3-5 denote
/// successful recall (in increasing ease). The interval and ease updates
/// branch on the 3-boundary.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(transparent)]
pub struct Quality(u8);

impl Quality {
    /// Validate a raw score. Anything outside [0, 5] is invalid input.
    pub fn new(raw: i64) -> Fallible<Self> {
        if (0..=5).contains(&raw) {
            Ok(Self(raw as u8))
        } else {
            Err(Error::invalid_input(format!(
                "quality must be between 0 and 5, got {raw}"
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Whether the review counts as a successful recall.
    pub fn is_pass(self) -> bool {
        self.0 >= 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_range() {
        for raw in 0..=5 {
            let q = Quality::new(raw).unwrap();
            assert_eq!(q.value() as i64, raw);
            assert_eq!(q.is_pass(), raw >= 3);
        }
    }

    #[test]
    fn test_out_of_range() {
        assert!(Quality::new(-1).is_err());
        assert!(Quality::new(6).is_err());
        assert!(Quality::new(i64::MAX).is_err());
    }
}
