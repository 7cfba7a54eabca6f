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

use thiserror::Error;

/// The error taxonomy of the core. The boundary layer maps each variant to a
/// transport status code; nothing in the core retries or swallows any of
/// these.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or out-of-range request data. Not retryable without caller
    /// correction.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A referenced card or item id is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Id collision on create. The caller should regenerate the id and retry.
    #[error("conflict: {0}")]
    Conflict(String),

    /// No items to assign for a domain.
    #[error("empty pool for domain '{0}'")]
    EmptyPool(String),

    /// Persisted state violates a scheduler invariant. Surfaced, never
    /// silently repaired.
    #[error("corrupt state: {0}")]
    CorruptState(String),

    /// A persistence port I/O failure, propagated unchanged.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Fallible<T> = Result<T, Error>;

impl Error {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn corrupt_state(msg: impl Into<String>) -> Self {
        Self::CorruptState(msg.into())
    }
}
