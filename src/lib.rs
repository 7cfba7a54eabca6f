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

//! A spaced repetition review scheduler and deterministic daily item
//! assignment, behind a thin HTTP boundary.

pub mod cli;
pub mod clock;
pub mod collection;
pub mod config;
pub mod daily;
pub mod error;
pub mod ident;
pub mod keylock;
pub mod scheduler;
pub mod server;
pub mod store;
pub mod types;
