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
use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

use crate::error::Error;
use crate::error::Fallible;
use crate::types::pool::PoolItem;

pub const DEFAULT_PORT: u16 = 8077;
pub const DEFAULT_DATABASE: &str = "memoria.db";
const CONFIG_FILE: &str = "memoria.toml";

/// Configuration loaded from `memoria.toml` in the data directory. Every
/// field is optional; a missing file yields the defaults.
///
/// ```toml
/// port = 8077
/// database = "memoria.db"
///
/// [[pool]]
/// domain = "puzzle"
/// items = [
///     { id = "p-1", title = "Knight fork" },
///     { id = "p-2", title = "Back rank mate" },
/// ]
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub port: Option<u16>,
    pub database: Option<String>,
    #[serde(default, rename = "pool")]
    pub pools: Vec<PoolConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolConfig {
    pub domain: String,
    #[serde(default)]
    pub items: Vec<PoolItem>,
}

impl Config {
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE);
        if !path.exists() {
            log::debug!("No {CONFIG_FILE} found, using defaults.");
            return Ok(Self::default());
        }
        let content = read_to_string(&path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Fallible<()> {
        let mut seen = HashMap::new();
        for pool in &self.pools {
            if seen.insert(pool.domain.as_str(), ()).is_some() {
                return Err(Error::Config(format!(
                    "duplicate pool domain '{}'",
                    pool.domain
                )));
            }
            let mut ids = HashMap::new();
            for item in &pool.items {
                if ids.insert(item.id.as_str(), ()).is_some() {
                    return Err(Error::Config(format!(
                        "duplicate item id '{}' in pool '{}'",
                        item.id, pool.domain
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn pools(&self) -> HashMap<String, Vec<PoolItem>> {
        self.pools
            .iter()
            .map(|pool| (pool.domain.clone(), pool.items.clone()))
            .collect()
    }
}
