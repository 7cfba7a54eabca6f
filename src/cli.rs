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

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use crate::clock::SystemClock;
use crate::collection::Collection;
use crate::config::Config;
use crate::config::DEFAULT_DATABASE;
use crate::config::DEFAULT_PORT;
use crate::daily::DailySelector;
use crate::daily::RandomPicker;
use crate::error::Error;
use crate::error::Fallible;
use crate::ident::RandomIdSource;
use crate::server::start_server;
use crate::store::sqlite::SqliteStore;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Serve the scheduler API.
    Serve {
        /// Optional path to the data directory.
        directory: Option<String>,
        /// Port override. Defaults to the configured or built-in port.
        #[arg(long)]
        port: Option<u16>,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Serve { directory, port } => {
            let directory: PathBuf = match directory {
                Some(dir) => PathBuf::from(dir),
                None => std::env::current_dir()?,
            };
            if !directory.exists() {
                return Err(Error::invalid_input("directory does not exist."));
            }
            let directory = directory.canonicalize()?;
            let config = Config::load(&directory)?;
            let port = port
                .or(config.port)
                .unwrap_or(DEFAULT_PORT);
            let db_path =
                directory.join(config.database.as_deref().unwrap_or(DEFAULT_DATABASE));
            let db_path = db_path
                .to_str()
                .ok_or_else(|| Error::invalid_input("invalid database path"))?;
            let store = SqliteStore::new(db_path)?;
            log::debug!("Opened database at {db_path}.");
            let collection = Collection::new(
                Arc::new(store),
                Arc::new(SystemClock),
                Arc::new(RandomIdSource),
                DailySelector::new(Box::new(RandomPicker)),
                config.pools(),
            );
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(start_server(Arc::new(collection), port))
        }
    }
}
