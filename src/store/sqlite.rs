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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;
use rusqlite::params;

use crate::error::Error;
use crate::error::Fallible;
use crate::store::Store;
use crate::types::card::MemoryCard;
use crate::types::card::Source;
use crate::types::card_id::CardId;
use crate::types::date::Date;
use crate::types::timestamp::Timestamp;

/// The SQLite-backed persistence port.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    fn acquire(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

impl Store for SqliteStore {
    fn insert_card(&self, card: &MemoryCard) -> Fallible<()> {
        log::debug!("Inserting card {}.", card.id);
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        let exists: i64 = tx.query_row(
            "select count(*) from cards where id = ?;",
            [&card.id],
            |row| row.get(0),
        )?;
        if exists > 0 {
            return Err(Error::conflict(format!(
                "a card with id '{}' already exists",
                card.id
            )));
        }
        let sql = "insert into cards (id, title, content, question, answer, source, source_id, source_metadata, tags, due, interval, repetitions, ease_factor, last_reviewed, created_at) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?);";
        tx.execute(
            sql,
            params![
                card.id,
                card.title,
                card.content,
                card.question,
                card.answer,
                source_to_str(card.source),
                card.source_id,
                card.source_metadata
                    .as_ref()
                    .map(|v| v.to_string()),
                serde_json::to_string(&card.tags)?,
                card.due,
                card.interval,
                card.repetitions,
                card.ease_factor,
                card.last_reviewed,
                card.created_at,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn get_card(&self, id: &CardId) -> Fallible<Option<MemoryCard>> {
        let conn = self.acquire();
        let sql = "select id, title, content, question, answer, source, source_id, source_metadata, tags, due, interval, repetitions, ease_factor, last_reviewed, created_at from cards where id = ?;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(card_from_row(row)?)),
            None => Ok(None),
        }
    }

    fn update_card(&self, card: &MemoryCard) -> Fallible<()> {
        log::debug!("Updating card {}.", card.id);
        let conn = self.acquire();
        let sql = "update cards set due = ?, interval = ?, repetitions = ?, ease_factor = ?, last_reviewed = ? where id = ?;";
        let changed = conn.execute(
            sql,
            params![
                card.due,
                card.interval,
                card.repetitions,
                card.ease_factor,
                card.last_reviewed,
                card.id,
            ],
        )?;
        if changed == 0 {
            return Err(Error::not_found(format!("no card with id '{}'", card.id)));
        }
        Ok(())
    }

    fn all_cards(&self) -> Fallible<Vec<MemoryCard>> {
        let conn = self.acquire();
        let sql = "select id, title, content, question, answer, source, source_id, source_metadata, tags, due, interval, repetitions, ease_factor, last_reviewed, created_at from cards order by rowid;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let mut cards = Vec::new();
        while let Some(row) = rows.next()? {
            cards.push(card_from_row(row)?);
        }
        Ok(cards)
    }

    fn get_assignment(&self, domain: &str, date: Date) -> Fallible<Option<String>> {
        let conn = self.acquire();
        let sql = "select item_id from assignments where domain = ? and date = ?;";
        let item_id = conn
            .query_row(sql, params![domain, date], |row| row.get(0))
            .optional()?;
        Ok(item_id)
    }

    fn record_assignment(
        &self,
        domain: &str,
        date: Date,
        item_id: &str,
        previous: Option<&str>,
    ) -> Fallible<String> {
        log::debug!("Assigning {domain}/{date} -> {item_id}.");
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        match previous {
            None => {
                let sql = "insert into assignments (domain, date, item_id) values (?, ?, ?) on conflict (domain, date) do nothing;";
                tx.execute(sql, params![domain, date, item_id])?;
            }
            Some(old) => {
                let sql = "update assignments set item_id = ? where domain = ? and date = ? and item_id = ?;";
                tx.execute(sql, params![item_id, domain, date, old])?;
            }
        }
        let winner: String = tx.query_row(
            "select item_id from assignments where domain = ? and date = ?;",
            params![domain, date],
            |row| row.get(0),
        )?;
        tx.commit()?;
        Ok(winner)
    }
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["cards"], |row| row.get(0))?;
    Ok(count > 0)
}

fn card_from_row(row: &Row) -> Fallible<MemoryCard> {
    let source: String = row.get(5)?;
    let source_metadata: Option<String> = row.get(7)?;
    let source_metadata = match source_metadata {
        Some(json) => Some(serde_json::from_str(&json)?),
        None => None,
    };
    let tags: String = row.get(8)?;
    let card = MemoryCard {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        question: row.get(3)?,
        answer: row.get(4)?,
        source: source_from_str(&source)?,
        source_id: row.get(6)?,
        source_metadata,
        tags: serde_json::from_str(&tags)?,
        due: row.get(9)?,
        interval: row.get(10)?,
        repetitions: row.get(11)?,
        ease_factor: row.get(12)?,
        last_reviewed: row.get(13)?,
        created_at: row.get(14)?,
    };
    Ok(card)
}

fn source_to_str(source: Source) -> &'static str {
    match source {
        Source::Highlight => "highlight",
        Source::Note => "note",
        Source::Chapter => "chapter",
        Source::Puzzle => "puzzle",
        Source::Lesson => "lesson",
        Source::Mentor => "mentor",
        Source::Manual => "manual",
    }
}

fn source_from_str(s: &str) -> Fallible<Source> {
    match s {
        "highlight" => Ok(Source::Highlight),
        "note" => Ok(Source::Note),
        "chapter" => Ok(Source::Chapter),
        "puzzle" => Ok(Source::Puzzle),
        "lesson" => Ok(Source::Lesson),
        "mentor" => Ok(Source::Mentor),
        "manual" => Ok(Source::Manual),
        other => Err(Error::corrupt_state(format!("unknown card source '{other}'"))),
    }
}
