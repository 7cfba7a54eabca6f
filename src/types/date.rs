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

use std::fmt::Display;
use std::fmt::Formatter;

use chrono::Days;
use chrono::NaiveDate;
use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;
use crate::error::Fallible;

const FORMAT: &str = "%Y-%m-%d";

/// A calendar date with no time-of-day component. Due-date comparisons are
/// exact day equality/less-than, never instant comparisons.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Date(NaiveDate);

impl Date {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parse a date in ISO `YYYY-MM-DD` form.
    pub fn parse(s: &str) -> Fallible<Self> {
        let date = NaiveDate::parse_from_str(s, FORMAT)
            .map_err(|_| Error::invalid_input(format!("invalid date: '{s}'")))?;
        Ok(Self(date))
    }

    /// The date `days` days after this one.
    pub fn plus_days(self, days: i64) -> Self {
        debug_assert!(days >= 0);
        Self(self.0 + Days::new(days as u64))
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}

impl Serialize for Date {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Date::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl ToSql for Date {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for Date {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        Date::parse(&string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let date = Date::parse("2024-03-01").unwrap();
        assert_eq!(date.to_string(), "2024-03-01");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Date::parse("03/01/2024").is_err());
        assert!(Date::parse("2024-13-01").is_err());
        assert!(Date::parse("").is_err());
    }

    #[test]
    fn test_plus_days() {
        let date = Date::parse("2024-02-28").unwrap();
        assert_eq!(date.plus_days(1).to_string(), "2024-02-29");
        assert_eq!(date.plus_days(2).to_string(), "2024-03-01");
    }

    #[test]
    fn test_ordering_matches_lexicographic() {
        let a = Date::parse("2024-03-01").unwrap();
        let b = Date::parse("2024-11-30").unwrap();
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }
}
