//! Column conversions shared by the row mappers.
//!
//! Ids are stored as text, timestamps as RFC 3339 text, calendar days as
//! `YYYY-MM-DD`, and profile attribute groups as JSON text.

use chrono::{DateTime, NaiveDate, Utc};
use peach_shared::{ChannelId, UserId};
use rusqlite::types::Type;
use rusqlite::Row;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

fn conversion<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub(crate) fn uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let s: String = row.get(idx)?;
    Uuid::parse_str(&s).map_err(|e| conversion(idx, e))
}

pub(crate) fn user_id(row: &Row<'_>, idx: usize) -> rusqlite::Result<UserId> {
    uuid(row, idx).map(UserId)
}

pub(crate) fn channel_id(row: &Row<'_>, idx: usize) -> rusqlite::Result<ChannelId> {
    let s: String = row.get(idx)?;
    s.parse().map_err(|e| conversion(idx, e))
}

pub(crate) fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    parse_timestamp(&s).map_err(|e| conversion(idx, e))
}

pub(crate) fn opt_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| parse_timestamp(&s))
        .transpose()
        .map_err(|e| conversion(idx, e))
}

pub(crate) fn opt_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| s.parse::<NaiveDate>())
        .transpose()
        .map_err(|e| conversion(idx, e))
}

pub(crate) fn opt_json<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(|e| conversion(idx, e))
}

pub(crate) fn to_json<T: Serialize>(value: &Option<T>) -> serde_json::Result<Option<String>> {
    value.as_ref().map(serde_json::to_string).transpose()
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

/// RFC 3339 with fixed sub-second precision so text order matches time order.
pub(crate) fn fmt_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
