use std::fmt::Display;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A point in time at millisecond resolution, which is what the database keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self::from_millis(Utc::now().timestamp_millis()).unwrap_or(Self(Utc::now()))
    }

    pub fn from_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    pub fn millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Midnight UTC of the given calendar day.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|x| x.and_hms_opt(0, 0, 0))
            .map(|x| Self(Utc.from_utc_datetime(&x)))
    }

    /// Accepts `yyyy-MM-dd` and falls back to whatever `dateparser` understands.
    /// Input without a time of day is midnight UTC either way.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(ts) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|x| x.and_hms_opt(0, 0, 0))
        {
            return Ok(Self(Utc.from_utc_datetime(&ts)));
        }
        let parsed = dateparser::parse_with(s, &Utc, NaiveTime::MIN)
            .map_err(|e| anyhow::anyhow!("Can't parse {:?} as a date: {}", s, e))?;
        Self::from_millis(parsed.timestamp_millis())
            .ok_or_else(|| anyhow::anyhow!("Date {:?} is out of range", s))
    }

    /// Four digit year, `yyyy`.
    pub fn year(&self) -> String {
        self.0.format("%Y").to_string()
    }

    /// ISO date, `yyyy-MM-dd`.
    pub fn ymd(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// Medium length en-US date, `Mar 15, 2023`.
    pub fn medium(&self) -> String {
        self.0.format("%b %-d, %Y").to_string()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.medium())
    }
}

impl sqlx::Type<sqlx::Sqlite> for Timestamp {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <i64 as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for Timestamp {
    fn encode_by_ref(
        &self,
        args: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> sqlx::encode::IsNull {
        args.push(sqlx::sqlite::SqliteArgumentValue::Int64(self.millis()));

        sqlx::encode::IsNull::No
    }
}

impl<'r, DB: sqlx::Database> sqlx::Decode<'r, DB> for Timestamp
where
    i64: sqlx::Decode<'r, DB>,
{
    fn decode(
        value: <DB as sqlx::database::HasValueRef<'r>>::ValueRef,
    ) -> Result<Self, Box<dyn std::error::Error + 'static + Send + Sync>> {
        let value = <i64 as sqlx::Decode<DB>>::decode(value)?;
        Ok(Self::from_millis(value).ok_or("timestamp out of range")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats() {
        let ts = Timestamp::from_ymd(2023, 3, 5).unwrap();
        assert_eq!(ts.year(), "2023");
        assert_eq!(ts.ymd(), "2023-03-05");
        assert_eq!(ts.medium(), "Mar 5, 2023");
    }

    #[test]
    fn parses_iso_dates_as_utc_midnight() {
        assert_eq!(
            Timestamp::parse("1920-01-01").unwrap(),
            Timestamp::from_ymd(1920, 1, 1).unwrap()
        );
        assert!(Timestamp::parse("not a date").is_err());
    }

    #[test]
    fn parses_written_out_dates_as_utc_midnight() {
        let expected = Timestamp::from_ymd(2023, 3, 15).unwrap();
        assert_eq!(Timestamp::parse("March 15, 2023").unwrap(), expected);
        assert_eq!(Timestamp::parse("  March 15, 2023 ").unwrap(), expected);
    }

    #[test]
    fn keeps_an_explicit_time() {
        let ts = Timestamp::parse("2023-03-15T10:30:00Z").unwrap();
        let midnight = Timestamp::from_ymd(2023, 3, 15).unwrap();
        assert_eq!(ts.millis() - midnight.millis(), 37_800_000);
    }

    #[test]
    fn now_is_truncated_to_millis() {
        let now = Timestamp::now();
        assert_eq!(Timestamp::from_millis(now.millis()), Some(now));
    }
}
