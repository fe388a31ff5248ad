use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

use crate::validation::{ValidationErrors, ViolationKind};

/// Availability of a single copy of a book.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Available,
    #[default]
    Maintenance,
    Loaned,
    Reserved,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Available,
        Status::Maintenance,
        Status::Loaned,
        Status::Reserved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Available => "Available",
            Status::Maintenance => "Maintenance",
            Status::Loaned => "Loaned",
            Status::Reserved => "Reserved",
        }
    }

    /// SQL fragment listing every accepted value, for CHECK constraints.
    pub fn sql_list() -> String {
        Self::ALL
            .iter()
            .map(|x| format!("'{}'", x.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0:?} is not a valid status")]
pub struct StatusParseError(pub String);

impl From<StatusParseError> for ValidationErrors {
    fn from(e: StatusParseError) -> Self {
        let mut errors = ValidationErrors::new();
        errors.push(
            "status",
            ViolationKind::InvalidEnum {
                value:   e.0,
                allowed: Status::ALL.iter().map(|x| x.to_string()).collect(),
            },
        );
        errors
    }
}

impl FromStr for Status {
    type Err = StatusParseError;

    // Exact match only, the stored values are case sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|x| x.as_str() == s)
            .ok_or_else(|| StatusParseError(s.to_string()))
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl sqlx::Type<sqlx::Sqlite> for Status {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <&str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for Status {
    fn encode_by_ref(
        &self,
        args: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> sqlx::encode::IsNull {
        args.push(sqlx::sqlite::SqliteArgumentValue::Text(
            std::borrow::Cow::Borrowed(self.as_str()),
        ));

        sqlx::encode::IsNull::No
    }
}

impl<'r, DB: sqlx::Database> sqlx::Decode<'r, DB> for Status
where
    &'r str: sqlx::Decode<'r, DB>,
{
    fn decode(
        value: <DB as sqlx::database::HasValueRef<'r>>::ValueRef,
    ) -> Result<Self, Box<dyn std::error::Error + 'static + Send + Sync>> {
        let value = <&str as sqlx::Decode<DB>>::decode(value)?;
        Ok(value.parse::<Status>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_maintenance() {
        assert_eq!(Status::default(), Status::Maintenance);
    }

    #[test]
    fn rejects_values_outside_the_enumeration() {
        assert_eq!(
            "Borrowed".parse::<Status>(),
            Err(StatusParseError("Borrowed".into()))
        );
        assert!("available".parse::<Status>().is_err());
        let errors: ValidationErrors = "Borrowed".parse::<Status>().unwrap_err().into();
        assert!(errors.has("status"));
    }

    #[test]
    fn parses_every_variant() {
        for status in Status::ALL {
            assert_eq!(status.to_string().parse::<Status>(), Ok(status));
        }
    }
}
