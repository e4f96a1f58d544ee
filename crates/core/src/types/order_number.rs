//! Human-readable order numbers.

use core::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OrderNumber`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum OrderNumberError {
    /// The input does not match `ORD-YYYYMMDD-NNNN`.
    #[error("order number must match ORD-YYYYMMDD-NNNN")]
    Malformed,
    /// The date portion is not a valid calendar date.
    #[error("order number has an invalid date portion")]
    InvalidDate,
}

/// A unique, human-readable, date-scoped order identifier.
///
/// Format: `ORD-YYYYMMDD-NNNN`, where the date is the UTC calendar date of
/// creation and `NNNN` is a zero-padded per-day sequence starting at 0001.
/// Assigned exactly once at order creation; never changes afterwards.
/// Uniqueness is enforced by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Compose an order number from a calendar date and a per-day sequence.
    #[must_use]
    pub fn compose(date: NaiveDate, sequence: u32) -> Self {
        Self(format!("ORD-{}-{sequence:04}", date.format("%Y%m%d")))
    }

    /// Parse an `OrderNumber` from its canonical string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the input does not match `ORD-YYYYMMDD-NNNN` or
    /// the date portion is not a real calendar date.
    pub fn parse(s: &str) -> Result<Self, OrderNumberError> {
        let rest = s.strip_prefix("ORD-").ok_or(OrderNumberError::Malformed)?;
        let (date_part, seq_part) = rest.split_once('-').ok_or(OrderNumberError::Malformed)?;

        if date_part.len() != 8 || !date_part.chars().all(|c| c.is_ascii_digit()) {
            return Err(OrderNumberError::Malformed);
        }
        if seq_part.len() != 4 || !seq_part.chars().all(|c| c.is_ascii_digit()) {
            return Err(OrderNumberError::Malformed);
        }

        NaiveDate::parse_from_str(date_part, "%Y%m%d")
            .map_err(|_| OrderNumberError::InvalidDate)?;

        Ok(Self(s.to_owned()))
    }

    /// The UTC calendar date this order number was scoped to.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        let date_part = self.0.get(4..12)?;
        NaiveDate::parse_from_str(date_part, "%Y%m%d").ok()
    }

    /// The per-day sequence number.
    #[must_use]
    pub fn sequence(&self) -> Option<u32> {
        self.0.get(13..17)?.parse().ok()
    }

    /// Returns the order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `OrderNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OrderNumber {
    type Err = OrderNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for OrderNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
