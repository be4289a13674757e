//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneNumberError {
    /// The input does not match the accepted format.
    #[error(
        "Phone number must be entered in the format: '+999999999'. Up to 15 digits allowed."
    )]
    InvalidFormat,
}

/// A phone number.
///
/// Accepts an optional leading `+`, an optional literal `1`, then 9-15
/// digits. Anything else is rejected.
///
/// ## Examples
///
/// ```
/// use tradewind_core::PhoneNumber;
///
/// assert!(PhoneNumber::parse("+12345678901").is_ok());
/// assert!(PhoneNumber::parse("1234567890").is_ok());
///
/// assert!(PhoneNumber::parse("abc123").is_err());
/// assert!(PhoneNumber::parse("12345678").is_err()); // too short
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse a `PhoneNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns `PhoneNumberError::InvalidFormat` if the input does not
    /// consist of an optional `+`, an optional `1`, and 9-15 digits.
    pub fn parse(s: &str) -> Result<Self, PhoneNumberError> {
        let rest = s.strip_prefix('+').unwrap_or(s);

        // The leading `1` is optional, so a bare run of 9-15 digits that
        // happens to start with `1` is also accepted.
        let matches = digits_in_range(rest)
            || rest.strip_prefix('1').is_some_and(digits_in_range);

        if matches {
            Ok(Self(s.to_owned()))
        } else {
            Err(PhoneNumberError::InvalidFormat)
        }
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PhoneNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// True if `s` is 9-15 ASCII digits.
fn digits_in_range(s: &str) -> bool {
    (9..=15).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for PhoneNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for PhoneNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for PhoneNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
