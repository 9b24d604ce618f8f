//! Human-facing order number type.
//!
//! Order numbers look like `ORD-MB3K2J9X-7FQ2`: a fixed prefix, the creation
//! time in base-36 milliseconds, and a short random suffix. They are the
//! identifier customers see on receipts and the admin sees in the back
//! office; the database still keys orders by [`OrderId`](crate::OrderId).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Prefix for all order numbers.
pub const ORDER_NUMBER_PREFIX: &str = "ORD";

/// Errors that can occur when parsing an [`OrderNumber`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum OrderNumberError {
    /// The input does not start with the `ORD-` prefix.
    #[error("order number must start with '{ORDER_NUMBER_PREFIX}-'")]
    BadPrefix,
    /// The input does not have the `ORD-<time>-<suffix>` shape.
    #[error("order number must have the form ORD-<timestamp>-<suffix>")]
    BadShape,
    /// A segment contains characters outside A-Z0-9.
    #[error("order number segments must be uppercase alphanumeric")]
    BadCharacters,
}

/// A validated order number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Parse an order number from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input does not have the
    /// `ORD-<timestamp>-<suffix>` shape with uppercase alphanumeric segments.
    pub fn parse(s: &str) -> Result<Self, OrderNumberError> {
        let rest = s
            .strip_prefix(ORDER_NUMBER_PREFIX)
            .and_then(|r| r.strip_prefix('-'))
            .ok_or(OrderNumberError::BadPrefix)?;

        let (timestamp, suffix) = rest.split_once('-').ok_or(OrderNumberError::BadShape)?;

        if timestamp.is_empty() || suffix.is_empty() {
            return Err(OrderNumberError::BadShape);
        }

        let valid = |seg: &str| {
            seg.chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        };
        if !valid(timestamp) || !valid(suffix) {
            return Err(OrderNumberError::BadCharacters);
        }

        Ok(Self(s.to_owned()))
    }

    /// Build an order number from its parts.
    ///
    /// Both segments must already be uppercase alphanumeric; the server's
    /// order repository generates them from the clock and an RNG.
    #[must_use]
    pub fn from_parts(timestamp: &str, suffix: &str) -> Self {
        Self(format!("{ORDER_NUMBER_PREFIX}-{timestamp}-{suffix}"))
    }

    /// Get the order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<'_, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<'_, sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let n = OrderNumber::parse("ORD-MB3K2J9X-7FQ2").expect("valid");
        assert_eq!(n.as_str(), "ORD-MB3K2J9X-7FQ2");
    }

    #[test]
    fn test_from_parts() {
        let n = OrderNumber::from_parts("MB3K2J9X", "7FQ2");
        assert_eq!(n.to_string(), "ORD-MB3K2J9X-7FQ2");
        assert!(OrderNumber::parse(n.as_str()).is_ok());
    }

    #[test]
    fn test_parse_bad_prefix() {
        assert!(matches!(
            OrderNumber::parse("INV-MB3K2J9X-7FQ2"),
            Err(OrderNumberError::BadPrefix)
        ));
    }

    #[test]
    fn test_parse_bad_shape() {
        assert!(matches!(
            OrderNumber::parse("ORD-MB3K2J9X"),
            Err(OrderNumberError::BadShape)
        ));
        assert!(matches!(
            OrderNumber::parse("ORD--7FQ2"),
            Err(OrderNumberError::BadShape)
        ));
    }

    #[test]
    fn test_parse_bad_characters() {
        assert!(matches!(
            OrderNumber::parse("ORD-mb3k2j9x-7fq2"),
            Err(OrderNumberError::BadCharacters)
        ));
    }
}
