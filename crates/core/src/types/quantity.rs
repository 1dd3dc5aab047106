//! Bounded positive integers used by recipes.
//!
//! Both types mirror a `SMALLINT` column with a `CHECK (value >= 1)`
//! constraint, so valid values are `1..=32767`.

use core::fmt;

use serde::Serialize;

/// Errors that can occur when constructing an [`Amount`] or [`CookingTime`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    #[error("must be at least {min}")]
    TooSmall { min: i64 },
    #[error("must be at most {max}")]
    TooLarge { max: i64 },
}

macro_rules! define_quantity {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(i16);

        impl $name {
            pub const MIN: i64 = 1;
            pub const MAX: i64 = 32_767;

            /// Validate and wrap a raw value.
            ///
            /// # Errors
            ///
            /// Returns [`QuantityError`] when the value is outside `1..=32767`.
            pub fn new(value: i64) -> Result<Self, QuantityError> {
                if value < Self::MIN {
                    return Err(QuantityError::TooSmall { min: Self::MIN });
                }
                i16::try_from(value)
                    .map(Self)
                    .map_err(|_| QuantityError::TooLarge { max: Self::MAX })
            }

            #[must_use]
            pub const fn get(self) -> i16 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        #[cfg(feature = "postgres")]
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <i16 as sqlx::Type<sqlx::Postgres>>::type_info()
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let raw = <i16 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(Self::new(i64::from(raw))?)
            }
        }

        #[cfg(feature = "postgres")]
        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <i16 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_quantity!(
    /// Quantity of one ingredient in a recipe, in the ingredient's unit.
    Amount
);

define_quantity!(
    /// Cooking time in minutes.
    CookingTime
);
