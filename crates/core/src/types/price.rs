//! Money amounts in Indonesian Rupiah.
//!
//! The store trades in a single currency, so a price is a non-negative decimal
//! amount in rupiah. Arithmetic stays in [`Decimal`] to avoid float drift when
//! line totals are summed.
//!
//! A constructed price fits the `NUMERIC(14,2)` columns it is stored in: at
//! most two decimal places and below [`Price::MAX_EXCLUSIVE`]. Multiples and
//! sums of prices saturate rather than overflow.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The input is not a decimal number.
    #[error("price is not a valid number: {0}")]
    Invalid(String),
    /// The amount does not fit the stored precision.
    #[error("price must be below 1000000000000")]
    TooLarge,
    /// The amount has sub-cent digits.
    #[error("price can have at most 2 decimal places")]
    TooPrecise,
}

/// A non-negative amount of rupiah.
///
/// Serializes as the bare decimal amount. Deserialization accepts either a
/// JSON number or a numeric string and rejects whatever [`Price::new`] does.
///
/// ```
/// use kedai_core::Price;
///
/// let shirt = Price::from_whole(50_000);
/// assert_eq!(shirt.times(2).to_string(), "Rp 100.000");
/// assert!("-1".parse::<Price>().is_err());
/// assert!("0.005".parse::<Price>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Zero rupiah.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Smallest amount that no longer fits `NUMERIC(14,2)`.
    pub const MAX_EXCLUSIVE: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero,
    /// [`PriceError::TooPrecise`] if it has more than two decimal places and
    /// [`PriceError::TooLarge`] if it is not below [`Price::MAX_EXCLUSIVE`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        let amount = Self::non_negative(amount)?;
        if amount.scale() > 2 {
            return Err(PriceError::TooPrecise);
        }
        if amount >= Self::MAX_EXCLUSIVE {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of rupiah.
    #[must_use]
    pub fn from_whole(rupiah: u32) -> Self {
        Self(Decimal::from(rupiah))
    }

    fn non_negative(amount: Decimal) -> Result<Decimal, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(amount.normalize())
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The price of `quantity` units, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.checked_mul(Decimal::from(quantity)).unwrap_or(Decimal::MAX))
    }

    /// Whether the amount still fits the `NUMERIC(14,2)` columns.
    ///
    /// Always true for a constructed price; sums and multiples can exceed it.
    #[must_use]
    pub fn is_storable(&self) -> bool {
        self.0 < Self::MAX_EXCLUSIVE && self.0.scale() <= 2
    }

    /// Whether this is exactly zero rupiah.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|e| PriceError::Invalid(e.to_string()))?;
        Self::new(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.checked_add(rhs.0).unwrap_or(Decimal::MAX))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Formats as `Rp 1.250.000` (Indonesian grouping), with `,NN` appended only
/// when the amount has a fractional part.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.0.round_dp(2);
        let whole = rounded.trunc();
        let cents = ((rounded - whole) * Decimal::ONE_HUNDRED).trunc();

        write!(f, "Rp {}", group_thousands(&whole.to_string()))?;
        if !cents.is_zero() {
            write!(f, ",{:0>2}", cents.to_string())?;
        }
        Ok(())
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

// SQLx support (with postgres feature): stored as NUMERIC
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        // Aggregates such as revenue sums may exceed a single column's bound.
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(Self::non_negative(amount)?))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
