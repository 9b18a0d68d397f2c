use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Money amount held in minor units (cents). Travels over the wire as a
/// decimal number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Amount(i64);

impl Amount {
    pub fn from_cents(cents: i64) -> Self {
        Amount(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AmountError {
    #[error("amount must be a finite number, got {0}")]
    NotFinite(f64),
    #[error("amount must not be negative, got {0}")]
    Negative(f64),
    #[error("amount {0} is out of range")]
    OutOfRange(f64),
}

impl TryFrom<f64> for Amount {
    type Error = AmountError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(AmountError::NotFinite(value));
        }
        if value < 0.0 {
            return Err(AmountError::Negative(value));
        }
        let cents = (value * 100.0).round();
        if cents > i64::MAX as f64 {
            return Err(AmountError::OutOfRange(value));
        }
        Ok(Amount(cents as i64))
    }
}

impl From<Amount> for f64 {
    fn from(amount: Amount) -> Self {
        amount.0 as f64 / 100.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// A booking about to be written. The labels are kept exactly as the
/// customer entered them; the covered slots are recomputed from them.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub user_id: i32,
    pub date: NaiveDate,
    pub from_label: String,
    pub to_label: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub booking_id: i32,
    pub user_id: i32,
    pub date: NaiveDate,
    pub from_label: String,
    pub to_label: String,
    pub amount: Amount,
}

impl Booking {
    pub fn from_new(booking_id: i32, new: NewBooking) -> Self {
        Self {
            booking_id,
            user_id: new.user_id,
            date: new.date,
            from_label: new.from_label,
            to_label: new.to_label,
            amount: new.amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_from_decimal() {
        let amount: Amount = serde_json::from_str("1200.5").unwrap();
        assert_eq!(amount.cents(), 120050);
        assert_eq!(amount.to_string(), "1200.50");
        assert_eq!(serde_json::to_string(&amount).unwrap(), "1200.5");

        assert_eq!(Amount::try_from(0.1 + 0.2).unwrap().cents(), 30);
        assert!(serde_json::from_str::<Amount>("-4").is_err());
    }
}
