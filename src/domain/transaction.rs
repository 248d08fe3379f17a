//! Transaction domain entity.
//! Framework-agnostic representation of an order transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::status::TransactionStatus;

/// Gross amount of a transaction in integer minor units plus currency code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalPrice {
    pub gross: i64,
    pub currency: String,
}

impl TotalPrice {
    pub fn new(gross: i64, currency: impl Into<String>) -> Self {
        Self {
            gross,
            currency: currency.into(),
        }
    }

    /// The amount in major units. Minor units are hundredths, so 1050
    /// cents becomes 10.50.
    pub fn major_units(&self) -> Decimal {
        Decimal::new(self.gross, 2)
    }
}

/// Domain entity representing a transaction.
///
/// Created by order placement outside this layer; payment initiation and
/// callback handling only ever move its status and foreign id forward.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Uuid,
    pub reference_number: String,
    pub total_price: TotalPrice,
    /// `None` until the payment has been initiated.
    pub status: Option<TransactionStatus>,
    /// Payment identifier assigned by the external provider.
    pub foreign_id: Option<String>,
    pub customer_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        reference_number: impl Into<String>,
        total_price: TotalPrice,
        customer_id: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            reference_number: reference_number.into(),
            total_price,
            status: None,
            foreign_id: None,
            customer_id,
            created_at: now,
            updated_at: now,
        }
    }
}
