//! Payment records.
//!
//! A payment is one money-in event, either tendered directly against a
//! receipt (`PaymentKind::Receipt`) or applied to a credit line
//! (`PaymentKind::Credit`). The customer name and mobile are denormalized
//! onto the row so history stays accurate if the customer record changes.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, ResultLedger};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    Receipt,
    Credit,
}

impl PaymentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Receipt => "receipt",
            Self::Credit => "credit",
        }
    }
}

impl TryFrom<&str> for PaymentKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "receipt" => Ok(Self::Receipt),
            "credit" => Ok(Self::Credit),
            other => Err(LedgerError::InvalidAmount(format!(
                "invalid payment kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub receipt_id: Option<Uuid>,
    pub kind: PaymentKind,
    pub amount_paid: i64,
    pub method: String,
    pub note: Option<String>,
    pub customer_name: Option<String>,
    pub customer_mobile: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(kind: PaymentKind, amount_paid: i64, method: String) -> ResultLedger<Self> {
        if amount_paid <= 0 {
            return Err(LedgerError::InvalidAmount(
                "amount_paid must be > 0".to_string(),
            ));
        }
        if method.trim().is_empty() {
            return Err(LedgerError::InvalidAmount(
                "payment method must not be empty".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            customer_id: None,
            receipt_id: None,
            kind,
            amount_paid,
            method,
            note: None,
            customer_name: None,
            customer_mobile: None,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub customer_id: Option<String>,
    pub receipt_id: Option<String>,
    pub kind: String,
    pub amount_paid: i64,
    pub method: String,
    pub note: Option<String>,
    pub customer_name: Option<String>,
    pub customer_mobile: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Customers,
    #[sea_orm(
        belongs_to = "super::receipts::Entity",
        from = "Column::ReceiptId",
        to = "super::receipts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Receipts,
    #[sea_orm(has_many = "super::credit_payments::Entity")]
    CreditPayments,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::receipts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receipts.def()
    }
}

impl Related<super::credit_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreditPayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Payment> for ActiveModel {
    fn from(payment: &Payment) -> Self {
        Self {
            id: ActiveValue::Set(payment.id.to_string()),
            customer_id: ActiveValue::Set(payment.customer_id.map(|id| id.to_string())),
            receipt_id: ActiveValue::Set(payment.receipt_id.map(|id| id.to_string())),
            kind: ActiveValue::Set(payment.kind.as_str().to_string()),
            amount_paid: ActiveValue::Set(payment.amount_paid),
            method: ActiveValue::Set(payment.method.clone()),
            note: ActiveValue::Set(payment.note.clone()),
            customer_name: ActiveValue::Set(payment.customer_name.clone()),
            customer_mobile: ActiveValue::Set(payment.customer_mobile.clone()),
            is_deleted: ActiveValue::Set(payment.is_deleted),
            created_at: ActiveValue::Set(payment.created_at),
            updated_at: ActiveValue::Set(payment.updated_at),
        }
    }
}

impl TryFrom<Model> for Payment {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::KeyNotFound("payment not exists".to_string()))?,
            customer_id: model
                .customer_id
                .as_deref()
                .and_then(|s| Uuid::parse_str(s).ok()),
            receipt_id: model
                .receipt_id
                .as_deref()
                .and_then(|s| Uuid::parse_str(s).ok()),
            kind: PaymentKind::try_from(model.kind.as_str())?,
            amount_paid: model.amount_paid,
            method: model.method,
            note: model.note,
            customer_name: model.customer_name,
            customer_mobile: model.customer_mobile,
            is_deleted: model.is_deleted,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_amount_rejected() {
        assert!(Payment::new(PaymentKind::Receipt, 0, "cash".to_string()).is_err());
        assert!(Payment::new(PaymentKind::Credit, -5, "cash".to_string()).is_err());
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [PaymentKind::Receipt, PaymentKind::Credit] {
            assert_eq!(PaymentKind::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(PaymentKind::try_from("cheque").is_err());
    }
}
