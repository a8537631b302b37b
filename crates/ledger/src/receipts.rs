//! Receipt records.
//!
//! A receipt is one sale. At creation `total_amount == amount_paid +
//! credit_amount` always holds; the under-paid part becomes a credit line.
//!
//! Cancellation keeps the row for the audit trail: amounts are zeroed and
//! `is_cancelled` is set instead of deleting anything.
//!
//! Amounts are stored as integer minor units (`i64` cents).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, ResultLedger};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub amount_paid: i64,
    pub total_amount: i64,
    pub credit_amount: i64,
    pub tax: i64,
    pub note: Option<String>,
    pub is_cancelled: bool,
    pub cancellation_reason: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Receipt {
    pub fn new(
        customer_id: Option<Uuid>,
        amount_paid: i64,
        total_amount: i64,
        credit_amount: i64,
        tax: i64,
        note: Option<String>,
    ) -> ResultLedger<Self> {
        if amount_paid < 0 || total_amount < 0 || credit_amount < 0 || tax < 0 {
            return Err(LedgerError::InvalidAmount(
                "receipt amounts must be >= 0".to_string(),
            ));
        }
        if total_amount != amount_paid + credit_amount {
            return Err(LedgerError::InvalidAmount(format!(
                "total_amount must equal amount_paid + credit_amount ({} != {} + {})",
                total_amount, amount_paid, credit_amount
            )));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            customer_id,
            amount_paid,
            total_amount,
            credit_amount,
            tax,
            note,
            is_cancelled: false,
            cancellation_reason: None,
            latitude: None,
            longitude: None,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// A receipt counts toward customer aggregates only while active.
    pub fn is_active(&self) -> bool {
        !self.is_deleted && !self.is_cancelled
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "receipts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub customer_id: Option<String>,
    pub amount_paid: i64,
    pub total_amount: i64,
    pub credit_amount: i64,
    pub tax: i64,
    pub note: Option<String>,
    pub is_cancelled: bool,
    pub cancellation_reason: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
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
    #[sea_orm(has_many = "super::receipt_items::Entity")]
    ReceiptItems,
    #[sea_orm(has_many = "super::credits::Entity")]
    Credits,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::receipt_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReceiptItems.def()
    }
}

impl Related<super::credits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Credits.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Receipt> for ActiveModel {
    fn from(receipt: &Receipt) -> Self {
        Self {
            id: ActiveValue::Set(receipt.id.to_string()),
            customer_id: ActiveValue::Set(receipt.customer_id.map(|id| id.to_string())),
            amount_paid: ActiveValue::Set(receipt.amount_paid),
            total_amount: ActiveValue::Set(receipt.total_amount),
            credit_amount: ActiveValue::Set(receipt.credit_amount),
            tax: ActiveValue::Set(receipt.tax),
            note: ActiveValue::Set(receipt.note.clone()),
            is_cancelled: ActiveValue::Set(receipt.is_cancelled),
            cancellation_reason: ActiveValue::Set(receipt.cancellation_reason.clone()),
            latitude: ActiveValue::Set(receipt.latitude),
            longitude: ActiveValue::Set(receipt.longitude),
            is_deleted: ActiveValue::Set(receipt.is_deleted),
            created_at: ActiveValue::Set(receipt.created_at),
            updated_at: ActiveValue::Set(receipt.updated_at),
        }
    }
}

impl TryFrom<Model> for Receipt {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::KeyNotFound("receipt not exists".to_string()))?,
            customer_id: model
                .customer_id
                .as_deref()
                .and_then(|s| Uuid::parse_str(s).ok()),
            amount_paid: model.amount_paid,
            total_amount: model.total_amount,
            credit_amount: model.credit_amount,
            tax: model.tax,
            note: model.note,
            is_cancelled: model.is_cancelled,
            cancellation_reason: model.cancellation_reason,
            latitude: model.latitude,
            longitude: model.longitude,
            is_deleted: model.is_deleted,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
