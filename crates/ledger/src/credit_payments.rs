//! Credit payment join records.
//!
//! One row links one [`Payment`](crate::Payment) to the credit line it was
//! applied against. Several rows may reference the same credit (partial
//! payments over time).
//!
//! `amount_paid` here is the **full incoming amount** of the originating
//! payment, even when only part of it landed on this line. That matches
//! the historical data written by earlier versions of this product; the
//! per-line applied portion is carried by the Payment row instead.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::LedgerError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditPayment {
    pub id: Uuid,
    pub credit_id: Uuid,
    pub payment_id: Uuid,
    pub amount_paid: i64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CreditPayment {
    pub fn new(credit_id: Uuid, payment_id: Uuid, amount_paid: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            credit_id,
            payment_id,
            amount_paid,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "credit_payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub credit_id: String,
    pub payment_id: String,
    pub amount_paid: i64,
    pub is_deleted: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::credits::Entity",
        from = "Column::CreditId",
        to = "super::credits::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Credits,
    #[sea_orm(
        belongs_to = "super::payments::Entity",
        from = "Column::PaymentId",
        to = "super::payments::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Payments,
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

impl From<&CreditPayment> for ActiveModel {
    fn from(cp: &CreditPayment) -> Self {
        Self {
            id: ActiveValue::Set(cp.id.to_string()),
            credit_id: ActiveValue::Set(cp.credit_id.to_string()),
            payment_id: ActiveValue::Set(cp.payment_id.to_string()),
            amount_paid: ActiveValue::Set(cp.amount_paid),
            is_deleted: ActiveValue::Set(cp.is_deleted),
            created_at: ActiveValue::Set(cp.created_at),
            updated_at: ActiveValue::Set(cp.updated_at),
        }
    }
}

impl TryFrom<Model> for CreditPayment {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::KeyNotFound("credit payment not exists".to_string()))?,
            credit_id: Uuid::parse_str(&model.credit_id)
                .map_err(|_| LedgerError::KeyNotFound("credit not exists".to_string()))?,
            payment_id: Uuid::parse_str(&model.payment_id)
                .map_err(|_| LedgerError::KeyNotFound("payment not exists".to_string()))?,
            amount_paid: model.amount_paid,
            is_deleted: model.is_deleted,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
