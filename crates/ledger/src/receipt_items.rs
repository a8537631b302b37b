//! Receipt line items.
//!
//! The product name is denormalized onto the line so a receipt stays
//! readable even after the product record changes.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, ResultLedger};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub id: Uuid,
    pub receipt_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReceiptItem {
    pub fn new(
        receipt_id: Uuid,
        product_id: Uuid,
        product_name: String,
        quantity: i64,
        unit_price: i64,
    ) -> ResultLedger<Self> {
        if quantity <= 0 {
            return Err(LedgerError::InvalidAmount(
                "quantity must be > 0".to_string(),
            ));
        }
        if unit_price < 0 {
            return Err(LedgerError::InvalidAmount(
                "unit_price must be >= 0".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            receipt_id,
            product_id,
            product_name,
            quantity,
            unit_price,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn subtotal(&self) -> i64 {
        self.quantity * self.unit_price
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "receipt_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub receipt_id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub is_deleted: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::receipts::Entity",
        from = "Column::ReceiptId",
        to = "super::receipts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Receipts,
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Products,
}

impl Related<super::receipts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receipts.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ReceiptItem> for ActiveModel {
    fn from(item: &ReceiptItem) -> Self {
        Self {
            id: ActiveValue::Set(item.id.to_string()),
            receipt_id: ActiveValue::Set(item.receipt_id.to_string()),
            product_id: ActiveValue::Set(item.product_id.to_string()),
            product_name: ActiveValue::Set(item.product_name.clone()),
            quantity: ActiveValue::Set(item.quantity),
            unit_price: ActiveValue::Set(item.unit_price),
            is_deleted: ActiveValue::Set(item.is_deleted),
            created_at: ActiveValue::Set(item.created_at),
            updated_at: ActiveValue::Set(item.updated_at),
        }
    }
}

impl TryFrom<Model> for ReceiptItem {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::KeyNotFound("receipt item not exists".to_string()))?,
            receipt_id: Uuid::parse_str(&model.receipt_id)
                .map_err(|_| LedgerError::KeyNotFound("receipt not exists".to_string()))?,
            product_id: Uuid::parse_str(&model.product_id)
                .map_err(|_| LedgerError::KeyNotFound("product not exists".to_string()))?,
            product_name: model.product_name,
            quantity: model.quantity,
            unit_price: model.unit_price,
            is_deleted: model.is_deleted,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
