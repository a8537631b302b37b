//! Product and stock records.
//!
//! Stock lives in the same database as the ledger so that a sale (stock
//! decrement) and a cancellation (restock) commit atomically with the
//! receipt they belong to.
//!
//! Prices are integer **minor units** (cents); quantities are whole units.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, ResultLedger};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub sku: Option<String>,
    pub unit_price: i64,
    pub quantity_in_stock: i64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(name: String, unit_price: i64, quantity_in_stock: i64) -> ResultLedger<Self> {
        if unit_price < 0 {
            return Err(LedgerError::InvalidAmount(
                "unit_price must be >= 0".to_string(),
            ));
        }
        if quantity_in_stock < 0 {
            return Err(LedgerError::InvalidAmount(
                "quantity_in_stock must be >= 0".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            sku: None,
            unit_price,
            quantity_in_stock,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Removes `quantity` units from stock for a sale.
    ///
    /// Stock never goes negative: a sale larger than the available quantity
    /// fails the whole transaction with [`LedgerError::InsufficientStock`].
    pub fn deduct(&mut self, quantity: i64) -> ResultLedger<()> {
        if quantity <= 0 {
            return Err(LedgerError::InvalidAmount(
                "quantity must be > 0".to_string(),
            ));
        }
        if quantity > self.quantity_in_stock {
            return Err(LedgerError::InsufficientStock(self.name.clone()));
        }
        self.quantity_in_stock -= quantity;
        Ok(())
    }

    /// Returns `quantity` units to stock (cancellation or manual restock).
    pub fn restock(&mut self, quantity: i64) -> ResultLedger<()> {
        if quantity <= 0 {
            return Err(LedgerError::InvalidAmount(
                "quantity must be > 0".to_string(),
            ));
        }
        self.quantity_in_stock += quantity;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub sku: Option<String>,
    pub unit_price: i64,
    pub quantity_in_stock: i64,
    pub is_deleted: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::receipt_items::Entity")]
    ReceiptItems,
}

impl Related<super::receipt_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReceiptItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Product> for ActiveModel {
    fn from(product: &Product) -> Self {
        Self {
            id: ActiveValue::Set(product.id.to_string()),
            name: ActiveValue::Set(product.name.clone()),
            sku: ActiveValue::Set(product.sku.clone()),
            unit_price: ActiveValue::Set(product.unit_price),
            quantity_in_stock: ActiveValue::Set(product.quantity_in_stock),
            is_deleted: ActiveValue::Set(product.is_deleted),
            created_at: ActiveValue::Set(product.created_at),
            updated_at: ActiveValue::Set(product.updated_at),
        }
    }
}

impl TryFrom<Model> for Product {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::KeyNotFound("product not exists".to_string()))?,
            name: model.name,
            sku: model.sku,
            unit_price: model.unit_price,
            quantity_in_stock: model.quantity_in_stock,
            is_deleted: model.is_deleted,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soap() -> Product {
        Product::new("Soap".to_string(), 2_50, 10).unwrap()
    }

    #[test]
    fn deduct_reduces_stock() {
        let mut product = soap();
        product.deduct(3).unwrap();
        assert_eq!(product.quantity_in_stock, 7);
    }

    #[test]
    fn deduct_never_goes_negative() {
        let mut product = soap();
        let err = product.deduct(11).unwrap_err();
        assert_eq!(err, LedgerError::InsufficientStock("Soap".to_string()));
        assert_eq!(product.quantity_in_stock, 10);
    }

    #[test]
    fn restock_reverses_deduct() {
        let mut product = soap();
        product.deduct(10).unwrap();
        product.restock(10).unwrap();
        assert_eq!(product.quantity_in_stock, 10);
    }

    #[test]
    fn zero_quantity_rejected() {
        let mut product = soap();
        assert!(product.deduct(0).is_err());
        assert!(product.restock(0).is_err());
    }
}
