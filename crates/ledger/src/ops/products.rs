//! Product catalog and stock adjustments.

use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{LedgerError, Product, ResultLedger, products};

use super::{Ledger, normalize_optional_text, normalize_required_text, with_tx};

impl Ledger {
    /// Adds a product to the catalog. The name must be unique among live
    /// products.
    pub async fn create_product(
        &self,
        name: &str,
        sku: Option<&str>,
        unit_price: i64,
        quantity_in_stock: i64,
    ) -> ResultLedger<Uuid> {
        let name = normalize_required_text(name, "product name")?;

        with_tx!(self, |db_tx| {
            let existing = products::Entity::find()
                .filter(products::Column::Name.eq(name.clone()))
                .filter(products::Column::IsDeleted.eq(false))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(LedgerError::ExistingKey(name));
            }

            let mut product = Product::new(name, unit_price, quantity_in_stock)?;
            product.sku = normalize_optional_text(sku);
            products::ActiveModel::from(&product).insert(&db_tx).await?;

            tracing::info!(product_id = %product.id, "product created");
            Ok(product.id)
        })
    }

    /// Returns a single live product.
    pub async fn product(&self, id: Uuid) -> ResultLedger<Product> {
        with_tx!(self, |db_tx| {
            let model = self.require_product(&db_tx, id).await?;
            Product::try_from(model)
        })
    }

    /// Adds stock to a product.
    pub async fn restock_product(&self, id: Uuid, quantity: i64) -> ResultLedger<Product> {
        with_tx!(self, |db_tx| {
            let model = self.require_product(&db_tx, id).await?;
            let mut product = Product::try_from(model)?;
            product.restock(quantity)?;

            let product_update = products::ActiveModel {
                id: ActiveValue::Set(product.id.to_string()),
                quantity_in_stock: ActiveValue::Set(product.quantity_in_stock),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            product_update.update(&db_tx).await?;

            tracing::info!(product_id = %id, quantity, "product restocked");
            Ok(product)
        })
    }
}
