//! Receipt orchestration: create, cancel, reassign.

use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Credit, Customer, CustomerRef, LedgerError, Payment, PaymentKind, Product, Receipt,
    ReceiptItem, ResultLedger, commands::CreateReceiptCmd, credits, customers, payments,
    receipt_items, receipts,
};

use super::{Ledger, normalize_optional_text, normalize_required_text, with_tx};

/// A receipt with its live children, as returned by [`Ledger::receipt_detail`].
#[derive(Clone, Debug)]
pub struct ReceiptDetail {
    pub receipt: Receipt,
    pub items: Vec<ReceiptItem>,
    pub payments: Vec<Payment>,
    pub credit: Option<Credit>,
}

impl Ledger {
    /// Creates a receipt with its items, tendered payments and (when the
    /// sale is under-paid) a credit line, all in one transaction.
    ///
    /// Every item decrements the product's stock; a sale that would drive
    /// stock negative fails the whole transaction. After the commit the
    /// receipt is geotagged best-effort on a background task.
    pub async fn create_receipt(&self, cmd: CreateReceiptCmd) -> ResultLedger<Uuid> {
        let receipt_id = with_tx!(self, |db_tx| {
            let customer = self.resolve_customer(&db_tx, cmd.customer.as_ref()).await?;
            if cmd.credit_amount > 0 && customer.is_none() {
                return Err(LedgerError::InvalidAmount(
                    "credit sales require a customer".to_string(),
                ));
            }

            let receipt = Receipt::new(
                customer.as_ref().map(|c| c.id),
                cmd.amount_paid,
                cmd.total_amount,
                cmd.credit_amount,
                cmd.tax,
                normalize_optional_text(cmd.note.as_deref()),
            )?;
            receipts::ActiveModel::from(&receipt).insert(&db_tx).await?;

            for item in &cmd.items {
                let product_model = self.require_product(&db_tx, item.product_id).await?;
                let mut product = Product::try_from(product_model)?;
                product.deduct(item.quantity)?;
                let product_update = crate::products::ActiveModel {
                    id: ActiveValue::Set(product.id.to_string()),
                    quantity_in_stock: ActiveValue::Set(product.quantity_in_stock),
                    updated_at: ActiveValue::Set(Utc::now()),
                    ..Default::default()
                };
                product_update.update(&db_tx).await?;

                let line = ReceiptItem::new(
                    receipt.id,
                    product.id,
                    product.name.clone(),
                    item.quantity,
                    item.unit_price,
                )?;
                receipt_items::ActiveModel::from(&line).insert(&db_tx).await?;
            }

            for tender in &cmd.payments {
                let mut payment =
                    Payment::new(PaymentKind::Receipt, tender.amount, tender.method.clone())?;
                payment.receipt_id = Some(receipt.id);
                payment.note = normalize_optional_text(tender.note.as_deref());
                if let Some(customer) = &customer {
                    payment.customer_id = Some(customer.id);
                    payment.customer_name = Some(customer.name.clone());
                    payment.customer_mobile = Some(customer.mobile.clone());
                }
                payments::ActiveModel::from(&payment).insert(&db_tx).await?;
            }

            if cmd.credit_amount > 0 {
                if let Some(customer) = &customer {
                    let credit =
                        Credit::open(customer.id, receipt.id, cmd.credit_amount, cmd.due_date)?;
                    credits::ActiveModel::from(&credit).insert(&db_tx).await?;
                }
            }

            tracing::info!(
                receipt_id = %receipt.id,
                total_amount = receipt.total_amount,
                credit_amount = receipt.credit_amount,
                "receipt created"
            );
            Ok::<_, LedgerError>(receipt.id)
        })?;

        self.spawn_geotag(receipt_id);
        Ok(receipt_id)
    }

    /// Cancels a receipt, reversing everything it did.
    ///
    /// Stock is returned, items and payments are soft-deleted and the
    /// credit line is closed. The receipt row itself stays (amounts zeroed,
    /// `is_cancelled` set) as the audit trail.
    pub async fn cancel_receipt(&self, receipt_id: Uuid, reason: &str) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let receipt_model = self.require_receipt(&db_tx, receipt_id).await?;
            if receipt_model.is_cancelled {
                return Err(LedgerError::Cancelled(receipt_id.to_string()));
            }
            let now = Utc::now();

            let item_models = receipt_items::Entity::find()
                .filter(receipt_items::Column::ReceiptId.eq(receipt_id.to_string()))
                .filter(receipt_items::Column::IsDeleted.eq(false))
                .all(&db_tx)
                .await?;
            for item_model in item_models {
                // Restock even soft-deleted products; the row always exists.
                let product_model = crate::products::Entity::find_by_id(item_model.product_id.clone())
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| LedgerError::KeyNotFound("product not exists".to_string()))?;
                let mut product = Product::try_from(product_model)?;
                product.restock(item_model.quantity)?;
                let product_update = crate::products::ActiveModel {
                    id: ActiveValue::Set(product.id.to_string()),
                    quantity_in_stock: ActiveValue::Set(product.quantity_in_stock),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                };
                product_update.update(&db_tx).await?;

                let item_update = receipt_items::ActiveModel {
                    id: ActiveValue::Set(item_model.id),
                    is_deleted: ActiveValue::Set(true),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                };
                item_update.update(&db_tx).await?;
            }

            let payment_models = payments::Entity::find()
                .filter(payments::Column::ReceiptId.eq(receipt_id.to_string()))
                .filter(payments::Column::IsDeleted.eq(false))
                .all(&db_tx)
                .await?;
            for payment_model in payment_models {
                let payment_update = payments::ActiveModel {
                    id: ActiveValue::Set(payment_model.id),
                    is_deleted: ActiveValue::Set(true),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                };
                payment_update.update(&db_tx).await?;
            }

            let credit_models = credits::Entity::find()
                .filter(credits::Column::ReceiptId.eq(receipt_id.to_string()))
                .filter(credits::Column::IsDeleted.eq(false))
                .all(&db_tx)
                .await?;
            for credit_model in credit_models {
                self.close_credit_line(&db_tx, credit_model).await?;
            }

            let receipt_update = receipts::ActiveModel {
                id: ActiveValue::Set(receipt_model.id),
                amount_paid: ActiveValue::Set(0),
                total_amount: ActiveValue::Set(0),
                credit_amount: ActiveValue::Set(0),
                is_cancelled: ActiveValue::Set(true),
                cancellation_reason: ActiveValue::Set(Some(reason.to_string())),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            receipt_update.update(&db_tx).await?;

            tracing::info!(receipt_id = %receipt_id, reason, "receipt cancelled");
            Ok(())
        })
    }

    /// Moves a receipt (with its payments and credit line) to another
    /// customer.
    pub async fn reassign_receipt_customer(
        &self,
        receipt_id: Uuid,
        customer_id: Uuid,
    ) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let receipt_model = self.require_receipt(&db_tx, receipt_id).await?;
            let customer_model = self.require_customer(&db_tx, customer_id).await?;
            let now = Utc::now();

            let receipt_update = receipts::ActiveModel {
                id: ActiveValue::Set(receipt_model.id),
                customer_id: ActiveValue::Set(Some(customer_id.to_string())),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            receipt_update.update(&db_tx).await?;

            let payment_models = payments::Entity::find()
                .filter(payments::Column::ReceiptId.eq(receipt_id.to_string()))
                .all(&db_tx)
                .await?;
            for payment_model in payment_models {
                let payment_update = payments::ActiveModel {
                    id: ActiveValue::Set(payment_model.id),
                    customer_id: ActiveValue::Set(Some(customer_id.to_string())),
                    customer_name: ActiveValue::Set(Some(customer_model.name.clone())),
                    customer_mobile: ActiveValue::Set(Some(customer_model.mobile.clone())),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                };
                payment_update.update(&db_tx).await?;
            }

            let credit_models = credits::Entity::find()
                .filter(credits::Column::ReceiptId.eq(receipt_id.to_string()))
                .all(&db_tx)
                .await?;
            for credit_model in credit_models {
                let credit_update = credits::ActiveModel {
                    id: ActiveValue::Set(credit_model.id),
                    customer_id: ActiveValue::Set(customer_id.to_string()),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                };
                credit_update.update(&db_tx).await?;
            }

            Ok(())
        })
    }

    /// Returns every live receipt of a customer, oldest first.
    pub async fn customer_receipts(&self, customer_id: Uuid) -> ResultLedger<Vec<Receipt>> {
        with_tx!(self, |db_tx| {
            self.require_customer(&db_tx, customer_id).await?;
            let models = receipts::Entity::find()
                .filter(receipts::Column::CustomerId.eq(customer_id.to_string()))
                .filter(receipts::Column::IsDeleted.eq(false))
                .order_by_asc(receipts::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            let mut customer_receipts = Vec::with_capacity(models.len());
            for model in models {
                customer_receipts.push(Receipt::try_from(model)?);
            }
            Ok(customer_receipts)
        })
    }

    /// Returns a single receipt header.
    pub async fn receipt(&self, id: Uuid) -> ResultLedger<Receipt> {
        with_tx!(self, |db_tx| {
            let model = self.require_receipt(&db_tx, id).await?;
            Receipt::try_from(model)
        })
    }

    /// Returns a receipt with its live items, payments and credit line.
    pub async fn receipt_detail(&self, id: Uuid) -> ResultLedger<ReceiptDetail> {
        with_tx!(self, |db_tx| {
            let receipt = Receipt::try_from(self.require_receipt(&db_tx, id).await?)?;

            let item_models = receipt_items::Entity::find()
                .filter(receipt_items::Column::ReceiptId.eq(id.to_string()))
                .filter(receipt_items::Column::IsDeleted.eq(false))
                .order_by_asc(receipt_items::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            let mut items = Vec::with_capacity(item_models.len());
            for model in item_models {
                items.push(ReceiptItem::try_from(model)?);
            }

            let payment_models = payments::Entity::find()
                .filter(payments::Column::ReceiptId.eq(id.to_string()))
                .filter(payments::Column::IsDeleted.eq(false))
                .order_by_asc(payments::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            let mut receipt_payments = Vec::with_capacity(payment_models.len());
            for model in payment_models {
                receipt_payments.push(Payment::try_from(model)?);
            }

            let credit = credits::Entity::find()
                .filter(credits::Column::ReceiptId.eq(id.to_string()))
                .filter(credits::Column::IsDeleted.eq(false))
                .one(&db_tx)
                .await?
                .map(Credit::try_from)
                .transpose()?;

            Ok(ReceiptDetail {
                receipt,
                items,
                payments: receipt_payments,
                credit,
            })
        })
    }

    async fn resolve_customer(
        &self,
        db_tx: &sea_orm::DatabaseTransaction,
        customer: Option<&CustomerRef>,
    ) -> ResultLedger<Option<Customer>> {
        match customer {
            None => Ok(None),
            Some(CustomerRef::Existing(id)) => {
                let model = self.require_customer(db_tx, *id).await?;
                Ok(Some(Customer::try_from(model)?))
            }
            Some(CustomerRef::New { name, mobile }) => {
                let name = normalize_required_text(name, "customer name")?;
                let mobile = normalize_required_text(mobile, "customer mobile")?;
                // A known mobile reuses the existing record instead of
                // creating a duplicate.
                let existing = customers::Entity::find()
                    .filter(customers::Column::Mobile.eq(mobile.clone()))
                    .filter(customers::Column::IsDeleted.eq(false))
                    .one(db_tx)
                    .await?;
                if let Some(model) = existing {
                    return Ok(Some(Customer::try_from(model)?));
                }
                let new_customer = Customer::new(name, mobile);
                customers::ActiveModel::from(&new_customer)
                    .insert(db_tx)
                    .await?;
                Ok(Some(new_customer))
            }
        }
    }

    fn spawn_geotag(&self, receipt_id: Uuid) {
        let Some(source) = self.location.clone() else {
            return;
        };
        let db = self.database.clone();
        tokio::spawn(async move {
            let Some(position) = source.current_position().await else {
                return;
            };
            let receipt_update = receipts::ActiveModel {
                id: ActiveValue::Set(receipt_id.to_string()),
                latitude: ActiveValue::Set(Some(position.latitude)),
                longitude: ActiveValue::Set(Some(position.longitude)),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            if let Err(err) = receipt_update.update(&db).await {
                tracing::warn!("failed to geotag receipt {receipt_id}: {err}");
            }
        });
    }
}
