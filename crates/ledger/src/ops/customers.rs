//! Customer registry and balance snapshots.

use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    BalanceSheet, Credit, Customer, DebtPolicy, LedgerError, Receipt, ResultLedger,
    commands::CreateCustomerCmd, credit_payments, credits, customers, payments, projection,
    receipts,
};

use super::{Ledger, normalize_optional_text, normalize_required_text, with_tx};

/// A customer together with the balance sheet projected from their
/// receipts and credit lines.
#[derive(Clone, Debug)]
pub struct CustomerSnapshot {
    pub customer: Customer,
    pub sheet: BalanceSheet,
}

impl Ledger {
    /// Registers a customer. The mobile number must be unique among live
    /// customers.
    pub async fn create_customer(&self, cmd: CreateCustomerCmd) -> ResultLedger<Uuid> {
        let name = normalize_required_text(&cmd.name, "customer name")?;
        let mobile = normalize_required_text(&cmd.mobile, "customer mobile")?;

        with_tx!(self, |db_tx| {
            let existing = customers::Entity::find()
                .filter(customers::Column::Mobile.eq(mobile.clone()))
                .filter(customers::Column::IsDeleted.eq(false))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(LedgerError::ExistingKey(mobile));
            }

            let mut customer = Customer::new(name, mobile);
            customer.email = normalize_optional_text(cmd.email.as_deref());
            customer.notes = normalize_optional_text(cmd.notes.as_deref());
            customers::ActiveModel::from(&customer).insert(&db_tx).await?;

            tracing::info!(customer_id = %customer.id, "customer created");
            Ok(customer.id)
        })
    }

    /// Returns a single live customer.
    pub async fn customer(&self, id: Uuid) -> ResultLedger<Customer> {
        with_tx!(self, |db_tx| {
            let model = self.require_customer(&db_tx, id).await?;
            Customer::try_from(model)
        })
    }

    /// Returns the customer with their balance sheet under `policy`.
    pub async fn customer_snapshot(
        &self,
        id: Uuid,
        policy: DebtPolicy,
    ) -> ResultLedger<CustomerSnapshot> {
        with_tx!(self, |db_tx| {
            let customer = Customer::try_from(self.require_customer(&db_tx, id).await?)?;

            let receipt_models = receipts::Entity::find()
                .filter(receipts::Column::CustomerId.eq(id.to_string()))
                .all(&db_tx)
                .await?;
            let mut customer_receipts = Vec::with_capacity(receipt_models.len());
            for model in receipt_models {
                customer_receipts.push(Receipt::try_from(model)?);
            }

            let credit_models = credits::Entity::find()
                .filter(credits::Column::CustomerId.eq(id.to_string()))
                .all(&db_tx)
                .await?;
            let mut customer_credits = Vec::with_capacity(credit_models.len());
            for model in credit_models {
                customer_credits.push(Credit::try_from(model)?);
            }

            let sheet =
                projection::project(&customer_receipts, &customer_credits, policy, Utc::now());
            Ok(CustomerSnapshot { customer, sheet })
        })
    }

    /// Soft-deletes a customer and everything hanging off them: receipts,
    /// credit lines, payment links and payments.
    pub async fn delete_customer(&self, id: Uuid) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let customer_model = self.require_customer(&db_tx, id).await?;
            let now = Utc::now();

            let receipt_models = receipts::Entity::find()
                .filter(receipts::Column::CustomerId.eq(id.to_string()))
                .filter(receipts::Column::IsDeleted.eq(false))
                .all(&db_tx)
                .await?;
            for receipt_model in receipt_models {
                let receipt_update = receipts::ActiveModel {
                    id: ActiveValue::Set(receipt_model.id),
                    is_deleted: ActiveValue::Set(true),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                };
                receipt_update.update(&db_tx).await?;
            }

            let credit_models = credits::Entity::find()
                .filter(credits::Column::CustomerId.eq(id.to_string()))
                .filter(credits::Column::IsDeleted.eq(false))
                .all(&db_tx)
                .await?;
            for credit_model in credit_models {
                let link_models = credit_payments::Entity::find()
                    .filter(credit_payments::Column::CreditId.eq(credit_model.id.clone()))
                    .filter(credit_payments::Column::IsDeleted.eq(false))
                    .all(&db_tx)
                    .await?;
                for link_model in link_models {
                    let link_update = credit_payments::ActiveModel {
                        id: ActiveValue::Set(link_model.id),
                        is_deleted: ActiveValue::Set(true),
                        updated_at: ActiveValue::Set(now),
                        ..Default::default()
                    };
                    link_update.update(&db_tx).await?;
                }
                let credit_update = credits::ActiveModel {
                    id: ActiveValue::Set(credit_model.id),
                    is_deleted: ActiveValue::Set(true),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                };
                credit_update.update(&db_tx).await?;
            }

            let payment_models = payments::Entity::find()
                .filter(payments::Column::CustomerId.eq(id.to_string()))
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

            let customer_update = customers::ActiveModel {
                id: ActiveValue::Set(customer_model.id),
                is_deleted: ActiveValue::Set(true),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            customer_update.update(&db_tx).await?;

            tracing::info!(customer_id = %id, "customer deleted");
            Ok(())
        })
    }
}
