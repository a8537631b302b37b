//! Credit lifecycle: applying payments to open lines and closing them.

use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    AllocationOutcome, Credit, CreditPayment, LedgerError, Payment, PaymentKind, ResultLedger,
    allocation::allocate, commands::RecordCreditPaymentCmd, credit_payments, credits, payments,
};

use super::{Ledger, normalize_optional_text, normalize_required_text, with_tx};

impl Ledger {
    /// Applies an incoming payment to the customer's open credit lines,
    /// oldest first.
    ///
    /// Each line absorbed produces one payment row for the portion it took
    /// and one credit-payment link carrying the full incoming amount (the
    /// historical ledger format records the whole tender on every link).
    /// Whatever no open line absorbs comes back as
    /// [`AllocationOutcome::unallocated`].
    pub async fn record_credit_payment(
        &self,
        cmd: RecordCreditPaymentCmd,
    ) -> ResultLedger<AllocationOutcome> {
        if cmd.amount <= 0 {
            return Err(LedgerError::InvalidAmount(
                "payment amount must be > 0".to_string(),
            ));
        }
        let method = normalize_required_text(&cmd.method, "payment method")?;
        let note = normalize_optional_text(cmd.note.as_deref());

        with_tx!(self, |db_tx| {
            let customer_model = self.require_customer(&db_tx, cmd.customer_id).await?;

            let line_models = credits::Entity::find()
                .filter(credits::Column::CustomerId.eq(cmd.customer_id.to_string()))
                .filter(credits::Column::IsDeleted.eq(false))
                .filter(credits::Column::Fulfilled.eq(false))
                .order_by_asc(credits::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            let mut lines = Vec::with_capacity(line_models.len());
            for model in line_models {
                lines.push(Credit::try_from(model)?);
            }
            // When the payment targets one receipt, its lines go first;
            // the rest keep their oldest-first order.
            if let Some(receipt_id) = cmd.receipt_id {
                lines.sort_by_key(|line| line.receipt_id != receipt_id);
            }

            let outcome = allocate(cmd.amount, &mut lines);

            let now = Utc::now();
            for allocation in &outcome.allocations {
                let line = lines
                    .iter()
                    .find(|line| line.id == allocation.credit_id)
                    .ok_or_else(|| LedgerError::KeyNotFound("credit not exists".to_string()))?;
                let credit_update = credits::ActiveModel {
                    id: ActiveValue::Set(line.id.to_string()),
                    amount_paid: ActiveValue::Set(line.amount_paid),
                    amount_left: ActiveValue::Set(line.amount_left),
                    fulfilled: ActiveValue::Set(line.fulfilled),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                };
                credit_update.update(&db_tx).await?;

                let mut payment =
                    Payment::new(PaymentKind::Credit, allocation.amount_applied, method.clone())?;
                payment.customer_id = Some(cmd.customer_id);
                payment.receipt_id = Some(allocation.receipt_id);
                payment.customer_name = Some(customer_model.name.clone());
                payment.customer_mobile = Some(customer_model.mobile.clone());
                payment.note = note.clone();
                payments::ActiveModel::from(&payment).insert(&db_tx).await?;

                let link = CreditPayment::new(allocation.credit_id, payment.id, cmd.amount);
                credit_payments::ActiveModel::from(&link)
                    .insert(&db_tx)
                    .await?;
            }

            tracing::info!(
                customer_id = %cmd.customer_id,
                amount = cmd.amount,
                applied = outcome.total_applied(),
                unallocated = outcome.unallocated,
                "credit payment recorded"
            );
            Ok(outcome)
        })
    }

    /// Returns every live credit line of a customer, oldest first.
    pub async fn customer_credits(&self, customer_id: Uuid) -> ResultLedger<Vec<Credit>> {
        with_tx!(self, |db_tx| {
            self.require_customer(&db_tx, customer_id).await?;
            let models = credits::Entity::find()
                .filter(credits::Column::CustomerId.eq(customer_id.to_string()))
                .filter(credits::Column::IsDeleted.eq(false))
                .order_by_asc(credits::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            let mut lines = Vec::with_capacity(models.len());
            for model in models {
                lines.push(Credit::try_from(model)?);
            }
            Ok(lines)
        })
    }

    /// Soft-deletes a credit line together with its payment links.
    pub(crate) async fn close_credit_line(
        &self,
        db_tx: &DatabaseTransaction,
        credit_model: credits::Model,
    ) -> ResultLedger<()> {
        let now = Utc::now();

        let link_models = credit_payments::Entity::find()
            .filter(credit_payments::Column::CreditId.eq(credit_model.id.clone()))
            .filter(credit_payments::Column::IsDeleted.eq(false))
            .all(db_tx)
            .await?;
        for link_model in link_models {
            let link_update = credit_payments::ActiveModel {
                id: ActiveValue::Set(link_model.id),
                is_deleted: ActiveValue::Set(true),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            link_update.update(db_tx).await?;
        }

        let credit_update = credits::ActiveModel {
            id: ActiveValue::Set(credit_model.id),
            is_deleted: ActiveValue::Set(true),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        credit_update.update(db_tx).await?;
        Ok(())
    }
}
