//! Credit lines.
//!
//! A credit line is the part of one receipt the customer still owes. It is
//! opened when a receipt is under-paid, reduced by every credit payment
//! applied to it, and soft-deleted when its receipt is cancelled.
//!
//! Invariants, at every point in time:
//!
//! - `amount_left == total_amount - amount_paid` until the line is paid off
//! - `amount_left` is never negative (over-payment is clamped to zero and
//!   the surplus stays with the allocator)
//! - `fulfilled == (amount_left == 0)`
//!
//! Amounts are stored as integer minor units (`i64` cents).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, ResultLedger};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Credit {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub receipt_id: Uuid,
    pub total_amount: i64,
    pub amount_paid: i64,
    pub amount_left: i64,
    pub fulfilled: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Credit {
    /// Opens a new credit line for an under-paid receipt.
    pub fn open(
        customer_id: Uuid,
        receipt_id: Uuid,
        total_amount: i64,
        due_date: Option<DateTime<Utc>>,
    ) -> ResultLedger<Self> {
        if total_amount <= 0 {
            return Err(LedgerError::InvalidAmount(
                "credit total_amount must be > 0".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            customer_id,
            receipt_id,
            total_amount,
            amount_paid: 0,
            amount_left: total_amount,
            fulfilled: false,
            due_date,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies up to `amount` against this line and returns the portion
    /// actually absorbed.
    ///
    /// Already-fulfilled or already-deleted lines are a silent no-op that
    /// returns 0. The applied portion never exceeds `amount_left`, so the
    /// line never goes negative.
    pub fn apply(&mut self, amount: i64) -> i64 {
        if amount <= 0 || self.fulfilled || self.is_deleted {
            return 0;
        }
        let applied = amount.min(self.amount_left);
        self.amount_left -= applied;
        self.amount_paid += applied;
        self.fulfilled = self.amount_left == 0;
        applied
    }

    /// A line is open while it is live and still carries a balance.
    pub fn is_open(&self) -> bool {
        !self.is_deleted && !self.fulfilled && self.amount_left > 0
    }

    /// True once the due date (if any) has passed and the line is unpaid.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_open() && self.due_date.is_some_and(|due| due < now)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "credits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub customer_id: String,
    pub receipt_id: String,
    pub total_amount: i64,
    pub amount_paid: i64,
    pub amount_left: i64,
    pub fulfilled: bool,
    pub due_date: Option<DateTimeUtc>,
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

impl From<&Credit> for ActiveModel {
    fn from(credit: &Credit) -> Self {
        Self {
            id: ActiveValue::Set(credit.id.to_string()),
            customer_id: ActiveValue::Set(credit.customer_id.to_string()),
            receipt_id: ActiveValue::Set(credit.receipt_id.to_string()),
            total_amount: ActiveValue::Set(credit.total_amount),
            amount_paid: ActiveValue::Set(credit.amount_paid),
            amount_left: ActiveValue::Set(credit.amount_left),
            fulfilled: ActiveValue::Set(credit.fulfilled),
            due_date: ActiveValue::Set(credit.due_date),
            is_deleted: ActiveValue::Set(credit.is_deleted),
            created_at: ActiveValue::Set(credit.created_at),
            updated_at: ActiveValue::Set(credit.updated_at),
        }
    }
}

impl TryFrom<Model> for Credit {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::KeyNotFound("credit not exists".to_string()))?,
            customer_id: Uuid::parse_str(&model.customer_id)
                .map_err(|_| LedgerError::KeyNotFound("customer not exists".to_string()))?,
            receipt_id: Uuid::parse_str(&model.receipt_id)
                .map_err(|_| LedgerError::KeyNotFound("receipt not exists".to_string()))?,
            total_amount: model.total_amount,
            amount_paid: model.amount_paid,
            amount_left: model.amount_left,
            fulfilled: model.fulfilled,
            due_date: model.due_date,
            is_deleted: model.is_deleted,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn line(total: i64) -> Credit {
        Credit::open(Uuid::new_v4(), Uuid::new_v4(), total, None).unwrap()
    }

    #[test]
    fn open_starts_with_full_balance() {
        let credit = line(50_00);
        assert_eq!(credit.amount_left, 50_00);
        assert_eq!(credit.amount_paid, 0);
        assert!(!credit.fulfilled);
    }

    #[test]
    fn open_rejects_non_positive_total() {
        assert!(Credit::open(Uuid::new_v4(), Uuid::new_v4(), 0, None).is_err());
        assert!(Credit::open(Uuid::new_v4(), Uuid::new_v4(), -10, None).is_err());
    }

    #[test]
    fn partial_payment_keeps_invariant() {
        let mut credit = line(50_00);
        let applied = credit.apply(20_00);

        assert_eq!(applied, 20_00);
        assert_eq!(credit.amount_left, 30_00);
        assert_eq!(credit.amount_paid, 20_00);
        assert_eq!(credit.amount_left, credit.total_amount - credit.amount_paid);
        assert!(!credit.fulfilled);
    }

    #[test]
    fn over_payment_clamps_to_zero() {
        let mut credit = line(50_00);
        let applied = credit.apply(80_00);

        assert_eq!(applied, 50_00);
        assert_eq!(credit.amount_left, 0);
        assert!(credit.fulfilled);
    }

    #[test]
    fn fulfilled_iff_amount_left_zero() {
        let mut credit = line(50_00);
        credit.apply(49_99);
        assert!(!credit.fulfilled);
        credit.apply(1);
        assert!(credit.fulfilled);
        assert_eq!(credit.amount_left, 0);
    }

    #[test]
    fn apply_on_fulfilled_line_is_noop() {
        let mut credit = line(50_00);
        credit.apply(50_00);
        let before = credit.clone();

        assert_eq!(credit.apply(10_00), 0);
        assert_eq!(credit, before);
    }

    #[test]
    fn apply_on_deleted_line_is_noop() {
        let mut credit = line(50_00);
        credit.is_deleted = true;

        assert_eq!(credit.apply(10_00), 0);
        assert_eq!(credit.amount_left, 50_00);
    }

    #[test]
    fn overdue_requires_past_due_date() {
        let now = Utc::now();
        let mut credit = line(50_00);
        assert!(!credit.is_overdue(now));

        credit.due_date = Some(now - Duration::days(1));
        assert!(credit.is_overdue(now));

        credit.due_date = Some(now + Duration::days(1));
        assert!(!credit.is_overdue(now));
    }
}
