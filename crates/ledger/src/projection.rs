//! Customer balance projection.
//!
//! Pure derived-value logic: given a customer's receipts and credit lines,
//! compute the aggregate figures shown next to the customer. Nothing here
//! writes; the numbers are recomputed on every read from the rows as they
//! are.
//!
//! Cancelled and soft-deleted receipts are excluded from every sum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Credit, Receipt};

/// Debt classification shown next to a customer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtLevel {
    #[default]
    NoDebt,
    InDebt,
    Overdue,
}

/// How `debt_level` is derived.
///
/// The product shipped with two policies over its lifetime; both remain
/// valid and the caller picks one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtPolicy {
    /// Three states: overdue credit wins over merely open credit.
    #[default]
    DueDates,
    /// Two states: in debt iff the signed balance is negative.
    BalanceSign,
}

/// Aggregate figures for one customer, computed on read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    /// Sum of receipt totals over active receipts.
    pub total_amount: i64,
    /// Collected minus credited; negative means the customer owes.
    pub balance: i64,
    /// Sum of `amount_left` over open credit lines.
    pub remaining_credit_amount: i64,
    /// Sum of `amount_left` over open lines whose due date has passed.
    pub overdue_credit_amount: i64,
    pub debt_level: DebtLevel,
}

/// Projects a customer's receipts and credit lines into a [`BalanceSheet`].
///
/// `balance` counts `amount_paid` only for fully-paid receipts
/// (`credit_amount == 0`) and subtracts `credit_amount` for every active
/// receipt, so an under-paid sale shows up as exactly its open credit.
pub fn project(
    receipts: &[Receipt],
    credits: &[Credit],
    policy: DebtPolicy,
    now: DateTime<Utc>,
) -> BalanceSheet {
    let active = || receipts.iter().filter(|r| r.is_active());

    let total_amount = active().map(|r| r.total_amount).sum();
    let collected: i64 = active()
        .filter(|r| r.credit_amount == 0)
        .map(|r| r.amount_paid)
        .sum();
    let credited: i64 = active().map(|r| r.credit_amount).sum();
    let balance = collected - credited;

    let remaining_credit_amount = credits
        .iter()
        .filter(|c| c.is_open())
        .map(|c| c.amount_left)
        .sum();
    let overdue_credit_amount = credits
        .iter()
        .filter(|c| c.is_overdue(now))
        .map(|c| c.amount_left)
        .sum();

    let debt_level = match policy {
        DebtPolicy::DueDates => {
            if overdue_credit_amount > 0 {
                DebtLevel::Overdue
            } else if remaining_credit_amount > 0 {
                DebtLevel::InDebt
            } else {
                DebtLevel::NoDebt
            }
        }
        DebtPolicy::BalanceSign => {
            if balance < 0 {
                DebtLevel::InDebt
            } else {
                DebtLevel::NoDebt
            }
        }
    };

    BalanceSheet {
        total_amount,
        balance,
        remaining_credit_amount,
        overdue_credit_amount,
        debt_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn receipt(amount_paid: i64, total: i64, credit: i64) -> Receipt {
        Receipt::new(Some(Uuid::new_v4()), amount_paid, total, credit, 0, None).unwrap()
    }

    fn credit_line(total: i64, due: Option<DateTime<Utc>>) -> Credit {
        Credit::open(Uuid::new_v4(), Uuid::new_v4(), total, due).unwrap()
    }

    #[test]
    fn under_paid_receipt_shows_negative_balance() {
        let receipts = vec![receipt(40_00, 100_00, 60_00)];
        let credits = vec![credit_line(60_00, None)];

        let sheet = project(&receipts, &credits, DebtPolicy::DueDates, Utc::now());

        assert_eq!(sheet.total_amount, 100_00);
        assert_eq!(sheet.balance, -60_00);
        assert_eq!(sheet.remaining_credit_amount, 60_00);
        assert_eq!(sheet.debt_level, DebtLevel::InDebt);
    }

    #[test]
    fn past_due_date_flips_to_overdue() {
        let now = Utc::now();
        let receipts = vec![receipt(40_00, 100_00, 60_00)];
        let credits = vec![credit_line(60_00, Some(now - Duration::days(3)))];

        let sheet = project(&receipts, &credits, DebtPolicy::DueDates, now);

        assert_eq!(sheet.overdue_credit_amount, 60_00);
        assert_eq!(sheet.debt_level, DebtLevel::Overdue);
    }

    #[test]
    fn overdue_wins_over_in_debt() {
        let now = Utc::now();
        let credits = vec![
            credit_line(30_00, None),
            credit_line(20_00, Some(now - Duration::days(1))),
        ];

        let sheet = project(&[], &credits, DebtPolicy::DueDates, now);

        assert_eq!(sheet.remaining_credit_amount, 50_00);
        assert_eq!(sheet.overdue_credit_amount, 20_00);
        assert_eq!(sheet.debt_level, DebtLevel::Overdue);
    }

    #[test]
    fn cancelled_and_deleted_receipts_excluded() {
        let mut cancelled = receipt(0, 0, 0);
        cancelled.is_cancelled = true;
        let mut deleted = receipt(50_00, 50_00, 0);
        deleted.is_deleted = true;
        let receipts = vec![receipt(30_00, 30_00, 0), cancelled, deleted];

        let sheet = project(&receipts, &[], DebtPolicy::DueDates, Utc::now());

        assert_eq!(sheet.total_amount, 30_00);
        assert_eq!(sheet.balance, 30_00);
        assert_eq!(sheet.debt_level, DebtLevel::NoDebt);
    }

    #[test]
    fn fulfilled_lines_do_not_count() {
        let mut line = credit_line(60_00, None);
        line.apply(60_00);

        let sheet = project(&[], &[line], DebtPolicy::DueDates, Utc::now());

        assert_eq!(sheet.remaining_credit_amount, 0);
        assert_eq!(sheet.debt_level, DebtLevel::NoDebt);
    }

    #[test]
    fn balance_sign_policy_ignores_due_dates() {
        let now = Utc::now();
        let receipts = vec![receipt(40_00, 100_00, 60_00)];
        let credits = vec![credit_line(60_00, Some(now - Duration::days(3)))];

        let sheet = project(&receipts, &credits, DebtPolicy::BalanceSign, now);

        assert_eq!(sheet.debt_level, DebtLevel::InDebt);

        let paid_up = vec![receipt(100_00, 100_00, 0)];
        let sheet = project(&paid_up, &[], DebtPolicy::BalanceSign, now);
        assert_eq!(sheet.debt_level, DebtLevel::NoDebt);
    }
}
