use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use ledger::{
    Coordinates, CreateCustomerCmd, CreateReceiptCmd, CustomerRef, DebtLevel, DebtPolicy,
    FixedLocation, Ledger, LedgerError, LocationSource, RecordCreditPaymentCmd,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn ledger_with_db() -> (Ledger, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder().database(db.clone()).build().await.unwrap();
    (ledger, db)
}

async fn new_customer(ledger: &Ledger, name: &str, mobile: &str) -> Uuid {
    ledger
        .create_customer(CreateCustomerCmd::new(name, mobile))
        .await
        .unwrap()
}

#[tokio::test]
async fn duplicate_mobile_is_rejected() {
    let (ledger, _db) = ledger_with_db().await;

    new_customer(&ledger, "Asha", "0700111222").await;
    let err = ledger
        .create_customer(CreateCustomerCmd::new("Other", "0700111222"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::ExistingKey(_)));
}

#[tokio::test]
async fn under_paid_receipt_opens_credit_and_projects_balance() {
    let (ledger, _db) = ledger_with_db().await;
    let customer_id = new_customer(&ledger, "Asha", "0700111222").await;

    // 40 paid out of 100: a 60 credit line opens.
    let receipt_id = ledger
        .create_receipt(
            CreateReceiptCmd::new(40_00, 100_00)
                .customer(CustomerRef::Existing(customer_id))
                .payment(40_00, "cash"),
        )
        .await
        .unwrap();

    let detail = ledger.receipt_detail(receipt_id).await.unwrap();
    assert_eq!(detail.receipt.credit_amount, 60_00);
    let credit = detail.credit.unwrap();
    assert_eq!(credit.total_amount, 60_00);
    assert_eq!(credit.amount_left, 60_00);
    assert!(!credit.fulfilled);

    let snapshot = ledger
        .customer_snapshot(customer_id, DebtPolicy::DueDates)
        .await
        .unwrap();
    assert_eq!(snapshot.sheet.balance, -60_00);
    assert_eq!(snapshot.sheet.remaining_credit_amount, 60_00);
    assert_eq!(snapshot.sheet.debt_level, DebtLevel::InDebt);
}

#[tokio::test]
async fn receipt_requires_consistent_amounts() {
    let (ledger, _db) = ledger_with_db().await;
    let customer_id = new_customer(&ledger, "Asha", "0700111222").await;

    let mut cmd = CreateReceiptCmd::new(40_00, 100_00).customer(CustomerRef::Existing(customer_id));
    cmd.credit_amount = 50_00;
    let err = ledger.create_receipt(cmd).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount(_)));
}

#[tokio::test]
async fn credit_without_customer_is_rejected() {
    let (ledger, _db) = ledger_with_db().await;

    let err = ledger
        .create_receipt(CreateReceiptCmd::new(40_00, 100_00))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount(_)));
}

#[tokio::test]
async fn payment_fills_oldest_lines_first() {
    let (ledger, _db) = ledger_with_db().await;
    let customer_id = new_customer(&ledger, "Asha", "0700111222").await;

    let first = ledger
        .create_receipt(
            CreateReceiptCmd::new(0, 50_00).customer(CustomerRef::Existing(customer_id)),
        )
        .await
        .unwrap();
    let second = ledger
        .create_receipt(
            CreateReceiptCmd::new(0, 30_00).customer(CustomerRef::Existing(customer_id)),
        )
        .await
        .unwrap();

    let outcome = ledger
        .record_credit_payment(RecordCreditPaymentCmd::new(customer_id, 60_00, "cash"))
        .await
        .unwrap();

    assert_eq!(outcome.total_applied() + outcome.unallocated, 60_00);
    assert_eq!(outcome.unallocated, 0);
    assert_eq!(outcome.allocations.len(), 2);
    assert_eq!(outcome.allocations[0].receipt_id, first);
    assert_eq!(outcome.allocations[0].amount_applied, 50_00);
    assert!(outcome.allocations[0].fulfilled);
    assert_eq!(outcome.allocations[1].receipt_id, second);
    assert_eq!(outcome.allocations[1].amount_applied, 10_00);
    assert!(!outcome.allocations[1].fulfilled);

    let credits = ledger.customer_credits(customer_id).await.unwrap();
    let left: i64 = credits.iter().map(|c| c.amount_left).sum();
    assert_eq!(left, 20_00);
}

#[tokio::test]
async fn payment_prefers_the_named_receipt() {
    let (ledger, _db) = ledger_with_db().await;
    let customer_id = new_customer(&ledger, "Asha", "0700111222").await;

    ledger
        .create_receipt(
            CreateReceiptCmd::new(0, 50_00).customer(CustomerRef::Existing(customer_id)),
        )
        .await
        .unwrap();
    let second = ledger
        .create_receipt(
            CreateReceiptCmd::new(0, 30_00).customer(CustomerRef::Existing(customer_id)),
        )
        .await
        .unwrap();

    let outcome = ledger
        .record_credit_payment(
            RecordCreditPaymentCmd::new(customer_id, 30_00, "cash").receipt_id(second),
        )
        .await
        .unwrap();

    assert_eq!(outcome.allocations[0].receipt_id, second);
    assert_eq!(outcome.allocations[0].amount_applied, 30_00);
    assert!(outcome.allocations[0].fulfilled);
}

#[tokio::test]
async fn tagged_payment_fulfills_its_receipt_then_spills_over() {
    let (ledger, _db) = ledger_with_db().await;
    let customer_id = new_customer(&ledger, "Asha", "0700111222").await;

    let r1 = ledger
        .create_receipt(
            CreateReceiptCmd::new(0, 50_00).customer(CustomerRef::Existing(customer_id)),
        )
        .await
        .unwrap();
    let r2 = ledger
        .create_receipt(
            CreateReceiptCmd::new(0, 30_00).customer(CustomerRef::Existing(customer_id)),
        )
        .await
        .unwrap();

    // 60 tagged to the first receipt: its 50 line fills, the remaining 10
    // spills onto the second line.
    let outcome = ledger
        .record_credit_payment(
            RecordCreditPaymentCmd::new(customer_id, 60_00, "cash").receipt_id(r1),
        )
        .await
        .unwrap();

    assert_eq!(outcome.unallocated, 0);
    assert_eq!(outcome.allocations[0].receipt_id, r1);
    assert_eq!(outcome.allocations[0].amount_applied, 50_00);
    assert!(outcome.allocations[0].fulfilled);
    assert_eq!(outcome.allocations[1].receipt_id, r2);
    assert_eq!(outcome.allocations[1].amount_applied, 10_00);

    let credits = ledger.customer_credits(customer_id).await.unwrap();
    let r2_line = credits.iter().find(|c| c.receipt_id == r2).unwrap();
    assert_eq!(r2_line.amount_left, 20_00);
}

#[tokio::test]
async fn payment_covering_everything_returns_the_change() {
    let (ledger, _db) = ledger_with_db().await;
    let customer_id = new_customer(&ledger, "Asha", "0700111222").await;

    ledger
        .create_receipt(
            CreateReceiptCmd::new(0, 50_00).customer(CustomerRef::Existing(customer_id)),
        )
        .await
        .unwrap();
    ledger
        .create_receipt(
            CreateReceiptCmd::new(0, 30_00).customer(CustomerRef::Existing(customer_id)),
        )
        .await
        .unwrap();

    let outcome = ledger
        .record_credit_payment(RecordCreditPaymentCmd::new(customer_id, 100_00, "cash"))
        .await
        .unwrap();

    assert_eq!(outcome.total_applied(), 80_00);
    assert_eq!(outcome.unallocated, 20_00);
    assert!(outcome.allocations.iter().all(|a| a.fulfilled));

    let receipts = ledger.customer_receipts(customer_id).await.unwrap();
    assert_eq!(receipts.len(), 2);
    let credits = ledger.customer_credits(customer_id).await.unwrap();
    assert!(credits.iter().all(|c| c.fulfilled && c.amount_left == 0));
}

#[tokio::test]
async fn surplus_payment_comes_back_unallocated() {
    let (ledger, db) = ledger_with_db().await;
    let customer_id = new_customer(&ledger, "Asha", "0700111222").await;

    ledger
        .create_receipt(
            CreateReceiptCmd::new(0, 50_00).customer(CustomerRef::Existing(customer_id)),
        )
        .await
        .unwrap();

    let outcome = ledger
        .record_credit_payment(RecordCreditPaymentCmd::new(customer_id, 80_00, "cash"))
        .await
        .unwrap();
    assert_eq!(outcome.total_applied(), 50_00);
    assert_eq!(outcome.unallocated, 30_00);

    // The link row records the full incoming amount; the payment row
    // records only the applied portion.
    let backend = db.get_database_backend();
    let link = db
        .query_one(Statement::from_string(
            backend,
            "SELECT amount_paid FROM credit_payments".to_string(),
        ))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(link.try_get::<i64>("", "amount_paid").unwrap(), 80_00);

    let payment = db
        .query_one(Statement::from_string(
            backend,
            "SELECT amount_paid FROM payments WHERE kind = 'credit'".to_string(),
        ))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.try_get::<i64>("", "amount_paid").unwrap(), 50_00);
}

#[tokio::test]
async fn zero_payment_is_rejected() {
    let (ledger, _db) = ledger_with_db().await;
    let customer_id = new_customer(&ledger, "Asha", "0700111222").await;

    let err = ledger
        .record_credit_payment(RecordCreditPaymentCmd::new(customer_id, 0, "cash"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount(_)));
}

#[tokio::test]
async fn cancellation_restocks_and_closes_the_credit() {
    let (ledger, _db) = ledger_with_db().await;
    let customer_id = new_customer(&ledger, "Asha", "0700111222").await;
    let product_id = ledger
        .create_product("Rice 1kg", None, 20_00, 10)
        .await
        .unwrap();

    let receipt_id = ledger
        .create_receipt(
            CreateReceiptCmd::new(0, 60_00)
                .customer(CustomerRef::Existing(customer_id))
                .item(product_id, 3, 20_00),
        )
        .await
        .unwrap();
    assert_eq!(
        ledger.product(product_id).await.unwrap().quantity_in_stock,
        7
    );

    ledger.cancel_receipt(receipt_id, "wrong items").await.unwrap();

    assert_eq!(
        ledger.product(product_id).await.unwrap().quantity_in_stock,
        10
    );
    let receipt = ledger.receipt(receipt_id).await.unwrap();
    assert!(receipt.is_cancelled);
    assert_eq!(receipt.total_amount, 0);
    assert_eq!(receipt.cancellation_reason.as_deref(), Some("wrong items"));

    // The credit line is gone and the customer owes nothing.
    assert!(ledger.customer_credits(customer_id).await.unwrap().is_empty());
    let snapshot = ledger
        .customer_snapshot(customer_id, DebtPolicy::DueDates)
        .await
        .unwrap();
    assert_eq!(snapshot.sheet.balance, 0);
    assert_eq!(snapshot.sheet.debt_level, DebtLevel::NoDebt);

    let err = ledger.cancel_receipt(receipt_id, "again").await.unwrap_err();
    assert!(matches!(err, LedgerError::Cancelled(_)));
}

#[tokio::test]
async fn overselling_aborts_the_whole_receipt() {
    let (ledger, db) = ledger_with_db().await;
    let product_id = ledger
        .create_product("Milk", None, 10_00, 2)
        .await
        .unwrap();

    let err = ledger
        .create_receipt(
            CreateReceiptCmd::new(50_00, 50_00)
                .item(product_id, 5, 10_00)
                .payment(50_00, "cash"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientStock(_)));

    assert_eq!(
        ledger.product(product_id).await.unwrap().quantity_in_stock,
        2
    );
    // The transaction rolled back: no receipt row survived.
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            "SELECT COUNT(*) AS n FROM receipts".to_string(),
        ))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.try_get::<i64>("", "n").unwrap(), 0);
}

#[tokio::test]
async fn overdue_lines_win_over_open_ones() {
    let (ledger, _db) = ledger_with_db().await;
    let customer_id = new_customer(&ledger, "Asha", "0700111222").await;

    ledger
        .create_receipt(
            CreateReceiptCmd::new(0, 50_00)
                .customer(CustomerRef::Existing(customer_id))
                .due_date(Utc::now() - ChronoDuration::days(3)),
        )
        .await
        .unwrap();

    let snapshot = ledger
        .customer_snapshot(customer_id, DebtPolicy::DueDates)
        .await
        .unwrap();
    assert_eq!(snapshot.sheet.overdue_credit_amount, 50_00);
    assert_eq!(snapshot.sheet.debt_level, DebtLevel::Overdue);

    // Under the sign-based policy the same rows read as plain debt.
    let snapshot = ledger
        .customer_snapshot(customer_id, DebtPolicy::BalanceSign)
        .await
        .unwrap();
    assert_eq!(snapshot.sheet.debt_level, DebtLevel::InDebt);
}

#[tokio::test]
async fn deleting_a_customer_cascades() {
    let (ledger, _db) = ledger_with_db().await;
    let customer_id = new_customer(&ledger, "Asha", "0700111222").await;

    let receipt_id = ledger
        .create_receipt(
            CreateReceiptCmd::new(0, 50_00).customer(CustomerRef::Existing(customer_id)),
        )
        .await
        .unwrap();
    ledger
        .record_credit_payment(RecordCreditPaymentCmd::new(customer_id, 20_00, "cash"))
        .await
        .unwrap();

    ledger.delete_customer(customer_id).await.unwrap();

    let err = ledger.customer(customer_id).await.unwrap_err();
    assert!(matches!(err, LedgerError::KeyNotFound(_)));
    let err = ledger.receipt(receipt_id).await.unwrap_err();
    assert!(matches!(err, LedgerError::KeyNotFound(_)));
}

#[tokio::test]
async fn receipt_creation_by_mobile_reuses_the_customer() {
    let (ledger, _db) = ledger_with_db().await;
    let customer_id = new_customer(&ledger, "Asha", "0700111222").await;

    let receipt_id = ledger
        .create_receipt(CreateReceiptCmd::new(0, 30_00).customer(CustomerRef::New {
            name: "Asha".to_string(),
            mobile: "0700111222".to_string(),
        }))
        .await
        .unwrap();

    let receipt = ledger.receipt(receipt_id).await.unwrap();
    assert_eq!(receipt.customer_id, Some(customer_id));
}

#[tokio::test]
async fn reassigning_a_receipt_moves_the_debt() {
    let (ledger, _db) = ledger_with_db().await;
    let from = new_customer(&ledger, "Asha", "0700111222").await;
    let to = new_customer(&ledger, "Neema", "0711000111").await;

    let receipt_id = ledger
        .create_receipt(CreateReceiptCmd::new(0, 30_00).customer(CustomerRef::Existing(from)))
        .await
        .unwrap();

    ledger.reassign_receipt_customer(receipt_id, to).await.unwrap();

    let snapshot = ledger.customer_snapshot(to, DebtPolicy::DueDates).await.unwrap();
    assert_eq!(snapshot.sheet.remaining_credit_amount, 30_00);
    assert!(ledger.customer_credits(from).await.unwrap().is_empty());
}

#[tokio::test]
async fn receipts_get_geotagged_after_commit() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder()
        .database(db.clone())
        .location(Arc::new(FixedLocation(Coordinates {
            latitude: -6.7924,
            longitude: 39.2083,
        })))
        .build()
        .await
        .unwrap();

    let receipt_id = ledger
        .create_receipt(CreateReceiptCmd::new(10_00, 10_00))
        .await
        .unwrap();

    // The geotag lands on a background task; poll briefly.
    let mut tagged = None;
    for _ in 0..50 {
        let receipt = ledger.receipt(receipt_id).await.unwrap();
        if receipt.latitude.is_some() {
            tagged = Some(receipt);
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let receipt = tagged.expect("receipt was never geotagged");
    assert_eq!(receipt.latitude, Some(-6.7924));
    assert_eq!(receipt.longitude, Some(39.2083));
}

struct NoFix;

#[async_trait::async_trait]
impl LocationSource for NoFix {
    async fn current_position(&self) -> Option<Coordinates> {
        None
    }
}

#[tokio::test]
async fn missing_location_fix_never_blocks_the_sale() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder()
        .database(db.clone())
        .location(Arc::new(NoFix))
        .build()
        .await
        .unwrap();

    let receipt_id = ledger
        .create_receipt(CreateReceiptCmd::new(10_00, 10_00))
        .await
        .unwrap();

    // Give the background task time to run, then confirm the receipt
    // committed and simply stayed untagged.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let receipt = ledger.receipt(receipt_id).await.unwrap();
    assert_eq!(receipt.latitude, None);
    assert_eq!(receipt.longitude, None);
    assert_eq!(receipt.total_amount, 10_00);
}
