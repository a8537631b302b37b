//! Receipts, credit and customer ledger engine.
//!
//! The ledger tracks sales (receipts), partial payments and open credit
//! lines per customer, and keeps running balances consistent under partial
//! fulfillment and cancellation. Every write operation runs inside one
//! database transaction; derived customer figures are computed on read by
//! [`projection`].
//!
//! Amounts are integer minor units (`i64` cents) throughout.

pub use allocation::{Allocation, AllocationOutcome, allocate};
pub use commands::{
    CreateCustomerCmd, CreateReceiptCmd, CustomerRef, RecordCreditPaymentCmd, SaleItem,
    TenderedPayment,
};
pub use credit_payments::CreditPayment;
pub use credits::Credit;
pub use customers::Customer;
pub use error::LedgerError;
pub use location::{Coordinates, FixedLocation, LocationSource};
pub use ops::{CustomerSnapshot, Ledger, LedgerBuilder, ReceiptDetail};
pub use payments::{Payment, PaymentKind};
pub use products::Product;
pub use projection::{BalanceSheet, DebtLevel, DebtPolicy, project};
pub use receipt_items::ReceiptItem;
pub use receipts::Receipt;

mod allocation;
mod commands;
mod credit_payments;
mod credits;
mod customers;
mod error;
mod location;
mod ops;
mod payments;
mod products;
mod projection;
mod receipt_items;
mod receipts;

type ResultLedger<T> = Result<T, LedgerError>;
