//! Command structs for ledger write operations.
//!
//! These group parameters for the orchestration entry points, keeping call
//! sites readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Who the sale belongs to.
#[derive(Clone, Debug)]
pub enum CustomerRef {
    /// An existing customer by id.
    Existing(Uuid),
    /// A new customer created on first sale.
    New { name: String, mobile: String },
}

/// One line of a sale.
#[derive(Clone, Debug)]
pub struct SaleItem {
    pub product_id: Uuid,
    pub quantity: i64,
    /// Price actually charged (may differ from the product's list price).
    pub unit_price: i64,
}

/// Money tendered at the counter while creating the receipt.
#[derive(Clone, Debug)]
pub struct TenderedPayment {
    pub amount: i64,
    pub method: String,
    pub note: Option<String>,
}

/// Create a receipt, its items, tendered payments and (when under-paid)
/// a credit line, all in one transaction.
#[derive(Clone, Debug)]
pub struct CreateReceiptCmd {
    pub customer: Option<CustomerRef>,
    pub items: Vec<SaleItem>,
    pub amount_paid: i64,
    pub total_amount: i64,
    pub credit_amount: i64,
    pub tax: i64,
    pub note: Option<String>,
    pub payments: Vec<TenderedPayment>,
    pub due_date: Option<DateTime<Utc>>,
}

impl CreateReceiptCmd {
    #[must_use]
    pub fn new(amount_paid: i64, total_amount: i64) -> Self {
        Self {
            customer: None,
            items: Vec::new(),
            amount_paid,
            total_amount,
            credit_amount: total_amount - amount_paid,
            tax: 0,
            note: None,
            payments: Vec::new(),
            due_date: None,
        }
    }

    #[must_use]
    pub fn customer(mut self, customer: CustomerRef) -> Self {
        self.customer = Some(customer);
        self
    }

    #[must_use]
    pub fn item(mut self, product_id: Uuid, quantity: i64, unit_price: i64) -> Self {
        self.items.push(SaleItem {
            product_id,
            quantity,
            unit_price,
        });
        self
    }

    #[must_use]
    pub fn payment(mut self, amount: i64, method: impl Into<String>) -> Self {
        self.payments.push(TenderedPayment {
            amount,
            method: method.into(),
            note: None,
        });
        self
    }

    #[must_use]
    pub fn tax(mut self, tax: i64) -> Self {
        self.tax = tax;
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Apply an incoming payment to a customer's open credit lines.
#[derive(Clone, Debug)]
pub struct RecordCreditPaymentCmd {
    pub customer_id: Uuid,
    pub amount: i64,
    pub method: String,
    pub note: Option<String>,
    /// When set, lines from this receipt are paid off first.
    pub receipt_id: Option<Uuid>,
}

impl RecordCreditPaymentCmd {
    #[must_use]
    pub fn new(customer_id: Uuid, amount: i64, method: impl Into<String>) -> Self {
        Self {
            customer_id,
            amount,
            method: method.into(),
            note: None,
            receipt_id: None,
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn receipt_id(mut self, receipt_id: Uuid) -> Self {
        self.receipt_id = Some(receipt_id);
        self
    }
}

/// Register a customer outside of a sale.
#[derive(Clone, Debug)]
pub struct CreateCustomerCmd {
    pub name: String,
    pub mobile: String,
    pub email: Option<String>,
    pub notes: Option<String>,
}

impl CreateCustomerCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, mobile: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mobile: mobile.into(),
            email: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
