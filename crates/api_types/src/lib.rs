use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod customer {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CustomerNew {
        pub name: String,
        pub mobile: String,
        pub email: Option<String>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CustomerCreated {
        pub id: Uuid,
    }

    /// How the debt level of a customer is decided.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DebtPolicy {
        /// Three states driven by credit due dates.
        #[default]
        DueDates,
        /// Two states driven by the sign of the balance.
        BalanceSign,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DebtLevel {
        NoDebt,
        InDebt,
        Overdue,
    }

    /// A customer together with figures derived from their receipts and
    /// credit lines. All amounts are integer minor units.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CustomerView {
        pub id: Uuid,
        pub name: String,
        pub mobile: String,
        pub email: Option<String>,
        pub notes: Option<String>,
        pub total_amount: i64,
        pub balance: i64,
        pub remaining_credit_amount: i64,
        pub overdue_credit_amount: i64,
        pub debt_level: DebtLevel,
    }
}

pub mod product {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductNew {
        pub name: String,
        pub sku: Option<String>,
        pub unit_price: i64,
        pub quantity_in_stock: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Restock {
        pub quantity: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductView {
        pub id: Uuid,
        pub name: String,
        pub sku: Option<String>,
        pub unit_price: i64,
        pub quantity_in_stock: i64,
    }
}

pub mod receipt {
    use super::*;

    /// Who the sale belongs to. Exactly one of the two shapes.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CustomerRef {
        Existing { id: Uuid },
        New { name: String, mobile: String },
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptItemNew {
        pub product_id: Uuid,
        pub quantity: i64,
        pub unit_price: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentNew {
        pub amount: i64,
        pub method: String,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptNew {
        pub customer: Option<CustomerRef>,
        pub items: Vec<ReceiptItemNew>,
        pub amount_paid: i64,
        pub total_amount: i64,
        /// Defaults to `total_amount - amount_paid` when omitted.
        pub credit_amount: Option<i64>,
        pub tax: Option<i64>,
        pub note: Option<String>,
        pub payments: Vec<PaymentNew>,
        /// RFC3339 due date for the credit line, when under-paid.
        pub due_date: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Cancel {
        pub reason: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReassignCustomer {
        pub customer_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptItemView {
        pub product_id: Uuid,
        pub product_name: String,
        pub quantity: i64,
        pub unit_price: i64,
        pub subtotal: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentView {
        pub id: Uuid,
        pub amount_paid: i64,
        pub method: String,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptView {
        pub id: Uuid,
        pub customer_id: Option<Uuid>,
        pub amount_paid: i64,
        pub total_amount: i64,
        pub credit_amount: i64,
        pub tax: i64,
        pub note: Option<String>,
        pub is_cancelled: bool,
        pub cancellation_reason: Option<String>,
        pub created_at: DateTime<Utc>,
        pub items: Vec<ReceiptItemView>,
        pub payments: Vec<PaymentView>,
        pub credit: Option<super::credit::CreditView>,
    }
}

pub mod credit {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CreditView {
        pub id: Uuid,
        pub receipt_id: Uuid,
        pub total_amount: i64,
        pub amount_paid: i64,
        pub amount_left: i64,
        pub fulfilled: bool,
        pub due_date: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CreditsResponse {
        pub credits: Vec<CreditView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CreditPaymentNew {
        pub customer_id: Uuid,
        pub amount: i64,
        pub method: String,
        pub note: Option<String>,
        /// When set, lines from this receipt are paid off first.
        pub receipt_id: Option<Uuid>,
    }

    /// What happened to one credit line during an allocation.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AllocationView {
        pub credit_id: Uuid,
        pub receipt_id: Uuid,
        pub amount_applied: i64,
        pub fulfilled: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CreditPaymentOutcome {
        pub allocations: Vec<AllocationView>,
        /// The part of the payment no open line absorbed.
        pub unallocated: i64,
    }
}
