use axum::{Json, http::StatusCode, response::IntoResponse};
use ledger::LedgerError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod credit_payments;
mod customers;
mod products;
mod receipts;
mod server;

pub mod types {
    pub mod customer {
        pub use api_types::customer::{
            CustomerCreated, CustomerNew, CustomerView, DebtLevel, DebtPolicy,
        };
    }

    pub mod product {
        pub use api_types::product::{ProductCreated, ProductNew, ProductView, Restock};
    }

    pub mod receipt {
        pub use api_types::receipt::{
            Cancel, CustomerRef, PaymentNew, ReassignCustomer, ReceiptCreated, ReceiptItemNew,
            ReceiptNew, ReceiptView,
        };
    }

    pub mod credit {
        pub use api_types::credit::{
            AllocationView, CreditPaymentNew, CreditPaymentOutcome, CreditView, CreditsResponse,
        };
    }
}

pub enum ServerError {
    Ledger(LedgerError),
    Generic(String),
}

//TODO: Find a better solution
#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_ledger_error(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::ExistingKey(_) => StatusCode::CONFLICT,
        LedgerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        LedgerError::InvalidAmount(_)
        | LedgerError::InsufficientStock(_)
        | LedgerError::Cancelled(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_ledger_error(err: LedgerError) -> String {
    match err {
        LedgerError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Ledger(err) => (status_for_ledger_error(&err), message_for_ledger_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<LedgerError> for ServerError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}
