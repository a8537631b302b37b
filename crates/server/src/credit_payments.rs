//! Credit payment API endpoints

use api_types::credit::{
    AllocationView, CreditPaymentNew, CreditPaymentOutcome, CreditView, CreditsResponse,
};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

/// Handle requests for applying a payment to a customer's open credit lines
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreditPaymentNew>,
) -> Result<Json<CreditPaymentOutcome>, ServerError> {
    let mut cmd =
        ledger::RecordCreditPaymentCmd::new(payload.customer_id, payload.amount, payload.method);
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }
    if let Some(receipt_id) = payload.receipt_id {
        cmd = cmd.receipt_id(receipt_id);
    }

    let outcome = state.ledger.record_credit_payment(cmd).await?;

    Ok(Json(CreditPaymentOutcome {
        allocations: outcome
            .allocations
            .into_iter()
            .map(|allocation| AllocationView {
                credit_id: allocation.credit_id,
                receipt_id: allocation.receipt_id,
                amount_applied: allocation.amount_applied,
                fulfilled: allocation.fulfilled,
            })
            .collect(),
        unallocated: outcome.unallocated,
    }))
}

/// Handle requests for listing a customer's live credit lines
pub async fn list(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CreditsResponse>, ServerError> {
    let credits = state.ledger.customer_credits(id).await?;

    Ok(Json(CreditsResponse {
        credits: credits
            .into_iter()
            .map(|credit| CreditView {
                id: credit.id,
                receipt_id: credit.receipt_id,
                total_amount: credit.total_amount,
                amount_paid: credit.amount_paid,
                amount_left: credit.amount_left,
                fulfilled: credit.fulfilled,
                due_date: credit.due_date,
            })
            .collect(),
    }))
}
