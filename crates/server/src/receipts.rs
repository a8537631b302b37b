//! Receipt API endpoints

use api_types::credit::CreditView;
use api_types::receipt::{
    Cancel, CustomerRef, PaymentView, ReassignCustomer, ReceiptCreated, ReceiptItemView,
    ReceiptNew, ReceiptView,
};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

/// Handle requests for creating a receipt with its items, payments and
/// (when under-paid) a credit line
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ReceiptNew>,
) -> Result<Json<ReceiptCreated>, ServerError> {
    let mut cmd = ledger::CreateReceiptCmd::new(payload.amount_paid, payload.total_amount);
    if let Some(credit_amount) = payload.credit_amount {
        cmd.credit_amount = credit_amount;
    }
    if let Some(tax) = payload.tax {
        cmd = cmd.tax(tax);
    }
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }
    if let Some(due_date) = payload.due_date {
        cmd = cmd.due_date(due_date);
    }
    if let Some(customer) = payload.customer {
        cmd = cmd.customer(match customer {
            CustomerRef::Existing { id } => ledger::CustomerRef::Existing(id),
            CustomerRef::New { name, mobile } => ledger::CustomerRef::New { name, mobile },
        });
    }
    for item in payload.items {
        cmd = cmd.item(item.product_id, item.quantity, item.unit_price);
    }
    for payment in payload.payments {
        cmd.payments.push(ledger::TenderedPayment {
            amount: payment.amount,
            method: payment.method,
            note: payment.note,
        });
    }

    let id = state.ledger.create_receipt(cmd).await?;
    Ok(Json(ReceiptCreated { id }))
}

/// Handle requests for a receipt with its live items, payments and credit
pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReceiptView>, ServerError> {
    let detail = state.ledger.receipt_detail(id).await?;

    Ok(Json(ReceiptView {
        id: detail.receipt.id,
        customer_id: detail.receipt.customer_id,
        amount_paid: detail.receipt.amount_paid,
        total_amount: detail.receipt.total_amount,
        credit_amount: detail.receipt.credit_amount,
        tax: detail.receipt.tax,
        note: detail.receipt.note,
        is_cancelled: detail.receipt.is_cancelled,
        cancellation_reason: detail.receipt.cancellation_reason,
        created_at: detail.receipt.created_at,
        items: detail
            .items
            .into_iter()
            .map(|item| ReceiptItemView {
                product_id: item.product_id,
                subtotal: item.subtotal(),
                product_name: item.product_name,
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect(),
        payments: detail
            .payments
            .into_iter()
            .map(|payment| PaymentView {
                id: payment.id,
                amount_paid: payment.amount_paid,
                method: payment.method,
                note: payment.note,
            })
            .collect(),
        credit: detail.credit.map(|credit| CreditView {
            id: credit.id,
            receipt_id: credit.receipt_id,
            total_amount: credit.total_amount,
            amount_paid: credit.amount_paid,
            amount_left: credit.amount_left,
            fulfilled: credit.fulfilled,
            due_date: credit.due_date,
        }),
    }))
}

/// Handle requests for cancelling a receipt
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Cancel>,
) -> Result<(), ServerError> {
    if payload.reason.trim().is_empty() {
        return Err(ServerError::Generic("reason required".to_string()));
    }
    state.ledger.cancel_receipt(id, &payload.reason).await?;
    Ok(())
}

/// Handle requests for moving a receipt to another customer
pub async fn reassign_customer(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReassignCustomer>,
) -> Result<(), ServerError> {
    state
        .ledger
        .reassign_receipt_customer(id, payload.customer_id)
        .await?;
    Ok(())
}
