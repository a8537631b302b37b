//! Customer API endpoints

use api_types::customer::{CustomerCreated, CustomerNew, CustomerView, DebtLevel, DebtPolicy};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

#[derive(Debug, Deserialize)]
pub struct SnapshotQuery {
    pub policy: Option<DebtPolicy>,
}

fn to_ledger_policy(policy: Option<DebtPolicy>) -> ledger::DebtPolicy {
    match policy.unwrap_or_default() {
        DebtPolicy::DueDates => ledger::DebtPolicy::DueDates,
        DebtPolicy::BalanceSign => ledger::DebtPolicy::BalanceSign,
    }
}

fn to_api_level(level: ledger::DebtLevel) -> DebtLevel {
    match level {
        ledger::DebtLevel::NoDebt => DebtLevel::NoDebt,
        ledger::DebtLevel::InDebt => DebtLevel::InDebt,
        ledger::DebtLevel::Overdue => DebtLevel::Overdue,
    }
}

/// Handle requests for registering a new customer
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CustomerNew>,
) -> Result<Json<CustomerCreated>, ServerError> {
    let mut cmd = ledger::CreateCustomerCmd::new(payload.name, payload.mobile);
    if let Some(email) = payload.email {
        cmd = cmd.email(email);
    }
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }

    let id = state.ledger.create_customer(cmd).await?;
    Ok(Json(CustomerCreated { id }))
}

/// Handle requests for a customer with their projected balance figures
pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SnapshotQuery>,
) -> Result<Json<CustomerView>, ServerError> {
    let snapshot = state
        .ledger
        .customer_snapshot(id, to_ledger_policy(query.policy))
        .await?;

    Ok(Json(CustomerView {
        id: snapshot.customer.id,
        name: snapshot.customer.name,
        mobile: snapshot.customer.mobile,
        email: snapshot.customer.email,
        notes: snapshot.customer.notes,
        total_amount: snapshot.sheet.total_amount,
        balance: snapshot.sheet.balance,
        remaining_credit_amount: snapshot.sheet.remaining_credit_amount,
        overdue_credit_amount: snapshot.sheet.overdue_credit_amount,
        debt_level: to_api_level(snapshot.sheet.debt_level),
    }))
}

/// Handle requests for deleting a customer and everything hanging off them
pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<(), ServerError> {
    state.ledger.delete_customer(id).await?;
    Ok(())
}
