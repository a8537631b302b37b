use axum::{
    Router,
    routing::{get, patch, post},
};

use std::sync::Arc;

use crate::{credit_payments, customers, products, receipts};
use ledger::Ledger;

#[derive(Clone)]
pub struct ServerState {
    pub ledger: Arc<Ledger>,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/customers", post(customers::create))
        .route(
            "/customers/{id}",
            get(customers::get).delete(customers::remove),
        )
        .route("/customers/{id}/credits", get(credit_payments::list))
        .route("/products", post(products::create))
        .route("/products/{id}", get(products::get))
        .route("/products/{id}/restock", post(products::restock))
        .route("/receipts", post(receipts::create))
        .route("/receipts/{id}", get(receipts::get))
        .route("/receipts/{id}/cancel", post(receipts::cancel))
        .route("/receipts/{id}/customer", patch(receipts::reassign_customer))
        .route("/creditPayments", post(credit_payments::create))
        .with_state(state)
}

pub async fn run(ledger: Ledger) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(ledger, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    ledger: Ledger,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        ledger: Arc::new(ledger),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    ledger: Ledger,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(ledger, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
