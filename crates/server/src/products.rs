//! Product API endpoints

use api_types::product::{ProductCreated, ProductNew, ProductView, Restock};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn view(product: ledger::Product) -> ProductView {
    ProductView {
        id: product.id,
        name: product.name,
        sku: product.sku,
        unit_price: product.unit_price,
        quantity_in_stock: product.quantity_in_stock,
    }
}

/// Handle requests for adding a product to the catalog
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductNew>,
) -> Result<Json<ProductCreated>, ServerError> {
    let id = state
        .ledger
        .create_product(
            &payload.name,
            payload.sku.as_deref(),
            payload.unit_price,
            payload.quantity_in_stock,
        )
        .await?;
    Ok(Json(ProductCreated { id }))
}

/// Handle requests for a single product
pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductView>, ServerError> {
    let product = state.ledger.product(id).await?;
    Ok(Json(view(product)))
}

/// Handle requests for adding stock to a product
pub async fn restock(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Restock>,
) -> Result<Json<ProductView>, ServerError> {
    let product = state.ledger.restock_product(id, payload.quantity).await?;
    Ok(Json(view(product)))
}
