use std::fmt;
use std::sync::Arc;

use sea_orm::{DatabaseConnection, DatabaseTransaction, prelude::*};
use uuid::Uuid;

use crate::{LedgerError, LocationSource, ResultLedger};

mod credits;
mod customers;
mod products;
mod receipts;

pub use customers::CustomerSnapshot;
pub use receipts::ReceiptDetail;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Handle on the ledger database plus the injected collaborators.
///
/// All write operations go through this handle and run inside one database
/// transaction each.
pub struct Ledger {
    database: DatabaseConnection,
    location: Option<Arc<dyn LocationSource>>,
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Return a builder for `Ledger`.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }

    pub(crate) async fn require_customer(
        &self,
        db_tx: &DatabaseTransaction,
        id: Uuid,
    ) -> ResultLedger<crate::customers::Model> {
        crate::customers::Entity::find_by_id(id.to_string())
            .one(db_tx)
            .await?
            .filter(|model| !model.is_deleted)
            .ok_or_else(|| LedgerError::KeyNotFound("customer not exists".to_string()))
    }

    pub(crate) async fn require_receipt(
        &self,
        db_tx: &DatabaseTransaction,
        id: Uuid,
    ) -> ResultLedger<crate::receipts::Model> {
        crate::receipts::Entity::find_by_id(id.to_string())
            .one(db_tx)
            .await?
            .filter(|model| !model.is_deleted)
            .ok_or_else(|| LedgerError::KeyNotFound("receipt not exists".to_string()))
    }

    pub(crate) async fn require_product(
        &self,
        db_tx: &DatabaseTransaction,
        id: Uuid,
    ) -> ResultLedger<crate::products::Model> {
        crate::products::Entity::find_by_id(id.to_string())
            .one(db_tx)
            .await?
            .filter(|model| !model.is_deleted)
            .ok_or_else(|| LedgerError::KeyNotFound("product not exists".to_string()))
    }
}

fn normalize_required_text(value: &str, label: &str) -> ResultLedger<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidAmount(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Ledger`.
#[derive(Default)]
pub struct LedgerBuilder {
    database: DatabaseConnection,
    location: Option<Arc<dyn LocationSource>>,
}

impl LedgerBuilder {
    /// Pass the required database.
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = db;
        self
    }

    /// Optional geolocation source used to geotag receipts after commit.
    pub fn location(mut self, source: Arc<dyn LocationSource>) -> LedgerBuilder {
        self.location = Some(source);
        self
    }

    /// Construct `Ledger`.
    pub async fn build(self) -> ResultLedger<Ledger> {
        Ok(Ledger {
            database: self.database,
            location: self.location,
        })
    }
}
