//! Customer records.
//!
//! A customer owns receipts, credits and payments by back-reference. The
//! aggregate figures shown for a customer (total sold, balance, overdue
//! credit, debt level) are never stored: they are computed on read by the
//! [`projection`](crate::projection) module.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::LedgerError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub mobile: String,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(name: String, mobile: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            mobile,
            email: None,
            notes: None,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub mobile: String,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::receipts::Entity")]
    Receipts,
    #[sea_orm(has_many = "super::credits::Entity")]
    Credits,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::receipts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receipts.def()
    }
}

impl Related<super::credits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Credits.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Customer> for ActiveModel {
    fn from(customer: &Customer) -> Self {
        Self {
            id: ActiveValue::Set(customer.id.to_string()),
            name: ActiveValue::Set(customer.name.clone()),
            mobile: ActiveValue::Set(customer.mobile.clone()),
            email: ActiveValue::Set(customer.email.clone()),
            notes: ActiveValue::Set(customer.notes.clone()),
            is_deleted: ActiveValue::Set(customer.is_deleted),
            created_at: ActiveValue::Set(customer.created_at),
            updated_at: ActiveValue::Set(customer.updated_at),
        }
    }
}

impl TryFrom<Model> for Customer {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::KeyNotFound("customer not exists".to_string()))?,
            name: model.name,
            mobile: model.mobile,
            email: model.email,
            notes: model.notes,
            is_deleted: model.is_deleted,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
