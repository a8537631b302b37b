//! Initial schema migration - creates all tables from scratch.
//!
//! Complete schema for Kitabu:
//!
//! - `customers`: the customer registry
//! - `products`: catalog with stock counts
//! - `receipts`: one row per sale
//! - `receipt_items`: sale lines with denormalized product names
//! - `credits`: the unpaid part of under-paid receipts
//! - `payments`: money movements, at the counter or against credit
//! - `credit_payments`: links payments to the credit lines they reduced

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Customers {
    Table,
    Id,
    Name,
    Mobile,
    Email,
    Notes,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
    Name,
    Sku,
    UnitPrice,
    QuantityInStock,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Receipts {
    Table,
    Id,
    CustomerId,
    AmountPaid,
    TotalAmount,
    CreditAmount,
    Tax,
    Note,
    IsCancelled,
    CancellationReason,
    Latitude,
    Longitude,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ReceiptItems {
    Table,
    Id,
    ReceiptId,
    ProductId,
    ProductName,
    Quantity,
    UnitPrice,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Credits {
    Table,
    Id,
    CustomerId,
    ReceiptId,
    TotalAmount,
    AmountPaid,
    AmountLeft,
    Fulfilled,
    DueDate,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
    CustomerId,
    ReceiptId,
    Kind,
    AmountPaid,
    Method,
    Note,
    CustomerName,
    CustomerMobile,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum CreditPayments {
    Table,
    Id,
    CreditId,
    PaymentId,
    AmountPaid,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Customers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Customers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Customers::Name).string().not_null())
                    .col(ColumnDef::new(Customers::Mobile).string().not_null())
                    .col(ColumnDef::new(Customers::Email).string())
                    .col(ColumnDef::new(Customers::Notes).string())
                    .col(ColumnDef::new(Customers::IsDeleted).boolean().not_null())
                    .col(
                        ColumnDef::new(Customers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Customers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-customers-mobile")
                    .table(Customers::Table)
                    .col(Customers::Mobile)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Products
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(ColumnDef::new(Products::Sku).string())
                    .col(ColumnDef::new(Products::UnitPrice).big_integer().not_null())
                    .col(
                        ColumnDef::new(Products::QuantityInStock)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Products::IsDeleted).boolean().not_null())
                    .col(
                        ColumnDef::new(Products::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Receipts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Receipts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Receipts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Receipts::CustomerId).string())
                    .col(ColumnDef::new(Receipts::AmountPaid).big_integer().not_null())
                    .col(
                        ColumnDef::new(Receipts::TotalAmount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Receipts::CreditAmount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Receipts::Tax).big_integer().not_null())
                    .col(ColumnDef::new(Receipts::Note).string())
                    .col(ColumnDef::new(Receipts::IsCancelled).boolean().not_null())
                    .col(ColumnDef::new(Receipts::CancellationReason).string())
                    .col(ColumnDef::new(Receipts::Latitude).double())
                    .col(ColumnDef::new(Receipts::Longitude).double())
                    .col(ColumnDef::new(Receipts::IsDeleted).boolean().not_null())
                    .col(
                        ColumnDef::new(Receipts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Receipts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-receipts-customer_id")
                            .from(Receipts::Table, Receipts::CustomerId)
                            .to(Customers::Table, Customers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-receipts-customer_id")
                    .table(Receipts::Table)
                    .col(Receipts::CustomerId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Receipt items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ReceiptItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReceiptItems::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ReceiptItems::ReceiptId).string().not_null())
                    .col(ColumnDef::new(ReceiptItems::ProductId).string().not_null())
                    .col(
                        ColumnDef::new(ReceiptItems::ProductName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReceiptItems::Quantity)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReceiptItems::UnitPrice)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ReceiptItems::IsDeleted).boolean().not_null())
                    .col(
                        ColumnDef::new(ReceiptItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReceiptItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-receipt_items-receipt_id")
                            .from(ReceiptItems::Table, ReceiptItems::ReceiptId)
                            .to(Receipts::Table, Receipts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-receipt_items-product_id")
                            .from(ReceiptItems::Table, ReceiptItems::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-receipt_items-receipt_id")
                    .table(ReceiptItems::Table)
                    .col(ReceiptItems::ReceiptId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Credits
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Credits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Credits::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Credits::CustomerId).string().not_null())
                    .col(ColumnDef::new(Credits::ReceiptId).string().not_null())
                    .col(ColumnDef::new(Credits::TotalAmount).big_integer().not_null())
                    .col(ColumnDef::new(Credits::AmountPaid).big_integer().not_null())
                    .col(ColumnDef::new(Credits::AmountLeft).big_integer().not_null())
                    .col(ColumnDef::new(Credits::Fulfilled).boolean().not_null())
                    .col(ColumnDef::new(Credits::DueDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(Credits::IsDeleted).boolean().not_null())
                    .col(
                        ColumnDef::new(Credits::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Credits::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-credits-customer_id")
                            .from(Credits::Table, Credits::CustomerId)
                            .to(Customers::Table, Customers::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-credits-receipt_id")
                            .from(Credits::Table, Credits::ReceiptId)
                            .to(Receipts::Table, Receipts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-credits-customer_id")
                    .table(Credits::Table)
                    .col(Credits::CustomerId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Payments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payments::CustomerId).string())
                    .col(ColumnDef::new(Payments::ReceiptId).string())
                    .col(ColumnDef::new(Payments::Kind).string().not_null())
                    .col(ColumnDef::new(Payments::AmountPaid).big_integer().not_null())
                    .col(ColumnDef::new(Payments::Method).string().not_null())
                    .col(ColumnDef::new(Payments::Note).string())
                    .col(ColumnDef::new(Payments::CustomerName).string())
                    .col(ColumnDef::new(Payments::CustomerMobile).string())
                    .col(ColumnDef::new(Payments::IsDeleted).boolean().not_null())
                    .col(
                        ColumnDef::new(Payments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-customer_id")
                            .from(Payments::Table, Payments::CustomerId)
                            .to(Customers::Table, Customers::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-receipt_id")
                            .from(Payments::Table, Payments::ReceiptId)
                            .to(Receipts::Table, Receipts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payments-receipt_id")
                    .table(Payments::Table)
                    .col(Payments::ReceiptId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Credit payments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CreditPayments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CreditPayments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CreditPayments::CreditId).string().not_null())
                    .col(
                        ColumnDef::new(CreditPayments::PaymentId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CreditPayments::AmountPaid)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CreditPayments::IsDeleted)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CreditPayments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CreditPayments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-credit_payments-credit_id")
                            .from(CreditPayments::Table, CreditPayments::CreditId)
                            .to(Credits::Table, Credits::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-credit_payments-payment_id")
                            .from(CreditPayments::Table, CreditPayments::PaymentId)
                            .to(Payments::Table, Payments::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-credit_payments-credit_id")
                    .table(CreditPayments::Table)
                    .col(CreditPayments::CreditId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(CreditPayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Credits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ReceiptItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Receipts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await?;
        Ok(())
    }
}
