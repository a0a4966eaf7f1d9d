use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_supplier_table::Migration),
            Box::new(m20240301_000002_create_inventory_item_table::Migration),
            Box::new(m20240301_000003_create_stock_history_table::Migration),
            Box::new(m20240301_000004_create_app_user_table::Migration),
        ]
    }
}

mod m20240301_000001_create_supplier_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_supplier_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Supplier::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Supplier::Id)
                                .string_len(64)
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Supplier::Name)
                                .string_len(255)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Supplier::ContactName).string_len(255).null())
                        .col(ColumnDef::new(Supplier::Phone).string_len(64).null())
                        .col(ColumnDef::new(Supplier::Email).string_len(255).null())
                        .col(ColumnDef::new(Supplier::CreatedBy).string_len(255).not_null())
                        .col(
                            ColumnDef::new(Supplier::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Supplier::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Supplier {
        Table,
        Id,
        Name,
        ContactName,
        Phone,
        Email,
        CreatedBy,
        CreatedAt,
    }
}

mod m20240301_000002_create_inventory_item_table {

    use super::m20240301_000001_create_supplier_table::Supplier;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_inventory_item_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryItem::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryItem::Id)
                                .string_len(64)
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItem::Name)
                                .string_len(255)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(InventoryItem::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryItem::Price)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItem::SupplierId)
                                .string_len(64)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItem::MinimumQuantity)
                                .integer()
                                .not_null()
                                .default(10),
                        )
                        .col(
                            ColumnDef::new(InventoryItem::CreatedBy)
                                .string_len(255)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItem::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_item_supplier_id")
                                .from(InventoryItem::Table, InventoryItem::SupplierId)
                                .to(Supplier::Table, Supplier::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_item_supplier_id")
                        .table(InventoryItem::Table)
                        .col(InventoryItem::SupplierId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryItem::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum InventoryItem {
        Table,
        Id,
        Name,
        Quantity,
        Price,
        SupplierId,
        MinimumQuantity,
        CreatedBy,
        CreatedAt,
    }
}

mod m20240301_000003_create_stock_history_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_stock_history_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // item_id carries no foreign key: audit rows outlive the items they describe
            manager
                .create_table(
                    Table::create()
                        .table(StockHistory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockHistory::Id)
                                .string_len(64)
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockHistory::ItemId).string_len(64).not_null())
                        .col(ColumnDef::new(StockHistory::SupplierId).string_len(64).null())
                        .col(
                            ColumnDef::new(StockHistory::QuantityChange)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockHistory::Reason).string_len(32).not_null())
                        .col(
                            ColumnDef::new(StockHistory::PriceAtChange)
                                .decimal_len(12, 2)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(StockHistory::CreatedBy)
                                .string_len(255)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockHistory::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("ix_sh_item_ts")
                        .table(StockHistory::Table)
                        .col(StockHistory::ItemId)
                        .col(StockHistory::CreatedAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("ix_sh_ts")
                        .table(StockHistory::Table)
                        .col(StockHistory::CreatedAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("ix_sh_supplier_ts")
                        .table(StockHistory::Table)
                        .col(StockHistory::SupplierId)
                        .col(StockHistory::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockHistory::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum StockHistory {
        Table,
        Id,
        ItemId,
        SupplierId,
        QuantityChange,
        Reason,
        PriceAtChange,
        CreatedBy,
        CreatedAt,
    }
}

mod m20240301_000004_create_app_user_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_app_user_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AppUser::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(AppUser::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(AppUser::Email)
                                .string_len(255)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(AppUser::Name).string_len(255).not_null())
                        .col(ColumnDef::new(AppUser::Role).string_len(16).not_null())
                        .col(
                            ColumnDef::new(AppUser::Enabled)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(AppUser::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AppUser::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum AppUser {
        Table,
        Id,
        Email,
        Name,
        Role,
        Enabled,
        CreatedAt,
    }
}
