use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250101_000001_create_items_table::Migration)]
    }
}

mod m20250101_000001_create_items_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Matches entities::stock_item; the (sku, store) pair is the only key.
            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Items::Sku).string().not_null())
                        .col(ColumnDef::new(Items::Store).string().not_null())
                        .col(ColumnDef::new(Items::Quantity).big_integer().not_null())
                        .col(ColumnDef::new(Items::Description).text().null())
                        .primary_key(Index::create().col(Items::Sku).col(Items::Store))
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Items {
        Table,
        Sku,
        Store,
        Quantity,
        Description,
    }
}
