pub use sea_orm_migration::prelude::*;

mod m20240210_000001_create_directory_tables;
mod m20240210_000002_create_quote_tables;
mod m20240210_000003_create_waybill_tables;
mod m20240210_000004_create_pickup_tables;
mod m20240210_000005_create_outbox_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240210_000001_create_directory_tables::Migration),
            Box::new(m20240210_000002_create_quote_tables::Migration),
            Box::new(m20240210_000003_create_waybill_tables::Migration),
            Box::new(m20240210_000004_create_pickup_tables::Migration),
            Box::new(m20240210_000005_create_outbox_table::Migration),
        ]
    }
}
