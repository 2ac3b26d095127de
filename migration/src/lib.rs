pub use sea_orm_migration::prelude::*;

mod m20260401_000001_create_categories;
mod m20260401_000002_create_submissions;
mod m20260402_000003_create_ui_tables;
mod m20260403_000004_create_app_users;
mod m20260403_000005_create_catalog_items;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260401_000001_create_categories::Migration),
            Box::new(m20260401_000002_create_submissions::Migration),
            Box::new(m20260402_000003_create_ui_tables::Migration),
            Box::new(m20260403_000004_create_app_users::Migration),
            Box::new(m20260403_000005_create_catalog_items::Migration),
        ]
    }
}
