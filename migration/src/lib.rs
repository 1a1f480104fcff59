pub use sea_orm_migration::prelude::*;

mod m20250310_120000_init;
mod m20250310_120500_chat_and_ai;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250310_120000_init::Migration),
            Box::new(m20250310_120500_chat_and_ai::Migration),
        ]
    }
}
