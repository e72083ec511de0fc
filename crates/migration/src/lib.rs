pub use sea_orm_migration::prelude::*;

mod m20260112_create_all_tables;
mod m20260112_add_indexes;
mod m20260113_seed_submission_types;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260112_create_all_tables::Migration),
            Box::new(m20260112_add_indexes::Migration),
            Box::new(m20260113_seed_submission_types::Migration),
        ]
    }
}
