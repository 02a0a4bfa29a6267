pub use sea_orm_migration::prelude::*;

mod m20251101_000000_init;
mod m20251103_124823_expense_indexes;
mod m20251108_000000_expense_note_search;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251101_000000_init::Migration),
            Box::new(m20251103_124823_expense_indexes::Migration),
            Box::new(m20251108_000000_expense_note_search::Migration),
        ]
    }
}
