//! Lowercased copy of `expenses.note` used for case-insensitive search.
//!
//! SQLite's `LOWER()` only folds ASCII, so the folded text is computed in
//! Rust on write and backfilled here the same way.

use sea_orm::{ConnectionTrait, Statement};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Expenses {
    Table,
    NoteSearch,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Expenses::Table)
                    .add_column(ColumnDef::new(Expenses::NoteSearch).string_len(2000))
                    .to_owned(),
            )
            .await?;

        backfill_note_search(manager).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Expenses::Table)
                    .drop_column(Expenses::NoteSearch)
                    .to_owned(),
            )
            .await
    }
}

async fn backfill_note_search(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    let db = manager.get_connection();
    let backend = db.get_database_backend();

    let rows = db
        .query_all(Statement::from_string(
            backend,
            "SELECT id, note FROM expenses WHERE note IS NOT NULL;",
        ))
        .await?;

    for row in rows {
        let id: String = row.try_get("", "id")?;
        let note: String = row.try_get("", "note")?;
        db.execute(Statement::from_sql_and_values(
            backend,
            "UPDATE expenses SET note_search = ? WHERE id = ?;",
            vec![note.to_lowercase().into(), id.into()],
        ))
        .await?;
    }

    Ok(())
}
