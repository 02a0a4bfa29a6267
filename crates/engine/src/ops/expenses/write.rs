use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Expense, ExpenseCmd, ResultEngine, UpdateExpenseCmd, expenses,
    util::{fold_note, normalize_category, normalize_note, validate_amount},
};

use super::super::{Engine, with_tx};

impl Engine {
    /// Stores a new expense for `cmd.user_id`.
    pub async fn create_expense(&self, cmd: ExpenseCmd) -> ResultEngine<Expense> {
        let category = normalize_category(&cmd.category)?;
        let amount = validate_amount(cmd.amount_minor)?;
        let note = normalize_note(cmd.note.as_deref())?;
        let expense = Expense::new(cmd.user_id, category, amount, note, cmd.created_at)?;

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, cmd.user_id).await?;
            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
            tracing::debug!(user_id = %cmd.user_id, expense_id = %expense.id, "created expense");
            Ok(expense)
        })
    }

    /// Returns one expense owned by `user_id`.
    pub async fn expense(&self, user_id: Uuid, expense_id: Uuid) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            let model = self.require_expense(&db_tx, user_id, expense_id).await?;
            Expense::try_from(model)
        })
    }

    /// Applies the fields set in `cmd` to an owned expense.
    pub async fn update_expense(&self, cmd: UpdateExpenseCmd) -> ResultEngine<Expense> {
        if cmd.is_empty() {
            return Err(EngineError::InvalidQuery(
                "provide at least one of category, amount_minor, note or created_at".to_string(),
            ));
        }
        let category = cmd.category.as_deref().map(normalize_category).transpose()?;
        let amount = cmd.amount_minor.map(validate_amount).transpose()?;
        let note = cmd
            .note
            .as_deref()
            .map(|note| normalize_note(Some(note)))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let model = self
                .require_expense(&db_tx, cmd.user_id, cmd.expense_id)
                .await?;

            let mut active: expenses::ActiveModel = model.into();
            if let Some(category) = category {
                active.category = ActiveValue::Set(category);
            }
            if let Some(amount) = amount {
                active.amount_minor = ActiveValue::Set(amount.cents());
            }
            if let Some(note) = note {
                active.note_search = ActiveValue::Set(fold_note(note.as_deref()));
                active.note = ActiveValue::Set(note);
            }
            if let Some(created_at) = cmd.created_at {
                active.created_at = ActiveValue::Set(created_at);
            }
            active.updated_at = ActiveValue::Set(Some(cmd.updated_at));

            let updated = active.update(&db_tx).await?;
            Expense::try_from(updated)
        })
    }

    /// Deletes an owned expense.
    pub async fn delete_expense(&self, user_id: Uuid, expense_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let result = expenses::Entity::delete_many()
                .filter(expenses::Column::Id.eq(expense_id.to_string()))
                .filter(expenses::Column::UserId.eq(user_id.to_string()))
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::KeyNotFound("expense not exists".to_string()));
            }
            Ok(())
        })
    }
}
