use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, QueryFilter, SqlErr, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, User, expenses, users,
    util::{validate_email, validate_password},
};

use super::{Engine, with_tx};

fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::PasswordHash(err.to_string()))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
        .is_ok()
}

fn invalid_credentials() -> EngineError {
    EngineError::Unauthorized("invalid credentials".to_string())
}

impl Engine {
    /// Registers a new user.
    ///
    /// The email is stored as given; a second registration with the same
    /// address fails with [`EngineError::ExistingKey`].
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<User> {
        let email = validate_email(email)?.to_string();
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        with_tx!(self, |db_tx| {
            let existing = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(email));
            }

            let id = Uuid::new_v4();
            let model = users::ActiveModel {
                id: ActiveValue::Set(id.to_string()),
                email: ActiveValue::Set(email.clone()),
                password_hash: ActiveValue::Set(password_hash),
                created_at: ActiveValue::Set(created_at),
            };
            match model.insert(&db_tx).await {
                Ok(model) => {
                    tracing::info!(user_id = %id, "registered user");
                    User::try_from(model)
                }
                Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                    Err(EngineError::ExistingKey(email))
                }
                Err(err) => Err(err.into()),
            }
        })
    }

    /// Verifies an email/password pair and returns the user id.
    ///
    /// Unknown emails and wrong passwords produce the same error.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<Uuid> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email.trim()))
            .one(&self.database)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(password, &user.password_hash) {
            tracing::debug!("password mismatch");
            return Err(invalid_credentials());
        }

        crate::util::parse_uuid(&user.id, "user")
    }

    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            User::try_from(model)
        })
    }

    /// Deletes a user together with every expense they own.
    pub async fn delete_user(&self, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            let removed = expenses::Entity::delete_many()
                .filter(expenses::Column::UserId.eq(user_id.to_string()))
                .exec(&db_tx)
                .await?;
            users::Entity::delete_by_id(user_id.to_string())
                .exec(&db_tx)
                .await?;

            tracing::info!(
                user_id = %user_id,
                expenses = removed.rows_affected,
                "deleted user"
            );
            Ok(())
        })
    }
}
