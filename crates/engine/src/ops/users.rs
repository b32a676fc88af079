use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, users};

use super::{Engine, normalize_email, normalize_required_name, with_tx};

impl Engine {
    /// Create a user with an already-hashed password.
    ///
    /// The email is trimmed and lowercased before the uniqueness check.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> ResultEngine<users::Model> {
        let name = normalize_required_name(name, "user")?;
        let email = normalize_email(email)?;

        with_tx!(self, |db_tx| {
            let existing = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::Conflict("email already registered".to_string()));
            }

            let user = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                name: ActiveValue::Set(name),
                email: ActiveValue::Set(email),
                password_hash: ActiveValue::Set(password_hash.to_string()),
                reset_token: ActiveValue::Set(None),
                reset_token_expires_at: ActiveValue::Set(None),
            };
            Ok(user.insert(&db_tx).await?)
        })
    }

    pub async fn user_by_email(&self, email: &str) -> ResultEngine<Option<users::Model>> {
        let email = normalize_email(email)?;
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?)
    }

    pub async fn user_by_id(&self, user_id: Uuid) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("user".to_string()))
    }

    /// Store a password-reset token on the user owning `email`.
    ///
    /// Returns `None` (not an error) when the email is unknown, so the HTTP
    /// layer can answer identically for existing and non-existing accounts.
    pub async fn issue_reset_token(
        &self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> ResultEngine<Option<()>> {
        let Some(user) = self.user_by_email(email).await? else {
            return Ok(None);
        };

        let mut user: users::ActiveModel = user.into();
        user.reset_token = ActiveValue::Set(Some(token.to_string()));
        user.reset_token_expires_at = ActiveValue::Set(Some(expires_at));
        user.update(&self.database).await?;

        Ok(Some(()))
    }

    /// Consume a reset token and replace the password hash.
    pub async fn reset_password(
        &self,
        token: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let user = users::Entity::find()
                .filter(users::Column::ResetToken.eq(token))
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::Conflict("reset token invalid or expired".to_string())
                })?;

            let expired = user
                .reset_token_expires_at
                .is_none_or(|expires_at| expires_at < now);
            if expired {
                return Err(EngineError::Conflict(
                    "reset token invalid or expired".to_string(),
                ));
            }

            let mut user: users::ActiveModel = user.into();
            user.password_hash = ActiveValue::Set(new_password_hash.to_string());
            user.reset_token = ActiveValue::Set(None);
            user.reset_token_expires_at = ActiveValue::Set(None);
            user.update(&db_tx).await?;

            Ok(())
        })
    }
}
