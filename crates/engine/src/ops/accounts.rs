use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, SqlErr, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Account, AccountPatch, EngineError, NewAccount, ResultEngine, password, products, sessions,
    users,
    util::{normalize_email, normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

impl Engine {
    /// Register a new account. The email doubles as username.
    ///
    /// New accounts start with a zero balance and the buyer role unless
    /// another role is requested.
    pub async fn register(&self, new: NewAccount) -> ResultEngine<Account> {
        let email = normalize_email(&new.email)?;
        if new.password.is_empty() {
            return Err(EngineError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }

        let exists = users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .one(&self.database)
            .await?
            .is_some();
        if exists {
            return Err(EngineError::ExistingKey(email));
        }

        let password_hash = password::hash_password(&new.password)?;
        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            username: email.clone(),
            email,
            full_name: normalize_optional_text(new.full_name.as_deref()),
            phone: normalize_optional_text(new.phone.as_deref()),
            role: new.role.unwrap_or_default(),
            deposit: 0,
            is_verified: true,
            created_at: now,
            updated_at: now,
        };

        users::ActiveModel {
            id: ActiveValue::Set(account.id.to_string()),
            email: ActiveValue::Set(account.email.clone()),
            username: ActiveValue::Set(account.username.clone()),
            full_name: ActiveValue::Set(account.full_name.clone()),
            phone: ActiveValue::Set(account.phone.clone()),
            password: ActiveValue::Set(password_hash),
            role: ActiveValue::Set(account.role.as_str().to_string()),
            deposit: ActiveValue::Set(0),
            is_verified: ActiveValue::Set(true),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(&self.database)
        .await
        .map_err(|err| match err.sql_err() {
            // A concurrent registration won the race past the lookup above.
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                EngineError::ExistingKey(account.email.clone())
            }
            _ => err.into(),
        })?;

        tracing::info!(user_id = %account.id, role = %account.role, "account registered");
        Ok(account)
    }

    /// Check an email/password pair.
    ///
    /// Unknown email and wrong password fail the same way.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<Account> {
        let invalid = || EngineError::InvalidCredentials("invalid login credentials".to_string());
        let email = email.trim().to_lowercase();

        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .ok_or_else(invalid)?;
        if !password::verify_password(password, &model.password) {
            tracing::debug!(user_id = %model.id, "password mismatch");
            return Err(invalid());
        }
        if !model.is_verified {
            return Err(EngineError::InvalidCredentials(
                "account is not verified".to_string(),
            ));
        }

        Account::try_from(model)
    }

    pub async fn account(&self, user_id: Uuid) -> ResultEngine<Account> {
        self.require_account(&self.database, user_id).await
    }

    pub async fn account_by_email(&self, email: &str) -> ResultEngine<Account> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
            .and_then(Account::try_from)
    }

    /// Apply every field set in `patch` to the caller's own account.
    pub async fn update_account(
        &self,
        user_id: Uuid,
        patch: AccountPatch,
    ) -> ResultEngine<Account> {
        if patch.is_empty() {
            return Err(EngineError::InvalidInput(
                "provide at least one of full_name, phone or role".to_string(),
            ));
        }
        let mut account = self.require_account(&self.database, user_id).await?;

        let now = Utc::now();
        let mut active = users::ActiveModel {
            id: ActiveValue::Set(user_id.to_string()),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        if let Some(full_name) = patch.full_name.as_deref() {
            let full_name = normalize_required_text(full_name, "full name")?;
            active.full_name = ActiveValue::Set(Some(full_name.clone()));
            account.full_name = Some(full_name);
        }
        if let Some(phone) = patch.phone.as_deref() {
            let phone = normalize_required_text(phone, "phone")?;
            active.phone = ActiveValue::Set(Some(phone.clone()));
            account.phone = Some(phone);
        }
        if let Some(role) = patch.role {
            active.role = ActiveValue::Set(role.as_str().to_string());
            account.role = role;
        }
        account.updated_at = now;

        active.update(&self.database).await.map_err(|err| match err {
            DbErr::RecordNotUpdated => EngineError::Persistence("user update failed".to_string()),
            other => other.into(),
        })?;

        tracing::info!(%user_id, role = %account.role, "account updated");
        Ok(account)
    }

    /// Delete the caller's account together with its sessions and the
    /// products it listed.
    pub async fn delete_account(&self, user_id: Uuid) -> ResultEngine<()> {
        let id = user_id.to_string();
        let deleted: ResultEngine<()> = with_tx!(self, |db_tx| {
            sessions::Entity::delete_many()
                .filter(sessions::Column::UserId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            products::Entity::delete_many()
                .filter(products::Column::SellerId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            let result = users::Entity::delete_by_id(id.clone()).exec(&db_tx).await?;
            if result.rows_affected == 0 {
                return Err(EngineError::Persistence("user delete failed".to_string()));
            }
            Ok(())
        });
        deleted?;

        tracing::info!(%user_id, "account deleted");
        Ok(())
    }
}
