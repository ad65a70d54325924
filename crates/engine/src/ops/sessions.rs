use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use rand::RngCore;
use sea_orm::{ActiveValue, PaginatorTrait, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{Account, EngineError, ResultEngine, SessionToken, sessions, util::parse_uuid};

use super::Engine;

const TOKEN_BYTES: usize = 32;

fn new_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

impl Engine {
    /// Open a session for an authenticated account.
    pub async fn issue_session(&self, user_id: Uuid) -> ResultEngine<SessionToken> {
        self.require_account(&self.database, user_id).await?;

        let now = Utc::now();
        let session = SessionToken {
            token: new_token(),
            expires_at: now + self.session_ttl,
        };
        sessions::ActiveModel {
            token: ActiveValue::Set(session.token.clone()),
            user_id: ActiveValue::Set(user_id.to_string()),
            created_at: ActiveValue::Set(now),
            expires_at: ActiveValue::Set(session.expires_at),
        }
        .insert(&self.database)
        .await?;

        tracing::debug!(%user_id, "session issued");
        Ok(session)
    }

    /// Resolve a bearer token to the account it was issued for.
    ///
    /// Expired sessions are removed when they are presented.
    pub async fn resolve_principal(&self, token: &str) -> ResultEngine<Account> {
        let invalid = || EngineError::InvalidCredentials("token invalid".to_string());

        let session = sessions::Entity::find_by_id(token.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(invalid)?;
        if session.expires_at <= Utc::now() {
            sessions::Entity::delete_by_id(session.token)
                .exec(&self.database)
                .await?;
            return Err(EngineError::InvalidCredentials("token expired".to_string()));
        }

        let user_id = parse_uuid(&session.user_id, "user")?;
        self.find_account(&self.database, user_id)
            .await?
            .ok_or_else(invalid)
    }

    pub async fn revoke_session(&self, token: &str) -> ResultEngine<()> {
        let result = sessions::Entity::delete_by_id(token.to_string())
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::Persistence("logout unsuccessful".to_string()));
        }
        Ok(())
    }

    /// Revoke every session of an account, returning how many were open.
    pub async fn revoke_all_sessions(&self, user_id: Uuid) -> ResultEngine<u64> {
        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::UserId.eq(user_id.to_string()))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::Persistence(
                "logout all sessions unsuccessful".to_string(),
            ));
        }
        tracing::info!(%user_id, revoked = result.rows_affected, "sessions revoked");
        Ok(result.rows_affected)
    }

    /// Number of unexpired sessions an account holds.
    pub async fn active_sessions(&self, user_id: Uuid) -> ResultEngine<u64> {
        sessions::Entity::find()
            .filter(sessions::Column::UserId.eq(user_id.to_string()))
            .filter(sessions::Column::ExpiresAt.gt(Utc::now()))
            .count(&self.database)
            .await
            .map_err(Into::into)
    }
}
