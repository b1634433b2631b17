//! User repository for database operations.

use chrono::Utc;
use herkey_core::auth::{AuthError, NewUser, UserAccount, UserRepository as UserRepoTrait};
use herkey_shared::auth::UserInfo;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, Unchanged,
};
use tracing::debug;

use crate::entities::users;

/// User repository implementation.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Whether a username is taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn username_exists(&self, username: &str) -> Result<bool, DbErr> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map(|user| user.is_some())
    }
}

impl UserRepoTrait for UserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, AuthError> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| AuthError::repository(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn find_user(&self, id: i32) -> Result<Option<UserAccount>, AuthError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::repository(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn list_users(&self) -> Result<Vec<UserAccount>, AuthError> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| AuthError::repository(e.to_string()))?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserAccount, AuthError> {
        let username = user.username.clone();
        let active_model = users::ActiveModel {
            username: Set(user.username),
            email: Set(user.email),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            password_hash: Set(user.password_hash),
            is_active: Set(user.is_active),
            date_joined: Set(user.date_joined.into()),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AuthError::UsernameTaken(username)
            } else {
                AuthError::repository(e.to_string())
            }
        })?;

        Ok(to_domain(model))
    }

    async fn update_user(&self, user: UserAccount) -> Result<UserAccount, AuthError> {
        let id = user.id;
        let username = user.username.clone();
        let active_model = users::ActiveModel {
            id: Unchanged(id),
            username: Set(user.username),
            email: Set(user.email),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            ..Default::default()
        };

        let model = active_model.update(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                return AuthError::UsernameTaken(username);
            }
            match e {
                DbErr::RecordNotUpdated => AuthError::UserNotFound(id),
                other => AuthError::repository(other.to_string()),
            }
        })?;

        Ok(to_domain(model))
    }

    async fn delete_user(&self, id: i32) -> Result<bool, AuthError> {
        // Participant rows go with it via ON DELETE CASCADE
        let result = users::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| AuthError::repository(e.to_string()))?;

        debug!(user_id = id, rows = result.rows_affected, "Deleted user");
        Ok(result.rows_affected > 0)
    }
}

/// Public summary of a user row.
pub(crate) fn to_info(model: users::Model) -> UserInfo {
    UserInfo {
        id: model.id,
        username: model.username,
        email: model.email,
        first_name: model.first_name,
        last_name: model.last_name,
    }
}

fn to_domain(model: users::Model) -> UserAccount {
    UserAccount {
        id: model.id,
        username: model.username,
        email: model.email,
        first_name: model.first_name,
        last_name: model.last_name,
        password_hash: model.password_hash,
        is_active: model.is_active,
        date_joined: model.date_joined.with_timezone(&Utc),
    }
}
