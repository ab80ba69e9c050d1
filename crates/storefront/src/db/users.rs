//! Account queries for the `PostgreSQL` store.

use async_trait::async_trait;

use pickles_core::{Password, User, Username};

use super::{IdentityStore, PgStore, RepositoryError};

/// Raw `storefront.users` row.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    username: String,
    password: String,
    is_admin: bool,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;
        let password = Password::new(row.password).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid password for {username}: {e}"))
        })?;

        Ok(Self {
            username,
            password,
            is_admin: row.is_admin,
        })
    }
}

#[async_trait]
impl IdentityStore for PgStore {
    async fn get_user(&self, username: &Username) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT username, password, is_admin
            FROM storefront.users
            WHERE username = $1
            ",
        )
        .bind(username.as_str())
        .fetch_optional(self.pool())
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn insert_user_if_absent(&self, user: &User) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO storefront.users (username, password, is_admin)
            VALUES ($1, $2, $3)
            ON CONFLICT (username) DO NOTHING
            ",
        )
        .bind(user.username.as_str())
        .bind(user.password.expose())
        .bind(user.is_admin)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(format!(
                "username {} already taken",
                user.username
            )));
        }

        Ok(())
    }
}
