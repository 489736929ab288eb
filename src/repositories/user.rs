use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::error::SqlState;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::user::{NewUser, User},
};

/// Persistence for user identities and password hashes.
///
/// There is deliberately no update or delete.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user. Fails with `AppError::Conflict` if the email is taken.
    async fn create(&self, user: NewUser) -> Result<User>;

    /// Finds a user by exact email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Finds a user by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
}

/// The PostgreSQL-backed user repository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool,
}

impl PgUserRepository {
    /// Creates a new `PgUserRepository`.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                r#"
                INSERT INTO users (id, email, password_hash, name)
                VALUES ($1, $2, $3, $4)
                RETURNING id, email, password_hash, name, created_at
                "#,
            )
            .await?;

        let row = client
            .query_one(
                &statement,
                &[&user.id, &user.email, &user.password_hash, &user.name],
            )
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    AppError::Conflict("User already exists".to_string())
                } else {
                    AppError::from(e)
                }
            })?;

        Ok(User::from(&row))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                r#"
                SELECT id, email, password_hash, name, created_at
                FROM users
                WHERE email = $1
                "#,
            )
            .await?;

        let row = client.query_opt(&statement, &[&email]).await?;
        Ok(row.as_ref().map(User::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                r#"
                SELECT id, email, password_hash, name, created_at
                FROM users
                WHERE id = $1
                "#,
            )
            .await?;

        let row = client.query_opt(&statement, &[&id]).await?;
        Ok(row.as_ref().map(User::from))
    }
}
