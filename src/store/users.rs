use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;
use time::OffsetDateTime;

/// User row as persisted. `id` and `created_at` are assigned by the database.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Caller-supplied fields for a user that does not exist yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts one row and returns it with the generated fields filled in.
    /// Driver errors are returned as-is.
    async fn create(&self, user: NewUser) -> Result<User, sqlx::Error>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> Result<User, sqlx::Error> {
        let (id, created_at) = sqlx::query_as::<_, (i64, OffsetDateTime)>(
            r#"
            INSERT INTO users (username, email, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.role)
        .fetch_one(&self.db)
        .await?;

        Ok(User {
            id,
            username: user.username,
            email: user.email,
            password: user.password,
            role: user.role,
            created_at,
        })
    }
}
