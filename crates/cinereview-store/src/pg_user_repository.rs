//! `PostgreSQL` implementation of the `UserRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cinereview_accounts::domain::user::{NewUser, Role, StoredUser, User, UserFilters};
use cinereview_accounts::ports::UserRepository;
use cinereview_core::error::DomainError;
use cinereview_core::pagination::PageRequest;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::{infrastructure, map_conflict};

const USER_COLUMNS: &str = "id, email, username, password_hash, role, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    username: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for StoredUser {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|_| DomainError::Infrastructure(format!("unknown role in row: {}", row.role)))?;
        Ok(Self {
            user: User {
                id: row.id,
                email: row.email,
                username: row.username,
                role,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            password_hash: row.password_hash,
        })
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &UserFilters) {
    query.push(" WHERE TRUE");
    if let Some(role) = filters.role {
        query.push(" AND role = ").push_bind(role.as_str());
    }
    if let Some(search) = filters.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        query
            .push(" AND (email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR username ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn ensure_updated(id: Uuid, rows_affected: u64) -> Result<(), DomainError> {
    if rows_affected == 0 {
        return Err(DomainError::UserNotFound(id));
    }
    Ok(())
}

/// PostgreSQL-backed user repository.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Creates a new `PgUserRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by(
        &self,
        column: &'static str,
        value: &str,
    ) -> Result<Option<StoredUser>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1"))
                .bind(value)
                .fetch_optional(&self.pool)
                .await
                .map_err(infrastructure)?;
        row.map(StoredUser::try_from).transpose()
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, DomainError> {
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users (id, email, username, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::now_v7())
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_conflict(e, || DomainError::UserAlreadyExists(user.email.clone())))?;
        Ok(StoredUser::try_from(row)?.user)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<StoredUser>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(infrastructure)?;
        row.map(StoredUser::try_from).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<StoredUser>, DomainError> {
        self.find_by("email", email).await
    }

    async fn get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredUser>, DomainError> {
        self.find_by("username", username).await
    }

    async fn list(
        &self,
        filters: &UserFilters,
        page: PageRequest,
    ) -> Result<(Vec<User>, i64), DomainError> {
        let mut count: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM users");
        push_filters(&mut count, filters);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(infrastructure)?;

        let mut select: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users"));
        push_filters(&mut select, filters);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows: Vec<UserRow> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?;

        let users = rows
            .into_iter()
            .map(|row| StoredUser::try_from(row).map(|stored| stored.user))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((users, total))
    }

    async fn update_role(&self, id: Uuid, role: Role) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(role.as_str())
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        ensure_updated(id, result.rows_affected())
    }

    async fn update(
        &self,
        id: Uuid,
        email: Option<&str>,
        username: Option<&str>,
    ) -> Result<(), DomainError> {
        let taken = email.or(username).unwrap_or_default().to_owned();
        let result = sqlx::query(
            "UPDATE users SET email = COALESCE($2, email), username = COALESCE($3, username), \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(email)
        .bind(username)
        .execute(&self.pool)
        .await
        .map_err(|e| map_conflict(e, || DomainError::UserAlreadyExists(taken)))?;
        ensure_updated(id, result.rows_affected())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), DomainError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await
                .map_err(infrastructure)?;
        ensure_updated(id, result.rows_affected())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(())
    }
}
