//! Repository for the `admin_allowlist` table.

use sqlx::PgPool;

/// Provides read and seed operations for the admin allowlist.
///
/// The allowlist has no API surface; it is written only by the startup
/// bootstrap and read at login to resolve a user's role.
pub struct AllowlistRepo;

impl AllowlistRepo {
    /// Whether the given email confers the admin role.
    pub async fn contains(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM admin_allowlist WHERE email = $1)",
        )
        .bind(email)
        .fetch_one(pool)
        .await
    }

    /// Number of allowlisted administrators.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admin_allowlist")
            .fetch_one(pool)
            .await
    }

    /// Add an email to the allowlist. Idempotent.
    pub async fn insert(pool: &PgPool, email: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO admin_allowlist (email) VALUES ($1) ON CONFLICT (email) DO NOTHING")
            .bind(email)
            .execute(pool)
            .await?;
        Ok(())
    }
}
