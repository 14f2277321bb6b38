//! Startup seeding of the admin allowlist.

use repliq_db::repositories::AllowlistRepo;
use sqlx::PgPool;

/// Seed the admin allowlist from the comma-separated `ADMIN_EMAILS`
/// environment variable, but only when the allowlist is still empty.
///
/// This is the only writer of the allowlist: once a deployment has
/// administrators, changing the variable has no effect and the set is
/// managed out of band.
pub async fn seed_admin_allowlist(pool: &PgPool) -> Result<(), sqlx::Error> {
    if AllowlistRepo::count(pool).await? > 0 {
        tracing::debug!("Admin allowlist already seeded");
        return Ok(());
    }

    let raw = match std::env::var("ADMIN_EMAILS") {
        Ok(v) => v,
        Err(_) => {
            tracing::warn!("Admin allowlist is empty and ADMIN_EMAILS is not set");
            return Ok(());
        }
    };

    let mut seeded = 0;
    for email in raw.split(',') {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            continue;
        }
        AllowlistRepo::insert(pool, &email).await?;
        seeded += 1;
    }

    tracing::info!(seeded, "Admin allowlist seeded");
    Ok(())
}
