use crate::errors::{DbError, DbResult};
use crate::globals;
use sqlx::SqlitePool;

// Embed all migration SQL files at compile time
const MIGRATION_INITIAL: &str = include_str!("../migrations/20250601000000_initial.sql");
const MIGRATION_PARENT_INDEX: &str =
    include_str!("../migrations/20250614000000_assessment_parent_index.sql");
const MIGRATION_ENROLLMENT_INDEX: &str =
    include_str!("../migrations/20250702000000_enrollment_status_index.sql");

// List of migrations with their names and SQL content
const MIGRATIONS: &[(&str, &str)] = &[
    ("20250601000000_initial.sql", MIGRATION_INITIAL),
    (
        "20250614000000_assessment_parent_index.sql",
        MIGRATION_PARENT_INDEX,
    ),
    (
        "20250702000000_enrollment_status_index.sql",
        MIGRATION_ENROLLMENT_INDEX,
    ),
];

/// Initialize the global database with migrations
pub async fn initialize_database() -> DbResult<()> {
    println!("🗄️ [DB_MIGRATION] Starting database migration process...");

    let pool = globals::get_db_pool()?;
    run_migrations(&pool).await?;

    println!("🎉 [DB_MIGRATION] Database migration process completed successfully");
    Ok(())
}

/// Apply any pending migrations against the given pool
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    create_migrations_table(pool).await?;

    let last_migration = get_last_migration(pool).await?;
    match &last_migration {
        Some(name) => println!("📋 [DB_MIGRATION] Last applied migration: {}", name),
        None => println!("📋 [DB_MIGRATION] No migrations applied yet"),
    }

    apply_pending_migrations(pool, last_migration).await
}

/// Create migrations table if it doesn't exist
async fn create_migrations_table(pool: &SqlitePool) -> DbResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| DbError::Migration(format!("Failed to create migrations table: {}", e)))?;

    Ok(())
}

/// Get the last applied migration
async fn get_last_migration(pool: &SqlitePool) -> DbResult<Option<String>> {
    let result =
        sqlx::query_scalar::<_, String>("SELECT name FROM migrations ORDER BY id DESC LIMIT 1")
            .fetch_optional(pool)
            .await
            .map_err(|e| DbError::Migration(format!("Failed to get last migration: {}", e)))?;

    Ok(result)
}

/// Apply pending migrations
async fn apply_pending_migrations(
    pool: &SqlitePool,
    last_migration: Option<String>,
) -> DbResult<()> {
    let pending_migrations = get_pending_migrations(last_migration);

    if pending_migrations.is_empty() {
        println!("✅ [DB_MIGRATION] No pending migrations to apply");
        return Ok(());
    }

    println!(
        "📋 [DB_MIGRATION] Found {} pending migrations",
        pending_migrations.len()
    );

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| DbError::Migration(format!("Failed to begin transaction: {}", e)))?;

    for (migration_name, migration_sql) in pending_migrations {
        println!("🚀 [DB_MIGRATION] Applying migration: {}", migration_name);

        sqlx::query(migration_sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to apply migration {}: {}",
                    migration_name, e
                ))
            })?;

        let now = chrono::Utc::now().to_rfc3339();
        sqlx::query("INSERT INTO migrations (name, applied_at) VALUES (?, ?)")
            .bind(migration_name)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration {}: {}",
                    migration_name, e
                ))
            })?;

        println!(
            "✅ [DB_MIGRATION] Migration {} applied successfully",
            migration_name
        );
    }

    tx.commit()
        .await
        .map_err(|e| DbError::Migration(format!("Failed to commit transaction: {}", e)))?;

    Ok(())
}

/// Determine which migrations need to be applied
fn get_pending_migrations(last_migration: Option<String>) -> Vec<(&'static str, &'static str)> {
    let mut pending = Vec::new();
    let mut should_include = last_migration.is_none();

    for &(migration_name, migration_sql) in MIGRATIONS {
        if should_include {
            pending.push((migration_name, migration_sql));
        } else if Some(migration_name.to_string()) == last_migration {
            // Found the last applied migration, include all subsequent ones
            should_include = true;
        }
    }

    pending
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool")
    }

    #[tokio::test]
    async fn migrations_apply_cleanly_and_are_idempotent() {
        let pool = memory_pool().await;
        run_migrations(&pool).await.expect("first run");
        // Second run finds nothing pending
        run_migrations(&pool).await.expect("second run");

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(applied as usize, MIGRATIONS.len());

        // Spot-check the core tables exist
        for table in [
            "players",
            "assessments",
            "camps",
            "camp_batches",
            "camp_enrollments",
            "camp_attendance",
            "camp_payments",
        ] {
            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
            )
            .bind(table)
            .fetch_one(&pool)
            .await
            .unwrap();
            assert_eq!(count, 1, "missing table {}", table);
        }
    }

    #[test]
    fn pending_migration_resume_logic() {
        let all = get_pending_migrations(None);
        assert_eq!(all.len(), MIGRATIONS.len());

        let after_first = get_pending_migrations(Some(MIGRATIONS[0].0.to_string()));
        assert_eq!(after_first.len(), MIGRATIONS.len() - 1);

        let after_last =
            get_pending_migrations(Some(MIGRATIONS[MIGRATIONS.len() - 1].0.to_string()));
        assert!(after_last.is_empty());
    }
}
