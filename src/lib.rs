// Public modules
pub mod auth;
pub mod domains;
pub mod errors;
pub mod globals;
pub mod types;
pub mod validation;

// Private modules
mod db_migration;

/// Initialize the library with the given database path.
/// This function must be called before any other function in the library.
pub async fn initialize(db_path: &str) -> errors::ServiceResult<()> {
    let _ = env_logger::try_init();

    // Initialize global services
    globals::initialize(db_path).await?;

    // Initialize database with migrations
    db_migration::initialize_database()
        .await
        .map_err(|e| errors::ServiceError::Configuration(e.to_string()))?;

    Ok(())
}

/// Check if the library has been initialized
pub fn is_initialized() -> bool {
    globals::is_initialized()
}

/// Get a reference to the SQLite connection pool.
/// This is primarily for internal use.
pub fn get_db_pool() -> Result<sqlx::SqlitePool, errors::DbError> {
    globals::get_db_pool()
}

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    /// One-connection in-memory pool with the full schema applied.
    pub async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        crate::db_migration::run_migrations(&pool)
            .await
            .expect("migrations");
        pool
    }
}
