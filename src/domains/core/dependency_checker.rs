use crate::errors::{DbError, DomainError, DomainResult};
use async_trait::async_trait;
use sqlx::{query_as, Pool, Sqlite};
use std::collections::HashMap;
use uuid::Uuid;

/// Dependency information
#[derive(Debug, Clone)]
pub struct Dependency {
    /// Name of the table with dependent records
    pub table_name: String,

    /// Count of dependent records
    pub count: i64,

    /// Name of the foreign key column
    pub foreign_key_column: String,

    /// Whether the dependency is cascadable (ON DELETE CASCADE)
    pub is_cascadable: bool,
}

/// Trait for dependency checking
#[async_trait]
pub trait DependencyChecker: Send + Sync {
    /// Check for dependencies for an entity
    async fn check_dependencies(&self, table_name: &str, id: Uuid)
        -> DomainResult<Vec<Dependency>>;

    /// Get a simplified list of dependency tables
    async fn get_dependency_tables(&self, table_name: &str, id: Uuid) -> DomainResult<Vec<String>> {
        let dependencies = self.check_dependencies(table_name, id).await?;
        Ok(dependencies.into_iter().map(|dep| dep.table_name).collect())
    }
}

/// SQLite implementation of the DependencyChecker
pub struct SqliteDependencyChecker {
    pool: Pool<Sqlite>,
    /// Maps table name to its dependencies
    dependency_map: HashMap<String, Vec<(String, String, bool)>>,
}

impl SqliteDependencyChecker {
    /// Create a new SQLite dependency checker
    pub fn new(pool: Pool<Sqlite>) -> Self {
        let mut dependency_map = HashMap::new();

        // Define dependencies based on schema
        // Format: (table_name, [(dependent_table, foreign_key_column, is_cascadable)])

        // Players dependencies.
        // NOTE: assessments.parent_assessment_id is intentionally absent here: a
        // follow-up may outlive the assessment it was seeded from, so the parent
        // link never blocks deletion.
        dependency_map.insert(
            "players".to_string(),
            vec![("assessments".to_string(), "player_id".to_string(), false)],
        );

        // Camps dependencies
        dependency_map.insert(
            "camps".to_string(),
            vec![
                ("camp_batches".to_string(), "camp_id".to_string(), false),
                ("camp_enrollments".to_string(), "camp_id".to_string(), false),
            ],
        );

        // Camp batches dependencies
        dependency_map.insert(
            "camp_batches".to_string(),
            vec![(
                "camp_enrollments".to_string(),
                "batch_id".to_string(),
                false,
            )],
        );

        // Camp enrollments dependencies
        dependency_map.insert(
            "camp_enrollments".to_string(),
            vec![
                ("camp_payments".to_string(), "enrollment_id".to_string(), false),
                (
                    "camp_attendance".to_string(),
                    "enrollment_id".to_string(),
                    true,
                ),
            ],
        );

        Self {
            pool,
            dependency_map,
        }
    }
}

/// Query result for dependency count
#[derive(Debug, sqlx::FromRow)]
struct DependencyCount {
    count: i64,
}

#[async_trait]
impl DependencyChecker for SqliteDependencyChecker {
    async fn check_dependencies(
        &self,
        table_name: &str,
        id: Uuid,
    ) -> DomainResult<Vec<Dependency>> {
        let mut dependencies = Vec::new();
        let id_str = id.to_string();

        if let Some(dependent_tables) = self.dependency_map.get(table_name) {
            for (dependent_table, foreign_key, is_cascadable) in dependent_tables {
                let query = format!(
                    "SELECT COUNT(*) as count FROM {} WHERE {} = ? AND deleted_at IS NULL",
                    dependent_table, foreign_key
                );

                let count_result: Result<DependencyCount, sqlx::Error> =
                    query_as(&query).bind(&id_str).fetch_one(&self.pool).await;

                let count = match count_result {
                    Ok(c) => c.count,
                    Err(sqlx::Error::RowNotFound) => 0,
                    Err(e) => return Err(DomainError::Database(DbError::from(e))),
                };

                if count > 0 {
                    dependencies.push(Dependency {
                        table_name: dependent_table.clone(),
                        count,
                        foreign_key_column: foreign_key.clone(),
                        is_cascadable: *is_cascadable,
                    });
                }
            }
        }

        Ok(dependencies)
    }
}
