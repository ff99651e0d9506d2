use crate::auth::AuthContext;
use crate::domains::core::dependency_checker::DependencyChecker;
use crate::domains::core::repository::{
    BatchDeleteResult, DeleteResult, FindById, HardDeletable, SoftDeletable,
};
use crate::errors::{DbError, DomainError, DomainResult};
use crate::types::Permission;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Delete options for controlling deletion behavior
#[derive(Debug, Clone)]
pub struct DeleteOptions {
    /// Whether to allow hard delete
    pub allow_hard_delete: bool,

    /// Whether to fall back to soft delete if hard delete is blocked by dependencies
    pub fallback_to_soft_delete: bool,

    /// Whether to bypass dependency checks (admin only)
    pub force: bool,
}

impl Default for DeleteOptions {
    fn default() -> Self {
        Self {
            allow_hard_delete: false,
            fallback_to_soft_delete: true,
            force: false,
        }
    }
}

/// Reason why a delete operation failed for a specific record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FailureReason {
    /// Failed due to existing non-cascading dependencies
    DependenciesPrevented,
    /// Record was not found during the operation
    NotFound,
    /// User did not have permission for the requested operation
    AuthorizationFailed,
    /// An unexpected database error occurred
    DatabaseError(String),
}

/// Trait combining repository operations needed for delete service
pub trait DeleteServiceRepository<E>:
    FindById<E> + SoftDeletable + HardDeletable + Send + Sync
{
    fn as_find_by_id(&self) -> &dyn FindById<E>;
}

/// Implement for any type that implements all required traits
impl<T, E> DeleteServiceRepository<E> for T
where
    T: FindById<E> + SoftDeletable + HardDeletable + Send + Sync,
    E: Send + Sync + 'static,
{
    fn as_find_by_id(&self) -> &dyn FindById<E> {
        self
    }
}

/// Delete service for handling delete operations
#[async_trait]
pub trait DeleteService<E>: Send + Sync
where
    E: Send + Sync + 'static,
{
    /// Get the repository
    fn repository(&self) -> &dyn FindById<E>;

    /// Get the dependency checker
    fn dependency_checker(&self) -> &dyn DependencyChecker;

    /// Delete an entity with specified options
    async fn delete(
        &self,
        id: Uuid,
        auth: &AuthContext,
        options: DeleteOptions,
    ) -> DomainResult<DeleteResult>;

    /// Delete multiple entities with specified options
    async fn batch_delete(
        &self,
        ids: &[Uuid],
        auth: &AuthContext,
        options: DeleteOptions,
    ) -> DomainResult<BatchDeleteResult>;
}

/// Base implementation of delete service
pub struct BaseDeleteService<E>
where
    E: Send + Sync + 'static,
{
    pool: SqlitePool,
    repo: Arc<dyn DeleteServiceRepository<E>>,
    dependency_checker: Arc<dyn DependencyChecker + Send + Sync>,
    _marker: std::marker::PhantomData<E>,
}

impl<E> BaseDeleteService<E>
where
    E: Send + Sync + Clone + 'static,
{
    /// Create a new base delete service
    pub fn new(
        pool: SqlitePool,
        repo: Arc<dyn DeleteServiceRepository<E>>,
        dependency_checker: Arc<dyn DependencyChecker + Send + Sync>,
    ) -> Self {
        Self {
            pool,
            repo,
            dependency_checker,
            _marker: std::marker::PhantomData,
        }
    }

    /// Names of dependency tables that block a hard delete (non-cascadable only)
    async fn blocking_dependencies(&self, id: Uuid) -> DomainResult<Vec<String>> {
        let deps = self
            .dependency_checker
            .check_dependencies(self.repo.entity_name(), id)
            .await?;
        Ok(deps
            .into_iter()
            .filter(|d| !d.is_cascadable)
            .map(|d| d.table_name)
            .collect())
    }
}

#[async_trait]
impl<E> DeleteService<E> for BaseDeleteService<E>
where
    E: Send + Sync + Clone + 'static,
{
    fn repository(&self) -> &dyn FindById<E> {
        self.repo.as_find_by_id()
    }

    fn dependency_checker(&self) -> &dyn DependencyChecker {
        &*self.dependency_checker
    }

    async fn delete(
        &self,
        id: Uuid,
        auth: &AuthContext,
        options: DeleteOptions,
    ) -> DomainResult<DeleteResult> {
        // Ensure the record exists (and is not already soft deleted)
        let _ = self.repo.find_by_id(id).await?;

        if options.force && !auth.has_permission(Permission::HardDeleteRecordWithDependencies) {
            return Err(DomainError::AuthorizationFailed(
                "Force delete requires elevated privileges".to_string(),
            ));
        }

        if options.allow_hard_delete {
            if !auth.role.can_hard_delete() {
                return Err(DomainError::AuthorizationFailed(
                    "User cannot hard delete records".to_string(),
                ));
            }

            let blocking = if options.force {
                Vec::new()
            } else {
                self.blocking_dependencies(id).await?
            };

            if blocking.is_empty() {
                let mut tx = self.pool.begin().await.map_err(DbError::from)?;
                match self.repo.hard_delete_with_tx(id, auth, &mut tx).await {
                    Ok(()) => {
                        tx.commit().await.map_err(DbError::from)?;
                        return Ok(DeleteResult::HardDeleted);
                    }
                    Err(e) => {
                        let _ = tx.rollback().await;
                        return Err(e);
                    }
                }
            }

            if !options.fallback_to_soft_delete {
                return Ok(DeleteResult::DependenciesPrevented {
                    dependencies: blocking,
                });
            }

            self.repo.soft_delete(id, auth).await?;
            return Ok(DeleteResult::SoftDeleted {
                dependencies: blocking,
            });
        }

        self.repo.soft_delete(id, auth).await?;
        Ok(DeleteResult::SoftDeleted {
            dependencies: Vec::new(),
        })
    }

    async fn batch_delete(
        &self,
        ids: &[Uuid],
        auth: &AuthContext,
        options: DeleteOptions,
    ) -> DomainResult<BatchDeleteResult> {
        let mut result = BatchDeleteResult {
            hard_deleted: Vec::new(),
            soft_deleted: Vec::new(),
            failed: Vec::new(),
            dependencies: HashMap::new(),
        };

        for &id in ids {
            match self.delete(id, auth, options.clone()).await {
                Ok(DeleteResult::HardDeleted) => result.hard_deleted.push(id),
                Ok(DeleteResult::SoftDeleted { dependencies }) => {
                    if !dependencies.is_empty() {
                        result.dependencies.insert(id, dependencies);
                    }
                    result.soft_deleted.push(id);
                }
                Ok(DeleteResult::DependenciesPrevented { dependencies }) => {
                    result.dependencies.insert(id, dependencies);
                    result.failed.push(id);
                }
                Err(_) => result.failed.push(id),
            }
        }

        Ok(result)
    }
}
