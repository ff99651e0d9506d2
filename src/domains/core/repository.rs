use crate::auth::AuthContext;
use crate::errors::DomainResult;
use async_trait::async_trait;
use sqlx::{Sqlite, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

/// Result type for delete operations
#[derive(Debug, PartialEq)]
pub enum DeleteResult {
    /// Record was hard deleted
    HardDeleted,

    /// Record was soft deleted, with list of dependencies that prevented hard delete
    SoftDeleted { dependencies: Vec<String> },

    /// Record was not deleted due to dependencies that prevented hard delete
    DependenciesPrevented { dependencies: Vec<String> },
}

/// Result type for batch delete operations
#[derive(Debug)]
pub struct BatchDeleteResult {
    /// Successfully hard deleted record IDs
    pub hard_deleted: Vec<Uuid>,

    /// Successfully soft deleted record IDs
    pub soft_deleted: Vec<Uuid>,

    /// Failed to delete record IDs
    pub failed: Vec<Uuid>,

    /// Map of ID to dependencies that prevented hard delete
    pub dependencies: HashMap<Uuid, Vec<String>>,
}

/// Trait for finding entities by ID
#[async_trait]
pub trait FindById<T> {
    /// Find an entity by ID
    async fn find_by_id(&self, id: Uuid) -> DomainResult<T>;
}

/// Trait for entities that support soft deletion
#[async_trait]
pub trait SoftDeletable {
    /// Soft delete an entity by ID (standalone)
    async fn soft_delete(&self, id: Uuid, auth: &AuthContext) -> DomainResult<()>;

    /// Soft delete an entity by ID within a transaction
    async fn soft_delete_with_tx(
        &self,
        id: Uuid,
        auth: &AuthContext,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<()>;
}

/// Trait for entities that support hard deletion
#[async_trait]
pub trait HardDeletable {
    /// The name of the entity table in the database (for logging)
    fn entity_name(&self) -> &'static str;

    /// Hard delete an entity by ID (standalone)
    async fn hard_delete(&self, id: Uuid, auth: &AuthContext) -> DomainResult<()>;

    /// Hard delete an entity by ID within a transaction
    async fn hard_delete_with_tx(
        &self,
        id: Uuid,
        auth: &AuthContext,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<()>;
}
