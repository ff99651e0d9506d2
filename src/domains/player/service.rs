use crate::auth::AuthContext;
use crate::domains::core::delete_service::{
    BaseDeleteService, DeleteOptions, DeleteService, DeleteServiceRepository,
};
use crate::domains::core::dependency_checker::DependencyChecker;
use crate::domains::core::repository::{
    BatchDeleteResult, DeleteResult, FindById, HardDeletable, SoftDeletable,
};
use crate::domains::permission::Permission;
use crate::domains::player::repository::PlayerRepository;
use crate::domains::player::types::{
    NewPlayer, Player, PlayerDemographics, PlayerFilter, PlayerResponse, UpdatePlayer,
};
use crate::errors::{DomainResult, ServiceError, ServiceResult};
use crate::types::{PaginatedResult, PaginationParams};
use crate::validation::Validate;
use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::sync::Arc;
use uuid::Uuid;

/// Trait defining player service operations
#[async_trait]
pub trait PlayerService: DeleteService<Player> + Send + Sync {
    async fn create_player(
        &self,
        new_player: NewPlayer,
        auth: &AuthContext,
    ) -> ServiceResult<PlayerResponse>;

    async fn get_player_by_id(&self, id: Uuid, auth: &AuthContext)
        -> ServiceResult<PlayerResponse>;

    async fn list_players(
        &self,
        filter: PlayerFilter,
        params: PaginationParams,
        auth: &AuthContext,
    ) -> ServiceResult<PaginatedResult<PlayerResponse>>;

    async fn update_player(
        &self,
        id: Uuid,
        update_data: UpdatePlayer,
        auth: &AuthContext,
    ) -> ServiceResult<PlayerResponse>;

    async fn delete_player(
        &self,
        id: Uuid,
        hard_delete: bool,
        auth: &AuthContext,
    ) -> ServiceResult<DeleteResult>;

    async fn get_demographics(&self, auth: &AuthContext) -> ServiceResult<PlayerDemographics>;
}

/// Implementation of the player service
#[derive(Clone)]
pub struct PlayerServiceImpl {
    repo: Arc<dyn PlayerRepository + Send + Sync>,
    delete_service: Arc<BaseDeleteService<Player>>,
}

impl PlayerServiceImpl {
    pub fn new(
        pool: SqlitePool,
        player_repo: Arc<dyn PlayerRepository + Send + Sync>,
        dependency_checker: Arc<dyn DependencyChecker + Send + Sync>,
    ) -> Self {
        struct RepoAdapter(Arc<dyn PlayerRepository + Send + Sync>);

        #[async_trait]
        impl FindById<Player> for RepoAdapter {
            async fn find_by_id(&self, id: Uuid) -> DomainResult<Player> {
                self.0.find_by_id(id).await
            }
        }

        #[async_trait]
        impl SoftDeletable for RepoAdapter {
            async fn soft_delete(&self, id: Uuid, auth: &AuthContext) -> DomainResult<()> {
                self.0.soft_delete(id, auth).await
            }
            async fn soft_delete_with_tx(
                &self,
                id: Uuid,
                auth: &AuthContext,
                tx: &mut Transaction<'_, Sqlite>,
            ) -> DomainResult<()> {
                self.0.soft_delete_with_tx(id, auth, tx).await
            }
        }

        #[async_trait]
        impl HardDeletable for RepoAdapter {
            fn entity_name(&self) -> &'static str {
                self.0.entity_name()
            }
            async fn hard_delete(&self, id: Uuid, auth: &AuthContext) -> DomainResult<()> {
                self.0.hard_delete(id, auth).await
            }
            async fn hard_delete_with_tx(
                &self,
                id: Uuid,
                auth: &AuthContext,
                tx: &mut Transaction<'_, Sqlite>,
            ) -> DomainResult<()> {
                self.0.hard_delete_with_tx(id, auth, tx).await
            }
        }

        let adapted_repo: Arc<dyn DeleteServiceRepository<Player>> =
            Arc::new(RepoAdapter(player_repo.clone()));

        let delete_service = Arc::new(BaseDeleteService::new(
            pool,
            adapted_repo,
            dependency_checker,
        ));

        Self {
            repo: player_repo,
            delete_service,
        }
    }
}

// Implement DeleteService<Player> by delegating
#[async_trait]
impl DeleteService<Player> for PlayerServiceImpl {
    fn repository(&self) -> &dyn FindById<Player> {
        self.delete_service.repository()
    }
    fn dependency_checker(&self) -> &dyn DependencyChecker {
        self.delete_service.dependency_checker()
    }
    async fn delete(
        &self,
        id: Uuid,
        auth: &AuthContext,
        options: DeleteOptions,
    ) -> DomainResult<DeleteResult> {
        self.delete_service.delete(id, auth, options).await
    }
    async fn batch_delete(
        &self,
        ids: &[Uuid],
        auth: &AuthContext,
        options: DeleteOptions,
    ) -> DomainResult<BatchDeleteResult> {
        self.delete_service.batch_delete(ids, auth, options).await
    }
}

#[async_trait]
impl PlayerService for PlayerServiceImpl {
    async fn create_player(
        &self,
        new_player: NewPlayer,
        auth: &AuthContext,
    ) -> ServiceResult<PlayerResponse> {
        if !auth.has_permission(Permission::CreatePlayers) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to create players".to_string(),
            ));
        }

        new_player.validate()?;

        let created = self.repo.create(&new_player, auth).await?;
        Ok(PlayerResponse::from(created))
    }

    async fn get_player_by_id(
        &self,
        id: Uuid,
        auth: &AuthContext,
    ) -> ServiceResult<PlayerResponse> {
        if !auth.has_permission(Permission::ViewPlayers) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to view players".to_string(),
            ));
        }

        let player = self.repo.find_by_id(id).await?;
        Ok(PlayerResponse::from(player))
    }

    async fn list_players(
        &self,
        filter: PlayerFilter,
        params: PaginationParams,
        auth: &AuthContext,
    ) -> ServiceResult<PaginatedResult<PlayerResponse>> {
        if !auth.has_permission(Permission::ViewPlayers) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to list players".to_string(),
            ));
        }

        filter.validate()?;

        let result = self.repo.find_by_filter(&filter, params).await?;
        let items = result.items.into_iter().map(PlayerResponse::from).collect();

        Ok(PaginatedResult::new(items, result.total, params))
    }

    async fn update_player(
        &self,
        id: Uuid,
        mut update_data: UpdatePlayer,
        auth: &AuthContext,
    ) -> ServiceResult<PlayerResponse> {
        if !auth.has_permission(Permission::EditPlayers) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to edit players".to_string(),
            ));
        }

        update_data.updated_by_user_id = auth.user_id;
        update_data.validate()?;

        let updated = self.repo.update(id, &update_data, auth).await?;
        Ok(PlayerResponse::from(updated))
    }

    async fn delete_player(
        &self,
        id: Uuid,
        hard_delete: bool,
        auth: &AuthContext,
    ) -> ServiceResult<DeleteResult> {
        let required_permission = if hard_delete {
            Permission::HardDeleteRecord
        } else {
            Permission::DeletePlayers
        };

        if !auth.has_permission(required_permission) {
            return Err(ServiceError::PermissionDenied(format!(
                "User does not have permission to {} players",
                if hard_delete { "hard delete" } else { "delete" }
            )));
        }

        let _ = self.repo.find_by_id(id).await?;

        let options = DeleteOptions {
            allow_hard_delete: hard_delete,
            fallback_to_soft_delete: !hard_delete,
            force: false,
        };

        let result = self.delete(id, auth, options).await?;
        Ok(result)
    }

    async fn get_demographics(&self, auth: &AuthContext) -> ServiceResult<PlayerDemographics> {
        if !auth.has_permission(Permission::ViewPlayers) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to view players".to_string(),
            ));
        }

        let demographics = self.repo.get_demographics().await?;
        Ok(demographics)
    }
}
