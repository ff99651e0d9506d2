use crate::auth::AuthContext;
use crate::domains::camp::repository::CampRepository;
use crate::domains::camp::types::{
    Camp, CampBatchResponse, CampResponse, CampStatus, NewCamp, NewCampBatch, UpdateCamp,
    UpdateCampBatch,
};
use crate::domains::core::delete_service::{
    BaseDeleteService, DeleteOptions, DeleteService, DeleteServiceRepository,
};
use crate::domains::core::dependency_checker::DependencyChecker;
use crate::domains::core::repository::{
    BatchDeleteResult, DeleteResult, FindById, HardDeletable, SoftDeletable,
};
use crate::domains::permission::Permission;
use crate::errors::{DomainError, DomainResult, ServiceError, ServiceResult, ValidationError};
use crate::types::{PaginatedResult, PaginationParams};
use crate::validation::Validate;
use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::sync::Arc;
use uuid::Uuid;

/// Enum to specify related data to include in camp responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampInclude {
    Batches,
    EnrollmentCount,
    All,
}

/// Trait defining camp service operations
#[async_trait]
pub trait CampService: DeleteService<Camp> + Send + Sync {
    async fn create_camp(&self, new_camp: NewCamp, auth: &AuthContext)
        -> ServiceResult<CampResponse>;

    async fn get_camp_by_id(
        &self,
        id: Uuid,
        include: Option<&[CampInclude]>,
        auth: &AuthContext,
    ) -> ServiceResult<CampResponse>;

    async fn list_camps(
        &self,
        status: Option<String>,
        params: PaginationParams,
        auth: &AuthContext,
    ) -> ServiceResult<PaginatedResult<CampResponse>>;

    async fn update_camp(
        &self,
        id: Uuid,
        update_data: UpdateCamp,
        auth: &AuthContext,
    ) -> ServiceResult<CampResponse>;

    async fn delete_camp(
        &self,
        id: Uuid,
        hard_delete: bool,
        auth: &AuthContext,
    ) -> ServiceResult<DeleteResult>;

    async fn create_batch(
        &self,
        new_batch: NewCampBatch,
        auth: &AuthContext,
    ) -> ServiceResult<CampBatchResponse>;

    async fn update_batch(
        &self,
        batch_id: Uuid,
        update_data: UpdateCampBatch,
        auth: &AuthContext,
    ) -> ServiceResult<CampBatchResponse>;

    async fn list_batches(
        &self,
        camp_id: Uuid,
        auth: &AuthContext,
    ) -> ServiceResult<Vec<CampBatchResponse>>;

    async fn delete_batch(&self, batch_id: Uuid, auth: &AuthContext) -> ServiceResult<()>;
}

/// Implementation of the camp service
#[derive(Clone)]
pub struct CampServiceImpl {
    repo: Arc<dyn CampRepository + Send + Sync>,
    delete_service: Arc<BaseDeleteService<Camp>>,
}

impl CampServiceImpl {
    pub fn new(
        pool: SqlitePool,
        camp_repo: Arc<dyn CampRepository + Send + Sync>,
        dependency_checker: Arc<dyn DependencyChecker + Send + Sync>,
    ) -> Self {
        struct RepoAdapter(Arc<dyn CampRepository + Send + Sync>);

        #[async_trait]
        impl FindById<Camp> for RepoAdapter {
            async fn find_by_id(&self, id: Uuid) -> DomainResult<Camp> {
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

        let adapted_repo: Arc<dyn DeleteServiceRepository<Camp>> =
            Arc::new(RepoAdapter(camp_repo.clone()));

        let delete_service = Arc::new(BaseDeleteService::new(
            pool,
            adapted_repo,
            dependency_checker,
        ));

        Self {
            repo: camp_repo,
            delete_service,
        }
    }

    async fn enrich_response(
        &self,
        mut response: CampResponse,
        include: Option<&[CampInclude]>,
    ) -> ServiceResult<CampResponse> {
        if let Some(includes) = include {
            let include_batches =
                includes.contains(&CampInclude::Batches) || includes.contains(&CampInclude::All);
            let include_count = includes.contains(&CampInclude::EnrollmentCount)
                || includes.contains(&CampInclude::All);

            if include_batches {
                let batches = self.repo.find_batches_for_camp(response.id).await?;
                response.batches =
                    Some(batches.into_iter().map(CampBatchResponse::from).collect());
            }
            if include_count {
                response.enrollment_count = Some(self.repo.count_enrollments(response.id).await?);
            }
        }

        Ok(response)
    }
}

// Implement DeleteService<Camp> by delegating
#[async_trait]
impl DeleteService<Camp> for CampServiceImpl {
    fn repository(&self) -> &dyn FindById<Camp> {
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
impl CampService for CampServiceImpl {
    async fn create_camp(
        &self,
        new_camp: NewCamp,
        auth: &AuthContext,
    ) -> ServiceResult<CampResponse> {
        if !auth.has_permission(Permission::CreateCamps) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to create camps".to_string(),
            ));
        }

        new_camp.validate()?;

        let created = self.repo.create(&new_camp, auth).await?;
        Ok(CampResponse::from(created))
    }

    async fn get_camp_by_id(
        &self,
        id: Uuid,
        include: Option<&[CampInclude]>,
        auth: &AuthContext,
    ) -> ServiceResult<CampResponse> {
        if !auth.has_permission(Permission::ViewCamps) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to view camps".to_string(),
            ));
        }

        let camp = self.repo.find_by_id(id).await?;
        self.enrich_response(CampResponse::from(camp), include).await
    }

    async fn list_camps(
        &self,
        status: Option<String>,
        params: PaginationParams,
        auth: &AuthContext,
    ) -> ServiceResult<PaginatedResult<CampResponse>> {
        if !auth.has_permission(Permission::ViewCamps) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to list camps".to_string(),
            ));
        }

        let result = match status {
            Some(status) => {
                if CampStatus::from_str(&status).is_none() {
                    return Err(ServiceError::Domain(DomainError::Validation(
                        ValidationError::invalid_value("status", "unknown camp status"),
                    )));
                }
                self.repo.find_by_status(&status, params).await?
            }
            None => self.repo.find_all(params).await?,
        };

        let items = result.items.into_iter().map(CampResponse::from).collect();
        Ok(PaginatedResult::new(items, result.total, params))
    }

    async fn update_camp(
        &self,
        id: Uuid,
        mut update_data: UpdateCamp,
        auth: &AuthContext,
    ) -> ServiceResult<CampResponse> {
        if !auth.has_permission(Permission::EditCamps) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to edit camps".to_string(),
            ));
        }

        update_data.updated_by_user_id = auth.user_id;
        update_data.validate()?;

        let current = self.repo.find_by_id(id).await?;

        // Date-order check across the stored and updated values
        let start = update_data
            .start_date
            .clone()
            .unwrap_or_else(|| current.start_date.clone());
        let end = update_data
            .end_date
            .clone()
            .unwrap_or_else(|| current.end_date.clone());
        if let (Ok(s), Ok(e)) = (
            chrono::NaiveDate::parse_from_str(&start, "%Y-%m-%d"),
            chrono::NaiveDate::parse_from_str(&end, "%Y-%m-%d"),
        ) {
            if e < s {
                return Err(ServiceError::Domain(DomainError::Validation(
                    ValidationError::invalid_value("end_date", "cannot be before start_date"),
                )));
            }
        }

        let updated = self.repo.update(id, &update_data, auth).await?;
        Ok(CampResponse::from(updated))
    }

    async fn delete_camp(
        &self,
        id: Uuid,
        hard_delete: bool,
        auth: &AuthContext,
    ) -> ServiceResult<DeleteResult> {
        let required_permission = if hard_delete {
            Permission::HardDeleteRecord
        } else {
            Permission::DeleteCamps
        };

        if !auth.has_permission(required_permission) {
            return Err(ServiceError::PermissionDenied(format!(
                "User does not have permission to {} camps",
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

    async fn create_batch(
        &self,
        new_batch: NewCampBatch,
        auth: &AuthContext,
    ) -> ServiceResult<CampBatchResponse> {
        if !auth.has_permission(Permission::EditCamps) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to manage camp batches".to_string(),
            ));
        }

        new_batch.validate()?;

        // Batches only make sense on a camp that is still running
        let camp = self.repo.find_by_id(new_batch.camp_id).await?;
        if matches!(
            camp.parsed_status(),
            Some(CampStatus::Completed) | Some(CampStatus::Cancelled)
        ) {
            return Err(ServiceError::Domain(DomainError::Validation(
                ValidationError::invalid_value(
                    "camp_id",
                    "cannot add batches to a completed or cancelled camp",
                ),
            )));
        }

        let created = self.repo.create_batch(&new_batch, auth).await?;
        Ok(CampBatchResponse::from(created))
    }

    async fn update_batch(
        &self,
        batch_id: Uuid,
        mut update_data: UpdateCampBatch,
        auth: &AuthContext,
    ) -> ServiceResult<CampBatchResponse> {
        if !auth.has_permission(Permission::EditCamps) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to manage camp batches".to_string(),
            ));
        }

        update_data.updated_by_user_id = auth.user_id;
        update_data.validate()?;

        let updated = self.repo.update_batch(batch_id, &update_data, auth).await?;
        Ok(CampBatchResponse::from(updated))
    }

    async fn list_batches(
        &self,
        camp_id: Uuid,
        auth: &AuthContext,
    ) -> ServiceResult<Vec<CampBatchResponse>> {
        if !auth.has_permission(Permission::ViewCamps) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to view camps".to_string(),
            ));
        }

        let _ = self.repo.find_by_id(camp_id).await?;
        let batches = self.repo.find_batches_for_camp(camp_id).await?;
        Ok(batches.into_iter().map(CampBatchResponse::from).collect())
    }

    async fn delete_batch(&self, batch_id: Uuid, auth: &AuthContext) -> ServiceResult<()> {
        if !auth.has_permission(Permission::EditCamps) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to manage camp batches".to_string(),
            ));
        }

        // A batch with active enrollments cannot be removed
        let active = self.repo.count_batch_enrollments(batch_id).await?;
        if active > 0 {
            return Err(ServiceError::DependenciesPreventDeletion(vec![
                "camp_enrollments".to_string(),
            ]));
        }

        self.repo.soft_delete_batch(batch_id, auth).await?;
        Ok(())
    }
}
