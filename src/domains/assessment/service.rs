use crate::auth::AuthContext;
use crate::domains::assessment::comparison::{self, SkillComparison};
use crate::domains::assessment::repository::AssessmentRepository;
use crate::domains::assessment::skills::{SkillSections, SkillTab, SKILL_CATALOG};
use crate::domains::assessment::types::{
    Assessment, AssessmentResponse, AssessmentSummary, NewAssessment, UpdateAssessment,
};
use crate::domains::core::delete_service::{
    BaseDeleteService, DeleteOptions, DeleteService, DeleteServiceRepository,
};
use crate::domains::core::dependency_checker::DependencyChecker;
use crate::domains::core::repository::{
    BatchDeleteResult, DeleteResult, FindById, HardDeletable, SoftDeletable,
};
use crate::domains::permission::Permission;
use crate::errors::{DomainError, DomainResult, ServiceError, ServiceResult};
use crate::types::{PaginatedResult, PaginationParams};
use crate::validation::Validate;
use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::sync::Arc;
use uuid::Uuid;

/// Trait defining assessment service operations
#[async_trait]
pub trait AssessmentService: DeleteService<Assessment> + Send + Sync {
    async fn create_assessment(
        &self,
        new_assessment: NewAssessment,
        auth: &AuthContext,
    ) -> ServiceResult<AssessmentResponse>;

    async fn get_assessment(
        &self,
        player_id: Uuid,
        id: Uuid,
        auth: &AuthContext,
    ) -> ServiceResult<AssessmentResponse>;

    async fn get_latest_completed(
        &self,
        player_id: Uuid,
        auth: &AuthContext,
    ) -> ServiceResult<AssessmentResponse>;

    async fn list_assessments(
        &self,
        player_id: Uuid,
        params: PaginationParams,
        auth: &AuthContext,
    ) -> ServiceResult<PaginatedResult<AssessmentSummary>>;

    async fn update_assessment(
        &self,
        player_id: Uuid,
        id: Uuid,
        update_data: UpdateAssessment,
        auth: &AuthContext,
    ) -> ServiceResult<AssessmentResponse>;

    async fn delete_assessment(
        &self,
        player_id: Uuid,
        id: Uuid,
        hard_delete: bool,
        auth: &AuthContext,
    ) -> ServiceResult<DeleteResult>;

    /// Compare two of the player's assessments over one tab.
    ///
    /// The two documents are fetched as independent lookups joined before the
    /// engine runs; if either lookup fails the comparison never runs and no
    /// partial result is produced.
    async fn compare_assessments(
        &self,
        player_id: Uuid,
        earlier_id: Uuid,
        later_id: Uuid,
        tab: SkillTab,
        auth: &AuthContext,
    ) -> ServiceResult<SkillComparison>;
}

/// Implementation of the assessment service
#[derive(Clone)]
pub struct AssessmentServiceImpl {
    repo: Arc<dyn AssessmentRepository + Send + Sync>,
    delete_service: Arc<BaseDeleteService<Assessment>>,
}

impl AssessmentServiceImpl {
    pub fn new(
        pool: SqlitePool,
        assessment_repo: Arc<dyn AssessmentRepository + Send + Sync>,
        dependency_checker: Arc<dyn DependencyChecker + Send + Sync>,
    ) -> Self {
        // Local adapter struct
        struct RepoAdapter(Arc<dyn AssessmentRepository + Send + Sync>);

        #[async_trait]
        impl FindById<Assessment> for RepoAdapter {
            async fn find_by_id(&self, id: Uuid) -> DomainResult<Assessment> {
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

        let adapted_repo: Arc<dyn DeleteServiceRepository<Assessment>> =
            Arc::new(RepoAdapter(assessment_repo.clone()));

        let delete_service = Arc::new(BaseDeleteService::new(
            pool,
            adapted_repo,
            dependency_checker,
        ));

        Self {
            repo: assessment_repo,
            delete_service,
        }
    }

    /// The read-only skill catalog the editing surface offers.
    pub fn skill_catalog() -> &'static [(
        crate::domains::assessment::skills::SkillGroupId,
        &'static [&'static str],
    )] {
        SKILL_CATALOG
    }

    /// Enforce document invariants before a write: `balance_priority` only
    /// survives for all-rounders and BMI is always derived, never entered.
    fn apply_document_invariants(skills: &mut SkillSections, player_role: Option<&str>) {
        if player_role != Some("ALL_ROUNDER") {
            skills.cricket_skills.balance_priority = None;
        }
        skills.fitness.body_metrics = skills.fitness.body_metrics.with_derived_bmi();
    }
}

// Implement DeleteService<Assessment> by delegating
#[async_trait]
impl DeleteService<Assessment> for AssessmentServiceImpl {
    fn repository(&self) -> &dyn FindById<Assessment> {
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
impl AssessmentService for AssessmentServiceImpl {
    async fn create_assessment(
        &self,
        mut new_assessment: NewAssessment,
        auth: &AuthContext,
    ) -> ServiceResult<AssessmentResponse> {
        if !auth.has_permission(Permission::CreateAssessments) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to create assessments".to_string(),
            ));
        }

        new_assessment.validate()?;

        // Seed a follow-up from the most recent COMPLETED document. Having no
        // completed assessment yet is the expected miss: create unseeded.
        if new_assessment.seed_from_latest_completed {
            match self
                .repo
                .find_latest_completed(new_assessment.player_id)
                .await
            {
                Ok(parent) => {
                    if !new_assessment.skills.has_any_skill() {
                        new_assessment.skills = parent.skills.clone();
                    }
                    if new_assessment.player_role.is_none() {
                        new_assessment.player_role = parent.player_role.clone();
                    }
                    if new_assessment.age_group.is_none() {
                        new_assessment.age_group = parent.age_group.clone();
                    }
                    new_assessment.parent_assessment_id = Some(parent.id);
                }
                Err(DomainError::EntityNotFound(_, _)) => {
                    new_assessment.parent_assessment_id = None;
                }
                Err(e) => return Err(ServiceError::Domain(e)),
            }
        }

        Self::apply_document_invariants(
            &mut new_assessment.skills,
            new_assessment.player_role.as_deref(),
        );

        let created = self.repo.create(&new_assessment, auth).await?;
        Ok(AssessmentResponse::from(created))
    }

    async fn get_assessment(
        &self,
        player_id: Uuid,
        id: Uuid,
        auth: &AuthContext,
    ) -> ServiceResult<AssessmentResponse> {
        if !auth.has_permission(Permission::ViewAssessments) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to view assessments".to_string(),
            ));
        }

        let assessment = self.repo.find_by_id_for_player(player_id, id).await?;
        Ok(AssessmentResponse::from(assessment))
    }

    async fn get_latest_completed(
        &self,
        player_id: Uuid,
        auth: &AuthContext,
    ) -> ServiceResult<AssessmentResponse> {
        if !auth.has_permission(Permission::ViewAssessments) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to view assessments".to_string(),
            ));
        }

        let assessment = self.repo.find_latest_completed(player_id).await?;
        Ok(AssessmentResponse::from(assessment))
    }

    async fn list_assessments(
        &self,
        player_id: Uuid,
        params: PaginationParams,
        auth: &AuthContext,
    ) -> ServiceResult<PaginatedResult<AssessmentSummary>> {
        if !auth.has_permission(Permission::ViewAssessments) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to list assessments".to_string(),
            ));
        }

        let result = self
            .repo
            .find_summaries_for_player(player_id, params)
            .await?;
        Ok(result)
    }

    async fn update_assessment(
        &self,
        player_id: Uuid,
        id: Uuid,
        mut update_data: UpdateAssessment,
        auth: &AuthContext,
    ) -> ServiceResult<AssessmentResponse> {
        if !auth.has_permission(Permission::EditAssessments) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to edit assessments".to_string(),
            ));
        }

        update_data.updated_by_user_id = auth.user_id;
        update_data.validate()?;

        // Ensure the assessment exists and belongs to this player
        let current = self.repo.find_by_id_for_player(player_id, id).await?;

        // The role after this update decides the balance_priority invariant
        let effective_role = update_data
            .player_role
            .clone()
            .or_else(|| current.player_role.clone());
        let is_all_rounder = effective_role.as_deref() == Some("ALL_ROUNDER");

        if let Some(cricket) = &mut update_data.cricket_skills {
            if !is_all_rounder {
                cricket.balance_priority = None;
            }
        } else if !is_all_rounder && current.skills.cricket_skills.balance_priority.is_some() {
            let mut cleared = current.skills.cricket_skills.clone();
            cleared.balance_priority = None;
            update_data.cricket_skills = Some(cleared);
        }

        if let Some(fitness) = &mut update_data.fitness {
            fitness.body_metrics = fitness.body_metrics.with_derived_bmi();
        }

        let updated = self.repo.update(id, &update_data, auth).await?;
        Ok(AssessmentResponse::from(updated))
    }

    async fn delete_assessment(
        &self,
        player_id: Uuid,
        id: Uuid,
        hard_delete: bool,
        auth: &AuthContext,
    ) -> ServiceResult<DeleteResult> {
        let required_permission = if hard_delete {
            Permission::HardDeleteRecord
        } else {
            Permission::DeleteAssessments
        };

        if !auth.has_permission(required_permission) {
            return Err(ServiceError::PermissionDenied(format!(
                "User does not have permission to {} assessments",
                if hard_delete { "hard delete" } else { "delete" }
            )));
        }

        let _ = self.repo.find_by_id_for_player(player_id, id).await?;

        let options = DeleteOptions {
            allow_hard_delete: hard_delete,
            fallback_to_soft_delete: !hard_delete,
            force: false,
        };

        let result = self.delete(id, auth, options).await?;
        Ok(result)
    }

    async fn compare_assessments(
        &self,
        player_id: Uuid,
        earlier_id: Uuid,
        later_id: Uuid,
        tab: SkillTab,
        auth: &AuthContext,
    ) -> ServiceResult<SkillComparison> {
        if !auth.has_permission(Permission::ViewAssessments) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to view assessments".to_string(),
            ));
        }

        // Two independent fetches, joined. Either failure aborts the
        // comparison; there is no partial result.
        let (earlier, later) = tokio::try_join!(
            self.repo.find_by_id_for_player(player_id, earlier_id),
            self.repo.find_by_id_for_player(player_id, later_id),
        )?;

        Ok(comparison::compare(&earlier.skills, &later.skills, tab))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::assessment::repository::SqliteAssessmentRepository;
    use crate::domains::assessment::skills::{SkillEntry, SkillGroupId};
    use crate::domains::assessment::types::NewAssessment;
    use crate::domains::core::dependency_checker::SqliteDependencyChecker;
    use crate::domains::player::repository::{PlayerRepository, SqlitePlayerRepository};
    use crate::domains::player::types::NewPlayer;
    use crate::test_support::test_pool;
    use crate::types::UserRole;

    fn admin() -> AuthContext {
        AuthContext::new(Uuid::new_v4(), UserRole::Admin)
    }

    fn coach() -> AuthContext {
        AuthContext::new(Uuid::new_v4(), UserRole::Coach)
    }

    async fn service_with_player(pool: &SqlitePool) -> (AssessmentServiceImpl, Uuid) {
        let assessment_repo = Arc::new(SqliteAssessmentRepository::new(pool.clone()));
        let checker = Arc::new(SqliteDependencyChecker::new(pool.clone()));
        let service = AssessmentServiceImpl::new(pool.clone(), assessment_repo, checker);

        let player_repo = SqlitePlayerRepository::new(pool.clone());
        let player = player_repo
            .create(
                &NewPlayer {
                    name: "Rohit Sharma Jr".to_string(),
                    date_of_birth: Some("2011-09-12".to_string()),
                    gender: Some("male".to_string()),
                    player_role: Some("BATSMEN".to_string()),
                    batting_style: None,
                    bowling_style: None,
                    age_group: Some("under_14".to_string()),
                    guardian_name: None,
                    guardian_phone: None,
                    joined_date: None,
                    notes: None,
                    created_by_user_id: None,
                },
                &admin(),
            )
            .await
            .expect("player");

        (service, player.id)
    }

    fn new_assessment(player_id: Uuid, date: &str, status: &str) -> NewAssessment {
        NewAssessment {
            player_id,
            assessment_date: date.to_string(),
            assessment_type: Some("WEEKLY".to_string()),
            player_role: Some("BATSMEN".to_string()),
            age_group: Some("under_14".to_string()),
            skills: SkillSections::default(),
            overall_rating: None,
            overall_summary: None,
            status: Some(status.to_string()),
            seed_from_latest_completed: false,
            parent_assessment_id: None,
            created_by_user_id: None,
        }
    }

    #[tokio::test]
    async fn create_get_and_latest_completed_roundtrip() {
        let pool = test_pool().await;
        let (service, player_id) = service_with_player(&pool).await;
        let auth = admin();

        let draft = service
            .create_assessment(new_assessment(player_id, "2025-06-01", "DRAFT"), &auth)
            .await
            .expect("create draft");
        assert_eq!(draft.status, "DRAFT");

        // No completed assessment yet: the expected, recoverable miss
        let miss = service.get_latest_completed(player_id, &auth).await;
        assert!(matches!(
            miss,
            Err(ServiceError::Domain(DomainError::EntityNotFound(_, _)))
        ));

        let completed = service
            .create_assessment(new_assessment(player_id, "2025-06-08", "COMPLETED"), &auth)
            .await
            .expect("create completed");

        let latest = service
            .get_latest_completed(player_id, &auth)
            .await
            .expect("latest");
        assert_eq!(latest.id, completed.id);

        let listed = service
            .list_assessments(player_id, PaginationParams::default(), &auth)
            .await
            .expect("list");
        assert_eq!(listed.total, 2);

        // Lookup is player-scoped
        let stranger = Uuid::new_v4();
        let scoped = service.get_assessment(stranger, completed.id, &auth).await;
        assert!(matches!(
            scoped,
            Err(ServiceError::Domain(DomainError::EntityNotFound(_, _)))
        ));
    }

    #[tokio::test]
    async fn follow_up_seeds_from_latest_completed() {
        let pool = test_pool().await;
        let (service, player_id) = service_with_player(&pool).await;
        let auth = admin();

        let mut parent = new_assessment(player_id, "2025-06-01", "COMPLETED");
        parent.skills = SkillSections::default().with_skill(
            SkillGroupId::CricketBattingBasics,
            "Grip",
            SkillEntry::new(Some("DEVELOPING"), Some("loosen top hand")),
        );
        let parent = service
            .create_assessment(parent, &auth)
            .await
            .expect("parent");

        let mut follow_up = new_assessment(player_id, "2025-06-15", "DRAFT");
        follow_up.assessment_type = Some("FOLLOW_UP".to_string());
        follow_up.player_role = None;
        follow_up.seed_from_latest_completed = true;
        let follow_up = service
            .create_assessment(follow_up, &auth)
            .await
            .expect("follow-up");

        assert_eq!(follow_up.parent_assessment_id, Some(parent.id));
        assert_eq!(follow_up.player_role.as_deref(), Some("BATSMEN"));
        assert_eq!(
            follow_up
                .skills
                .skill(SkillGroupId::CricketBattingBasics, "Grip")
                .rating
                .as_deref(),
            Some("DEVELOPING")
        );
    }

    #[tokio::test]
    async fn balance_priority_cleared_for_non_all_rounders_and_bmi_derived() {
        let pool = test_pool().await;
        let (service, player_id) = service_with_player(&pool).await;
        let auth = admin();

        let mut doc = new_assessment(player_id, "2025-06-01", "DRAFT");
        doc.skills.cricket_skills.balance_priority = Some(true);
        doc.skills.fitness.body_metrics.height_cm = Some(180.0);
        doc.skills.fitness.body_metrics.weight_kg = Some(81.0);
        doc.skills.fitness.body_metrics.bmi = Some(99.0); // entered value is ignored

        let created = service.create_assessment(doc, &auth).await.expect("create");
        assert_eq!(created.skills.cricket_skills.balance_priority, None);
        assert_eq!(created.skills.fitness.body_metrics.bmi, Some(25.0));

        // An all-rounder keeps the flag
        let mut ar = new_assessment(player_id, "2025-06-02", "DRAFT");
        ar.player_role = Some("ALL_ROUNDER".to_string());
        ar.skills.cricket_skills.balance_priority = Some(true);
        let ar = service.create_assessment(ar, &auth).await.expect("create");
        assert_eq!(ar.skills.cricket_skills.balance_priority, Some(true));
    }

    #[tokio::test]
    async fn compare_through_the_service_and_swap_asymmetry() {
        let pool = test_pool().await;
        let (service, player_id) = service_with_player(&pool).await;
        let auth = admin();

        let mut earlier = new_assessment(player_id, "2025-06-01", "COMPLETED");
        earlier.skills = SkillSections::default().with_skill(
            SkillGroupId::CricketBattingBasics,
            "Grip",
            SkillEntry::new(Some("DEVELOPING"), None),
        );
        let earlier = service.create_assessment(earlier, &auth).await.unwrap();

        let mut later = new_assessment(player_id, "2025-06-15", "COMPLETED");
        later.skills = SkillSections::default().with_skill(
            SkillGroupId::CricketBattingBasics,
            "Grip",
            SkillEntry::new(Some("GOOD"), None),
        );
        let later = service.create_assessment(later, &auth).await.unwrap();

        let forward = service
            .compare_assessments(player_id, earlier.id, later.id, SkillTab::Cricket, &auth)
            .await
            .expect("compare");
        assert_eq!(forward.rows.len(), 1);
        assert_eq!(forward.rows[0].key, "cricket.basics.Grip");
        assert_eq!(forward.rows[0].diff, 1);
        assert_eq!(forward.improved, 1);

        let backward = service
            .compare_assessments(player_id, later.id, earlier.id, SkillTab::Cricket, &auth)
            .await
            .expect("compare swapped");
        assert_eq!(backward.rows[0].diff, -1);
        assert_eq!(backward.declined, 1);
        assert_eq!(backward.improved, 0);

        // A missing document aborts the comparison entirely
        let missing = service
            .compare_assessments(player_id, earlier.id, Uuid::new_v4(), SkillTab::Cricket, &auth)
            .await;
        assert!(missing.is_err());
    }

    #[tokio::test]
    async fn coach_cannot_delete_assessments() {
        let pool = test_pool().await;
        let (service, player_id) = service_with_player(&pool).await;

        let created = service
            .create_assessment(new_assessment(player_id, "2025-06-01", "DRAFT"), &coach())
            .await
            .expect("coach can create");

        let denied = service
            .delete_assessment(player_id, created.id, false, &coach())
            .await;
        assert!(matches!(denied, Err(ServiceError::PermissionDenied(_))));

        let allowed = service
            .delete_assessment(player_id, created.id, false, &admin())
            .await;
        assert!(allowed.is_ok());
    }
}
