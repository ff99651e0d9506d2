use crate::auth::AuthContext;
use crate::domains::camp::repository::CampRepository;
use crate::domains::camp::types::CampStatus;
use crate::domains::core::delete_service::{
    BaseDeleteService, DeleteOptions, DeleteService, DeleteServiceRepository,
};
use crate::domains::core::dependency_checker::DependencyChecker;
use crate::domains::core::repository::{
    BatchDeleteResult, DeleteResult, FindById, HardDeletable, SoftDeletable,
};
use crate::domains::enrollment::repository::EnrollmentRepository;
use crate::domains::enrollment::types::{
    AttendanceRecord, BulkAttendance, CampEnrollment, CampEnrollmentResponse, CampPaymentResponse,
    EnrollmentStatus, NewCampEnrollment, NewCampPayment, UpdateCampEnrollment,
};
use crate::domains::permission::Permission;
use crate::domains::player::repository::PlayerRepository;
use crate::domains::player::types::{NewPlayer, PlayerResponse};
use crate::errors::{DbError, DomainError, DomainResult, ServiceError, ServiceResult, ValidationError};
use crate::types::{PaginatedResult, PaginationParams};
use crate::validation::{common, Validate};
use async_trait::async_trait;
use chrono::Local;
use rust_decimal::Decimal;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Trait defining enrollment service operations
#[async_trait]
pub trait EnrollmentService: DeleteService<CampEnrollment> + Send + Sync {
    async fn create_enrollment(
        &self,
        new_enrollment: NewCampEnrollment,
        auth: &AuthContext,
    ) -> ServiceResult<CampEnrollmentResponse>;

    async fn get_enrollment_by_id(
        &self,
        id: Uuid,
        auth: &AuthContext,
    ) -> ServiceResult<CampEnrollmentResponse>;

    async fn list_enrollments(
        &self,
        camp_id: Uuid,
        params: PaginationParams,
        auth: &AuthContext,
    ) -> ServiceResult<PaginatedResult<CampEnrollmentResponse>>;

    async fn update_enrollment(
        &self,
        id: Uuid,
        update_data: UpdateCampEnrollment,
        auth: &AuthContext,
    ) -> ServiceResult<CampEnrollmentResponse>;

    /// Cancel an active enrollment. Recorded payments stand.
    async fn cancel_enrollment(
        &self,
        id: Uuid,
        auth: &AuthContext,
    ) -> ServiceResult<CampEnrollmentResponse>;

    async fn delete_enrollment(
        &self,
        id: Uuid,
        hard_delete: bool,
        auth: &AuthContext,
    ) -> ServiceResult<DeleteResult>;

    /// Record a payment against an enrollment. The amount may not exceed the
    /// outstanding balance.
    async fn record_payment(
        &self,
        new_payment: NewCampPayment,
        auth: &AuthContext,
    ) -> ServiceResult<CampPaymentResponse>;

    async fn list_payments(
        &self,
        enrollment_id: Uuid,
        auth: &AuthContext,
    ) -> ServiceResult<Vec<CampPaymentResponse>>;

    /// Record attendance for a whole batch on one date; marks upsert per
    /// (enrollment, date).
    async fn record_attendance(
        &self,
        bulk: BulkAttendance,
        auth: &AuthContext,
    ) -> ServiceResult<u64>;

    async fn get_batch_attendance(
        &self,
        batch_id: Uuid,
        attendance_date: String,
        auth: &AuthContext,
    ) -> ServiceResult<Vec<AttendanceRecord>>;

    /// Convert a camp student into a regular program player. Transactional:
    /// creates the player and marks the enrollment CONVERTED in one commit.
    async fn convert_to_player(
        &self,
        enrollment_id: Uuid,
        auth: &AuthContext,
    ) -> ServiceResult<PlayerResponse>;
}

/// Implementation of the enrollment service
#[derive(Clone)]
pub struct EnrollmentServiceImpl {
    pool: SqlitePool,
    repo: Arc<dyn EnrollmentRepository + Send + Sync>,
    camp_repo: Arc<dyn CampRepository + Send + Sync>,
    player_repo: Arc<dyn PlayerRepository + Send + Sync>,
    delete_service: Arc<BaseDeleteService<CampEnrollment>>,
}

impl EnrollmentServiceImpl {
    pub fn new(
        pool: SqlitePool,
        enrollment_repo: Arc<dyn EnrollmentRepository + Send + Sync>,
        camp_repo: Arc<dyn CampRepository + Send + Sync>,
        player_repo: Arc<dyn PlayerRepository + Send + Sync>,
        dependency_checker: Arc<dyn DependencyChecker + Send + Sync>,
    ) -> Self {
        struct RepoAdapter(Arc<dyn EnrollmentRepository + Send + Sync>);

        #[async_trait]
        impl FindById<CampEnrollment> for RepoAdapter {
            async fn find_by_id(&self, id: Uuid) -> DomainResult<CampEnrollment> {
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

        let adapted_repo: Arc<dyn DeleteServiceRepository<CampEnrollment>> =
            Arc::new(RepoAdapter(enrollment_repo.clone()));

        let delete_service = Arc::new(BaseDeleteService::new(
            pool.clone(),
            adapted_repo,
            dependency_checker,
        ));

        Self {
            pool,
            repo: enrollment_repo,
            camp_repo,
            player_repo,
            delete_service,
        }
    }

    async fn enrich(&self, enrollment: CampEnrollment) -> ServiceResult<CampEnrollmentResponse> {
        let total_paid = self.repo.total_paid(enrollment.id).await?;
        Ok(CampEnrollmentResponse::from_entity(enrollment, total_paid))
    }
}

// Implement DeleteService<CampEnrollment> by delegating
#[async_trait]
impl DeleteService<CampEnrollment> for EnrollmentServiceImpl {
    fn repository(&self) -> &dyn FindById<CampEnrollment> {
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
impl EnrollmentService for EnrollmentServiceImpl {
    async fn create_enrollment(
        &self,
        new_enrollment: NewCampEnrollment,
        auth: &AuthContext,
    ) -> ServiceResult<CampEnrollmentResponse> {
        if !auth.has_permission(Permission::CreateEnrollments) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to create enrollments".to_string(),
            ));
        }

        new_enrollment.validate()?;

        let camp = self.camp_repo.find_by_id(new_enrollment.camp_id).await?;
        match camp.parsed_status() {
            Some(status) if status.accepts_enrollments() => {}
            _ => {
                return Err(ServiceError::Domain(DomainError::Validation(
                    ValidationError::invalid_value(
                        "camp_id",
                        "camp is not accepting enrollments",
                    ),
                )))
            }
        }

        // Capacity checks are a convenience guard, rechecked here inside the
        // service rather than trusted from the client.
        if let Some(capacity) = camp.capacity {
            let current = self.camp_repo.count_enrollments(camp.id).await?;
            if current >= capacity {
                return Err(ServiceError::Domain(DomainError::Validation(
                    ValidationError::invalid_value("camp_id", "camp is full"),
                )));
            }
        }

        if let Some(batch_id) = new_enrollment.batch_id {
            let batch = self.camp_repo.find_batch_by_id(batch_id).await?;
            if batch.camp_id != camp.id {
                return Err(ServiceError::Domain(DomainError::Validation(
                    ValidationError::relationship("batch does not belong to this camp"),
                )));
            }
            if let Some(capacity) = batch.capacity {
                let current = self.camp_repo.count_batch_enrollments(batch_id).await?;
                if current >= capacity {
                    return Err(ServiceError::Domain(DomainError::Validation(
                        ValidationError::invalid_value("batch_id", "batch is full"),
                    )));
                }
            }
        }

        let fee_amount = new_enrollment.fee_amount.unwrap_or(camp.base_fee);
        let discount = new_enrollment.discount_amount.unwrap_or(Decimal::ZERO);
        if discount > fee_amount {
            return Err(ServiceError::Domain(DomainError::Validation(
                ValidationError::invalid_value(
                    "discount_amount",
                    "cannot exceed the fee amount",
                ),
            )));
        }

        let created = self.repo.create(&new_enrollment, fee_amount, auth).await?;
        self.enrich(created).await
    }

    async fn get_enrollment_by_id(
        &self,
        id: Uuid,
        auth: &AuthContext,
    ) -> ServiceResult<CampEnrollmentResponse> {
        if !auth.has_permission(Permission::ViewEnrollments) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to view enrollments".to_string(),
            ));
        }

        let enrollment = self.repo.find_by_id(id).await?;
        self.enrich(enrollment).await
    }

    async fn list_enrollments(
        &self,
        camp_id: Uuid,
        params: PaginationParams,
        auth: &AuthContext,
    ) -> ServiceResult<PaginatedResult<CampEnrollmentResponse>> {
        if !auth.has_permission(Permission::ViewEnrollments) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to list enrollments".to_string(),
            ));
        }

        let result = self.repo.find_for_camp(camp_id, params).await?;
        let mut items = Vec::with_capacity(result.items.len());
        for enrollment in result.items {
            items.push(self.enrich(enrollment).await?);
        }

        Ok(PaginatedResult::new(items, result.total, params))
    }

    async fn update_enrollment(
        &self,
        id: Uuid,
        mut update_data: UpdateCampEnrollment,
        auth: &AuthContext,
    ) -> ServiceResult<CampEnrollmentResponse> {
        if !auth.has_permission(Permission::EditEnrollments) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to edit enrollments".to_string(),
            ));
        }

        update_data.updated_by_user_id = auth.user_id;
        update_data.validate()?;

        let current = self.repo.find_by_id(id).await?;

        // Moving to another batch: same camp, spare capacity
        if let Some(batch_id) = update_data.batch_id {
            let batch = self.camp_repo.find_batch_by_id(batch_id).await?;
            if batch.camp_id != current.camp_id {
                return Err(ServiceError::Domain(DomainError::Validation(
                    ValidationError::relationship("batch does not belong to this camp"),
                )));
            }
            if current.batch_id != Some(batch_id) {
                if let Some(capacity) = batch.capacity {
                    let occupied = self.camp_repo.count_batch_enrollments(batch_id).await?;
                    if occupied >= capacity {
                        return Err(ServiceError::Domain(DomainError::Validation(
                            ValidationError::invalid_value("batch_id", "batch is full"),
                        )));
                    }
                }
            }
        }

        let updated = self.repo.update(id, &update_data, auth).await?;
        self.enrich(updated).await
    }

    async fn cancel_enrollment(
        &self,
        id: Uuid,
        auth: &AuthContext,
    ) -> ServiceResult<CampEnrollmentResponse> {
        if !auth.has_permission(Permission::EditEnrollments) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to edit enrollments".to_string(),
            ));
        }

        let enrollment = self.repo.find_by_id(id).await?;
        if !enrollment.is_active() {
            return Err(ServiceError::Domain(DomainError::Validation(
                ValidationError::invalid_value("status", "only active enrollments can be cancelled"),
            )));
        }

        let mut tx = self.pool.begin().await.map_err(DbError::from).map_err(DomainError::from)?;
        let result = self
            .repo
            .set_status_with_tx(id, EnrollmentStatus::Cancelled.as_str(), None, auth, &mut tx)
            .await;
        match result {
            Ok(()) => {
                tx.commit()
                    .await
                    .map_err(DbError::from)
                    .map_err(DomainError::from)?;
            }
            Err(e) => {
                let _ = tx.rollback().await;
                return Err(ServiceError::Domain(e));
            }
        }

        let cancelled = self.repo.find_by_id(id).await?;
        self.enrich(cancelled).await
    }

    async fn delete_enrollment(
        &self,
        id: Uuid,
        hard_delete: bool,
        auth: &AuthContext,
    ) -> ServiceResult<DeleteResult> {
        let required_permission = if hard_delete {
            Permission::HardDeleteRecord
        } else {
            Permission::DeleteEnrollments
        };

        if !auth.has_permission(required_permission) {
            return Err(ServiceError::PermissionDenied(format!(
                "User does not have permission to {} enrollments",
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

    async fn record_payment(
        &self,
        new_payment: NewCampPayment,
        auth: &AuthContext,
    ) -> ServiceResult<CampPaymentResponse> {
        if !auth.has_permission(Permission::RecordPayments) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to record payments".to_string(),
            ));
        }

        new_payment.validate()?;

        let enrollment = self.repo.find_by_id(new_payment.enrollment_id).await?;
        if enrollment.parsed_status() == Some(EnrollmentStatus::Cancelled) {
            return Err(ServiceError::Domain(DomainError::Validation(
                ValidationError::invalid_value(
                    "enrollment_id",
                    "cannot record payments against a cancelled enrollment",
                ),
            )));
        }

        let total_paid = self.repo.total_paid(enrollment.id).await?;
        let balance = enrollment.net_fee() - total_paid;
        if new_payment.amount > balance {
            return Err(ServiceError::Domain(DomainError::Validation(
                ValidationError::invalid_value(
                    "amount",
                    &format!("exceeds the outstanding balance of {}", balance),
                ),
            )));
        }

        let payment_date = new_payment
            .payment_date
            .clone()
            .unwrap_or_else(|| Local::now().date_naive().format("%Y-%m-%d").to_string());

        let payment = self
            .repo
            .record_payment(&new_payment, &payment_date, auth)
            .await?;
        Ok(CampPaymentResponse::from(payment))
    }

    async fn list_payments(
        &self,
        enrollment_id: Uuid,
        auth: &AuthContext,
    ) -> ServiceResult<Vec<CampPaymentResponse>> {
        if !auth.has_permission(Permission::ViewEnrollments) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to view enrollments".to_string(),
            ));
        }

        let _ = self.repo.find_by_id(enrollment_id).await?;
        let payments = self.repo.list_payments(enrollment_id).await?;
        Ok(payments.into_iter().map(CampPaymentResponse::from).collect())
    }

    async fn record_attendance(
        &self,
        bulk: BulkAttendance,
        auth: &AuthContext,
    ) -> ServiceResult<u64> {
        if !auth.has_permission(Permission::RecordAttendance) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to record attendance".to_string(),
            ));
        }

        bulk.validate()?;

        // Every mark must belong to the batch being submitted
        let batch_enrollments = self.repo.find_for_batch(bulk.batch_id).await?;
        let known: HashSet<Uuid> = batch_enrollments.iter().map(|e| e.id).collect();
        for mark in &bulk.marks {
            if !known.contains(&mark.enrollment_id) {
                return Err(ServiceError::Domain(DomainError::Validation(
                    ValidationError::relationship(&format!(
                        "enrollment {} is not part of this batch",
                        mark.enrollment_id
                    )),
                )));
            }
        }

        let written = self
            .repo
            .upsert_attendance(&bulk.attendance_date, &bulk.marks, auth)
            .await?;
        Ok(written)
    }

    async fn get_batch_attendance(
        &self,
        batch_id: Uuid,
        attendance_date: String,
        auth: &AuthContext,
    ) -> ServiceResult<Vec<AttendanceRecord>> {
        if !auth.has_permission(Permission::ViewEnrollments) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to view enrollments".to_string(),
            ));
        }

        common::validate_date_format(&attendance_date, "attendance_date")?;

        let records = self
            .repo
            .find_attendance_for_batch(batch_id, &attendance_date)
            .await?;
        Ok(records)
    }

    async fn convert_to_player(
        &self,
        enrollment_id: Uuid,
        auth: &AuthContext,
    ) -> ServiceResult<PlayerResponse> {
        if !auth.has_permission(Permission::ConvertCampStudents) {
            return Err(ServiceError::PermissionDenied(
                "User does not have permission to convert camp students".to_string(),
            ));
        }

        let enrollment = self.repo.find_by_id(enrollment_id).await?;
        match enrollment.parsed_status() {
            Some(EnrollmentStatus::Active) => {}
            Some(EnrollmentStatus::Converted) => {
                return Err(ServiceError::Domain(DomainError::Validation(
                    ValidationError::invalid_value("status", "enrollment is already converted"),
                )))
            }
            _ => {
                return Err(ServiceError::Domain(DomainError::Validation(
                    ValidationError::invalid_value(
                        "status",
                        "only active enrollments can be converted",
                    ),
                )))
            }
        }

        let new_player = NewPlayer {
            name: enrollment.student_name.clone(),
            date_of_birth: enrollment.date_of_birth.clone(),
            gender: enrollment.gender.clone(),
            player_role: enrollment.preferred_role.clone(),
            batting_style: None,
            bowling_style: None,
            age_group: enrollment.age_group.clone(),
            guardian_name: enrollment.guardian_name.clone(),
            guardian_phone: enrollment.guardian_phone.clone(),
            joined_date: Some(Local::now().date_naive().format("%Y-%m-%d").to_string()),
            notes: Some(format!(
                "Converted from camp enrollment {}",
                enrollment.id
            )),
            created_by_user_id: Some(auth.user_id),
        };
        new_player.validate()?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(DbError::from)
            .map_err(DomainError::from)?;

        let player = match self.player_repo.create_with_tx(&new_player, auth, &mut tx).await {
            Ok(player) => player,
            Err(e) => {
                let _ = tx.rollback().await;
                return Err(ServiceError::Domain(e));
            }
        };

        if let Err(e) = self
            .repo
            .set_status_with_tx(
                enrollment.id,
                EnrollmentStatus::Converted.as_str(),
                Some(player.id),
                auth,
                &mut tx,
            )
            .await
        {
            let _ = tx.rollback().await;
            return Err(ServiceError::Domain(e));
        }

        tx.commit()
            .await
            .map_err(DbError::from)
            .map_err(DomainError::from)?;

        println!(
            "✅ [ENROLLMENT_SERVICE] Converted enrollment {} into player {}",
            enrollment.id, player.id
        );

        Ok(PlayerResponse::from(player))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::camp::repository::SqliteCampRepository;
    use crate::domains::camp::types::NewCamp;
    use crate::domains::core::dependency_checker::SqliteDependencyChecker;
    use crate::domains::enrollment::repository::SqliteEnrollmentRepository;
    use crate::domains::enrollment::types::AttendanceMark;
    use crate::domains::player::repository::SqlitePlayerRepository;
    use crate::test_support::test_pool;
    use crate::types::UserRole;
    use rust_decimal_macros::dec;

    fn admin() -> AuthContext {
        AuthContext::new(Uuid::new_v4(), UserRole::Admin)
    }

    struct Fixture {
        service: EnrollmentServiceImpl,
        camp_repo: Arc<SqliteCampRepository>,
        camp_id: Uuid,
    }

    async fn fixture(pool: &SqlitePool, camp_status: &str) -> Fixture {
        let enrollment_repo = Arc::new(SqliteEnrollmentRepository::new(pool.clone()));
        let camp_repo = Arc::new(SqliteCampRepository::new(pool.clone()));
        let player_repo = Arc::new(SqlitePlayerRepository::new(pool.clone()));
        let checker = Arc::new(SqliteDependencyChecker::new(pool.clone()));

        let service = EnrollmentServiceImpl::new(
            pool.clone(),
            enrollment_repo,
            camp_repo.clone(),
            player_repo,
            checker,
        );

        let camp = camp_repo
            .create(
                &NewCamp {
                    name: "Summer Camp 2025".to_string(),
                    season: Some("Summer 2025".to_string()),
                    start_date: "2025-05-01".to_string(),
                    end_date: "2025-06-15".to_string(),
                    location: None,
                    description: None,
                    base_fee: dec!(4500),
                    capacity: Some(50),
                    status: Some(camp_status.to_string()),
                    created_by_user_id: None,
                },
                &admin(),
            )
            .await
            .expect("camp");

        Fixture {
            service,
            camp_repo,
            camp_id: camp.id,
        }
    }

    fn new_enrollment(camp_id: Uuid, name: &str) -> NewCampEnrollment {
        NewCampEnrollment {
            camp_id,
            batch_id: None,
            student_name: name.to_string(),
            date_of_birth: Some("2013-01-20".to_string()),
            gender: Some("female".to_string()),
            age_group: Some("under_12".to_string()),
            guardian_name: Some("S. Rao".to_string()),
            guardian_phone: Some("9876501234".to_string()),
            preferred_role: Some("BOWLER".to_string()),
            fee_amount: None,
            discount_amount: None,
            enrolled_on: Some("2025-05-02".to_string()),
            created_by_user_id: None,
        }
    }

    #[tokio::test]
    async fn enrollment_defaults_fee_from_camp_and_tracks_balance() {
        let pool = test_pool().await;
        let fx = fixture(&pool, "OPEN").await;
        let auth = admin();

        let enrollment = fx
            .service
            .create_enrollment(new_enrollment(fx.camp_id, "Anika Rao"), &auth)
            .await
            .expect("enroll");

        assert_eq!(enrollment.fee_amount, dec!(4500));
        assert_eq!(enrollment.total_paid, Decimal::ZERO);
        assert_eq!(enrollment.balance, dec!(4500));

        let payment = fx
            .service
            .record_payment(
                NewCampPayment {
                    enrollment_id: enrollment.id,
                    amount: dec!(1500),
                    payment_date: Some("2025-05-03".to_string()),
                    method: "UPI".to_string(),
                    reference: Some("TXN-001".to_string()),
                    notes: None,
                },
                &auth,
            )
            .await
            .expect("payment");
        assert_eq!(payment.amount, dec!(1500));

        let refreshed = fx
            .service
            .get_enrollment_by_id(enrollment.id, &auth)
            .await
            .expect("get");
        assert_eq!(refreshed.total_paid, dec!(1500));
        assert_eq!(refreshed.balance, dec!(3000));

        // Exceeding the outstanding balance is rejected
        let over = fx
            .service
            .record_payment(
                NewCampPayment {
                    enrollment_id: enrollment.id,
                    amount: dec!(3001),
                    payment_date: None,
                    method: "CASH".to_string(),
                    reference: None,
                    notes: None,
                },
                &auth,
            )
            .await;
        assert!(matches!(
            over,
            Err(ServiceError::Domain(DomainError::Validation(_)))
        ));

        // Settling exactly the balance is fine
        let settle = fx
            .service
            .record_payment(
                NewCampPayment {
                    enrollment_id: enrollment.id,
                    amount: dec!(3000),
                    payment_date: None,
                    method: "CASH".to_string(),
                    reference: None,
                    notes: None,
                },
                &auth,
            )
            .await;
        assert!(settle.is_ok());
    }

    #[tokio::test]
    async fn camps_not_open_reject_enrollments() {
        let pool = test_pool().await;
        let fx = fixture(&pool, "PLANNED").await;

        let rejected = fx
            .service
            .create_enrollment(new_enrollment(fx.camp_id, "Anika Rao"), &admin())
            .await;
        assert!(matches!(
            rejected,
            Err(ServiceError::Domain(DomainError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn attendance_bulk_marks_upsert_per_date() {
        let pool = test_pool().await;
        let fx = fixture(&pool, "OPEN").await;
        let auth = admin();

        let batch = fx
            .camp_repo
            .create_batch(
                &crate::domains::camp::types::NewCampBatch {
                    camp_id: fx.camp_id,
                    name: "Morning Batch".to_string(),
                    schedule_days: Some("mon,wed,fri".to_string()),
                    start_time: Some("06:30".to_string()),
                    end_time: Some("08:30".to_string()),
                    capacity: Some(25),
                    coach_name: None,
                    created_by_user_id: None,
                },
                &auth,
            )
            .await
            .expect("batch");

        let mut enrollment = new_enrollment(fx.camp_id, "Anika Rao");
        enrollment.batch_id = Some(batch.id);
        let enrollment = fx
            .service
            .create_enrollment(enrollment, &auth)
            .await
            .expect("enroll");

        let submit = |present: bool| BulkAttendance {
            batch_id: batch.id,
            attendance_date: "2025-05-05".to_string(),
            marks: vec![AttendanceMark {
                enrollment_id: enrollment.id,
                present,
                notes: None,
            }],
        };

        fx.service
            .record_attendance(submit(true), &auth)
            .await
            .expect("first mark");
        // Re-marking the same date replaces, not duplicates
        fx.service
            .record_attendance(submit(false), &auth)
            .await
            .expect("re-mark");

        let records = fx
            .service
            .get_batch_attendance(batch.id, "2025-05-05".to_string(), &auth)
            .await
            .expect("read back");
        assert_eq!(records.len(), 1);
        assert!(!records[0].present);

        // Marks for students outside the batch are rejected
        let foreign = BulkAttendance {
            batch_id: batch.id,
            attendance_date: "2025-05-05".to_string(),
            marks: vec![AttendanceMark {
                enrollment_id: Uuid::new_v4(),
                present: true,
                notes: None,
            }],
        };
        assert!(fx.service.record_attendance(foreign, &auth).await.is_err());
    }

    #[tokio::test]
    async fn conversion_creates_player_and_finalizes_enrollment() {
        let pool = test_pool().await;
        let fx = fixture(&pool, "OPEN").await;
        let auth = admin();

        let enrollment = fx
            .service
            .create_enrollment(new_enrollment(fx.camp_id, "Anika Rao"), &auth)
            .await
            .expect("enroll");

        let player = fx
            .service
            .convert_to_player(enrollment.id, &auth)
            .await
            .expect("convert");
        assert_eq!(player.name, "Anika Rao");
        assert_eq!(player.player_role.as_deref(), Some("BOWLER"));

        let converted = fx
            .service
            .get_enrollment_by_id(enrollment.id, &auth)
            .await
            .expect("get");
        assert_eq!(converted.status, "CONVERTED");
        assert_eq!(converted.converted_player_id, Some(player.id));

        // A second conversion attempt fails
        let again = fx.service.convert_to_player(enrollment.id, &auth).await;
        assert!(matches!(
            again,
            Err(ServiceError::Domain(DomainError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn cancelled_enrollments_take_no_payments() {
        let pool = test_pool().await;
        let fx = fixture(&pool, "OPEN").await;
        let auth = admin();

        let enrollment = fx
            .service
            .create_enrollment(new_enrollment(fx.camp_id, "Anika Rao"), &auth)
            .await
            .expect("enroll");

        let cancelled = fx
            .service
            .cancel_enrollment(enrollment.id, &auth)
            .await
            .expect("cancel");
        assert_eq!(cancelled.status, "CANCELLED");

        let rejected = fx
            .service
            .record_payment(
                NewCampPayment {
                    enrollment_id: enrollment.id,
                    amount: dec!(100),
                    payment_date: None,
                    method: "CASH".to_string(),
                    reference: None,
                    notes: None,
                },
                &auth,
            )
            .await;
        assert!(matches!(
            rejected,
            Err(ServiceError::Domain(DomainError::Validation(_)))
        ));
    }
}
