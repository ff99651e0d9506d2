use crate::auth::AuthContext;
use crate::domains::camp::types::parse_decimal;
use crate::domains::core::delete_service::DeleteServiceRepository;
use crate::domains::core::repository::{FindById, HardDeletable, SoftDeletable};
use crate::domains::enrollment::types::{
    AttendanceMark, AttendanceRecord, AttendanceRow, CampEnrollment, CampPayment, EnrollmentRow,
    NewCampEnrollment, NewCampPayment, PaymentRow, UpdateCampEnrollment,
};
use crate::errors::{DbError, DomainError, DomainResult};
use crate::types::{PaginatedResult, PaginationParams};
use async_trait::async_trait;
use chrono::{Local, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteArguments;
use sqlx::{query, query_as, query_scalar, Arguments, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

/// Trait defining enrollment repository operations (enrollments, attendance,
/// payments)
#[async_trait]
pub trait EnrollmentRepository: DeleteServiceRepository<CampEnrollment> + Send + Sync {
    async fn create(
        &self,
        new_enrollment: &NewCampEnrollment,
        fee_amount: Decimal,
        auth: &AuthContext,
    ) -> DomainResult<CampEnrollment>;

    async fn update(
        &self,
        id: Uuid,
        update_data: &UpdateCampEnrollment,
        auth: &AuthContext,
    ) -> DomainResult<CampEnrollment>;

    async fn find_for_camp(
        &self,
        camp_id: Uuid,
        params: PaginationParams,
    ) -> DomainResult<PaginatedResult<CampEnrollment>>;

    async fn find_for_batch(&self, batch_id: Uuid) -> DomainResult<Vec<CampEnrollment>>;

    /// Transition the enrollment status; conversion also records the new
    /// player's id.
    async fn set_status_with_tx<'t>(
        &self,
        id: Uuid,
        status: &str,
        converted_player_id: Option<Uuid>,
        auth: &AuthContext,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<()>;

    /// Sum of non-voided payments for an enrollment
    async fn total_paid(&self, enrollment_id: Uuid) -> DomainResult<Decimal>;

    async fn record_payment(
        &self,
        new_payment: &NewCampPayment,
        payment_date: &str,
        auth: &AuthContext,
    ) -> DomainResult<CampPayment>;

    async fn list_payments(&self, enrollment_id: Uuid) -> DomainResult<Vec<CampPayment>>;

    /// Insert or replace attendance marks for a date in one transaction.
    /// One record per (enrollment, date); re-marking replaces.
    async fn upsert_attendance(
        &self,
        attendance_date: &str,
        marks: &[AttendanceMark],
        auth: &AuthContext,
    ) -> DomainResult<u64>;

    async fn find_attendance_for_batch(
        &self,
        batch_id: Uuid,
        attendance_date: &str,
    ) -> DomainResult<Vec<AttendanceRecord>>;

    async fn find_attendance_for_enrollment(
        &self,
        enrollment_id: Uuid,
    ) -> DomainResult<Vec<AttendanceRecord>>;
}

/// SQLite implementation for EnrollmentRepository
#[derive(Clone)]
pub struct SqliteEnrollmentRepository {
    pool: SqlitePool,
}

impl SqliteEnrollmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row_to_entity(row: EnrollmentRow) -> DomainResult<CampEnrollment> {
        row.into_entity()
            .map_err(|e| DomainError::Internal(format!("Failed to map row to entity: {}", e)))
    }
}

#[async_trait]
impl FindById<CampEnrollment> for SqliteEnrollmentRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<CampEnrollment> {
        let row = query_as::<_, EnrollmentRow>(
            "SELECT * FROM camp_enrollments WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| DomainError::EntityNotFound("CampEnrollment".to_string(), id))?;

        Self::map_row_to_entity(row)
    }
}

#[async_trait]
impl SoftDeletable for SqliteEnrollmentRepository {
    async fn soft_delete_with_tx(
        &self,
        id: Uuid,
        auth: &AuthContext,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<()> {
        let now_str = Utc::now().to_rfc3339();

        let result = query(
            "UPDATE camp_enrollments SET deleted_at = ?, deleted_by_user_id = ? WHERE id = ? AND deleted_at IS NULL"
        )
        .bind(now_str)
        .bind(auth.user_id.to_string())
        .bind(id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            Err(DomainError::EntityNotFound("CampEnrollment".to_string(), id))
        } else {
            Ok(())
        }
    }

    async fn soft_delete(&self, id: Uuid, auth: &AuthContext) -> DomainResult<()> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        match self.soft_delete_with_tx(id, auth, &mut tx).await {
            Ok(()) => {
                tx.commit().await.map_err(DbError::from)?;
                Ok(())
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl HardDeletable for SqliteEnrollmentRepository {
    fn entity_name(&self) -> &'static str {
        "camp_enrollments"
    }

    async fn hard_delete_with_tx(
        &self,
        id: Uuid,
        _auth: &AuthContext,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<()> {
        let id_str = id.to_string();

        // Attendance cascades with its enrollment; payments block via the
        // dependency checker before we ever get here.
        query("DELETE FROM camp_attendance WHERE enrollment_id = ?")
            .bind(&id_str)
            .execute(&mut **tx)
            .await
            .map_err(DbError::from)?;

        let result = query("DELETE FROM camp_enrollments WHERE id = ?")
            .bind(&id_str)
            .execute(&mut **tx)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            Err(DomainError::EntityNotFound("CampEnrollment".to_string(), id))
        } else {
            Ok(())
        }
    }

    async fn hard_delete(&self, id: Uuid, auth: &AuthContext) -> DomainResult<()> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        match self.hard_delete_with_tx(id, auth, &mut tx).await {
            Ok(()) => {
                tx.commit().await.map_err(DbError::from)?;
                Ok(())
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl EnrollmentRepository for SqliteEnrollmentRepository {
    async fn create(
        &self,
        new_enrollment: &NewCampEnrollment,
        fee_amount: Decimal,
        auth: &AuthContext,
    ) -> DomainResult<CampEnrollment> {
        let id = Uuid::new_v4();
        let now_str = Utc::now().to_rfc3339();
        let user_id_str = auth.user_id.to_string();
        let created_by_id_str = new_enrollment
            .created_by_user_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| user_id_str.clone());
        let enrolled_on = new_enrollment
            .enrolled_on
            .clone()
            .unwrap_or_else(|| Local::now().date_naive().format("%Y-%m-%d").to_string());
        let discount = new_enrollment.discount_amount.unwrap_or(Decimal::ZERO);

        query(
            r#"INSERT INTO camp_enrollments (
                id, camp_id, batch_id, student_name, date_of_birth, gender, age_group,
                guardian_name, guardian_phone, preferred_role,
                fee_amount, discount_amount, status, enrolled_on,
                created_at, updated_at, created_by_user_id, updated_by_user_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'ACTIVE', ?, ?, ?, ?, ?)"#,
        )
        .bind(id.to_string())
        .bind(new_enrollment.camp_id.to_string())
        .bind(new_enrollment.batch_id.map(|u| u.to_string()))
        .bind(&new_enrollment.student_name)
        .bind(&new_enrollment.date_of_birth)
        .bind(&new_enrollment.gender)
        .bind(&new_enrollment.age_group)
        .bind(&new_enrollment.guardian_name)
        .bind(&new_enrollment.guardian_phone)
        .bind(&new_enrollment.preferred_role)
        .bind(fee_amount.to_string())
        .bind(discount.to_string())
        .bind(&enrolled_on)
        .bind(&now_str)
        .bind(&now_str)
        .bind(&created_by_id_str)
        .bind(&user_id_str)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        self.find_by_id(id).await
    }

    async fn update(
        &self,
        id: Uuid,
        update_data: &UpdateCampEnrollment,
        auth: &AuthContext,
    ) -> DomainResult<CampEnrollment> {
        let _current = self.find_by_id(id).await?;

        let now_str = Utc::now().to_rfc3339();
        let user_id_str = auth.user_id.to_string();

        let mut set_clauses: Vec<String> = Vec::new();
        let mut args = SqliteArguments::default();

        macro_rules! add_update {
            ($field:ident, $value:expr) => {
                if let Some(val) = $value {
                    set_clauses.push(format!("{} = ?", stringify!($field)));
                    let _ = args.add(val);
                }
            };
        }

        if let Some(batch_id) = update_data.batch_id {
            set_clauses.push("batch_id = ?".to_string());
            let _ = args.add(batch_id.to_string());
        }
        add_update!(student_name, &update_data.student_name);
        add_update!(date_of_birth, &update_data.date_of_birth);
        add_update!(gender, &update_data.gender);
        add_update!(age_group, &update_data.age_group);
        add_update!(guardian_name, &update_data.guardian_name);
        add_update!(guardian_phone, &update_data.guardian_phone);
        add_update!(preferred_role, &update_data.preferred_role);
        if let Some(fee) = update_data.fee_amount {
            set_clauses.push("fee_amount = ?".to_string());
            let _ = args.add(fee.to_string());
        }
        if let Some(discount) = update_data.discount_amount {
            set_clauses.push("discount_amount = ?".to_string());
            let _ = args.add(discount.to_string());
        }

        if set_clauses.is_empty() {
            return self.find_by_id(id).await;
        }

        set_clauses.push("updated_at = ?".to_string());
        let _ = args.add(&now_str);
        set_clauses.push("updated_by_user_id = ?".to_string());
        let _ = args.add(&user_id_str);

        let query_str = format!(
            "UPDATE camp_enrollments SET {} WHERE id = ? AND deleted_at IS NULL",
            set_clauses.join(", ")
        );
        let _ = args.add(id.to_string());

        let result = sqlx::query_with(&query_str, args)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EntityNotFound("CampEnrollment".to_string(), id));
        }

        self.find_by_id(id).await
    }

    async fn find_for_camp(
        &self,
        camp_id: Uuid,
        params: PaginationParams,
    ) -> DomainResult<PaginatedResult<CampEnrollment>> {
        let camp_id_str = camp_id.to_string();

        let total: i64 = query_scalar(
            "SELECT COUNT(*) FROM camp_enrollments WHERE camp_id = ? AND deleted_at IS NULL",
        )
        .bind(&camp_id_str)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;

        let offset = (params.page - 1) * params.per_page;
        let rows = query_as::<_, EnrollmentRow>(
            r#"SELECT * FROM camp_enrollments
               WHERE camp_id = ? AND deleted_at IS NULL
               ORDER BY student_name COLLATE NOCASE ASC
               LIMIT ? OFFSET ?"#,
        )
        .bind(&camp_id_str)
        .bind(params.per_page as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        let enrollments = rows
            .into_iter()
            .map(Self::map_row_to_entity)
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(PaginatedResult::new(enrollments, total as u64, params))
    }

    async fn find_for_batch(&self, batch_id: Uuid) -> DomainResult<Vec<CampEnrollment>> {
        let rows = query_as::<_, EnrollmentRow>(
            r#"SELECT * FROM camp_enrollments
               WHERE batch_id = ? AND deleted_at IS NULL
               ORDER BY student_name COLLATE NOCASE ASC"#,
        )
        .bind(batch_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        rows.into_iter().map(Self::map_row_to_entity).collect()
    }

    async fn set_status_with_tx<'t>(
        &self,
        id: Uuid,
        status: &str,
        converted_player_id: Option<Uuid>,
        auth: &AuthContext,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<()> {
        let now_str = Utc::now().to_rfc3339();

        let result = query(
            r#"UPDATE camp_enrollments
               SET status = ?, converted_player_id = ?, updated_at = ?, updated_by_user_id = ?
               WHERE id = ? AND deleted_at IS NULL"#,
        )
        .bind(status)
        .bind(converted_player_id.map(|u| u.to_string()))
        .bind(&now_str)
        .bind(auth.user_id.to_string())
        .bind(id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            Err(DomainError::EntityNotFound("CampEnrollment".to_string(), id))
        } else {
            Ok(())
        }
    }

    async fn total_paid(&self, enrollment_id: Uuid) -> DomainResult<Decimal> {
        // Amounts are stored as TEXT to keep Decimal precision, so the sum is
        // computed here rather than in SQL.
        let amounts: Vec<(String,)> = query_as(
            "SELECT amount FROM camp_payments WHERE enrollment_id = ? AND deleted_at IS NULL",
        )
        .bind(enrollment_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        let mut total = Decimal::ZERO;
        for (amount,) in &amounts {
            total += parse_decimal(amount, "amount")?;
        }
        Ok(total)
    }

    async fn record_payment(
        &self,
        new_payment: &NewCampPayment,
        payment_date: &str,
        auth: &AuthContext,
    ) -> DomainResult<CampPayment> {
        let id = Uuid::new_v4();
        let now_str = Utc::now().to_rfc3339();

        query(
            r#"INSERT INTO camp_payments (
                id, enrollment_id, amount, payment_date, method, reference, notes,
                recorded_by_user_id, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(id.to_string())
        .bind(new_payment.enrollment_id.to_string())
        .bind(new_payment.amount.to_string())
        .bind(payment_date)
        .bind(&new_payment.method)
        .bind(&new_payment.reference)
        .bind(&new_payment.notes)
        .bind(auth.user_id.to_string())
        .bind(&now_str)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        let row = query_as::<_, PaymentRow>("SELECT * FROM camp_payments WHERE id = ?")
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;

        row.into_entity()
    }

    async fn list_payments(&self, enrollment_id: Uuid) -> DomainResult<Vec<CampPayment>> {
        let rows = query_as::<_, PaymentRow>(
            r#"SELECT * FROM camp_payments
               WHERE enrollment_id = ? AND deleted_at IS NULL
               ORDER BY payment_date ASC, created_at ASC"#,
        )
        .bind(enrollment_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        rows.into_iter().map(PaymentRow::into_entity).collect()
    }

    async fn upsert_attendance(
        &self,
        attendance_date: &str,
        marks: &[AttendanceMark],
        auth: &AuthContext,
    ) -> DomainResult<u64> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        let now_str = Utc::now().to_rfc3339();
        let user_id_str = auth.user_id.to_string();
        let mut written = 0u64;

        for mark in marks {
            let result = query(
                r#"INSERT INTO camp_attendance (
                    id, enrollment_id, attendance_date, present, notes,
                    marked_by_user_id, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(enrollment_id, attendance_date)
                DO UPDATE SET present = excluded.present,
                              notes = excluded.notes,
                              marked_by_user_id = excluded.marked_by_user_id,
                              updated_at = excluded.updated_at"#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(mark.enrollment_id.to_string())
            .bind(attendance_date)
            .bind(if mark.present { 1i64 } else { 0i64 })
            .bind(&mark.notes)
            .bind(&user_id_str)
            .bind(&now_str)
            .bind(&now_str)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

            written += result.rows_affected();
        }

        tx.commit().await.map_err(DbError::from)?;
        Ok(written)
    }

    async fn find_attendance_for_batch(
        &self,
        batch_id: Uuid,
        attendance_date: &str,
    ) -> DomainResult<Vec<AttendanceRecord>> {
        let rows = query_as::<_, AttendanceRow>(
            r#"SELECT a.id, a.enrollment_id, a.attendance_date, a.present, a.notes,
                      a.marked_by_user_id, a.created_at, a.updated_at
               FROM camp_attendance a
               JOIN camp_enrollments e ON e.id = a.enrollment_id
               WHERE e.batch_id = ? AND a.attendance_date = ? AND e.deleted_at IS NULL
               ORDER BY e.student_name COLLATE NOCASE ASC"#,
        )
        .bind(batch_id.to_string())
        .bind(attendance_date)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        rows.into_iter().map(AttendanceRow::into_entity).collect()
    }

    async fn find_attendance_for_enrollment(
        &self,
        enrollment_id: Uuid,
    ) -> DomainResult<Vec<AttendanceRecord>> {
        let rows = query_as::<_, AttendanceRow>(
            r#"SELECT * FROM camp_attendance
               WHERE enrollment_id = ?
               ORDER BY attendance_date ASC"#,
        )
        .bind(enrollment_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        rows.into_iter().map(AttendanceRow::into_entity).collect()
    }
}
