use crate::auth::AuthContext;
use crate::domains::camp::types::{
    Camp, CampBatch, CampBatchRow, CampRow, NewCamp, NewCampBatch, UpdateCamp, UpdateCampBatch,
};
use crate::domains::core::delete_service::DeleteServiceRepository;
use crate::domains::core::repository::{FindById, HardDeletable, SoftDeletable};
use crate::errors::{DbError, DomainError, DomainResult};
use crate::types::{PaginatedResult, PaginationParams};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteArguments;
use sqlx::{query, query_as, query_scalar, Arguments, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

/// Trait defining camp repository operations (camps and their batches)
#[async_trait]
pub trait CampRepository: DeleteServiceRepository<Camp> + Send + Sync {
    async fn create(&self, new_camp: &NewCamp, auth: &AuthContext) -> DomainResult<Camp>;

    async fn update(
        &self,
        id: Uuid,
        update_data: &UpdateCamp,
        auth: &AuthContext,
    ) -> DomainResult<Camp>;

    async fn find_all(&self, params: PaginationParams) -> DomainResult<PaginatedResult<Camp>>;

    async fn find_by_status(
        &self,
        status: &str,
        params: PaginationParams,
    ) -> DomainResult<PaginatedResult<Camp>>;

    async fn count_enrollments(&self, camp_id: Uuid) -> DomainResult<i64>;

    // Batch operations
    async fn create_batch(
        &self,
        new_batch: &NewCampBatch,
        auth: &AuthContext,
    ) -> DomainResult<CampBatch>;

    async fn update_batch(
        &self,
        batch_id: Uuid,
        update_data: &UpdateCampBatch,
        auth: &AuthContext,
    ) -> DomainResult<CampBatch>;

    async fn find_batch_by_id(&self, batch_id: Uuid) -> DomainResult<CampBatch>;

    async fn find_batches_for_camp(&self, camp_id: Uuid) -> DomainResult<Vec<CampBatch>>;

    async fn soft_delete_batch(&self, batch_id: Uuid, auth: &AuthContext) -> DomainResult<()>;

    /// Active (non-cancelled, non-deleted) enrollments assigned to a batch
    async fn count_batch_enrollments(&self, batch_id: Uuid) -> DomainResult<i64>;
}

/// SQLite implementation for CampRepository
#[derive(Clone)]
pub struct SqliteCampRepository {
    pool: SqlitePool,
}

impl SqliteCampRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row_to_entity(row: CampRow) -> DomainResult<Camp> {
        row.into_entity()
            .map_err(|e| DomainError::Internal(format!("Failed to map row to entity: {}", e)))
    }

    fn map_batch_row(row: CampBatchRow) -> DomainResult<CampBatch> {
        row.into_entity()
            .map_err(|e| DomainError::Internal(format!("Failed to map row to entity: {}", e)))
    }

    async fn paginate_camps(
        &self,
        where_clause: &str,
        binds: &[String],
        params: PaginationParams,
    ) -> DomainResult<PaginatedResult<Camp>> {
        let count_query = format!("SELECT COUNT(*) FROM camps WHERE {}", where_clause);
        let mut count_q = query_scalar::<_, i64>(&count_query);
        for bind in binds {
            count_q = count_q.bind(bind);
        }
        let total = count_q.fetch_one(&self.pool).await.map_err(DbError::from)?;

        let offset = (params.page - 1) * params.per_page;
        let select_query = format!(
            "SELECT * FROM camps WHERE {} ORDER BY start_date DESC LIMIT ? OFFSET ?",
            where_clause
        );
        let mut select_q = query_as::<_, CampRow>(&select_query);
        for bind in binds {
            select_q = select_q.bind(bind);
        }
        let rows = select_q
            .bind(params.per_page as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        let camps = rows
            .into_iter()
            .map(Self::map_row_to_entity)
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(PaginatedResult::new(camps, total as u64, params))
    }
}

#[async_trait]
impl FindById<Camp> for SqliteCampRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Camp> {
        let row = query_as::<_, CampRow>("SELECT * FROM camps WHERE id = ? AND deleted_at IS NULL")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::EntityNotFound("Camp".to_string(), id))?;

        Self::map_row_to_entity(row)
    }
}

#[async_trait]
impl SoftDeletable for SqliteCampRepository {
    async fn soft_delete_with_tx(
        &self,
        id: Uuid,
        auth: &AuthContext,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<()> {
        let now_str = Utc::now().to_rfc3339();

        let result = query(
            "UPDATE camps SET deleted_at = ?, deleted_by_user_id = ? WHERE id = ? AND deleted_at IS NULL"
        )
        .bind(now_str)
        .bind(auth.user_id.to_string())
        .bind(id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            Err(DomainError::EntityNotFound("Camp".to_string(), id))
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
impl HardDeletable for SqliteCampRepository {
    fn entity_name(&self) -> &'static str {
        "camps"
    }

    async fn hard_delete_with_tx(
        &self,
        id: Uuid,
        _auth: &AuthContext,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<()> {
        let result = query("DELETE FROM camps WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut **tx)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            Err(DomainError::EntityNotFound("Camp".to_string(), id))
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
impl CampRepository for SqliteCampRepository {
    async fn create(&self, new_camp: &NewCamp, auth: &AuthContext) -> DomainResult<Camp> {
        let id = Uuid::new_v4();
        let now_str = Utc::now().to_rfc3339();
        let user_id_str = auth.user_id.to_string();
        let created_by_id_str = new_camp
            .created_by_user_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| user_id_str.clone());

        query(
            r#"INSERT INTO camps (
                id, name, season, start_date, end_date, location, description,
                base_fee, capacity, status,
                created_at, updated_at, created_by_user_id, updated_by_user_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(id.to_string())
        .bind(&new_camp.name)
        .bind(&new_camp.season)
        .bind(&new_camp.start_date)
        .bind(&new_camp.end_date)
        .bind(&new_camp.location)
        .bind(&new_camp.description)
        .bind(new_camp.base_fee.to_string())
        .bind(new_camp.capacity)
        .bind(new_camp.status.as_deref().unwrap_or("PLANNED"))
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
        update_data: &UpdateCamp,
        auth: &AuthContext,
    ) -> DomainResult<Camp> {
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

        add_update!(name, &update_data.name);
        add_update!(season, &update_data.season);
        add_update!(start_date, &update_data.start_date);
        add_update!(end_date, &update_data.end_date);
        add_update!(location, &update_data.location);
        add_update!(description, &update_data.description);
        if let Some(base_fee) = update_data.base_fee {
            set_clauses.push("base_fee = ?".to_string());
            let _ = args.add(base_fee.to_string());
        }
        if let Some(capacity) = update_data.capacity {
            set_clauses.push("capacity = ?".to_string());
            let _ = args.add(capacity);
        }
        add_update!(status, &update_data.status);

        if set_clauses.is_empty() {
            return self.find_by_id(id).await;
        }

        set_clauses.push("updated_at = ?".to_string());
        let _ = args.add(&now_str);
        set_clauses.push("updated_by_user_id = ?".to_string());
        let _ = args.add(&user_id_str);

        let query_str = format!(
            "UPDATE camps SET {} WHERE id = ? AND deleted_at IS NULL",
            set_clauses.join(", ")
        );
        let _ = args.add(id.to_string());

        let result = sqlx::query_with(&query_str, args)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EntityNotFound("Camp".to_string(), id));
        }

        self.find_by_id(id).await
    }

    async fn find_all(&self, params: PaginationParams) -> DomainResult<PaginatedResult<Camp>> {
        self.paginate_camps("deleted_at IS NULL", &[], params).await
    }

    async fn find_by_status(
        &self,
        status: &str,
        params: PaginationParams,
    ) -> DomainResult<PaginatedResult<Camp>> {
        self.paginate_camps(
            "deleted_at IS NULL AND status = ?",
            &[status.to_string()],
            params,
        )
        .await
    }

    async fn count_enrollments(&self, camp_id: Uuid) -> DomainResult<i64> {
        let count: i64 = query_scalar(
            r#"SELECT COUNT(*) FROM camp_enrollments
               WHERE camp_id = ? AND status = 'ACTIVE' AND deleted_at IS NULL"#,
        )
        .bind(camp_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(count)
    }

    async fn create_batch(
        &self,
        new_batch: &NewCampBatch,
        auth: &AuthContext,
    ) -> DomainResult<CampBatch> {
        let id = Uuid::new_v4();
        let now_str = Utc::now().to_rfc3339();
        let user_id_str = auth.user_id.to_string();
        let created_by_id_str = new_batch
            .created_by_user_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| user_id_str.clone());

        query(
            r#"INSERT INTO camp_batches (
                id, camp_id, name, schedule_days, start_time, end_time, capacity, coach_name,
                created_at, updated_at, created_by_user_id, updated_by_user_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(id.to_string())
        .bind(new_batch.camp_id.to_string())
        .bind(&new_batch.name)
        .bind(&new_batch.schedule_days)
        .bind(&new_batch.start_time)
        .bind(&new_batch.end_time)
        .bind(new_batch.capacity)
        .bind(&new_batch.coach_name)
        .bind(&now_str)
        .bind(&now_str)
        .bind(&created_by_id_str)
        .bind(&user_id_str)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        self.find_batch_by_id(id).await
    }

    async fn update_batch(
        &self,
        batch_id: Uuid,
        update_data: &UpdateCampBatch,
        auth: &AuthContext,
    ) -> DomainResult<CampBatch> {
        let _current = self.find_batch_by_id(batch_id).await?;

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

        add_update!(name, &update_data.name);
        add_update!(schedule_days, &update_data.schedule_days);
        add_update!(start_time, &update_data.start_time);
        add_update!(end_time, &update_data.end_time);
        if let Some(capacity) = update_data.capacity {
            set_clauses.push("capacity = ?".to_string());
            let _ = args.add(capacity);
        }
        add_update!(coach_name, &update_data.coach_name);

        if set_clauses.is_empty() {
            return self.find_batch_by_id(batch_id).await;
        }

        set_clauses.push("updated_at = ?".to_string());
        let _ = args.add(&now_str);
        set_clauses.push("updated_by_user_id = ?".to_string());
        let _ = args.add(&user_id_str);

        let query_str = format!(
            "UPDATE camp_batches SET {} WHERE id = ? AND deleted_at IS NULL",
            set_clauses.join(", ")
        );
        let _ = args.add(batch_id.to_string());

        let result = sqlx::query_with(&query_str, args)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EntityNotFound("CampBatch".to_string(), batch_id));
        }

        self.find_batch_by_id(batch_id).await
    }

    async fn find_batch_by_id(&self, batch_id: Uuid) -> DomainResult<CampBatch> {
        let row = query_as::<_, CampBatchRow>(
            "SELECT * FROM camp_batches WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(batch_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| DomainError::EntityNotFound("CampBatch".to_string(), batch_id))?;

        Self::map_batch_row(row)
    }

    async fn find_batches_for_camp(&self, camp_id: Uuid) -> DomainResult<Vec<CampBatch>> {
        let rows = query_as::<_, CampBatchRow>(
            r#"SELECT * FROM camp_batches
               WHERE camp_id = ? AND deleted_at IS NULL
               ORDER BY start_time ASC, name ASC"#,
        )
        .bind(camp_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        rows.into_iter().map(Self::map_batch_row).collect()
    }

    async fn soft_delete_batch(&self, batch_id: Uuid, auth: &AuthContext) -> DomainResult<()> {
        let now_str = Utc::now().to_rfc3339();

        let result = query(
            "UPDATE camp_batches SET deleted_at = ?, deleted_by_user_id = ? WHERE id = ? AND deleted_at IS NULL"
        )
        .bind(now_str)
        .bind(auth.user_id.to_string())
        .bind(batch_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            Err(DomainError::EntityNotFound("CampBatch".to_string(), batch_id))
        } else {
            Ok(())
        }
    }

    async fn count_batch_enrollments(&self, batch_id: Uuid) -> DomainResult<i64> {
        let count: i64 = query_scalar(
            r#"SELECT COUNT(*) FROM camp_enrollments
               WHERE batch_id = ? AND status = 'ACTIVE' AND deleted_at IS NULL"#,
        )
        .bind(batch_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(count)
    }
}
