use crate::auth::AuthContext;
use crate::domains::assessment::types::{
    Assessment, AssessmentRow, AssessmentSummary, NewAssessment, UpdateAssessment,
};
use crate::domains::core::delete_service::DeleteServiceRepository;
use crate::domains::core::repository::{FindById, HardDeletable, SoftDeletable};
use crate::errors::{DbError, DomainError, DomainResult, ValidationError};
use crate::types::{PaginatedResult, PaginationParams};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use sqlx::sqlite::SqliteArguments;
use sqlx::{query, query_as, query_scalar, Arguments, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

/// Trait defining assessment repository operations
#[async_trait]
pub trait AssessmentRepository: DeleteServiceRepository<Assessment> + Send + Sync {
    async fn create(
        &self,
        new_assessment: &NewAssessment,
        auth: &AuthContext,
    ) -> DomainResult<Assessment>;
    async fn create_with_tx<'t>(
        &self,
        new_assessment: &NewAssessment,
        auth: &AuthContext,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Assessment>;

    async fn update(
        &self,
        id: Uuid,
        update_data: &UpdateAssessment,
        auth: &AuthContext,
    ) -> DomainResult<Assessment>;
    async fn update_with_tx<'t>(
        &self,
        id: Uuid,
        update_data: &UpdateAssessment,
        auth: &AuthContext,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Assessment>;

    /// Find an assessment, checking it belongs to the given player
    async fn find_by_id_for_player(
        &self,
        player_id: Uuid,
        id: Uuid,
    ) -> DomainResult<Assessment>;

    /// Lightweight listing rows for a player, newest assessment date first
    async fn find_summaries_for_player(
        &self,
        player_id: Uuid,
        params: PaginationParams,
    ) -> DomainResult<PaginatedResult<AssessmentSummary>>;

    /// The player's most recent COMPLETED assessment. `EntityNotFound` here
    /// is an expected, recoverable miss, not a failure.
    async fn find_latest_completed(&self, player_id: Uuid) -> DomainResult<Assessment>;
}

/// SQLite implementation for AssessmentRepository
#[derive(Clone)]
pub struct SqliteAssessmentRepository {
    pool: SqlitePool,
}

impl SqliteAssessmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row_to_entity(row: AssessmentRow) -> DomainResult<Assessment> {
        row.into_entity()
            .map_err(|e| DomainError::Internal(format!("Failed to map row to entity: {}", e)))
    }

    fn subtree_json<T: Serialize>(value: &T, field_name: &str) -> DomainResult<String> {
        serde_json::to_string(value).map_err(|e| {
            DomainError::Internal(format!("Failed to serialize {}: {}", field_name, e))
        })
    }

    async fn find_by_id_with_tx<'t>(
        &self,
        id: Uuid,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Assessment> {
        let row = query_as::<_, AssessmentRow>(
            "SELECT * FROM assessments WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id.to_string())
        .fetch_optional(&mut **tx)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| DomainError::EntityNotFound("Assessment".to_string(), id))?;

        Self::map_row_to_entity(row)
    }
}

#[async_trait]
impl FindById<Assessment> for SqliteAssessmentRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Assessment> {
        let row = query_as::<_, AssessmentRow>(
            "SELECT * FROM assessments WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| DomainError::EntityNotFound("Assessment".to_string(), id))?;

        Self::map_row_to_entity(row)
    }
}

#[async_trait]
impl SoftDeletable for SqliteAssessmentRepository {
    async fn soft_delete_with_tx(
        &self,
        id: Uuid,
        auth: &AuthContext,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<()> {
        let now_str = Utc::now().to_rfc3339();
        let deleted_by_str = auth.user_id.to_string();

        let result = query(
            "UPDATE assessments SET deleted_at = ?, deleted_by_user_id = ? WHERE id = ? AND deleted_at IS NULL"
        )
        .bind(now_str)
        .bind(deleted_by_str)
        .bind(id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            Err(DomainError::EntityNotFound("Assessment".to_string(), id))
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
impl HardDeletable for SqliteAssessmentRepository {
    fn entity_name(&self) -> &'static str {
        "assessments"
    }

    async fn hard_delete_with_tx(
        &self,
        id: Uuid,
        _auth: &AuthContext,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<()> {
        let id_str = id.to_string();

        // Follow-ups outlive the assessment they were seeded from; detach
        // them before the row disappears.
        query("UPDATE assessments SET parent_assessment_id = NULL WHERE parent_assessment_id = ?")
            .bind(&id_str)
            .execute(&mut **tx)
            .await
            .map_err(DbError::from)?;

        let result = query("DELETE FROM assessments WHERE id = ?")
            .bind(&id_str)
            .execute(&mut **tx)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            Err(DomainError::EntityNotFound("Assessment".to_string(), id))
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

/// Row for the lightweight summary listing
#[derive(Debug, sqlx::FromRow)]
struct AssessmentSummaryRow {
    id: String,
    player_id: String,
    assessment_date: String,
    assessment_type: Option<String>,
    player_role: Option<String>,
    overall_rating: Option<String>,
    status: String,
    parent_assessment_id: Option<String>,
    created_at: String,
}

impl AssessmentSummaryRow {
    fn into_summary(self) -> DomainResult<AssessmentSummary> {
        let parse_uuid = |s: &str, field: &str| {
            Uuid::parse_str(s).map_err(|_| {
                DomainError::Validation(ValidationError::format(
                    field,
                    &format!("Invalid UUID format: {}", s),
                ))
            })
        };
        Ok(AssessmentSummary {
            id: parse_uuid(&self.id, "id")?,
            player_id: parse_uuid(&self.player_id, "player_id")?,
            assessment_date: self.assessment_date,
            assessment_type: self.assessment_type,
            player_role: self.player_role,
            overall_rating: self.overall_rating,
            status: self.status,
            parent_assessment_id: match &self.parent_assessment_id {
                Some(s) => Some(parse_uuid(s, "parent_assessment_id")?),
                None => None,
            },
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl AssessmentRepository for SqliteAssessmentRepository {
    async fn create(
        &self,
        new_assessment: &NewAssessment,
        auth: &AuthContext,
    ) -> DomainResult<Assessment> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        match self.create_with_tx(new_assessment, auth, &mut tx).await {
            Ok(assessment) => {
                tx.commit().await.map_err(DbError::from)?;
                Ok(assessment)
            }
            Err(e) => {
                let _ = tx.rollback().await;
                println!(
                    "🚨 [ASSESSMENT_REPO] Creation failed for player {}: {}",
                    new_assessment.player_id, e
                );
                Err(e)
            }
        }
    }

    async fn create_with_tx<'t>(
        &self,
        new_assessment: &NewAssessment,
        auth: &AuthContext,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Assessment> {
        let id = Uuid::new_v4();
        let now_str = Utc::now().to_rfc3339();
        let user_id_str = auth.user_id.to_string();
        let created_by_id_str = new_assessment
            .created_by_user_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| user_id_str.clone());

        let cricket_json =
            Self::subtree_json(&new_assessment.skills.cricket_skills, "cricket_skills")?;
        let fielding_json = Self::subtree_json(&new_assessment.skills.fielding, "fielding")?;
        let fitness_json = Self::subtree_json(&new_assessment.skills.fitness, "fitness")?;
        let diet_json = Self::subtree_json(&new_assessment.skills.diet, "diet")?;
        let mental_json = Self::subtree_json(&new_assessment.skills.mental, "mental")?;

        query(
            r#"INSERT INTO assessments (
                id, player_id, assessment_date, assessment_type, player_role, age_group,
                cricket_skills, fielding, fitness, diet, mental,
                overall_rating, overall_summary, status, parent_assessment_id,
                created_at, updated_at, created_by_user_id, updated_by_user_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(id.to_string())
        .bind(new_assessment.player_id.to_string())
        .bind(&new_assessment.assessment_date)
        .bind(&new_assessment.assessment_type)
        .bind(&new_assessment.player_role)
        .bind(&new_assessment.age_group)
        .bind(cricket_json)
        .bind(fielding_json)
        .bind(fitness_json)
        .bind(diet_json)
        .bind(mental_json)
        .bind(&new_assessment.overall_rating)
        .bind(&new_assessment.overall_summary)
        .bind(new_assessment.status.as_deref().unwrap_or("DRAFT"))
        .bind(new_assessment.parent_assessment_id.map(|u| u.to_string()))
        .bind(&now_str)
        .bind(&now_str)
        .bind(&created_by_id_str)
        .bind(&user_id_str)
        .execute(&mut **tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                DomainError::Validation(ValidationError::relationship(
                    "player_id does not reference an existing player",
                ))
            }
            _ => DomainError::Database(DbError::from(e)),
        })?;

        self.find_by_id_with_tx(id, tx).await
    }

    async fn update(
        &self,
        id: Uuid,
        update_data: &UpdateAssessment,
        auth: &AuthContext,
    ) -> DomainResult<Assessment> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        match self.update_with_tx(id, update_data, auth, &mut tx).await {
            Ok(assessment) => {
                tx.commit().await.map_err(DbError::from)?;
                Ok(assessment)
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }

    async fn update_with_tx<'t>(
        &self,
        id: Uuid,
        update_data: &UpdateAssessment,
        auth: &AuthContext,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Assessment> {
        // Fetch current to ensure it exists before update
        let _current = self.find_by_id_with_tx(id, tx).await?;

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
        macro_rules! add_subtree_update {
            ($field:ident, $value:expr) => {
                if let Some(val) = $value {
                    set_clauses.push(format!("{} = ?", stringify!($field)));
                    let _ = args.add(Self::subtree_json(val, stringify!($field))?);
                }
            };
        }

        add_update!(assessment_date, &update_data.assessment_date);
        add_update!(assessment_type, &update_data.assessment_type);
        add_update!(player_role, &update_data.player_role);
        add_update!(age_group, &update_data.age_group);
        add_subtree_update!(cricket_skills, &update_data.cricket_skills);
        add_subtree_update!(fielding, &update_data.fielding);
        add_subtree_update!(fitness, &update_data.fitness);
        add_subtree_update!(diet, &update_data.diet);
        add_subtree_update!(mental, &update_data.mental);
        add_update!(overall_rating, &update_data.overall_rating);
        add_update!(overall_summary, &update_data.overall_summary);
        add_update!(status, &update_data.status);

        if set_clauses.is_empty() {
            return self.find_by_id_with_tx(id, tx).await;
        }

        set_clauses.push("updated_at = ?".to_string());
        let _ = args.add(&now_str);
        set_clauses.push("updated_by_user_id = ?".to_string());
        let _ = args.add(&user_id_str);

        let query_str = format!(
            "UPDATE assessments SET {} WHERE id = ? AND deleted_at IS NULL",
            set_clauses.join(", ")
        );
        let _ = args.add(id.to_string());

        let result = sqlx::query_with(&query_str, args)
            .execute(&mut **tx)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EntityNotFound("Assessment".to_string(), id));
        }

        self.find_by_id_with_tx(id, tx).await
    }

    async fn find_by_id_for_player(
        &self,
        player_id: Uuid,
        id: Uuid,
    ) -> DomainResult<Assessment> {
        let row = query_as::<_, AssessmentRow>(
            "SELECT * FROM assessments WHERE id = ? AND player_id = ? AND deleted_at IS NULL",
        )
        .bind(id.to_string())
        .bind(player_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| DomainError::EntityNotFound("Assessment".to_string(), id))?;

        Self::map_row_to_entity(row)
    }

    async fn find_summaries_for_player(
        &self,
        player_id: Uuid,
        params: PaginationParams,
    ) -> DomainResult<PaginatedResult<AssessmentSummary>> {
        let player_id_str = player_id.to_string();
        let offset = (params.page - 1) * params.per_page;

        let total: i64 = query_scalar(
            "SELECT COUNT(*) FROM assessments WHERE player_id = ? AND deleted_at IS NULL",
        )
        .bind(&player_id_str)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;

        let rows = query_as::<_, AssessmentSummaryRow>(
            r#"SELECT id, player_id, assessment_date, assessment_type, player_role,
                      overall_rating, status, parent_assessment_id, created_at
               FROM assessments
               WHERE player_id = ? AND deleted_at IS NULL
               ORDER BY assessment_date DESC, created_at DESC
               LIMIT ? OFFSET ?"#,
        )
        .bind(&player_id_str)
        .bind(params.per_page as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        let summaries = rows
            .into_iter()
            .map(AssessmentSummaryRow::into_summary)
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(PaginatedResult::new(summaries, total as u64, params))
    }

    async fn find_latest_completed(&self, player_id: Uuid) -> DomainResult<Assessment> {
        let row = query_as::<_, AssessmentRow>(
            r#"SELECT * FROM assessments
               WHERE player_id = ? AND status = 'COMPLETED' AND deleted_at IS NULL
               ORDER BY assessment_date DESC, created_at DESC
               LIMIT 1"#,
        )
        .bind(player_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| DomainError::EntityNotFound("Assessment".to_string(), player_id))?;

        Self::map_row_to_entity(row)
    }
}
