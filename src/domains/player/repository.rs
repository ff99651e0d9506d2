use crate::auth::AuthContext;
use crate::domains::core::delete_service::DeleteServiceRepository;
use crate::domains::core::repository::{FindById, HardDeletable, SoftDeletable};
use crate::domains::player::types::{
    NewPlayer, Player, PlayerDemographics, PlayerFilter, PlayerRow, UpdatePlayer,
};
use crate::errors::{DbError, DomainError, DomainResult};
use crate::types::{PaginatedResult, PaginationParams};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteArguments;
use sqlx::{query, query_as, query_scalar, Arguments, Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

/// Trait defining player repository operations
#[async_trait]
pub trait PlayerRepository: DeleteServiceRepository<Player> + Send + Sync {
    async fn create(&self, new_player: &NewPlayer, auth: &AuthContext) -> DomainResult<Player>;
    async fn create_with_tx<'t>(
        &self,
        new_player: &NewPlayer,
        auth: &AuthContext,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Player>;

    async fn update(
        &self,
        id: Uuid,
        update_data: &UpdatePlayer,
        auth: &AuthContext,
    ) -> DomainResult<Player>;

    async fn find_all(&self, params: PaginationParams) -> DomainResult<PaginatedResult<Player>>;

    async fn find_by_filter(
        &self,
        filter: &PlayerFilter,
        params: PaginationParams,
    ) -> DomainResult<PaginatedResult<Player>>;

    /// Squad composition counts over non-deleted active players
    async fn get_demographics(&self) -> DomainResult<PlayerDemographics>;
}

/// SQLite implementation for PlayerRepository
#[derive(Clone)]
pub struct SqlitePlayerRepository {
    pool: SqlitePool,
}

impl SqlitePlayerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row_to_entity(row: PlayerRow) -> DomainResult<Player> {
        row.into_entity()
            .map_err(|e| DomainError::Internal(format!("Failed to map row to entity: {}", e)))
    }

    /// Build WHERE clause fragments for a filter. Caller owns the argument
    /// binding order: fragments are pushed in the same order here.
    fn filter_clauses(filter: &PlayerFilter) -> (Vec<String>, Vec<String>) {
        let mut clauses = Vec::new();
        let mut binds = Vec::new();

        if let Some(roles) = &filter.player_roles {
            if !roles.is_empty() {
                let placeholders = vec!["?"; roles.len()].join(", ");
                clauses.push(format!("player_role IN ({})", placeholders));
                binds.extend(roles.iter().cloned());
            }
        }
        if let Some(age_groups) = &filter.age_groups {
            if !age_groups.is_empty() {
                let placeholders = vec!["?"; age_groups.len()].join(", ");
                clauses.push(format!("age_group IN ({})", placeholders));
                binds.extend(age_groups.iter().cloned());
            }
        }
        if let Some(search) = &filter.search_text {
            if !search.is_empty() {
                clauses.push("(name LIKE ? OR guardian_name LIKE ?)".to_string());
                let pattern = format!("%{}%", search);
                binds.push(pattern.clone());
                binds.push(pattern);
            }
        }
        if !filter.include_inactive {
            clauses.push("active = 1".to_string());
        }

        (clauses, binds)
    }
}

#[async_trait]
impl FindById<Player> for SqlitePlayerRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Player> {
        let row =
            query_as::<_, PlayerRow>("SELECT * FROM players WHERE id = ? AND deleted_at IS NULL")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(DbError::from)?
                .ok_or_else(|| DomainError::EntityNotFound("Player".to_string(), id))?;

        Self::map_row_to_entity(row)
    }
}

#[async_trait]
impl SoftDeletable for SqlitePlayerRepository {
    async fn soft_delete_with_tx(
        &self,
        id: Uuid,
        auth: &AuthContext,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<()> {
        let now_str = Utc::now().to_rfc3339();

        let result = query(
            "UPDATE players SET deleted_at = ?, deleted_by_user_id = ? WHERE id = ? AND deleted_at IS NULL"
        )
        .bind(now_str)
        .bind(auth.user_id.to_string())
        .bind(id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            Err(DomainError::EntityNotFound("Player".to_string(), id))
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
impl HardDeletable for SqlitePlayerRepository {
    fn entity_name(&self) -> &'static str {
        "players"
    }

    async fn hard_delete_with_tx(
        &self,
        id: Uuid,
        _auth: &AuthContext,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<()> {
        let result = query("DELETE FROM players WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut **tx)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            Err(DomainError::EntityNotFound("Player".to_string(), id))
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
impl PlayerRepository for SqlitePlayerRepository {
    async fn create(&self, new_player: &NewPlayer, auth: &AuthContext) -> DomainResult<Player> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        match self.create_with_tx(new_player, auth, &mut tx).await {
            Ok(player) => {
                tx.commit().await.map_err(DbError::from)?;
                Ok(player)
            }
            Err(e) => {
                let _ = tx.rollback().await;
                println!(
                    "🚨 [PLAYER_REPO] Creation failed for '{}': {}",
                    new_player.name, e
                );
                Err(e)
            }
        }
    }

    async fn create_with_tx<'t>(
        &self,
        new_player: &NewPlayer,
        auth: &AuthContext,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Player> {
        let id = Uuid::new_v4();
        let now_str = Utc::now().to_rfc3339();
        let user_id_str = auth.user_id.to_string();
        let created_by_id_str = new_player
            .created_by_user_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| user_id_str.clone());

        query(
            r#"INSERT INTO players (
                id, name, date_of_birth, gender, player_role, batting_style, bowling_style,
                age_group, guardian_name, guardian_phone, joined_date, notes, active,
                created_at, updated_at, created_by_user_id, updated_by_user_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?, ?, ?)"#,
        )
        .bind(id.to_string())
        .bind(&new_player.name)
        .bind(&new_player.date_of_birth)
        .bind(&new_player.gender)
        .bind(&new_player.player_role)
        .bind(&new_player.batting_style)
        .bind(&new_player.bowling_style)
        .bind(&new_player.age_group)
        .bind(&new_player.guardian_name)
        .bind(&new_player.guardian_phone)
        .bind(&new_player.joined_date)
        .bind(&new_player.notes)
        .bind(&now_str)
        .bind(&now_str)
        .bind(&created_by_id_str)
        .bind(&user_id_str)
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        let row =
            query_as::<_, PlayerRow>("SELECT * FROM players WHERE id = ? AND deleted_at IS NULL")
                .bind(id.to_string())
                .fetch_one(&mut **tx)
                .await
                .map_err(DbError::from)?;

        Self::map_row_to_entity(row)
    }

    async fn update(
        &self,
        id: Uuid,
        update_data: &UpdatePlayer,
        auth: &AuthContext,
    ) -> DomainResult<Player> {
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
        add_update!(date_of_birth, &update_data.date_of_birth);
        add_update!(gender, &update_data.gender);
        add_update!(player_role, &update_data.player_role);
        add_update!(batting_style, &update_data.batting_style);
        add_update!(bowling_style, &update_data.bowling_style);
        add_update!(age_group, &update_data.age_group);
        add_update!(guardian_name, &update_data.guardian_name);
        add_update!(guardian_phone, &update_data.guardian_phone);
        add_update!(joined_date, &update_data.joined_date);
        add_update!(notes, &update_data.notes);
        if let Some(active) = update_data.active {
            set_clauses.push("active = ?".to_string());
            let _ = args.add(if active { 1i64 } else { 0i64 });
        }

        if set_clauses.is_empty() {
            return self.find_by_id(id).await;
        }

        set_clauses.push("updated_at = ?".to_string());
        let _ = args.add(&now_str);
        set_clauses.push("updated_by_user_id = ?".to_string());
        let _ = args.add(&user_id_str);

        let query_str = format!(
            "UPDATE players SET {} WHERE id = ? AND deleted_at IS NULL",
            set_clauses.join(", ")
        );
        let _ = args.add(id.to_string());

        let result = sqlx::query_with(&query_str, args)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EntityNotFound("Player".to_string(), id));
        }

        self.find_by_id(id).await
    }

    async fn find_all(&self, params: PaginationParams) -> DomainResult<PaginatedResult<Player>> {
        self.find_by_filter(&PlayerFilter::default(), params).await
    }

    async fn find_by_filter(
        &self,
        filter: &PlayerFilter,
        params: PaginationParams,
    ) -> DomainResult<PaginatedResult<Player>> {
        let (clauses, binds) = Self::filter_clauses(filter);
        let mut where_clause = "deleted_at IS NULL".to_string();
        for clause in &clauses {
            where_clause.push_str(" AND ");
            where_clause.push_str(clause);
        }

        let count_query = format!("SELECT COUNT(*) FROM players WHERE {}", where_clause);
        let mut count_q = query_scalar::<_, i64>(&count_query);
        for bind in &binds {
            count_q = count_q.bind(bind);
        }
        let total = count_q.fetch_one(&self.pool).await.map_err(DbError::from)?;

        let offset = (params.page - 1) * params.per_page;
        let select_query = format!(
            "SELECT * FROM players WHERE {} ORDER BY name COLLATE NOCASE ASC LIMIT ? OFFSET ?",
            where_clause
        );
        let mut select_q = query_as::<_, PlayerRow>(&select_query);
        for bind in &binds {
            select_q = select_q.bind(bind);
        }
        let rows = select_q
            .bind(params.per_page as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        let players = rows
            .into_iter()
            .map(Self::map_row_to_entity)
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(PaginatedResult::new(players, total as u64, params))
    }

    async fn get_demographics(&self) -> DomainResult<PlayerDemographics> {
        let total: i64 = query_scalar(
            "SELECT COUNT(*) FROM players WHERE deleted_at IS NULL AND active = 1",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;

        let by_role_rows: Vec<(Option<String>, i64)> = query_as(
            r#"SELECT player_role, COUNT(*) FROM players
               WHERE deleted_at IS NULL AND active = 1
               GROUP BY player_role"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        let by_age_rows: Vec<(Option<String>, i64)> = query_as(
            r#"SELECT age_group, COUNT(*) FROM players
               WHERE deleted_at IS NULL AND active = 1
               GROUP BY age_group"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        let mut by_role = HashMap::new();
        for (role, count) in by_role_rows {
            by_role.insert(role.unwrap_or_else(|| "unassigned".to_string()), count);
        }
        let mut by_age_group = HashMap::new();
        for (age_group, count) in by_age_rows {
            by_age_group.insert(age_group.unwrap_or_else(|| "unassigned".to_string()), count);
        }

        Ok(PlayerDemographics {
            total_players: total,
            by_role,
            by_age_group,
        })
    }
}
