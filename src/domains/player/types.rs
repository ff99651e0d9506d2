use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::validation::{common, Validate, ValidationBuilder};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domains::assessment::types::PlayerRole;

/// Filter for player listing queries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerFilter {
    pub player_roles: Option<Vec<String>>,
    pub age_groups: Option<Vec<String>>,
    pub search_text: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
}

impl PlayerFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.player_roles = Some(roles);
        self
    }

    pub fn with_age_groups(mut self, age_groups: Vec<String>) -> Self {
        self.age_groups = Some(age_groups);
        self
    }

    pub fn with_search_text(mut self, search_text: String) -> Self {
        self.search_text = Some(search_text);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.player_roles.is_none() && self.age_groups.is_none() && self.search_text.is_none()
    }
}

impl Validate for PlayerFilter {
    fn validate(&self) -> DomainResult<()> {
        if let Some(roles) = &self.player_roles {
            for role in roles {
                common::validate_player_role(role)?;
            }
        }
        if let Some(age_groups) = &self.age_groups {
            for age_group in age_groups {
                common::validate_age_group(age_group)?;
            }
        }
        Ok(())
    }
}

/// Player entity - a regular program player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    /// ISO date format YYYY-MM-DD
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub player_role: Option<String>,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
    pub age_group: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    /// ISO date format YYYY-MM-DD
    pub joined_date: Option<String>,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by_user_id: Option<Uuid>,
    pub updated_by_user_id: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by_user_id: Option<Uuid>,
}

impl Player {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn parsed_role(&self) -> Option<PlayerRole> {
        self.player_role.as_deref().and_then(PlayerRole::from_str)
    }

    pub fn parsed_date_of_birth(&self) -> Option<NaiveDate> {
        self.date_of_birth
            .as_ref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }
}

/// NewPlayer DTO - used when creating a new player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlayer {
    pub name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub player_role: Option<String>,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
    pub age_group: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub joined_date: Option<String>,
    pub notes: Option<String>,
    pub created_by_user_id: Option<Uuid>,
}

impl Validate for NewPlayer {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("name", Some(self.name.clone()))
            .required()
            .min_length(2)
            .max_length(100)
            .validate()?;

        if let Some(date_of_birth) = &self.date_of_birth {
            common::validate_date_format(date_of_birth, "date_of_birth")?;
        }
        if let Some(gender) = &self.gender {
            common::validate_gender(gender)?;
        }
        if let Some(role) = &self.player_role {
            common::validate_player_role(role)?;
        }
        if let Some(age_group) = &self.age_group {
            common::validate_age_group(age_group)?;
        }
        if let Some(phone) = &self.guardian_phone {
            ValidationBuilder::new("guardian_phone", Some(phone.clone()))
                .phone()
                .validate()?;
        }
        if let Some(joined_date) = &self.joined_date {
            common::validate_date_format(joined_date, "joined_date")?;
        }

        Ok(())
    }
}

/// UpdatePlayer DTO - used when updating an existing player
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePlayer {
    pub name: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub player_role: Option<String>,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
    pub age_group: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub joined_date: Option<String>,
    pub notes: Option<String>,
    pub active: Option<bool>,
    #[serde(skip)]
    pub updated_by_user_id: Uuid,
}

impl Validate for UpdatePlayer {
    fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            ValidationBuilder::new("name", Some(name.clone()))
                .min_length(2)
                .max_length(100)
                .validate()?;
        }
        if let Some(date_of_birth) = &self.date_of_birth {
            common::validate_date_format(date_of_birth, "date_of_birth")?;
        }
        if let Some(gender) = &self.gender {
            common::validate_gender(gender)?;
        }
        if let Some(role) = &self.player_role {
            common::validate_player_role(role)?;
        }
        if let Some(age_group) = &self.age_group {
            common::validate_age_group(age_group)?;
        }
        if let Some(phone) = &self.guardian_phone {
            ValidationBuilder::new("guardian_phone", Some(phone.clone()))
                .phone()
                .validate()?;
        }
        if let Some(joined_date) = &self.joined_date {
            common::validate_date_format(joined_date, "joined_date")?;
        }

        Ok(())
    }
}

/// PlayerRow - SQLite row representation for mapping from database
#[derive(Debug, Clone, FromRow)]
pub struct PlayerRow {
    pub id: String,
    pub name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub player_role: Option<String>,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
    pub age_group: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub joined_date: Option<String>,
    pub notes: Option<String>,
    pub active: i64,
    pub created_at: String,
    pub updated_at: String,
    pub created_by_user_id: Option<String>,
    pub updated_by_user_id: Option<String>,
    pub deleted_at: Option<String>,
    pub deleted_by_user_id: Option<String>,
}

impl PlayerRow {
    /// Convert database row to domain entity
    pub fn into_entity(self) -> DomainResult<Player> {
        let parse_optional_uuid =
            |s: &Option<String>, field_name: &str| -> DomainResult<Option<Uuid>> {
                match s {
                    Some(id_str) => Uuid::parse_str(id_str).map(Some).map_err(|_| {
                        DomainError::Validation(ValidationError::format(
                            field_name,
                            &format!("Invalid UUID format: {}", id_str),
                        ))
                    }),
                    None => Ok(None),
                }
            };

        let parse_optional_datetime =
            |s: &Option<String>, field_name: &str| -> DomainResult<Option<DateTime<Utc>>> {
                match s {
                    Some(dt_str) => DateTime::parse_from_rfc3339(dt_str)
                        .map(|dt| Some(dt.with_timezone(&Utc)))
                        .map_err(|_| {
                            DomainError::Validation(ValidationError::format(
                                field_name,
                                &format!("Invalid RFC3339 format: {}", dt_str),
                            ))
                        }),
                    None => Ok(None),
                }
            };

        Ok(Player {
            id: Uuid::parse_str(&self.id).map_err(|_| {
                DomainError::Validation(ValidationError::format(
                    "id",
                    &format!("Invalid UUID format: {}", self.id),
                ))
            })?,
            name: self.name,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            player_role: self.player_role,
            batting_style: self.batting_style,
            bowling_style: self.bowling_style,
            age_group: self.age_group,
            guardian_name: self.guardian_name,
            guardian_phone: self.guardian_phone,
            joined_date: self.joined_date,
            notes: self.notes,
            active: self.active != 0,
            created_at: DateTime::parse_from_rfc3339(&self.created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| {
                    DomainError::Validation(ValidationError::format(
                        "created_at",
                        &format!("Invalid RFC3339 format: {}", self.created_at),
                    ))
                })?,
            updated_at: DateTime::parse_from_rfc3339(&self.updated_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| {
                    DomainError::Validation(ValidationError::format(
                        "updated_at",
                        &format!("Invalid RFC3339 format: {}", self.updated_at),
                    ))
                })?,
            created_by_user_id: parse_optional_uuid(&self.created_by_user_id, "created_by_user_id")?,
            updated_by_user_id: parse_optional_uuid(&self.updated_by_user_id, "updated_by_user_id")?,
            deleted_at: parse_optional_datetime(&self.deleted_at, "deleted_at")?,
            deleted_by_user_id: parse_optional_uuid(&self.deleted_by_user_id, "deleted_by_user_id")?,
        })
    }
}

/// Basic player summary for nested responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: Uuid,
    pub name: String,
    pub player_role: Option<String>,
    pub age_group: Option<String>,
    pub active: bool,
}

impl From<Player> for PlayerSummary {
    fn from(player: Player) -> Self {
        Self {
            id: player.id,
            name: player.name,
            player_role: player.player_role,
            age_group: player.age_group,
            active: player.active,
        }
    }
}

/// PlayerResponse DTO - used as the API response for a player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerResponse {
    pub id: Uuid,
    pub name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub player_role: Option<String>,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
    pub age_group: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub joined_date: Option<String>,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Player> for PlayerResponse {
    fn from(p: Player) -> Self {
        Self {
            id: p.id,
            name: p.name,
            date_of_birth: p.date_of_birth,
            gender: p.gender,
            player_role: p.player_role,
            batting_style: p.batting_style,
            bowling_style: p.bowling_style,
            age_group: p.age_group,
            guardian_name: p.guardian_name,
            guardian_phone: p.guardian_phone,
            joined_date: p.joined_date,
            notes: p.notes,
            active: p.active,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

/// Squad composition statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDemographics {
    pub total_players: i64,
    pub by_role: HashMap<String, i64>,
    pub by_age_group: HashMap<String, i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_new_player() -> NewPlayer {
        NewPlayer {
            name: "Arjun Mehta".to_string(),
            date_of_birth: Some("2012-03-04".to_string()),
            gender: Some("male".to_string()),
            player_role: Some("BOWLER".to_string()),
            batting_style: Some("Right-hand bat".to_string()),
            bowling_style: Some("Right-arm medium".to_string()),
            age_group: Some("under_14".to_string()),
            guardian_name: Some("R. Mehta".to_string()),
            guardian_phone: Some("9876543210".to_string()),
            joined_date: Some("2024-04-01".to_string()),
            notes: None,
            created_by_user_id: None,
        }
    }

    #[test]
    fn new_player_validates() {
        assert!(valid_new_player().validate().is_ok());

        let mut short_name = valid_new_player();
        short_name.name = "A".to_string();
        assert!(short_name.validate().is_err());

        let mut bad_role = valid_new_player();
        bad_role.player_role = Some("KEEPER".to_string());
        assert!(bad_role.validate().is_err());

        let mut bad_phone = valid_new_player();
        bad_phone.guardian_phone = Some("call me".to_string());
        assert!(bad_phone.validate().is_err());
    }

    #[test]
    fn filter_validates_role_and_age_group() {
        assert!(PlayerFilter::new().validate().is_ok());
        assert!(PlayerFilter::new()
            .with_roles(vec!["BATSMEN".to_string()])
            .validate()
            .is_ok());
        assert!(PlayerFilter::new()
            .with_roles(vec!["GOALKEEPER".to_string()])
            .validate()
            .is_err());
    }
}
