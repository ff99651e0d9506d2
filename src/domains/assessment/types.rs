use crate::domains::assessment::skills::{
    CricketSkills, DietSection, FieldingSkills, FitnessSection, MentalSection, SkillSections,
};
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::validation::{common, Validate, ValidationBuilder};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Player role enum with string representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerRole {
    Batsmen,
    Bowler,
    AllRounder,
    WicketKeeper,
}

impl PlayerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerRole::Batsmen => "BATSMEN",
            PlayerRole::Bowler => "BOWLER",
            PlayerRole::AllRounder => "ALL_ROUNDER",
            PlayerRole::WicketKeeper => "WICKET_KEEPER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "BATSMEN" => Some(PlayerRole::Batsmen),
            "BOWLER" => Some(PlayerRole::Bowler),
            "ALL_ROUNDER" => Some(PlayerRole::AllRounder),
            "WICKET_KEEPER" => Some(PlayerRole::WicketKeeper),
            _ => None,
        }
    }
}

impl fmt::Display for PlayerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Assessment type enum with string representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssessmentType {
    Weekly,
    Monthly,
    FollowUp,
    Custom,
}

impl AssessmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentType::Weekly => "WEEKLY",
            AssessmentType::Monthly => "MONTHLY",
            AssessmentType::FollowUp => "FOLLOW_UP",
            AssessmentType::Custom => "CUSTOM",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "WEEKLY" => Some(AssessmentType::Weekly),
            "MONTHLY" => Some(AssessmentType::Monthly),
            "FOLLOW_UP" => Some(AssessmentType::FollowUp),
            "CUSTOM" => Some(AssessmentType::Custom),
            _ => None,
        }
    }
}

impl fmt::Display for AssessmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Assessment status enum with string representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssessmentStatus {
    Draft,
    Completed,
}

impl AssessmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentStatus::Draft => "DRAFT",
            AssessmentStatus::Completed => "COMPLETED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(AssessmentStatus::Draft),
            "COMPLETED" => Some(AssessmentStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Assessment entity - one dated, role-scoped evaluation snapshot of a player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub id: Uuid,
    pub player_id: Uuid,
    /// ISO date format YYYY-MM-DD
    pub assessment_date: String,
    pub assessment_type: Option<String>,
    pub player_role: Option<String>,
    pub age_group: Option<String>,
    /// The five skill subtrees, stored as JSON documents
    #[serde(flatten)]
    pub skills: SkillSections,
    pub overall_rating: Option<String>,
    pub overall_summary: Option<String>,
    pub status: String,
    /// Back-reference for follow-ups seeded from an earlier assessment
    pub parent_assessment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by_user_id: Option<Uuid>,
    pub updated_by_user_id: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by_user_id: Option<Uuid>,
}

impl Assessment {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.assessment_date, "%Y-%m-%d").ok()
    }

    pub fn parsed_role(&self) -> Option<PlayerRole> {
        self.player_role.as_deref().and_then(PlayerRole::from_str)
    }

    pub fn parsed_type(&self) -> Option<AssessmentType> {
        self.assessment_type
            .as_deref()
            .and_then(AssessmentType::from_str)
    }

    pub fn parsed_status(&self) -> Option<AssessmentStatus> {
        AssessmentStatus::from_str(&self.status)
    }

    pub fn is_completed(&self) -> bool {
        self.parsed_status() == Some(AssessmentStatus::Completed)
    }
}

/// NewAssessment DTO - used when creating a new assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAssessment {
    pub player_id: Uuid,
    /// ISO date format YYYY-MM-DD, required
    pub assessment_date: String,
    pub assessment_type: Option<String>,
    pub player_role: Option<String>,
    pub age_group: Option<String>,
    #[serde(default)]
    pub skills: SkillSections,
    pub overall_rating: Option<String>,
    pub overall_summary: Option<String>,
    pub status: Option<String>,
    /// When true, field values default from the player's most recent
    /// COMPLETED assessment and the new document is linked to it as a
    /// follow-up. Having no completed assessment yet is not an error.
    #[serde(default)]
    pub seed_from_latest_completed: bool,
    /// Set by the service when seeding succeeds; links the follow-up to its
    /// predecessor.
    #[serde(default)]
    pub parent_assessment_id: Option<Uuid>,
    pub created_by_user_id: Option<Uuid>,
}

impl Validate for NewAssessment {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("player_id", Some(self.player_id))
            .not_nil()
            .validate()?;

        ValidationBuilder::new("assessment_date", Some(self.assessment_date.clone()))
            .required()
            .validate()?;
        common::validate_date_format(&self.assessment_date, "assessment_date")?;

        if let Some(assessment_type) = &self.assessment_type {
            common::validate_assessment_type(assessment_type)?;
        }
        if let Some(role) = &self.player_role {
            common::validate_player_role(role)?;
        }
        if let Some(age_group) = &self.age_group {
            common::validate_age_group(age_group)?;
        }
        if let Some(rating) = &self.overall_rating {
            common::validate_rating_value(rating)?;
        }
        if let Some(status) = &self.status {
            common::validate_assessment_status(status)?;
        }

        Ok(())
    }
}

/// UpdateAssessment DTO - subtrees are replaced wholesale per tab, matching
/// the tab-by-tab editing surface
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAssessment {
    pub assessment_date: Option<String>,
    pub assessment_type: Option<String>,
    pub player_role: Option<String>,
    pub age_group: Option<String>,
    pub cricket_skills: Option<CricketSkills>,
    pub fielding: Option<FieldingSkills>,
    pub fitness: Option<FitnessSection>,
    pub diet: Option<DietSection>,
    pub mental: Option<MentalSection>,
    pub overall_rating: Option<String>,
    pub overall_summary: Option<String>,
    pub status: Option<String>,
    #[serde(skip)]
    pub updated_by_user_id: Uuid,
}

impl Validate for UpdateAssessment {
    fn validate(&self) -> DomainResult<()> {
        if let Some(date) = &self.assessment_date {
            if date.is_empty() {
                return Err(DomainError::Validation(ValidationError::required(
                    "assessment_date",
                )));
            }
            common::validate_date_format(date, "assessment_date")?;
        }
        if let Some(assessment_type) = &self.assessment_type {
            common::validate_assessment_type(assessment_type)?;
        }
        if let Some(role) = &self.player_role {
            common::validate_player_role(role)?;
        }
        if let Some(age_group) = &self.age_group {
            common::validate_age_group(age_group)?;
        }
        if let Some(rating) = &self.overall_rating {
            common::validate_rating_value(rating)?;
        }
        if let Some(status) = &self.status {
            common::validate_assessment_status(status)?;
        }

        Ok(())
    }
}

/// AssessmentRow - SQLite row representation for mapping from database.
/// The five subtrees live in JSON TEXT columns.
#[derive(Debug, Clone, FromRow)]
pub struct AssessmentRow {
    pub id: String,
    pub player_id: String,
    pub assessment_date: String,
    pub assessment_type: Option<String>,
    pub player_role: Option<String>,
    pub age_group: Option<String>,
    pub cricket_skills: Option<String>,
    pub fielding: Option<String>,
    pub fitness: Option<String>,
    pub diet: Option<String>,
    pub mental: Option<String>,
    pub overall_rating: Option<String>,
    pub overall_summary: Option<String>,
    pub status: String,
    pub parent_assessment_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub created_by_user_id: Option<String>,
    pub updated_by_user_id: Option<String>,
    pub deleted_at: Option<String>,
    pub deleted_by_user_id: Option<String>,
}

impl AssessmentRow {
    /// Convert database row to domain entity.
    ///
    /// Subtree JSON that fails to parse degrades to an empty subtree: stored
    /// documents are partially populated by design and must always load.
    pub fn into_entity(self) -> DomainResult<Assessment> {
        let parse_optional_uuid = |s: &Option<String>, field_name: &str| -> DomainResult<Option<Uuid>> {
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

        fn parse_subtree<T: serde::de::DeserializeOwned + Default>(json: &Option<String>) -> T {
            json.as_deref()
                .and_then(|s| serde_json::from_str(s).ok())
                .unwrap_or_default()
        }

        let skills = SkillSections {
            cricket_skills: parse_subtree(&self.cricket_skills),
            fielding: parse_subtree(&self.fielding),
            fitness: parse_subtree(&self.fitness),
            diet: parse_subtree(&self.diet),
            mental: parse_subtree(&self.mental),
        };

        Ok(Assessment {
            id: Uuid::parse_str(&self.id).map_err(|_| {
                DomainError::Validation(ValidationError::format(
                    "id",
                    &format!("Invalid UUID format: {}", self.id),
                ))
            })?,
            player_id: Uuid::parse_str(&self.player_id).map_err(|_| {
                DomainError::Validation(ValidationError::format(
                    "player_id",
                    &format!("Invalid UUID format: {}", self.player_id),
                ))
            })?,
            assessment_date: self.assessment_date,
            assessment_type: self.assessment_type,
            player_role: self.player_role,
            age_group: self.age_group,
            skills,
            overall_rating: self.overall_rating,
            overall_summary: self.overall_summary,
            status: self.status,
            parent_assessment_id: parse_optional_uuid(
                &self.parent_assessment_id,
                "parent_assessment_id",
            )?,
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

/// AssessmentResponse DTO - used as the API response for a full assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentResponse {
    pub id: Uuid,
    pub player_id: Uuid,
    pub assessment_date: String,
    pub assessment_type: Option<String>,
    pub player_role: Option<String>,
    pub age_group: Option<String>,
    #[serde(flatten)]
    pub skills: SkillSections,
    pub overall_rating: Option<String>,
    pub overall_summary: Option<String>,
    pub status: String,
    pub parent_assessment_id: Option<Uuid>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Assessment> for AssessmentResponse {
    fn from(a: Assessment) -> Self {
        Self {
            id: a.id,
            player_id: a.player_id,
            assessment_date: a.assessment_date,
            assessment_type: a.assessment_type,
            player_role: a.player_role,
            age_group: a.age_group,
            skills: a.skills,
            overall_rating: a.overall_rating,
            overall_summary: a.overall_summary,
            status: a.status,
            parent_assessment_id: a.parent_assessment_id,
            created_at: a.created_at.to_rfc3339(),
            updated_at: a.updated_at.to_rfc3339(),
        }
    }
}

/// Lightweight assessment listing row - no subtree payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentSummary {
    pub id: Uuid,
    pub player_id: Uuid,
    pub assessment_date: String,
    pub assessment_type: Option<String>,
    pub player_role: Option<String>,
    pub overall_rating: Option<String>,
    pub status: String,
    pub parent_assessment_id: Option<Uuid>,
    pub created_at: String,
}

impl From<Assessment> for AssessmentSummary {
    fn from(a: Assessment) -> Self {
        Self {
            id: a.id,
            player_id: a.player_id,
            assessment_date: a.assessment_date,
            assessment_type: a.assessment_type,
            player_role: a.player_role,
            overall_rating: a.overall_rating,
            status: a.status,
            parent_assessment_id: a.parent_assessment_id,
            created_at: a.created_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_new_assessment() -> NewAssessment {
        NewAssessment {
            player_id: Uuid::new_v4(),
            assessment_date: "2025-06-15".to_string(),
            assessment_type: Some("WEEKLY".to_string()),
            player_role: Some("BATSMEN".to_string()),
            age_group: Some("under_14".to_string()),
            skills: SkillSections::default(),
            overall_rating: Some("GOOD".to_string()),
            overall_summary: None,
            status: Some("DRAFT".to_string()),
            seed_from_latest_completed: false,
            parent_assessment_id: None,
            created_by_user_id: None,
        }
    }

    #[test]
    fn new_assessment_requires_a_parseable_date() {
        assert!(valid_new_assessment().validate().is_ok());

        let mut missing = valid_new_assessment();
        missing.assessment_date = String::new();
        assert!(missing.validate().is_err());

        let mut garbage = valid_new_assessment();
        garbage.assessment_date = "15/06/2025".to_string();
        assert!(garbage.validate().is_err());
    }

    #[test]
    fn new_assessment_rejects_unknown_enum_strings() {
        let mut bad_type = valid_new_assessment();
        bad_type.assessment_type = Some("ANNUAL".to_string());
        assert!(bad_type.validate().is_err());

        let mut bad_role = valid_new_assessment();
        bad_role.player_role = Some("OPENER".to_string());
        assert!(bad_role.validate().is_err());

        let mut bad_status = valid_new_assessment();
        bad_status.status = Some("FINALIZED".to_string());
        assert!(bad_status.validate().is_err());
    }

    #[test]
    fn row_with_malformed_subtree_json_still_loads() {
        let row = AssessmentRow {
            id: Uuid::new_v4().to_string(),
            player_id: Uuid::new_v4().to_string(),
            assessment_date: "2025-06-15".to_string(),
            assessment_type: Some("WEEKLY".to_string()),
            player_role: None,
            age_group: None,
            cricket_skills: Some("{not json".to_string()),
            fielding: None,
            fitness: Some(r#"{"endurance":{"Aerobic Capacity":{"rating":"GOOD"}}}"#.to_string()),
            diet: None,
            mental: None,
            overall_rating: None,
            overall_summary: None,
            status: "DRAFT".to_string(),
            parent_assessment_id: None,
            created_at: Utc::now().to_rfc3339(),
            updated_at: Utc::now().to_rfc3339(),
            created_by_user_id: None,
            updated_by_user_id: None,
            deleted_at: None,
            deleted_by_user_id: None,
        };

        let entity = row.into_entity().unwrap();
        // Malformed column degrades to an empty subtree
        assert_eq!(entity.skills.cricket_skills, Default::default());
        // Valid column parses
        assert!(entity
            .skills
            .fitness
            .endurance
            .contains_key("Aerobic Capacity"));
    }

    #[test]
    fn enums_round_trip_through_strings() {
        for role in [
            PlayerRole::Batsmen,
            PlayerRole::Bowler,
            PlayerRole::AllRounder,
            PlayerRole::WicketKeeper,
        ] {
            assert_eq!(PlayerRole::from_str(role.as_str()), Some(role));
        }
        for t in [
            AssessmentType::Weekly,
            AssessmentType::Monthly,
            AssessmentType::FollowUp,
            AssessmentType::Custom,
        ] {
            assert_eq!(AssessmentType::from_str(t.as_str()), Some(t));
        }
        assert_eq!(PlayerRole::from_str("SLOGGER"), None);
    }
}
