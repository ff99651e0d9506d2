use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::validation::{common, Validate, ValidationBuilder};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Camp lifecycle status enum with string representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampStatus {
    Planned,
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl CampStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampStatus::Planned => "PLANNED",
            CampStatus::Open => "OPEN",
            CampStatus::InProgress => "IN_PROGRESS",
            CampStatus::Completed => "COMPLETED",
            CampStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PLANNED" => Some(CampStatus::Planned),
            "OPEN" => Some(CampStatus::Open),
            "IN_PROGRESS" => Some(CampStatus::InProgress),
            "COMPLETED" => Some(CampStatus::Completed),
            "CANCELLED" => Some(CampStatus::Cancelled),
            _ => None,
        }
    }

    /// Whether new enrollments are accepted in this state
    pub fn accepts_enrollments(&self) -> bool {
        matches!(self, CampStatus::Open | CampStatus::InProgress)
    }
}

impl fmt::Display for CampStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Camp entity - one summer camp edition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camp {
    pub id: Uuid,
    pub name: String,
    /// Season label, e.g. "Summer 2025"
    pub season: Option<String>,
    /// ISO date format YYYY-MM-DD
    pub start_date: String,
    /// ISO date format YYYY-MM-DD
    pub end_date: String,
    pub location: Option<String>,
    pub description: Option<String>,
    /// Default enrollment fee, currency units
    pub base_fee: Decimal,
    pub capacity: Option<i64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by_user_id: Option<Uuid>,
    pub updated_by_user_id: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by_user_id: Option<Uuid>,
}

impl Camp {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn parsed_status(&self) -> Option<CampStatus> {
        CampStatus::from_str(&self.status)
    }

    pub fn parsed_start_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.start_date, "%Y-%m-%d").ok()
    }

    pub fn parsed_end_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.end_date, "%Y-%m-%d").ok()
    }
}

/// NewCamp DTO - used when creating a new camp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCamp {
    pub name: String,
    pub season: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub base_fee: Decimal,
    pub capacity: Option<i64>,
    pub status: Option<String>,
    pub created_by_user_id: Option<Uuid>,
}

fn validate_date_order(start: &str, end: &str) -> DomainResult<()> {
    let start_date = NaiveDate::parse_from_str(start, "%Y-%m-%d");
    let end_date = NaiveDate::parse_from_str(end, "%Y-%m-%d");
    if let (Ok(s), Ok(e)) = (start_date, end_date) {
        if e < s {
            return Err(DomainError::Validation(ValidationError::invalid_value(
                "end_date",
                "cannot be before start_date",
            )));
        }
    }
    Ok(())
}

impl Validate for NewCamp {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("name", Some(self.name.clone()))
            .required()
            .min_length(2)
            .max_length(150)
            .validate()?;

        common::validate_date_format(&self.start_date, "start_date")?;
        common::validate_date_format(&self.end_date, "end_date")?;
        validate_date_order(&self.start_date, &self.end_date)?;

        if self.base_fee < Decimal::ZERO {
            return Err(DomainError::Validation(ValidationError::invalid_value(
                "base_fee",
                "cannot be negative",
            )));
        }
        if let Some(capacity) = self.capacity {
            ValidationBuilder::new("capacity", Some(capacity))
                .min(1)
                .validate()?;
        }
        if let Some(status) = &self.status {
            common::validate_camp_status(status)?;
        }

        Ok(())
    }
}

/// UpdateCamp DTO - used when updating an existing camp
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCamp {
    pub name: Option<String>,
    pub season: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub base_fee: Option<Decimal>,
    pub capacity: Option<i64>,
    pub status: Option<String>,
    #[serde(skip)]
    pub updated_by_user_id: Uuid,
}

impl Validate for UpdateCamp {
    fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            ValidationBuilder::new("name", Some(name.clone()))
                .min_length(2)
                .max_length(150)
                .validate()?;
        }
        if let Some(start_date) = &self.start_date {
            common::validate_date_format(start_date, "start_date")?;
        }
        if let Some(end_date) = &self.end_date {
            common::validate_date_format(end_date, "end_date")?;
        }
        if let (Some(start), Some(end)) = (&self.start_date, &self.end_date) {
            validate_date_order(start, end)?;
        }
        if let Some(base_fee) = self.base_fee {
            if base_fee < Decimal::ZERO {
                return Err(DomainError::Validation(ValidationError::invalid_value(
                    "base_fee",
                    "cannot be negative",
                )));
            }
        }
        if let Some(capacity) = self.capacity {
            ValidationBuilder::new("capacity", Some(capacity))
                .min(1)
                .validate()?;
        }
        if let Some(status) = &self.status {
            common::validate_camp_status(status)?;
        }

        Ok(())
    }
}

/// CampRow - SQLite row representation for mapping from database
#[derive(Debug, Clone, FromRow)]
pub struct CampRow {
    pub id: String,
    pub name: String,
    pub season: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub location: Option<String>,
    pub description: Option<String>,
    /// Decimal stored as TEXT
    pub base_fee: String,
    pub capacity: Option<i64>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub created_by_user_id: Option<String>,
    pub updated_by_user_id: Option<String>,
    pub deleted_at: Option<String>,
    pub deleted_by_user_id: Option<String>,
}

pub(crate) fn parse_decimal(value: &str, field_name: &str) -> DomainResult<Decimal> {
    Decimal::from_str(value).map_err(|_| {
        DomainError::Validation(ValidationError::format(
            field_name,
            &format!("Invalid decimal value: {}", value),
        ))
    })
}

pub(crate) fn parse_optional_uuid(
    s: &Option<String>,
    field_name: &str,
) -> DomainResult<Option<Uuid>> {
    match s {
        Some(id_str) => Uuid::parse_str(id_str).map(Some).map_err(|_| {
            DomainError::Validation(ValidationError::format(
                field_name,
                &format!("Invalid UUID format: {}", id_str),
            ))
        }),
        None => Ok(None),
    }
}

pub(crate) fn parse_required_uuid(s: &str, field_name: &str) -> DomainResult<Uuid> {
    Uuid::parse_str(s).map_err(|_| {
        DomainError::Validation(ValidationError::format(
            field_name,
            &format!("Invalid UUID format: {}", s),
        ))
    })
}

pub(crate) fn parse_required_datetime(s: &str, field_name: &str) -> DomainResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            DomainError::Validation(ValidationError::format(
                field_name,
                &format!("Invalid RFC3339 format: {}", s),
            ))
        })
}

pub(crate) fn parse_optional_datetime(
    s: &Option<String>,
    field_name: &str,
) -> DomainResult<Option<DateTime<Utc>>> {
    match s {
        Some(dt_str) => parse_required_datetime(dt_str, field_name).map(Some),
        None => Ok(None),
    }
}

impl CampRow {
    /// Convert database row to domain entity
    pub fn into_entity(self) -> DomainResult<Camp> {
        Ok(Camp {
            id: parse_required_uuid(&self.id, "id")?,
            name: self.name,
            season: self.season,
            start_date: self.start_date,
            end_date: self.end_date,
            location: self.location,
            description: self.description,
            base_fee: parse_decimal(&self.base_fee, "base_fee")?,
            capacity: self.capacity,
            status: self.status,
            created_at: parse_required_datetime(&self.created_at, "created_at")?,
            updated_at: parse_required_datetime(&self.updated_at, "updated_at")?,
            created_by_user_id: parse_optional_uuid(&self.created_by_user_id, "created_by_user_id")?,
            updated_by_user_id: parse_optional_uuid(&self.updated_by_user_id, "updated_by_user_id")?,
            deleted_at: parse_optional_datetime(&self.deleted_at, "deleted_at")?,
            deleted_by_user_id: parse_optional_uuid(&self.deleted_by_user_id, "deleted_by_user_id")?,
        })
    }
}

/// CampResponse DTO - used as the API response for a camp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampResponse {
    pub id: Uuid,
    pub name: String,
    pub season: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub base_fee: Decimal,
    pub capacity: Option<i64>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    /// Present when batches are included
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batches: Option<Vec<CampBatchResponse>>,
    /// Present when enrollment counts are included
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_count: Option<i64>,
}

impl From<Camp> for CampResponse {
    fn from(c: Camp) -> Self {
        Self {
            id: c.id,
            name: c.name,
            season: c.season,
            start_date: c.start_date,
            end_date: c.end_date,
            location: c.location,
            description: c.description,
            base_fee: c.base_fee,
            capacity: c.capacity,
            status: c.status,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
            batches: None,
            enrollment_count: None,
        }
    }
}

/// CampBatch entity - a scheduled training batch within a camp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampBatch {
    pub id: Uuid,
    pub camp_id: Uuid,
    pub name: String,
    /// Comma-separated weekday labels, e.g. "mon,wed,fri"
    pub schedule_days: Option<String>,
    /// HH:MM, 24h
    pub start_time: Option<String>,
    /// HH:MM, 24h
    pub end_time: Option<String>,
    pub capacity: Option<i64>,
    pub coach_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by_user_id: Option<Uuid>,
    pub updated_by_user_id: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by_user_id: Option<Uuid>,
}

impl CampBatch {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// NewCampBatch DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCampBatch {
    pub camp_id: Uuid,
    pub name: String,
    pub schedule_days: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub capacity: Option<i64>,
    pub coach_name: Option<String>,
    pub created_by_user_id: Option<Uuid>,
}

impl Validate for NewCampBatch {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("camp_id", Some(self.camp_id))
            .not_nil()
            .validate()?;
        ValidationBuilder::new("name", Some(self.name.clone()))
            .required()
            .min_length(1)
            .max_length(100)
            .validate()?;
        if let Some(start_time) = &self.start_time {
            common::validate_time_format(start_time, "start_time")?;
        }
        if let Some(end_time) = &self.end_time {
            common::validate_time_format(end_time, "end_time")?;
        }
        if let Some(capacity) = self.capacity {
            ValidationBuilder::new("capacity", Some(capacity))
                .min(1)
                .validate()?;
        }
        Ok(())
    }
}

/// UpdateCampBatch DTO
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCampBatch {
    pub name: Option<String>,
    pub schedule_days: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub capacity: Option<i64>,
    pub coach_name: Option<String>,
    #[serde(skip)]
    pub updated_by_user_id: Uuid,
}

impl Validate for UpdateCampBatch {
    fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            ValidationBuilder::new("name", Some(name.clone()))
                .min_length(1)
                .max_length(100)
                .validate()?;
        }
        if let Some(start_time) = &self.start_time {
            common::validate_time_format(start_time, "start_time")?;
        }
        if let Some(end_time) = &self.end_time {
            common::validate_time_format(end_time, "end_time")?;
        }
        if let Some(capacity) = self.capacity {
            ValidationBuilder::new("capacity", Some(capacity))
                .min(1)
                .validate()?;
        }
        Ok(())
    }
}

/// CampBatchRow - SQLite row representation
#[derive(Debug, Clone, FromRow)]
pub struct CampBatchRow {
    pub id: String,
    pub camp_id: String,
    pub name: String,
    pub schedule_days: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub capacity: Option<i64>,
    pub coach_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub created_by_user_id: Option<String>,
    pub updated_by_user_id: Option<String>,
    pub deleted_at: Option<String>,
    pub deleted_by_user_id: Option<String>,
}

impl CampBatchRow {
    /// Convert database row to domain entity
    pub fn into_entity(self) -> DomainResult<CampBatch> {
        Ok(CampBatch {
            id: parse_required_uuid(&self.id, "id")?,
            camp_id: parse_required_uuid(&self.camp_id, "camp_id")?,
            name: self.name,
            schedule_days: self.schedule_days,
            start_time: self.start_time,
            end_time: self.end_time,
            capacity: self.capacity,
            coach_name: self.coach_name,
            created_at: parse_required_datetime(&self.created_at, "created_at")?,
            updated_at: parse_required_datetime(&self.updated_at, "updated_at")?,
            created_by_user_id: parse_optional_uuid(&self.created_by_user_id, "created_by_user_id")?,
            updated_by_user_id: parse_optional_uuid(&self.updated_by_user_id, "updated_by_user_id")?,
            deleted_at: parse_optional_datetime(&self.deleted_at, "deleted_at")?,
            deleted_by_user_id: parse_optional_uuid(&self.deleted_by_user_id, "deleted_by_user_id")?,
        })
    }
}

/// CampBatchResponse DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampBatchResponse {
    pub id: Uuid,
    pub camp_id: Uuid,
    pub name: String,
    pub schedule_days: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub capacity: Option<i64>,
    pub coach_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CampBatch> for CampBatchResponse {
    fn from(b: CampBatch) -> Self {
        Self {
            id: b.id,
            camp_id: b.camp_id,
            name: b.name,
            schedule_days: b.schedule_days,
            start_time: b.start_time,
            end_time: b.end_time,
            capacity: b.capacity,
            coach_name: b.coach_name,
            created_at: b.created_at.to_rfc3339(),
            updated_at: b.updated_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn valid_new_camp() -> NewCamp {
        NewCamp {
            name: "Summer Camp 2025".to_string(),
            season: Some("Summer 2025".to_string()),
            start_date: "2025-05-01".to_string(),
            end_date: "2025-06-15".to_string(),
            location: Some("Main Ground".to_string()),
            description: None,
            base_fee: dec!(4500.00),
            capacity: Some(80),
            status: Some("OPEN".to_string()),
            created_by_user_id: None,
        }
    }

    #[test]
    fn new_camp_validates() {
        assert!(valid_new_camp().validate().is_ok());

        let mut backwards = valid_new_camp();
        backwards.end_date = "2025-04-01".to_string();
        assert!(backwards.validate().is_err());

        let mut negative_fee = valid_new_camp();
        negative_fee.base_fee = dec!(-1);
        assert!(negative_fee.validate().is_err());

        let mut bad_status = valid_new_camp();
        bad_status.status = Some("RUNNING".to_string());
        assert!(bad_status.validate().is_err());
    }

    #[test]
    fn camp_status_enrollment_gate() {
        assert!(CampStatus::Open.accepts_enrollments());
        assert!(CampStatus::InProgress.accepts_enrollments());
        assert!(!CampStatus::Planned.accepts_enrollments());
        assert!(!CampStatus::Completed.accepts_enrollments());
        assert!(!CampStatus::Cancelled.accepts_enrollments());
    }

    #[test]
    fn batch_time_format_is_checked() {
        let mut batch = NewCampBatch {
            camp_id: Uuid::new_v4(),
            name: "Morning Batch".to_string(),
            schedule_days: Some("mon,wed,fri".to_string()),
            start_time: Some("06:30".to_string()),
            end_time: Some("08:30".to_string()),
            capacity: Some(25),
            coach_name: None,
            created_by_user_id: None,
        };
        assert!(batch.validate().is_ok());

        batch.start_time = Some("6:30am".to_string());
        assert!(batch.validate().is_err());
    }
}
