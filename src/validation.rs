use crate::errors::{DomainError, DomainResult, ValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::{query_scalar, SqlitePool};
use std::sync::OnceLock;
use uuid::Uuid;

/// A trait that entities should implement for validation.
pub trait Validate {
    /// Validates the entity and returns an error if validation fails.
    fn validate(&self) -> DomainResult<()>;
}

// Common regex patterns
fn phone_regex() -> &'static Regex {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    PHONE_REGEX.get_or_init(|| Regex::new(r"^\+?[0-9]{8,15}$").unwrap())
}

fn uuid_regex() -> &'static Regex {
    static UUID_REGEX: OnceLock<Regex> = OnceLock::new();
    UUID_REGEX.get_or_init(|| {
        Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
    })
}

fn time_regex() -> &'static Regex {
    static TIME_REGEX: OnceLock<Regex> = OnceLock::new();
    TIME_REGEX.get_or_init(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").unwrap())
}

/// Struct for configuring validations in a fluent style
#[derive(Default)]
pub struct ValidationBuilder<T> {
    field_name: String,
    value: Option<T>,
    errors: Vec<ValidationError>,
}

/// Generic validation implementations
impl<T> ValidationBuilder<T> {
    pub fn new(field_name: &str, value: Option<T>) -> Self {
        Self {
            field_name: field_name.to_string(),
            value,
            errors: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self
    where
        T: Default + PartialEq,
    {
        if self.value.is_none() || self.value == Some(T::default()) {
            self.errors.push(ValidationError::required(&self.field_name));
        }
        self
    }

    pub fn validate_with<F>(mut self, validator: F) -> Self
    where
        F: FnOnce(&T) -> Result<(), ValidationError>,
        T: Clone,
    {
        if let Some(value) = &self.value {
            if let Err(err) = validator(value) {
                self.errors.push(err);
            }
        }
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> DomainResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            // Return the first error for simplicity
            Err(DomainError::Validation(self.errors[0].clone()))
        }
    }
}

/// String-specific validations
impl ValidationBuilder<String> {
    pub fn min_length(mut self, min: usize) -> Self {
        if let Some(value) = &self.value {
            if value.len() < min {
                self.errors
                    .push(ValidationError::min_length(&self.field_name, min));
            }
        }
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        if let Some(value) = &self.value {
            if value.len() > max {
                self.errors
                    .push(ValidationError::max_length(&self.field_name, max));
            }
        }
        self
    }

    pub fn matches_pattern(mut self, pattern: &Regex, message: &str) -> Self {
        if let Some(value) = &self.value {
            if !pattern.is_match(value) {
                self.errors
                    .push(ValidationError::format(&self.field_name, message));
            }
        }
        self
    }

    pub fn phone(self) -> Self {
        self.matches_pattern(phone_regex(), "must be a valid phone number")
    }

    pub fn uuid_string(self) -> Self {
        self.matches_pattern(uuid_regex(), "must be a valid UUID")
    }

    pub fn one_of(mut self, allowed_values: &[&str], message: Option<&str>) -> Self {
        if let Some(value) = &self.value {
            if !allowed_values.contains(&value.as_str()) {
                let reason = message.unwrap_or("must be one of the allowed values");
                self.errors
                    .push(ValidationError::invalid_value(&self.field_name, reason));
            }
        }
        self
    }
}

/// Numeric validations
impl<T> ValidationBuilder<T>
where
    T: PartialOrd + Clone + std::fmt::Display,
{
    pub fn min(mut self, min: T) -> Self {
        if let Some(value) = &self.value {
            if value < &min {
                self.errors.push(ValidationError::range(
                    &self.field_name,
                    min.to_string(),
                    "maximum".to_string(),
                ));
            }
        }
        self
    }

    pub fn max(mut self, max: T) -> Self {
        if let Some(value) = &self.value {
            if value > &max {
                self.errors.push(ValidationError::range(
                    &self.field_name,
                    "minimum".to_string(),
                    max.to_string(),
                ));
            }
        }
        self
    }

    pub fn range(mut self, min: T, max: T) -> Self {
        if let Some(value) = &self.value {
            if value < &min || value > &max {
                self.errors.push(ValidationError::range(
                    &self.field_name,
                    min.to_string(),
                    max.to_string(),
                ));
            }
        }
        self
    }
}

/// DateTime validation helpers
impl ValidationBuilder<DateTime<Utc>> {
    pub fn not_in_future(mut self) -> Self {
        if let Some(value) = &self.value {
            let now = Utc::now();
            if value > &now {
                self.errors.push(ValidationError::invalid_value(
                    &self.field_name,
                    "cannot be in the future",
                ));
            }
        }
        self
    }
}

/// UUID validation helpers
impl ValidationBuilder<Uuid> {
    pub fn not_nil(mut self) -> Self {
        if let Some(value) = &self.value {
            if *value == Uuid::nil() {
                self.errors.push(ValidationError::invalid_value(
                    &self.field_name,
                    "cannot be a nil UUID",
                ));
            }
        }
        self
    }
}

/// Uniqueness validation helper (relies on database access)
pub async fn validate_unique(
    pool: &SqlitePool,
    table: &str,
    field: &str,
    value: &str,
    exclude_id: Option<&str>,
    field_name: &str,
) -> DomainResult<()> {
    let query = match exclude_id {
        Some(_) => format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ? AND id != ? AND deleted_at IS NULL",
            table, field
        ),
        None => format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ? AND deleted_at IS NULL",
            table, field
        ),
    };

    let count: i64 = match exclude_id {
        Some(id) => query_scalar(&query)
            .bind(value)
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(|e| DomainError::Database(e.into()))?,
        None => query_scalar(&query)
            .bind(value)
            .fetch_one(pool)
            .await
            .map_err(|e| DomainError::Database(e.into()))?,
    };

    if count > 0 {
        return Err(DomainError::Validation(ValidationError::unique(field_name)));
    }

    Ok(())
}

/// Validation utility for checking entity exists in the database
pub async fn validate_entity_exists(
    pool: &SqlitePool,
    table: &str,
    id: &Uuid,
    field_name: &str,
) -> DomainResult<()> {
    let query = format!(
        "SELECT COUNT(*) FROM {} WHERE id = ? AND deleted_at IS NULL",
        table
    );

    let count: i64 = query_scalar(&query)
        .bind(id.to_string())
        .fetch_one(pool)
        .await
        .map_err(|e| DomainError::Database(e.into()))?;

    if count == 0 {
        return Err(DomainError::Validation(ValidationError::relationship(
            &format!("{} does not exist", field_name),
        )));
    }

    Ok(())
}

/// Strongly typed wrapper models for validated input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoneNumber(pub String);

impl PhoneNumber {
    pub fn new(phone: &str) -> Result<Self, ValidationError> {
        if phone_regex().is_match(phone) {
            Ok(PhoneNumber(phone.to_string()))
        } else {
            Err(ValidationError::format(
                "phone",
                "must be a valid phone number",
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NonEmptyString(pub String);

impl NonEmptyString {
    pub fn new(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            Ok(NonEmptyString(trimmed.to_string()))
        } else {
            Err(ValidationError::required("value"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Common validation utility module for frequently validated entities
pub mod common {
    use super::*;

    pub async fn validate_player_exists(
        pool: &SqlitePool,
        player_id: &Uuid,
        field_name: &str,
    ) -> DomainResult<()> {
        validate_entity_exists(pool, "players", player_id, field_name).await
    }

    pub async fn validate_camp_exists(
        pool: &SqlitePool,
        camp_id: &Uuid,
        field_name: &str,
    ) -> DomainResult<()> {
        validate_entity_exists(pool, "camps", camp_id, field_name).await
    }

    pub async fn validate_batch_exists(
        pool: &SqlitePool,
        batch_id: &Uuid,
        field_name: &str,
    ) -> DomainResult<()> {
        validate_entity_exists(pool, "camp_batches", batch_id, field_name).await
    }

    pub async fn validate_enrollment_exists(
        pool: &SqlitePool,
        enrollment_id: &Uuid,
        field_name: &str,
    ) -> DomainResult<()> {
        validate_entity_exists(pool, "camp_enrollments", enrollment_id, field_name).await
    }

    pub fn validate_player_role(role: &str) -> DomainResult<()> {
        ValidationBuilder::new("player_role", Some(role.to_string()))
            .one_of(
                &["BATSMEN", "BOWLER", "ALL_ROUNDER", "WICKET_KEEPER"],
                None,
            )
            .validate()
    }

    pub fn validate_assessment_type(assessment_type: &str) -> DomainResult<()> {
        ValidationBuilder::new("assessment_type", Some(assessment_type.to_string()))
            .one_of(&["WEEKLY", "MONTHLY", "FOLLOW_UP", "CUSTOM"], None)
            .validate()
    }

    pub fn validate_assessment_status(status: &str) -> DomainResult<()> {
        ValidationBuilder::new("status", Some(status.to_string()))
            .one_of(&["DRAFT", "COMPLETED"], None)
            .validate()
    }

    pub fn validate_rating_value(rating: &str) -> DomainResult<()> {
        ValidationBuilder::new("rating", Some(rating.to_string()))
            .one_of(
                &["NEEDS_WORK", "DEVELOPING", "GOOD", "EXCELLENT"],
                None,
            )
            .validate()
    }

    pub fn validate_age_group(age_group: &str) -> DomainResult<()> {
        ValidationBuilder::new("age_group", Some(age_group.to_string()))
            .one_of(
                &[
                    "under_10", "under_12", "under_14", "under_16", "under_19", "senior",
                ],
                None,
            )
            .validate()
    }

    pub fn validate_gender(gender: &str) -> DomainResult<()> {
        ValidationBuilder::new("gender", Some(gender.to_string()))
            .one_of(&["male", "female", "other"], None)
            .validate()
    }

    pub fn validate_camp_status(status: &str) -> DomainResult<()> {
        ValidationBuilder::new("status", Some(status.to_string()))
            .one_of(
                &[
                    "PLANNED",
                    "OPEN",
                    "IN_PROGRESS",
                    "COMPLETED",
                    "CANCELLED",
                ],
                None,
            )
            .validate()
    }

    pub fn validate_enrollment_status(status: &str) -> DomainResult<()> {
        ValidationBuilder::new("status", Some(status.to_string()))
            .one_of(&["ACTIVE", "CANCELLED", "CONVERTED"], None)
            .validate()
    }

    pub fn validate_payment_method(method: &str) -> DomainResult<()> {
        ValidationBuilder::new("method", Some(method.to_string()))
            .one_of(&["CASH", "CARD", "UPI", "BANK_TRANSFER"], None)
            .validate()
    }

    pub fn validate_date_format(date_str: &str, field_name: &str) -> DomainResult<()> {
        match NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
            Ok(_) => Ok(()),
            Err(_) => Err(DomainError::Validation(ValidationError::format(
                field_name,
                "must be in the format YYYY-MM-DD",
            ))),
        }
    }

    pub fn validate_time_format(time_str: &str, field_name: &str) -> DomainResult<()> {
        if time_regex().is_match(time_str) {
            Ok(())
        } else {
            Err(DomainError::Validation(ValidationError::format(
                field_name,
                "must be in the format HH:MM",
            )))
        }
    }

    pub fn validate_iso8601_datetime(date_str: &str, field_name: &str) -> DomainResult<()> {
        match DateTime::parse_from_rfc3339(date_str) {
            Ok(_) => Ok(()),
            Err(_) => Err(DomainError::Validation(ValidationError::format(
                field_name,
                "must be in ISO 8601 format (YYYY-MM-DDTHH:MM:SS.sssZ)",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_validation() {
        assert!(phone_regex().is_match("9876543210"));
        assert!(phone_regex().is_match("+919876543210"));
        assert!(!phone_regex().is_match("123"));
        assert!(!phone_regex().is_match("abcdefghij"));

        assert!(PhoneNumber::new("9876543210").is_ok());
        assert!(PhoneNumber::new("123").is_err());
    }

    #[test]
    fn test_non_empty_string() {
        assert!(NonEmptyString::new("hello").is_ok());
        assert!(NonEmptyString::new("   hello   ").is_ok());
        assert!(NonEmptyString::new("").is_err());
        assert!(NonEmptyString::new("   ").is_err());
    }

    #[test]
    fn test_validation_builder() {
        let result = ValidationBuilder::new("name", Some("".to_string()))
            .required()
            .validate();
        assert!(result.is_err());

        let result = ValidationBuilder::new("name", Some("test".to_string()))
            .required()
            .min_length(5)
            .validate();
        assert!(result.is_err());

        let result = ValidationBuilder::new("capacity", Some(15))
            .min(20)
            .validate();
        assert!(result.is_err());

        let result = ValidationBuilder::new("capacity", Some(25))
            .range(1, 200)
            .validate();
        assert!(result.is_ok());

        let value: Option<String> = None;
        let result = ValidationBuilder::new("name", value).required().validate();
        assert!(result.is_err());
    }

    #[test]
    fn test_common_validations() {
        assert!(common::validate_player_role("BATSMEN").is_ok());
        assert!(common::validate_player_role("ALL_ROUNDER").is_ok());
        assert!(common::validate_player_role("batsmen").is_err());

        assert!(common::validate_assessment_type("WEEKLY").is_ok());
        assert!(common::validate_assessment_type("ANNUAL").is_err());

        assert!(common::validate_rating_value("EXCELLENT").is_ok());
        assert!(common::validate_rating_value("AMAZING").is_err());

        assert!(common::validate_age_group("under_14").is_ok());
        assert!(common::validate_age_group("unknown").is_err());

        assert!(common::validate_camp_status("OPEN").is_ok());
        assert!(common::validate_camp_status("open").is_err());

        assert!(common::validate_payment_method("UPI").is_ok());
        assert!(common::validate_payment_method("CHEQUE").is_err());

        assert!(common::validate_date_format("2025-06-01", "date").is_ok());
        assert!(common::validate_date_format("01/06/2025", "date").is_err());

        assert!(common::validate_time_format("16:30", "start_time").is_ok());
        assert!(common::validate_time_format("24:10", "start_time").is_err());

        assert!(common::validate_iso8601_datetime("2025-06-01T12:00:00Z", "datetime").is_ok());
        assert!(common::validate_iso8601_datetime("2025-06-01", "datetime").is_err());
    }
}
