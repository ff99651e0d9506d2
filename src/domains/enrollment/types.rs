use crate::domains::camp::types::{
    parse_decimal, parse_optional_datetime, parse_optional_uuid, parse_required_datetime,
    parse_required_uuid,
};
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::validation::{common, Validate, ValidationBuilder};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Enrollment status enum with string representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnrollmentStatus {
    Active,
    Cancelled,
    Converted,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Active => "ACTIVE",
            EnrollmentStatus::Cancelled => "CANCELLED",
            EnrollmentStatus::Converted => "CONVERTED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(EnrollmentStatus::Active),
            "CANCELLED" => Some(EnrollmentStatus::Cancelled),
            "CONVERTED" => Some(EnrollmentStatus::Converted),
            _ => None,
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment method enum with string representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Card => "CARD",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CASH" => Some(PaymentMethod::Cash),
            "CARD" => Some(PaymentMethod::Card),
            "UPI" => Some(PaymentMethod::Upi),
            "BANK_TRANSFER" => Some(PaymentMethod::BankTransfer),
            _ => None,
        }
    }
}

/// CampEnrollment entity - a camp student's enrollment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampEnrollment {
    pub id: Uuid,
    pub camp_id: Uuid,
    pub batch_id: Option<Uuid>,
    pub student_name: String,
    /// ISO date format YYYY-MM-DD
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub age_group: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    /// Role the student leans toward; seeds the player record on conversion
    pub preferred_role: Option<String>,
    pub fee_amount: Decimal,
    pub discount_amount: Decimal,
    pub status: String,
    /// Set when the student was converted into a program player
    pub converted_player_id: Option<Uuid>,
    /// ISO date format YYYY-MM-DD
    pub enrolled_on: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by_user_id: Option<Uuid>,
    pub updated_by_user_id: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by_user_id: Option<Uuid>,
}

impl CampEnrollment {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn parsed_status(&self) -> Option<EnrollmentStatus> {
        EnrollmentStatus::from_str(&self.status)
    }

    pub fn is_active(&self) -> bool {
        self.parsed_status() == Some(EnrollmentStatus::Active)
    }

    /// Net amount owed before payments
    pub fn net_fee(&self) -> Decimal {
        self.fee_amount - self.discount_amount
    }
}

/// Outstanding balance: net fee minus everything paid so far. Computed, never
/// stored.
pub fn compute_balance(fee_amount: Decimal, discount_amount: Decimal, total_paid: Decimal) -> Decimal {
    fee_amount - discount_amount - total_paid
}

/// NewCampEnrollment DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCampEnrollment {
    pub camp_id: Uuid,
    pub batch_id: Option<Uuid>,
    pub student_name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub age_group: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub preferred_role: Option<String>,
    /// Defaults to the camp's base fee when absent
    pub fee_amount: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    /// Defaults to today's date when absent
    pub enrolled_on: Option<String>,
    pub created_by_user_id: Option<Uuid>,
}

impl Validate for NewCampEnrollment {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("camp_id", Some(self.camp_id))
            .not_nil()
            .validate()?;
        ValidationBuilder::new("student_name", Some(self.student_name.clone()))
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
        if let Some(age_group) = &self.age_group {
            common::validate_age_group(age_group)?;
        }
        if let Some(phone) = &self.guardian_phone {
            ValidationBuilder::new("guardian_phone", Some(phone.clone()))
                .phone()
                .validate()?;
        }
        if let Some(role) = &self.preferred_role {
            common::validate_player_role(role)?;
        }
        if let Some(fee) = self.fee_amount {
            if fee < Decimal::ZERO {
                return Err(DomainError::Validation(ValidationError::invalid_value(
                    "fee_amount",
                    "cannot be negative",
                )));
            }
        }
        if let Some(discount) = self.discount_amount {
            if discount < Decimal::ZERO {
                return Err(DomainError::Validation(ValidationError::invalid_value(
                    "discount_amount",
                    "cannot be negative",
                )));
            }
        }
        if let Some(enrolled_on) = &self.enrolled_on {
            common::validate_date_format(enrolled_on, "enrolled_on")?;
        }

        Ok(())
    }
}

/// UpdateCampEnrollment DTO - status transitions go through the explicit
/// cancel/convert operations, not through update
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCampEnrollment {
    pub batch_id: Option<Uuid>,
    pub student_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub age_group: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub preferred_role: Option<String>,
    pub fee_amount: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    #[serde(skip)]
    pub updated_by_user_id: Uuid,
}

impl Validate for UpdateCampEnrollment {
    fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.student_name {
            ValidationBuilder::new("student_name", Some(name.clone()))
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
        if let Some(age_group) = &self.age_group {
            common::validate_age_group(age_group)?;
        }
        if let Some(phone) = &self.guardian_phone {
            ValidationBuilder::new("guardian_phone", Some(phone.clone()))
                .phone()
                .validate()?;
        }
        if let Some(role) = &self.preferred_role {
            common::validate_player_role(role)?;
        }
        if let Some(fee) = self.fee_amount {
            if fee < Decimal::ZERO {
                return Err(DomainError::Validation(ValidationError::invalid_value(
                    "fee_amount",
                    "cannot be negative",
                )));
            }
        }
        if let Some(discount) = self.discount_amount {
            if discount < Decimal::ZERO {
                return Err(DomainError::Validation(ValidationError::invalid_value(
                    "discount_amount",
                    "cannot be negative",
                )));
            }
        }

        Ok(())
    }
}

/// EnrollmentRow - SQLite row representation
#[derive(Debug, Clone, FromRow)]
pub struct EnrollmentRow {
    pub id: String,
    pub camp_id: String,
    pub batch_id: Option<String>,
    pub student_name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub age_group: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub preferred_role: Option<String>,
    /// Decimal stored as TEXT
    pub fee_amount: String,
    /// Decimal stored as TEXT
    pub discount_amount: String,
    pub status: String,
    pub converted_player_id: Option<String>,
    pub enrolled_on: String,
    pub created_at: String,
    pub updated_at: String,
    pub created_by_user_id: Option<String>,
    pub updated_by_user_id: Option<String>,
    pub deleted_at: Option<String>,
    pub deleted_by_user_id: Option<String>,
}

impl EnrollmentRow {
    /// Convert database row to domain entity
    pub fn into_entity(self) -> DomainResult<CampEnrollment> {
        Ok(CampEnrollment {
            id: parse_required_uuid(&self.id, "id")?,
            camp_id: parse_required_uuid(&self.camp_id, "camp_id")?,
            batch_id: parse_optional_uuid(&self.batch_id, "batch_id")?,
            student_name: self.student_name,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            age_group: self.age_group,
            guardian_name: self.guardian_name,
            guardian_phone: self.guardian_phone,
            preferred_role: self.preferred_role,
            fee_amount: parse_decimal(&self.fee_amount, "fee_amount")?,
            discount_amount: parse_decimal(&self.discount_amount, "discount_amount")?,
            status: self.status,
            converted_player_id: parse_optional_uuid(
                &self.converted_player_id,
                "converted_player_id",
            )?,
            enrolled_on: self.enrolled_on,
            created_at: parse_required_datetime(&self.created_at, "created_at")?,
            updated_at: parse_required_datetime(&self.updated_at, "updated_at")?,
            created_by_user_id: parse_optional_uuid(&self.created_by_user_id, "created_by_user_id")?,
            updated_by_user_id: parse_optional_uuid(&self.updated_by_user_id, "updated_by_user_id")?,
            deleted_at: parse_optional_datetime(&self.deleted_at, "deleted_at")?,
            deleted_by_user_id: parse_optional_uuid(&self.deleted_by_user_id, "deleted_by_user_id")?,
        })
    }
}

/// CampEnrollmentResponse DTO - entity plus the computed money summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampEnrollmentResponse {
    pub id: Uuid,
    pub camp_id: Uuid,
    pub batch_id: Option<Uuid>,
    pub student_name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub age_group: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub preferred_role: Option<String>,
    pub fee_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_paid: Decimal,
    pub balance: Decimal,
    pub status: String,
    pub converted_player_id: Option<Uuid>,
    pub enrolled_on: String,
    pub created_at: String,
    pub updated_at: String,
}

impl CampEnrollmentResponse {
    pub fn from_entity(e: CampEnrollment, total_paid: Decimal) -> Self {
        let balance = compute_balance(e.fee_amount, e.discount_amount, total_paid);
        Self {
            id: e.id,
            camp_id: e.camp_id,
            batch_id: e.batch_id,
            student_name: e.student_name,
            date_of_birth: e.date_of_birth,
            gender: e.gender,
            age_group: e.age_group,
            guardian_name: e.guardian_name,
            guardian_phone: e.guardian_phone,
            preferred_role: e.preferred_role,
            fee_amount: e.fee_amount,
            discount_amount: e.discount_amount,
            total_paid,
            balance,
            status: e.status,
            converted_player_id: e.converted_player_id,
            enrolled_on: e.enrolled_on,
            created_at: e.created_at.to_rfc3339(),
            updated_at: e.updated_at.to_rfc3339(),
        }
    }
}

/// One attendance record: one enrollment on one date. Re-marking the same
/// date replaces the earlier record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub enrollment_id: Uuid,
    /// ISO date format YYYY-MM-DD
    pub attendance_date: String,
    pub present: bool,
    pub notes: Option<String>,
    pub marked_by_user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// AttendanceRow - SQLite row representation
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceRow {
    pub id: String,
    pub enrollment_id: String,
    pub attendance_date: String,
    pub present: i64,
    pub notes: Option<String>,
    pub marked_by_user_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl AttendanceRow {
    pub fn into_entity(self) -> DomainResult<AttendanceRecord> {
        Ok(AttendanceRecord {
            id: parse_required_uuid(&self.id, "id")?,
            enrollment_id: parse_required_uuid(&self.enrollment_id, "enrollment_id")?,
            attendance_date: self.attendance_date,
            present: self.present != 0,
            notes: self.notes,
            marked_by_user_id: parse_optional_uuid(&self.marked_by_user_id, "marked_by_user_id")?,
            created_at: parse_required_datetime(&self.created_at, "created_at")?,
            updated_at: parse_required_datetime(&self.updated_at, "updated_at")?,
        })
    }
}

/// One student's mark within a bulk attendance submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceMark {
    pub enrollment_id: Uuid,
    pub present: bool,
    pub notes: Option<String>,
}

/// Bulk attendance submission: a whole batch on one date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkAttendance {
    pub batch_id: Uuid,
    /// ISO date format YYYY-MM-DD
    pub attendance_date: String,
    pub marks: Vec<AttendanceMark>,
}

impl Validate for BulkAttendance {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("batch_id", Some(self.batch_id))
            .not_nil()
            .validate()?;
        common::validate_date_format(&self.attendance_date, "attendance_date")?;
        if self.marks.is_empty() {
            return Err(DomainError::Validation(ValidationError::required("marks")));
        }
        Ok(())
    }
}

/// CampPayment entity - one recorded payment against an enrollment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampPayment {
    pub id: Uuid,
    pub enrollment_id: Uuid,
    pub amount: Decimal,
    /// ISO date format YYYY-MM-DD
    pub payment_date: String,
    pub method: String,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub recorded_by_user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by_user_id: Option<Uuid>,
}

/// PaymentRow - SQLite row representation
#[derive(Debug, Clone, FromRow)]
pub struct PaymentRow {
    pub id: String,
    pub enrollment_id: String,
    /// Decimal stored as TEXT
    pub amount: String,
    pub payment_date: String,
    pub method: String,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub recorded_by_user_id: Option<String>,
    pub created_at: String,
    pub deleted_at: Option<String>,
    pub deleted_by_user_id: Option<String>,
}

impl PaymentRow {
    pub fn into_entity(self) -> DomainResult<CampPayment> {
        Ok(CampPayment {
            id: parse_required_uuid(&self.id, "id")?,
            enrollment_id: parse_required_uuid(&self.enrollment_id, "enrollment_id")?,
            amount: parse_decimal(&self.amount, "amount")?,
            payment_date: self.payment_date,
            method: self.method,
            reference: self.reference,
            notes: self.notes,
            recorded_by_user_id: parse_optional_uuid(
                &self.recorded_by_user_id,
                "recorded_by_user_id",
            )?,
            created_at: parse_required_datetime(&self.created_at, "created_at")?,
            deleted_at: parse_optional_datetime(&self.deleted_at, "deleted_at")?,
            deleted_by_user_id: parse_optional_uuid(&self.deleted_by_user_id, "deleted_by_user_id")?,
        })
    }
}

/// NewCampPayment DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCampPayment {
    pub enrollment_id: Uuid,
    pub amount: Decimal,
    /// Defaults to today's date when absent
    pub payment_date: Option<String>,
    pub method: String,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

impl Validate for NewCampPayment {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("enrollment_id", Some(self.enrollment_id))
            .not_nil()
            .validate()?;
        if self.amount <= Decimal::ZERO {
            return Err(DomainError::Validation(ValidationError::invalid_value(
                "amount",
                "must be greater than zero",
            )));
        }
        if let Some(payment_date) = &self.payment_date {
            common::validate_date_format(payment_date, "payment_date")?;
        }
        common::validate_payment_method(&self.method)?;
        Ok(())
    }
}

/// CampPaymentResponse DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampPaymentResponse {
    pub id: Uuid,
    pub enrollment_id: Uuid,
    pub amount: Decimal,
    pub payment_date: String,
    pub method: String,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<CampPayment> for CampPaymentResponse {
    fn from(p: CampPayment) -> Self {
        Self {
            id: p.id,
            enrollment_id: p.enrollment_id,
            amount: p.amount,
            payment_date: p.payment_date,
            method: p.method,
            reference: p.reference,
            notes: p.notes,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn balance_is_fee_minus_discount_minus_paid() {
        assert_eq!(
            compute_balance(dec!(4500), dec!(500), dec!(1000)),
            dec!(3000)
        );
        assert_eq!(compute_balance(dec!(4500), dec!(0), dec!(0)), dec!(4500));
        assert_eq!(
            compute_balance(dec!(4500), dec!(0), dec!(4500)),
            Decimal::ZERO
        );
    }

    #[test]
    fn new_payment_validates_amount_and_method() {
        let mut payment = NewCampPayment {
            enrollment_id: Uuid::new_v4(),
            amount: dec!(1500),
            payment_date: Some("2025-05-10".to_string()),
            method: "UPI".to_string(),
            reference: Some("TXN123".to_string()),
            notes: None,
        };
        assert!(payment.validate().is_ok());

        payment.amount = Decimal::ZERO;
        assert!(payment.validate().is_err());

        payment.amount = dec!(100);
        payment.method = "CHEQUE".to_string();
        assert!(payment.validate().is_err());
    }

    #[test]
    fn bulk_attendance_requires_marks() {
        let empty = BulkAttendance {
            batch_id: Uuid::new_v4(),
            attendance_date: "2025-05-10".to_string(),
            marks: vec![],
        };
        assert!(empty.validate().is_err());

        let ok = BulkAttendance {
            batch_id: Uuid::new_v4(),
            attendance_date: "2025-05-10".to_string(),
            marks: vec![AttendanceMark {
                enrollment_id: Uuid::new_v4(),
                present: true,
                notes: None,
            }],
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn enrollment_status_round_trips() {
        for status in [
            EnrollmentStatus::Active,
            EnrollmentStatus::Cancelled,
            EnrollmentStatus::Converted,
        ] {
            assert_eq!(EnrollmentStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(EnrollmentStatus::from_str("WAITLISTED"), None);
    }
}
