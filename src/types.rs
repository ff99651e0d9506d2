use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export UserRole and Permission from the permission module
pub use crate::domains::permission::{Permission, UserRole};

/// Common timestamp fields used across entities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Common authorship fields used across entities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Authorship {
    pub created_by_user_id: Option<Uuid>,
    pub updated_by_user_id: Option<Uuid>,
    pub deleted_by_user_id: Option<Uuid>,
}

/// Audit log action type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditLogAction {
    Create,
    Update,
    Delete,
    HardDelete,
    AttendanceRecorded,
    PaymentRecorded,
    EnrollmentConverted,
    PermissionDenied,
}

impl AuditLogAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditLogAction::Create => "create",
            AuditLogAction::Update => "update",
            AuditLogAction::Delete => "delete",
            AuditLogAction::HardDelete => "hard_delete",
            AuditLogAction::AttendanceRecorded => "attendance_recorded",
            AuditLogAction::PaymentRecorded => "payment_recorded",
            AuditLogAction::EnrollmentConverted => "enrollment_converted",
            AuditLogAction::PermissionDenied => "permission_denied",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "create" => Some(AuditLogAction::Create),
            "update" => Some(AuditLogAction::Update),
            "delete" => Some(AuditLogAction::Delete),
            "hard_delete" => Some(AuditLogAction::HardDelete),
            "attendance_recorded" => Some(AuditLogAction::AttendanceRecorded),
            "payment_recorded" => Some(AuditLogAction::PaymentRecorded),
            "enrollment_converted" => Some(AuditLogAction::EnrollmentConverted),
            "permission_denied" => Some(AuditLogAction::PermissionDenied),
            _ => None,
        }
    }
}

/// Pagination parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: u32,
    pub per_page: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

/// Paginated result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total: u64, params: PaginationParams) -> Self {
        let total_pages = (total as f64 / params.per_page as f64).ceil() as u32;
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
            total_pages,
        }
    }
}
