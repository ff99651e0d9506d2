use serde::{Deserialize, Serialize};

// --- User Role Definition ---

/// UserRole enum for authorization in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    HeadCoach,
    Coach,
}

// --- Permission Enum Definition ---

/// Permission enum representing individual permissions in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    // User management
    ManageUsers,

    // Player permissions
    ViewPlayers,
    EditPlayers,
    CreatePlayers,
    DeletePlayers,

    // Assessment permissions
    ViewAssessments,
    EditAssessments,
    CreateAssessments,
    DeleteAssessments,

    // Camp permissions
    ViewCamps,
    EditCamps,
    CreateCamps,
    DeleteCamps,

    // Enrollment permissions
    ViewEnrollments,
    EditEnrollments,
    CreateEnrollments,
    DeleteEnrollments,

    // Camp operations
    RecordAttendance,
    RecordPayments,
    ConvertCampStudents,

    // System permissions
    ViewAuditLogs,
    ConfigureSystem,

    // Special permissions
    DeleteRecord,
    HardDeleteRecord,
    HardDeleteRecordWithDependencies,
}

// --- UserRole Implementation ---

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::HeadCoach => "head_coach",
            UserRole::Coach => "coach",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(UserRole::Admin),
            "head_coach" => Some(UserRole::HeadCoach),
            "coach" => Some(UserRole::Coach),
            _ => None,
        }
    }

    /// Check if the user has a specific permission
    pub fn has_permission(&self, permission: Permission) -> bool {
        match self {
            UserRole::Admin => true, // Admin has all permissions
            UserRole::HeadCoach => {
                match permission {
                    // Admin-only permissions - deny HeadCoach
                    Permission::ManageUsers
                    | Permission::ViewAuditLogs
                    | Permission::ConfigureSystem
                    | Permission::HardDeleteRecord
                    | Permission::HardDeleteRecordWithDependencies => false,

                    // Everything else is allowed for HeadCoach
                    _ => true,
                }
            }
            UserRole::Coach => {
                match permission {
                    // Day-to-day coaching work - allow Coach
                    Permission::ViewPlayers
                    | Permission::EditPlayers
                    | Permission::CreatePlayers
                    | Permission::ViewAssessments
                    | Permission::EditAssessments
                    | Permission::CreateAssessments
                    | Permission::ViewCamps
                    | Permission::ViewEnrollments
                    | Permission::EditEnrollments
                    | Permission::CreateEnrollments
                    | Permission::RecordAttendance => true,

                    // Money, conversion, camp setup and anything destructive - deny Coach
                    Permission::DeletePlayers
                    | Permission::DeleteAssessments
                    | Permission::EditCamps
                    | Permission::CreateCamps
                    | Permission::DeleteCamps
                    | Permission::DeleteEnrollments
                    | Permission::RecordPayments
                    | Permission::ConvertCampStudents
                    | Permission::ManageUsers
                    | Permission::ViewAuditLogs
                    | Permission::ConfigureSystem
                    | Permission::DeleteRecord
                    | Permission::HardDeleteRecord
                    | Permission::HardDeleteRecordWithDependencies => false,
                }
            }
        }
    }

    /// Check if the user has all of the specified permissions
    pub fn has_permissions(&self, permissions: &[Permission]) -> bool {
        permissions.iter().all(|p| self.has_permission(*p))
    }

    /// Check if this role can perform any form of hard delete
    pub fn can_hard_delete(&self) -> bool {
        self.has_permission(Permission::HardDeleteRecord)
            || self.has_permission(Permission::HardDeleteRecordWithDependencies)
    }
}

// --- Permission Implementation (String Conversions & Listing) ---

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ManageUsers => "manage_users",
            Permission::ViewPlayers => "view_players",
            Permission::EditPlayers => "edit_players",
            Permission::CreatePlayers => "create_players",
            Permission::DeletePlayers => "delete_players",
            Permission::ViewAssessments => "view_assessments",
            Permission::EditAssessments => "edit_assessments",
            Permission::CreateAssessments => "create_assessments",
            Permission::DeleteAssessments => "delete_assessments",
            Permission::ViewCamps => "view_camps",
            Permission::EditCamps => "edit_camps",
            Permission::CreateCamps => "create_camps",
            Permission::DeleteCamps => "delete_camps",
            Permission::ViewEnrollments => "view_enrollments",
            Permission::EditEnrollments => "edit_enrollments",
            Permission::CreateEnrollments => "create_enrollments",
            Permission::DeleteEnrollments => "delete_enrollments",
            Permission::RecordAttendance => "record_attendance",
            Permission::RecordPayments => "record_payments",
            Permission::ConvertCampStudents => "convert_camp_students",
            Permission::ViewAuditLogs => "view_audit_logs",
            Permission::ConfigureSystem => "configure_system",
            Permission::DeleteRecord => "delete_record",
            Permission::HardDeleteRecord => "hard_delete_record",
            Permission::HardDeleteRecordWithDependencies => {
                "hard_delete_record_with_dependencies"
            }
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "manage_users" => Some(Permission::ManageUsers),
            "view_players" => Some(Permission::ViewPlayers),
            "edit_players" => Some(Permission::EditPlayers),
            "create_players" => Some(Permission::CreatePlayers),
            "delete_players" => Some(Permission::DeletePlayers),
            "view_assessments" => Some(Permission::ViewAssessments),
            "edit_assessments" => Some(Permission::EditAssessments),
            "create_assessments" => Some(Permission::CreateAssessments),
            "delete_assessments" => Some(Permission::DeleteAssessments),
            "view_camps" => Some(Permission::ViewCamps),
            "edit_camps" => Some(Permission::EditCamps),
            "create_camps" => Some(Permission::CreateCamps),
            "delete_camps" => Some(Permission::DeleteCamps),
            "view_enrollments" => Some(Permission::ViewEnrollments),
            "edit_enrollments" => Some(Permission::EditEnrollments),
            "create_enrollments" => Some(Permission::CreateEnrollments),
            "delete_enrollments" => Some(Permission::DeleteEnrollments),
            "record_attendance" => Some(Permission::RecordAttendance),
            "record_payments" => Some(Permission::RecordPayments),
            "convert_camp_students" => Some(Permission::ConvertCampStudents),
            "view_audit_logs" => Some(Permission::ViewAuditLogs),
            "configure_system" => Some(Permission::ConfigureSystem),
            "delete_record" => Some(Permission::DeleteRecord),
            "hard_delete_record" => Some(Permission::HardDeleteRecord),
            "hard_delete_record_with_dependencies" => {
                Some(Permission::HardDeleteRecordWithDependencies)
            }
            _ => None,
        }
    }

    /// Get all permissions in the system
    pub fn all() -> Vec<Permission> {
        vec![
            Permission::ManageUsers,
            Permission::ViewPlayers,
            Permission::EditPlayers,
            Permission::CreatePlayers,
            Permission::DeletePlayers,
            Permission::ViewAssessments,
            Permission::EditAssessments,
            Permission::CreateAssessments,
            Permission::DeleteAssessments,
            Permission::ViewCamps,
            Permission::EditCamps,
            Permission::CreateCamps,
            Permission::DeleteCamps,
            Permission::ViewEnrollments,
            Permission::EditEnrollments,
            Permission::CreateEnrollments,
            Permission::DeleteEnrollments,
            Permission::RecordAttendance,
            Permission::RecordPayments,
            Permission::ConvertCampStudents,
            Permission::ViewAuditLogs,
            Permission::ConfigureSystem,
            Permission::DeleteRecord,
            Permission::HardDeleteRecord,
            Permission::HardDeleteRecordWithDependencies,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_has_every_permission() {
        for p in Permission::all() {
            assert!(UserRole::Admin.has_permission(p), "admin denied {:?}", p);
        }
    }

    #[test]
    fn head_coach_cannot_hard_delete_or_manage_users() {
        assert!(!UserRole::HeadCoach.has_permission(Permission::ManageUsers));
        assert!(!UserRole::HeadCoach.has_permission(Permission::HardDeleteRecord));
        assert!(!UserRole::HeadCoach.can_hard_delete());
        assert!(UserRole::HeadCoach.has_permission(Permission::RecordPayments));
        assert!(UserRole::HeadCoach.has_permission(Permission::ConvertCampStudents));
        assert!(UserRole::HeadCoach.has_permission(Permission::DeleteRecord));
    }

    #[test]
    fn coach_is_limited_to_day_to_day_work() {
        assert!(UserRole::Coach.has_permission(Permission::CreateAssessments));
        assert!(UserRole::Coach.has_permission(Permission::RecordAttendance));
        assert!(!UserRole::Coach.has_permission(Permission::RecordPayments));
        assert!(!UserRole::Coach.has_permission(Permission::ConvertCampStudents));
        assert!(!UserRole::Coach.has_permission(Permission::CreateCamps));
        assert!(!UserRole::Coach.has_permission(Permission::DeleteRecord));
    }

    #[test]
    fn role_round_trips_through_strings() {
        for role in [UserRole::Admin, UserRole::HeadCoach, UserRole::Coach] {
            assert_eq!(UserRole::from_str(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::from_str("groundskeeper"), None);
    }
}
