pub mod repository;
pub mod service;
pub mod types;

pub use repository::{EnrollmentRepository, SqliteEnrollmentRepository};
pub use service::{EnrollmentService, EnrollmentServiceImpl};
pub use types::{
    AttendanceRecord, BulkAttendance, CampEnrollment, CampEnrollmentResponse, CampPayment,
    EnrollmentStatus, NewCampEnrollment, NewCampPayment, PaymentMethod,
};
