pub mod comparison;
pub mod repository;
pub mod service;
pub mod skills;
pub mod types;

pub use comparison::{compare, SkillComparison, SkillComparisonRow};
pub use repository::{AssessmentRepository, SqliteAssessmentRepository};
pub use service::{AssessmentService, AssessmentServiceImpl};
pub use skills::{
    compute_bmi, RatingValue, SkillEntry, SkillGroupId, SkillSections, SkillTab,
};
pub use types::{Assessment, AssessmentResponse, AssessmentSummary};
