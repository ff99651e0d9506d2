pub mod repository;
pub mod service;
pub mod types;

pub use repository::{CampRepository, SqliteCampRepository};
pub use service::{CampInclude, CampService, CampServiceImpl};
pub use types::{Camp, CampBatch, CampResponse, CampStatus, NewCamp, NewCampBatch};
