use crate::domains::assessment::repository::{AssessmentRepository, SqliteAssessmentRepository};
use crate::domains::assessment::service::{AssessmentService, AssessmentServiceImpl};
use crate::domains::camp::repository::{CampRepository, SqliteCampRepository};
use crate::domains::camp::service::{CampService, CampServiceImpl};
use crate::domains::core::dependency_checker::{DependencyChecker, SqliteDependencyChecker};
use crate::domains::enrollment::repository::{EnrollmentRepository, SqliteEnrollmentRepository};
use crate::domains::enrollment::service::{EnrollmentService, EnrollmentServiceImpl};
use crate::domains::player::repository::{PlayerRepository, SqlitePlayerRepository};
use crate::domains::player::service::{PlayerService, PlayerServiceImpl};
use crate::errors::{DbError, ServiceError, ServiceResult};
use lazy_static::lazy_static;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

// Global state definitions
lazy_static! {
    static ref INITIALIZED: AtomicBool = AtomicBool::new(false);
    static ref DB_POOL: Mutex<Option<SqlitePool>> = Mutex::new(None);

    // Core services
    static ref DEPENDENCY_CHECKER: Mutex<Option<Arc<dyn DependencyChecker>>> = Mutex::new(None);

    // Player domain
    static ref PLAYER_REPO: Mutex<Option<Arc<dyn PlayerRepository + Send + Sync>>> =
        Mutex::new(None);
    static ref PLAYER_SERVICE: Mutex<Option<Arc<dyn PlayerService>>> = Mutex::new(None);

    // Assessment domain
    static ref ASSESSMENT_REPO: Mutex<Option<Arc<dyn AssessmentRepository + Send + Sync>>> =
        Mutex::new(None);
    static ref ASSESSMENT_SERVICE: Mutex<Option<Arc<dyn AssessmentService>>> = Mutex::new(None);

    // Camp domain
    static ref CAMP_REPO: Mutex<Option<Arc<dyn CampRepository + Send + Sync>>> = Mutex::new(None);
    static ref CAMP_SERVICE: Mutex<Option<Arc<dyn CampService>>> = Mutex::new(None);

    // Enrollment domain
    static ref ENROLLMENT_REPO: Mutex<Option<Arc<dyn EnrollmentRepository + Send + Sync>>> =
        Mutex::new(None);
    static ref ENROLLMENT_SERVICE: Mutex<Option<Arc<dyn EnrollmentService>>> = Mutex::new(None);
}

fn lock_error(name: &str) -> ServiceError {
    ServiceError::Configuration(format!("Global lock poisoned: {}", name))
}

fn not_initialized(name: &str) -> ServiceError {
    ServiceError::Configuration(format!(
        "{} not initialized - call initialize() first",
        name
    ))
}

/// Initialize the global service registry against the given database path.
/// Safe to call once; repeated calls are a no-op.
pub async fn initialize(db_path: &str) -> ServiceResult<()> {
    if INITIALIZED.load(Ordering::SeqCst) {
        return Ok(());
    }

    println!("🔧 [GLOBALS] Initializing services with database: {}", db_path);

    let options = SqliteConnectOptions::from_str(db_path)
        .map_err(|e| ServiceError::Configuration(format!("Invalid database path: {}", e)))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| {
            ServiceError::Configuration(format!("Failed to open database: {}", e))
        })?;

    wire_services(pool)?;

    INITIALIZED.store(true, Ordering::SeqCst);
    println!("✅ [GLOBALS] Service registry initialized");
    Ok(())
}

/// Build every repository and service against the pool and publish them.
fn wire_services(pool: SqlitePool) -> ServiceResult<()> {
    let dependency_checker: Arc<dyn DependencyChecker> =
        Arc::new(SqliteDependencyChecker::new(pool.clone()));

    let player_repo: Arc<dyn PlayerRepository + Send + Sync> =
        Arc::new(SqlitePlayerRepository::new(pool.clone()));
    let assessment_repo: Arc<dyn AssessmentRepository + Send + Sync> =
        Arc::new(SqliteAssessmentRepository::new(pool.clone()));
    let camp_repo: Arc<dyn CampRepository + Send + Sync> =
        Arc::new(SqliteCampRepository::new(pool.clone()));
    let enrollment_repo: Arc<dyn EnrollmentRepository + Send + Sync> =
        Arc::new(SqliteEnrollmentRepository::new(pool.clone()));

    let player_service: Arc<dyn PlayerService> = Arc::new(PlayerServiceImpl::new(
        pool.clone(),
        player_repo.clone(),
        dependency_checker.clone(),
    ));
    let assessment_service: Arc<dyn AssessmentService> = Arc::new(AssessmentServiceImpl::new(
        pool.clone(),
        assessment_repo.clone(),
        dependency_checker.clone(),
    ));
    let camp_service: Arc<dyn CampService> = Arc::new(CampServiceImpl::new(
        pool.clone(),
        camp_repo.clone(),
        dependency_checker.clone(),
    ));
    let enrollment_service: Arc<dyn EnrollmentService> = Arc::new(EnrollmentServiceImpl::new(
        pool.clone(),
        enrollment_repo.clone(),
        camp_repo.clone(),
        player_repo.clone(),
        dependency_checker.clone(),
    ));

    *DB_POOL.lock().map_err(|_| lock_error("DB_POOL"))? = Some(pool);
    *DEPENDENCY_CHECKER
        .lock()
        .map_err(|_| lock_error("DEPENDENCY_CHECKER"))? = Some(dependency_checker);
    *PLAYER_REPO.lock().map_err(|_| lock_error("PLAYER_REPO"))? = Some(player_repo);
    *PLAYER_SERVICE
        .lock()
        .map_err(|_| lock_error("PLAYER_SERVICE"))? = Some(player_service);
    *ASSESSMENT_REPO
        .lock()
        .map_err(|_| lock_error("ASSESSMENT_REPO"))? = Some(assessment_repo);
    *ASSESSMENT_SERVICE
        .lock()
        .map_err(|_| lock_error("ASSESSMENT_SERVICE"))? = Some(assessment_service);
    *CAMP_REPO.lock().map_err(|_| lock_error("CAMP_REPO"))? = Some(camp_repo);
    *CAMP_SERVICE.lock().map_err(|_| lock_error("CAMP_SERVICE"))? = Some(camp_service);
    *ENROLLMENT_REPO
        .lock()
        .map_err(|_| lock_error("ENROLLMENT_REPO"))? = Some(enrollment_repo);
    *ENROLLMENT_SERVICE
        .lock()
        .map_err(|_| lock_error("ENROLLMENT_SERVICE"))? = Some(enrollment_service);

    Ok(())
}

/// Whether initialize() has completed
pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::SeqCst)
}

/// Get a reference to the SQLite connection pool
pub fn get_db_pool() -> Result<SqlitePool, DbError> {
    DB_POOL
        .lock()
        .map_err(|_| DbError::ConnectionPool("Global lock poisoned: DB_POOL".to_string()))?
        .clone()
        .ok_or_else(|| {
            DbError::ConnectionPool("Database pool not initialized - call initialize() first".to_string())
        })
}

pub fn get_player_service() -> ServiceResult<Arc<dyn PlayerService>> {
    PLAYER_SERVICE
        .lock()
        .map_err(|_| lock_error("PLAYER_SERVICE"))?
        .clone()
        .ok_or_else(|| not_initialized("Player service"))
}

pub fn get_assessment_service() -> ServiceResult<Arc<dyn AssessmentService>> {
    ASSESSMENT_SERVICE
        .lock()
        .map_err(|_| lock_error("ASSESSMENT_SERVICE"))?
        .clone()
        .ok_or_else(|| not_initialized("Assessment service"))
}

pub fn get_camp_service() -> ServiceResult<Arc<dyn CampService>> {
    CAMP_SERVICE
        .lock()
        .map_err(|_| lock_error("CAMP_SERVICE"))?
        .clone()
        .ok_or_else(|| not_initialized("Camp service"))
}

pub fn get_enrollment_service() -> ServiceResult<Arc<dyn EnrollmentService>> {
    ENROLLMENT_SERVICE
        .lock()
        .map_err(|_| lock_error("ENROLLMENT_SERVICE"))?
        .clone()
        .ok_or_else(|| not_initialized("Enrollment service"))
}

pub fn get_dependency_checker() -> ServiceResult<Arc<dyn DependencyChecker>> {
    DEPENDENCY_CHECKER
        .lock()
        .map_err(|_| lock_error("DEPENDENCY_CHECKER"))?
        .clone()
        .ok_or_else(|| not_initialized("Dependency checker"))
}
