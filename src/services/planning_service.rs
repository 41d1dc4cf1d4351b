use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::db::repository;
use crate::error::AppError;
use crate::models::{AcademicPlan, AiRecommendations, Course, Student};
use crate::planner::{self, EditOutcome, PlanProgress, ValidationResult, validator};

/// A plan together with its current validation.
#[derive(Debug, Clone, Serialize)]
pub struct PlanView {
    pub plan: AcademicPlan,
    pub validation: ValidationResult,
    /// Courses the generator could not fit, if this view came from generation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unplaced: Vec<Course>,
}

/// One async mutex per plan id. Mutations hold the guard across
/// load, edit and save so overlapping requests apply one after another.
#[derive(Clone, Default)]
pub struct PlanLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl PlanLocks {
    pub async fn lock(&self, plan_id: &str) -> OwnedMutexGuard<()> {
        let plan_lock = {
            let mut locks = self.inner.lock().await;
            // Entries nobody holds or waits on are dropped.
            locks.retain(|_, l| Arc::strong_count(l) > 1);
            locks.entry(plan_id.to_string()).or_default().clone()
        };
        plan_lock.lock_owned().await
    }
}

/// Generates, edits, validates and persists plans. Each mutation
/// re-validates and then saves explicitly, serialized per plan id.
#[derive(Clone)]
pub struct PlanningService {
    db: SqlitePool,
    catalog: Arc<Catalog>,
    locks: PlanLocks,
}

impl PlanningService {
    pub fn new(db: SqlitePool, catalog: Arc<Catalog>) -> Self {
        Self::with_locks(db, catalog, PlanLocks::default())
    }

    /// Shares `locks` with every other service built from the same set.
    pub fn with_locks(db: SqlitePool, catalog: Arc<Catalog>, locks: PlanLocks) -> Self {
        Self { db, catalog, locks }
    }

    pub fn validate_plan(&self, plan: &AcademicPlan) -> ValidationResult {
        if !validator::has_major(plan) {
            return ValidationResult::invalid(validator::NO_MAJOR_ISSUE);
        }
        let major = plan.major.as_deref().unwrap_or_default();
        match self.catalog.requirements(major) {
            Some(requirements) => planner::validate(plan, requirements),
            None => ValidationResult::invalid(format!("Unknown major: {}", major)),
        }
    }

    pub async fn get_plan(&self, plan_id: &str) -> Result<PlanView, AppError> {
        let plan = self.load_plan(plan_id).await?;
        let validation = self.validate_plan(&plan);
        Ok(PlanView {
            plan,
            validation,
            unplaced: Vec::new(),
        })
    }

    pub async fn list_plans(&self) -> Result<Vec<AcademicPlan>, AppError> {
        Ok(repository::fetch_plans(&self.db).await?)
    }

    pub async fn delete_plan(&self, plan_id: &str) -> Result<(), AppError> {
        let _guard = self.locks.lock(plan_id).await;
        if repository::delete_plan(&self.db, plan_id).await? {
            info!("Deleted plan {}", plan_id);
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }

    /// Generates the first plan for a student. Fails with `Conflict` if the
    /// student already has one, including when two requests race.
    pub async fn create_plan_for_student(&self, student_id: &str) -> Result<PlanView, AppError> {
        let student = repository::find_student_by_id(&self.db, student_id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.create_plan(&student, None).await
    }

    pub(crate) async fn create_plan(
        &self,
        student: &Student,
        ai_recommendations: Option<AiRecommendations>,
    ) -> Result<PlanView, AppError> {
        if let Some(existing) = repository::find_plan_for_student(&self.db, &student.id).await? {
            return Err(AppError::Conflict(format!(
                "Student {} already has plan {}",
                student.id, existing.id
            )));
        }

        let generated = planner::generate_plan(student, &self.catalog, Utc::now());
        let mut plan = generated.plan;
        plan.ai_recommendations = ai_recommendations;
        log_unplaced(&plan, &generated.unplaced);

        info!(
            "Generated plan {} for student {} ({} semesters, {} credits)",
            plan.id,
            student.id,
            plan.semesters.len(),
            plan.total_credits()
        );
        let student_id = student.id.clone();
        let mut view = self.finish(plan).await.map_err(|e| match e {
            AppError::Database(db_err) if repository::is_unique_violation(&db_err) => {
                AppError::Conflict(format!("Student {} already has a plan", student_id))
            }
            e => e,
        })?;
        view.unplaced = generated.unplaced;
        Ok(view)
    }

    /// Rebuilds the semesters of an existing plan from the owner's current
    /// major and preferences.
    pub async fn regenerate_plan(&self, plan_id: &str) -> Result<PlanView, AppError> {
        let _guard = self.locks.lock(plan_id).await;
        let mut plan = self.load_plan(plan_id).await?;
        let student = repository::find_student_by_id(&self.db, &plan.student_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let unplaced = planner::regenerate(&mut plan, &student, &self.catalog, Utc::now());
        log_unplaced(&plan, &unplaced);
        info!("Regenerated plan {}", plan.id);

        let mut view = self.finish(plan).await?;
        view.unplaced = unplaced;
        Ok(view)
    }

    pub async fn add_course(
        &self,
        plan_id: &str,
        semester_id: &str,
        course_code: &str,
    ) -> Result<PlanView, AppError> {
        let course = self
            .catalog
            .course(course_code.trim())
            .ok_or(AppError::NotFound)?
            .clone();
        let _guard = self.locks.lock(plan_id).await;
        let mut plan = self.load_plan(plan_id).await?;

        match planner::add_course(&mut plan, semester_id, &course, Utc::now()) {
            EditOutcome::SemesterNotFound => Err(AppError::NotFound),
            EditOutcome::Unchanged => self.unchanged(plan),
            EditOutcome::Changed => {
                info!("Added {} to plan {} semester {}", course.code, plan_id, semester_id);
                self.finish(plan).await
            }
        }
    }

    pub async fn remove_course(
        &self,
        plan_id: &str,
        semester_id: &str,
        course_id: &str,
    ) -> Result<PlanView, AppError> {
        let _guard = self.locks.lock(plan_id).await;
        let mut plan = self.load_plan(plan_id).await?;

        match planner::remove_course(&mut plan, semester_id, course_id, Utc::now()) {
            EditOutcome::SemesterNotFound => Err(AppError::NotFound),
            EditOutcome::Unchanged => self.unchanged(plan),
            EditOutcome::Changed => {
                info!("Removed {} from plan {} semester {}", course_id, plan_id, semester_id);
                self.finish(plan).await
            }
        }
    }

    pub async fn rename_plan(&self, plan_id: &str, name: &str) -> Result<PlanView, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Plan name must not be empty".to_string()));
        }
        let _guard = self.locks.lock(plan_id).await;
        let mut plan = self.load_plan(plan_id).await?;
        plan.name = name.to_string();
        plan.last_modified = Utc::now();
        self.finish(plan).await
    }

    pub async fn progress(&self, plan_id: &str) -> Result<PlanProgress, AppError> {
        let plan = self.load_plan(plan_id).await?;
        let major = plan
            .major
            .as_deref()
            .ok_or_else(|| AppError::BadRequest(validator::NO_MAJOR_ISSUE.to_string()))?;
        let requirements = self
            .catalog
            .requirements(major)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown major: {}", major)))?;
        Ok(planner::progress(&plan, requirements))
    }

    async fn load_plan(&self, plan_id: &str) -> Result<AcademicPlan, AppError> {
        repository::find_plan_by_id(&self.db, plan_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    fn unchanged(&self, plan: AcademicPlan) -> Result<PlanView, AppError> {
        let validation = self.validate_plan(&plan);
        Ok(PlanView {
            plan,
            validation,
            unplaced: Vec::new(),
        })
    }

    /// Re-validates, records completeness and saves.
    async fn finish(&self, mut plan: AcademicPlan) -> Result<PlanView, AppError> {
        let validation = self.validate_plan(&plan);
        plan.is_complete = validation.valid;
        let plan = repository::save_plan(&self.db, &plan).await?;
        debug!("Saved plan {} (valid: {})", plan.id, validation.valid);
        Ok(PlanView {
            plan,
            validation,
            unplaced: Vec::new(),
        })
    }
}

fn log_unplaced(plan: &AcademicPlan, unplaced: &[Course]) {
    if !unplaced.is_empty() {
        let codes: Vec<&str> = unplaced.iter().map(|c| c.code.as_str()).collect();
        warn!(
            "Plan {} ran out of semesters; unplaced: {}",
            plan.id,
            codes.join(", ")
        );
    }
}
