use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::db::repository;
use crate::error::AppError;
use crate::models::{
    AiRecommendations, Course, CourseRecommendation, NewStudentRequest, Student,
    UpdatePreferencesRequest,
};
use crate::recommend::{FEASIBILITY_FALLBACK, Recommender};
use crate::services::planning_service::{PlanView, PlanningService};

/// Religion courses are never offered as electives.
const EXCLUDED_CANDIDATE_PREFIX: &str = "REL";

#[derive(Debug, Serialize)]
pub struct OnboardingResult {
    pub student: Student,
    pub plan: PlanView,
    pub recommendations: Vec<CourseRecommendation>,
}

pub struct OnboardingService {
    db: SqlitePool,
    catalog: Arc<Catalog>,
    recommender: Arc<dyn Recommender>,
}

impl OnboardingService {
    pub fn new(db: SqlitePool, catalog: Arc<Catalog>, recommender: Arc<dyn Recommender>) -> Self {
        Self {
            db,
            catalog,
            recommender,
        }
    }

    /// Stores the student, asks for elective suggestions (best effort) and
    /// generates their first plan.
    pub async fn onboard(&self, req: NewStudentRequest) -> Result<OnboardingResult, AppError> {
        let student = self.build_student(req)?;
        repository::insert_student(&self.db, &student).await?;
        info!("Created student {} (major: {:?})", student.id, student.major);

        let recommendations = self.recommendations_for(&student).await;
        let ai_recommendations = (!recommendations.is_empty())
            .then(|| AiRecommendations::from_recommendations(&recommendations));

        let planning = PlanningService::new(self.db.clone(), self.catalog.clone());
        let plan = planning.create_plan(&student, ai_recommendations).await?;

        Ok(OnboardingResult {
            student,
            plan,
            recommendations,
        })
    }

    pub async fn get_student(&self, student_id: &str) -> Result<Student, AppError> {
        repository::find_student_by_id(&self.db, student_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn update_preferences(
        &self,
        student_id: &str,
        req: UpdatePreferencesRequest,
    ) -> Result<Student, AppError> {
        let mut student = self.get_student(student_id).await?;
        let prefs = &mut student.preferences;

        if let Some(max) = req.max_credits_per_semester {
            prefs.max_credits_per_semester = check_credit_cap(max)?;
        }
        if let Some(include_summer) = req.include_summer {
            prefs.include_summer = include_summer;
        }
        if let Some(target) = req.target_graduation {
            prefs.target_graduation = Some(target);
        }
        if let Some(time) = req.preferred_time_of_day {
            prefs.preferred_time_of_day = Some(time);
        }

        repository::update_student(&self.db, &student).await?;
        Ok(student)
    }

    /// Advisory review of the student's planned courses. Never fails because
    /// of the recommendation service.
    pub async fn feasibility(&self, student_id: &str) -> Result<String, AppError> {
        let student = self.get_student(student_id).await?;
        let courses: Vec<Course> = repository::find_plan_for_student(&self.db, student_id)
            .await?
            .map(|plan| plan.courses().cloned().collect())
            .unwrap_or_default();

        match self.recommender.analyze_feasibility(&student, &courses).await {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!("Feasibility analysis failed for {}: {}", student_id, e);
                Ok(FEASIBILITY_FALLBACK.to_string())
            }
        }
    }

    async fn recommendations_for(&self, student: &Student) -> Vec<CourseRecommendation> {
        let candidates: Vec<Course> = self
            .catalog
            .courses()
            .iter()
            .filter(|c| !c.code.starts_with(EXCLUDED_CANDIDATE_PREFIX))
            .cloned()
            .collect();

        match self.recommender.recommend(student, &candidates).await {
            Ok(recommendations) => {
                info!(
                    "Received {} elective recommendations for {}",
                    recommendations.len(),
                    student.id
                );
                recommendations
            }
            Err(e) => {
                warn!("Recommendations unavailable for {}: {}", student.id, e);
                Vec::new()
            }
        }
    }

    fn build_student(&self, req: NewStudentRequest) -> Result<Student, AppError> {
        let major = req.major.filter(|m| !m.trim().is_empty());
        if let Some(major) = &major {
            if self.catalog.major(major).is_none() {
                return Err(AppError::BadRequest(format!("Unknown major: {}", major)));
            }
        }
        let minor = req.minor.filter(|m| !m.trim().is_empty());

        let preferences = req.preferences.unwrap_or_default();
        check_credit_cap(preferences.max_credits_per_semester)?;

        Ok(Student {
            id: uuid::Uuid::new_v4().to_string(),
            name: req
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Student".to_string()),
            email: req.email.unwrap_or_default(),
            major,
            minor,
            start_year: req.start_year.unwrap_or_else(|| Utc::now().year()),
            has_transfer_credits: req.has_transfer_credits,
            completed_courses: req.completed_courses,
            preferences,
            career_goals: req.career_goals,
            interests: req.interests,
        })
    }
}

fn check_credit_cap(max: u32) -> Result<u32, AppError> {
    if max == 0 {
        return Err(AppError::BadRequest(
            "max_credits_per_semester must be positive".to_string(),
        ));
    }
    Ok(max)
}
