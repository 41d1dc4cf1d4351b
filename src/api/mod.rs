use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::{delete, patch, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::*;
use crate::planner::{PlanProgress, ValidationResult};
use crate::services::{OnboardingResult, PlanView};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/catalog/courses", get(list_courses))
        .route("/catalog/majors", get(list_majors))
        .route("/students", post(create_student))
        .route("/students/{id}", get(get_student))
        .route("/students/{id}/preferences", patch(update_preferences))
        .route("/students/{id}/plan", post(create_plan))
        .route("/students/{id}/feasibility", get(feasibility))
        .route("/plans", get(list_plans))
        .route("/plans/{id}", get(get_plan).patch(rename_plan).delete(delete_plan))
        .route("/plans/{id}/regenerate", post(regenerate_plan))
        .route("/plans/{id}/validation", get(validate_plan))
        .route("/plans/{id}/progress", get(plan_progress))
        .route("/plans/{id}/semesters/{semester_id}/courses", post(add_course))
        .route(
            "/plans/{id}/semesters/{semester_id}/courses/{course_id}",
            delete(remove_course),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

#[derive(Deserialize)]
struct CourseFilter {
    category: Option<String>,
}

async fn list_courses(
    State(state): State<AppState>,
    Query(filter): Query<CourseFilter>,
) -> Json<Vec<Course>> {
    let courses = match filter.category.as_deref() {
        Some(category) => state.catalog.courses_in_category(category).cloned().collect(),
        None => state.catalog.courses().to_vec(),
    };
    Json(courses)
}

async fn list_majors(State(state): State<AppState>) -> Json<Vec<Major>> {
    Json(state.catalog.majors().to_vec())
}

async fn create_student(
    State(state): State<AppState>,
    Json(req): Json<NewStudentRequest>,
) -> Result<(StatusCode, Json<OnboardingResult>), AppError> {
    let result = state.onboarding().onboard(req).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Student>, AppError> {
    Ok(Json(state.onboarding().get_student(&id).await?))
}

async fn update_preferences(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePreferencesRequest>,
) -> Result<Json<Student>, AppError> {
    Ok(Json(state.onboarding().update_preferences(&id, req).await?))
}

#[derive(Serialize)]
struct FeasibilityResponse {
    analysis: String,
}

async fn feasibility(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FeasibilityResponse>, AppError> {
    let analysis = state.onboarding().feasibility(&id).await?;
    Ok(Json(FeasibilityResponse { analysis }))
}

async fn create_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<PlanView>), AppError> {
    let view = state.planning().create_plan_for_student(&id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn list_plans(State(state): State<AppState>) -> Result<Json<Vec<AcademicPlan>>, AppError> {
    Ok(Json(state.planning().list_plans().await?))
}

async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlanView>, AppError> {
    Ok(Json(state.planning().get_plan(&id).await?))
}

async fn rename_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RenamePlanRequest>,
) -> Result<Json<PlanView>, AppError> {
    Ok(Json(state.planning().rename_plan(&id, &req.name).await?))
}

async fn delete_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.planning().delete_plan(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn regenerate_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlanView>, AppError> {
    Ok(Json(state.planning().regenerate_plan(&id).await?))
}

async fn validate_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ValidationResult>, AppError> {
    let view = state.planning().get_plan(&id).await?;
    Ok(Json(view.validation))
}

async fn plan_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlanProgress>, AppError> {
    Ok(Json(state.planning().progress(&id).await?))
}

async fn add_course(
    State(state): State<AppState>,
    Path((id, semester_id)): Path<(String, String)>,
    Json(req): Json<AddCourseRequest>,
) -> Result<Json<PlanView>, AppError> {
    let view = state
        .planning()
        .add_course(&id, &semester_id, &req.course_code)
        .await?;
    Ok(Json(view))
}

async fn remove_course(
    State(state): State<AppState>,
    Path((id, semester_id, course_id)): Path<(String, String, String)>,
) -> Result<Json<PlanView>, AppError> {
    let view = state
        .planning()
        .remove_course(&id, &semester_id, &course_id)
        .await?;
    Ok(Json(view))
}
