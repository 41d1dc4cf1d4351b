use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, SqlitePool};

use crate::models::{AcademicPlan, AiRecommendations, Preferences, Semester, Student};

#[derive(Debug, FromRow)]
struct PlanRow {
    id: String,
    name: String,
    student_id: String,
    major: Option<String>,
    minor: Option<String>,
    semesters: Json<Vec<Semester>>,
    created_at: DateTime<Utc>,
    last_modified: DateTime<Utc>,
    notes: Option<String>,
    is_complete: bool,
    ai_recommendations: Option<Json<AiRecommendations>>,
}

impl From<PlanRow> for AcademicPlan {
    fn from(row: PlanRow) -> Self {
        AcademicPlan {
            id: row.id,
            name: row.name,
            student_id: row.student_id,
            major: row.major,
            minor: row.minor,
            semesters: row.semesters.0,
            created_at: row.created_at,
            last_modified: row.last_modified,
            notes: row.notes,
            is_complete: row.is_complete,
            ai_recommendations: row.ai_recommendations.map(|j| j.0),
        }
    }
}

#[derive(Debug, FromRow)]
struct StudentRow {
    id: String,
    name: String,
    email: String,
    major: Option<String>,
    minor: Option<String>,
    start_year: i32,
    has_transfer_credits: bool,
    completed_courses: Json<Vec<String>>,
    preferences: Json<Preferences>,
    career_goals: Option<String>,
    interests: Json<Vec<String>>,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Student {
            id: row.id,
            name: row.name,
            email: row.email,
            major: row.major,
            minor: row.minor,
            start_year: row.start_year,
            has_transfer_credits: row.has_transfer_credits,
            completed_courses: row.completed_courses.0,
            preferences: row.preferences.0,
            career_goals: row.career_goals,
            interests: row.interests.0,
        }
    }
}

pub async fn fetch_plans(db: &SqlitePool) -> Result<Vec<AcademicPlan>, sqlx::Error> {
    let rows: Vec<PlanRow> = sqlx::query_as(
        r#"
        SELECT id, name, student_id, major, minor, semesters, created_at,
            last_modified, notes, is_complete, ai_recommendations
        FROM plans
        ORDER BY last_modified DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(AcademicPlan::from).collect())
}

pub async fn find_plan_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<AcademicPlan>, sqlx::Error> {
    let row: Option<PlanRow> = sqlx::query_as(
        r#"
        SELECT id, name, student_id, major, minor, semesters, created_at,
            last_modified, notes, is_complete, ai_recommendations
        FROM plans
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(row.map(AcademicPlan::from))
}

pub async fn find_plan_for_student(
    db: &SqlitePool,
    student_id: &str,
) -> Result<Option<AcademicPlan>, sqlx::Error> {
    let row: Option<PlanRow> = sqlx::query_as(
        r#"
        SELECT id, name, student_id, major, minor, semesters, created_at,
            last_modified, notes, is_complete, ai_recommendations
        FROM plans
        WHERE student_id = ?1
        "#,
    )
    .bind(student_id)
    .fetch_optional(db)
    .await?;

    Ok(row.map(AcademicPlan::from))
}

/// Inserts or replaces the plan by id in one statement. `last_modified` is
/// always set to now; the stored plan is returned. A second plan for the
/// same student fails with a unique-constraint violation.
pub async fn save_plan(db: &SqlitePool, plan: &AcademicPlan) -> Result<AcademicPlan, sqlx::Error> {
    let mut stored = plan.clone();
    stored.last_modified = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO plans
            (id, name, student_id, major, minor, semesters, created_at,
            last_modified, notes, is_complete, ai_recommendations)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            student_id = excluded.student_id,
            major = excluded.major,
            minor = excluded.minor,
            semesters = excluded.semesters,
            created_at = excluded.created_at,
            last_modified = excluded.last_modified,
            notes = excluded.notes,
            is_complete = excluded.is_complete,
            ai_recommendations = excluded.ai_recommendations
        "#,
    )
    .bind(&stored.id)
    .bind(&stored.name)
    .bind(&stored.student_id)
    .bind(&stored.major)
    .bind(&stored.minor)
    .bind(Json(&stored.semesters))
    .bind(stored.created_at)
    .bind(stored.last_modified)
    .bind(&stored.notes)
    .bind(stored.is_complete)
    .bind(stored.ai_recommendations.as_ref().map(Json))
    .execute(db)
    .await?;

    Ok(stored)
}

pub async fn delete_plan(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM plans WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn insert_student(db: &SqlitePool, student: &Student) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO students
            (id, name, email, major, minor, start_year, has_transfer_credits,
            completed_courses, preferences, career_goals, interests, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&student.id)
    .bind(&student.name)
    .bind(&student.email)
    .bind(&student.major)
    .bind(&student.minor)
    .bind(student.start_year)
    .bind(student.has_transfer_credits)
    .bind(Json(&student.completed_courses))
    .bind(Json(&student.preferences))
    .bind(&student.career_goals)
    .bind(Json(&student.interests))
    .bind(Utc::now())
    .execute(db)
    .await?;

    Ok(())
}

pub async fn update_student(db: &SqlitePool, student: &Student) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE students
        SET name = ?1, email = ?2, major = ?3, minor = ?4, start_year = ?5,
            has_transfer_credits = ?6, completed_courses = ?7, preferences = ?8,
            career_goals = ?9, interests = ?10, updated_at = ?11
        WHERE id = ?12
        "#,
    )
    .bind(&student.name)
    .bind(&student.email)
    .bind(&student.major)
    .bind(&student.minor)
    .bind(student.start_year)
    .bind(student.has_transfer_credits)
    .bind(Json(&student.completed_courses))
    .bind(Json(&student.preferences))
    .bind(&student.career_goals)
    .bind(Json(&student.interests))
    .bind(Utc::now())
    .bind(&student.id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn find_student_by_id(db: &SqlitePool, id: &str) -> Result<Option<Student>, sqlx::Error> {
    let row: Option<StudentRow> = sqlx::query_as(
        r#"
        SELECT id, name, email, major, minor, start_year, has_transfer_credits,
            completed_courses, preferences, career_goals, interests
        FROM students
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(row.map(Student::from))
}

/// True when `err` is a unique-constraint violation reported by the database.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(e) if e.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::catalog::Catalog;
    use crate::db::connect_in_memory;
    use crate::models::{AiRecommendations, Preferences};
    use crate::planner::generate_plan;

    async fn setup_test_db() -> SqlitePool {
        connect_in_memory().await.expect("Failed to create test db")
    }

    fn test_student() -> Student {
        Student {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Katherine".to_string(),
            email: "kj@example.edu".to_string(),
            major: Some("cs".to_string()),
            minor: None,
            start_year: 2025,
            has_transfer_credits: false,
            completed_courses: vec!["WRTG 150".to_string()],
            preferences: Preferences {
                max_credits_per_semester: 12,
                include_summer: true,
                ..Preferences::default()
            },
            career_goals: None,
            interests: vec!["orbits".to_string()],
        }
    }

    #[tokio::test]
    async fn test_save_and_fetch_plan() {
        let pool = setup_test_db().await;
        let catalog = Catalog::builtin().unwrap();
        let plan = generate_plan(&test_student(), &catalog, Utc::now() - Duration::hours(1)).plan;

        let saved = save_plan(&pool, &plan).await.expect("Failed to save plan");
        assert!(saved.last_modified > plan.last_modified);

        let plans = fetch_plans(&pool).await.expect("Failed to fetch plans");
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].id, plan.id);
        assert_eq!(plans[0].semesters, plan.semesters);
    }

    #[tokio::test]
    async fn test_save_is_upsert() {
        let pool = setup_test_db().await;
        let catalog = Catalog::builtin().unwrap();
        let mut plan = generate_plan(&test_student(), &catalog, Utc::now()).plan;
        save_plan(&pool, &plan).await.unwrap();

        plan.name = "Plan B".to_string();
        plan.ai_recommendations = Some(AiRecommendations {
            suggested_electives: vec![catalog.course("ARTS 101").unwrap().clone()],
            reasoning: "Balance".to_string(),
        });
        save_plan(&pool, &plan).await.unwrap();

        let plans = fetch_plans(&pool).await.unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].name, "Plan B");
        assert_eq!(plans[0].ai_recommendations, plan.ai_recommendations);
    }

    #[tokio::test]
    async fn test_delete_plan() {
        let pool = setup_test_db().await;
        let catalog = Catalog::builtin().unwrap();
        let plan = generate_plan(&test_student(), &catalog, Utc::now()).plan;
        save_plan(&pool, &plan).await.unwrap();

        assert!(delete_plan(&pool, &plan.id).await.unwrap());
        assert!(!delete_plan(&pool, &plan.id).await.unwrap());
        assert!(find_plan_by_id(&pool, &plan.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_student_round_trip_and_plan_lookup() {
        let pool = setup_test_db().await;
        let catalog = Catalog::builtin().unwrap();
        let mut student = test_student();
        insert_student(&pool, &student).await.unwrap();

        let fetched = find_student_by_id(&pool, &student.id)
            .await
            .unwrap()
            .expect("Student not found");
        assert_eq!(fetched, student);

        student.preferences.max_credits_per_semester = 18;
        assert!(update_student(&pool, &student).await.unwrap());
        let fetched = find_student_by_id(&pool, &student.id).await.unwrap().unwrap();
        assert_eq!(fetched.preferences.max_credits_per_semester, 18);

        assert!(find_plan_for_student(&pool, &student.id).await.unwrap().is_none());
        let plan = generate_plan(&student, &catalog, Utc::now()).plan;
        save_plan(&pool, &plan).await.unwrap();
        let found = find_plan_for_student(&pool, &student.id).await.unwrap().unwrap();
        assert_eq!(found.id, plan.id);
    }

    #[tokio::test]
    async fn test_second_plan_for_student_is_rejected() {
        let pool = setup_test_db().await;
        let catalog = Catalog::builtin().unwrap();
        let student = test_student();
        let first = generate_plan(&student, &catalog, Utc::now()).plan;
        let second = generate_plan(&student, &catalog, Utc::now()).plan;
        save_plan(&pool, &first).await.unwrap();

        let err = save_plan(&pool, &second).await.expect_err("Duplicate plan was stored");
        assert!(is_unique_violation(&err));
        assert_eq!(fetch_plans(&pool).await.unwrap().len(), 1);

        // Updating the existing plan is still allowed.
        save_plan(&pool, &first).await.unwrap();
    }
}
