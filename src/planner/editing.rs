use chrono::{DateTime, Utc};

use super::{allocator, resolver};
use crate::catalog::Catalog;
use crate::models::{AcademicPlan, Course, Semester, Student};

pub const DEFAULT_PLAN_NAME: &str = "My Academic Plan";

#[derive(Debug, Clone)]
pub struct GeneratedPlan {
    pub plan: AcademicPlan,
    /// Required courses that did not fit in the four-year calendar.
    pub unplaced: Vec<Course>,
}

/// Builds a fresh plan for `student`: the calendar from their start year and
/// term preference, filled with their major's required courses in
/// prerequisite order. Required codes missing from the catalog are skipped.
pub fn generate_plan(student: &Student, catalog: &Catalog, now: DateTime<Utc>) -> GeneratedPlan {
    let (semesters, unplaced) = fill_semesters(student, catalog);

    GeneratedPlan {
        plan: AcademicPlan {
            id: uuid::Uuid::new_v4().to_string(),
            name: DEFAULT_PLAN_NAME.to_string(),
            student_id: student.id.clone(),
            major: student.major.clone(),
            minor: student.minor.clone(),
            semesters,
            created_at: now,
            last_modified: now,
            notes: None,
            is_complete: false,
            ai_recommendations: None,
        },
        unplaced,
    }
}

/// Replaces the semesters of `plan` with a newly generated set. Identity,
/// name, creation time and advisory payload are kept.
pub fn regenerate(
    plan: &mut AcademicPlan,
    student: &Student,
    catalog: &Catalog,
    now: DateTime<Utc>,
) -> Vec<Course> {
    let (semesters, unplaced) = fill_semesters(student, catalog);
    plan.semesters = semesters;
    plan.major = student.major.clone();
    plan.minor = student.minor.clone();
    plan.last_modified = now;
    unplaced
}

fn fill_semesters(student: &Student, catalog: &Catalog) -> (Vec<Semester>, Vec<Course>) {
    let prefs = &student.preferences;
    let calendar = allocator::build_calendar(student.start_year, prefs.include_summer);

    let Some(requirements) = student.major.as_deref().and_then(|m| catalog.requirements(m)) else {
        return (calendar, Vec::new());
    };

    let required: Vec<Course> = requirements
        .required_courses
        .iter()
        .filter_map(|code| catalog.course(code).cloned())
        .collect();
    let ordered = resolver::order(&required);
    let allocation = allocator::allocate(
        &ordered,
        calendar,
        prefs.max_credits_per_semester,
        prefs.include_summer,
    );

    (allocation.semesters, allocation.unplaced)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Changed,
    Unchanged,
    SemesterNotFound,
}

/// Appends `course` to a semester. A course with the same id already in
/// that semester leaves the plan untouched.
pub fn add_course(
    plan: &mut AcademicPlan,
    semester_id: &str,
    course: &Course,
    now: DateTime<Utc>,
) -> EditOutcome {
    let Some(semester) = plan.semester_mut(semester_id) else {
        return EditOutcome::SemesterNotFound;
    };
    if semester.courses.iter().any(|c| c.id == course.id) {
        return EditOutcome::Unchanged;
    }
    semester.courses.push(course.clone());
    plan.last_modified = now;
    EditOutcome::Changed
}

/// Removes the course with id `course_id` from a semester.
pub fn remove_course(
    plan: &mut AcademicPlan,
    semester_id: &str,
    course_id: &str,
    now: DateTime<Utc>,
) -> EditOutcome {
    let Some(semester) = plan.semester_mut(semester_id) else {
        return EditOutcome::SemesterNotFound;
    };
    let before = semester.courses.len();
    semester.courses.retain(|c| c.id != course_id);
    if semester.courses.len() == before {
        return EditOutcome::Unchanged;
    }
    plan.last_modified = now;
    EditOutcome::Changed
}
