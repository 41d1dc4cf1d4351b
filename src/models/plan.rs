use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::course::{Course, Term};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Semester {
    pub id: String,
    pub term: Term,
    pub year: i32,
    pub courses: Vec<Course>,
}

impl Semester {
    pub fn new(term: Term, year: i32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            term,
            year,
            courses: Vec::new(),
        }
    }

    pub fn total_credits(&self) -> u32 {
        self.courses.iter().map(|c| c.credits).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicPlan {
    pub id: String,
    pub name: String,
    pub student_id: String,
    pub major: Option<String>,
    pub minor: Option<String>,
    pub semesters: Vec<Semester>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub notes: Option<String>,
    pub is_complete: bool,
    pub ai_recommendations: Option<AiRecommendations>,
}

impl AcademicPlan {
    pub fn total_credits(&self) -> u32 {
        self.semesters.iter().map(Semester::total_credits).sum()
    }

    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.semesters.iter().flat_map(|s| s.courses.iter())
    }

    pub fn semester_mut(&mut self, semester_id: &str) -> Option<&mut Semester> {
        self.semesters.iter_mut().find(|s| s.id == semester_id)
    }
}

/// Advisory payload attached to a plan during onboarding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiRecommendations {
    pub suggested_electives: Vec<Course>,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecommendation {
    pub course: Course,
    pub relevance_score: u8,
    pub reasoning: String,
}

impl AiRecommendations {
    pub fn from_recommendations(recommendations: &[CourseRecommendation]) -> Self {
        Self {
            suggested_electives: recommendations.iter().map(|r| r.course.clone()).collect(),
            reasoning: recommendations
                .iter()
                .map(|r| r.reasoning.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCourseRequest {
    pub course_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamePlanRequest {
    pub name: String,
}
