use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::models::{Course, Major, RequirementSpec};

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

/// Upper bound on a single course's credit value.
pub const MAX_COURSE_CREDITS: u32 = 30;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate course code in catalog: {0}")]
    DuplicateCourse(String),

    #[error("Course {code} has {credits} credits; expected 1..={max}", max = MAX_COURSE_CREDITS)]
    InvalidCredits { code: String, credits: u32 },

    #[error("Major {major} requires {code} outside every requirement bucket")]
    DanglingRequirement { major: String, code: String },
}

#[derive(Deserialize)]
struct CatalogFile {
    courses: Vec<Course>,
    majors: Vec<Major>,
}

/// Read-only set of courses and majors, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Catalog {
    courses: Vec<Course>,
    majors: Vec<Major>,
    course_index: HashMap<String, usize>,
    major_index: HashMap<String, usize>,
}

impl Catalog {
    /// The catalog compiled into the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(raw)?;
        Self::new(file.courses, file.majors)
    }

    pub fn new(courses: Vec<Course>, majors: Vec<Major>) -> Result<Self, CatalogError> {
        let mut course_index = HashMap::with_capacity(courses.len());
        for (i, course) in courses.iter().enumerate() {
            if !(1..=MAX_COURSE_CREDITS).contains(&course.credits) {
                return Err(CatalogError::InvalidCredits {
                    code: course.code.clone(),
                    credits: course.credits,
                });
            }
            if course_index.insert(course.code.clone(), i).is_some() {
                return Err(CatalogError::DuplicateCourse(course.code.clone()));
            }
        }

        for major in &majors {
            if let Some(code) = major.requirements.dangling_required_courses().first() {
                return Err(CatalogError::DanglingRequirement {
                    major: major.id.clone(),
                    code: code.to_string(),
                });
            }
        }

        let major_index = majors
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id.clone(), i))
            .collect();

        Ok(Self {
            courses,
            majors,
            course_index,
            major_index,
        })
    }

    pub fn course(&self, code: &str) -> Option<&Course> {
        self.course_index.get(code).map(|&i| &self.courses[i])
    }

    pub fn major(&self, id: &str) -> Option<&Major> {
        self.major_index.get(id).map(|&i| &self.majors[i])
    }

    pub fn requirements(&self, major_id: &str) -> Option<&RequirementSpec> {
        self.major(major_id).map(|m| &m.requirements)
    }

    /// Courses in catalog order.
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn majors(&self) -> &[Major] {
        &self.majors
    }

    pub fn courses_in_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a Course> {
        self.courses
            .iter()
            .filter(move |c| c.category.as_deref() == Some(category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = Catalog::builtin().expect("builtin catalog");
        assert_eq!(catalog.courses().len(), 17);
        assert_eq!(catalog.majors().len(), 3);

        let cs240 = catalog.course("CS 240").expect("CS 240");
        assert_eq!(cs240.credits, 4);
        assert_eq!(cs240.prerequisites, vec!["CS 235".to_string()]);

        let reqs = catalog.requirements("cs").expect("cs requirements");
        assert_eq!(reqs.total_credits, 120);
        assert_eq!(reqs.required_courses.len(), 14);
        assert!(catalog.major("history").is_none());
    }

    #[test]
    fn courses_in_category_filters() {
        let catalog = Catalog::builtin().unwrap();
        let codes: Vec<_> = catalog
            .courses_in_category("Mathematics")
            .map(|c| c.code.as_str())
            .collect();
        assert_eq!(codes, vec!["MATH 112", "MATH 113", "MATH 290"]);
    }

    #[test]
    fn rejects_required_course_outside_buckets() {
        let raw = r#"{
            "courses": [],
            "majors": [{
                "id": "x", "name": "X", "college": "C", "department": "D",
                "requirements": {
                    "total_credits": 10,
                    "major_requirements": [{"category": "Core", "credits": 3, "required_courses": ["A 1"]}],
                    "required_courses": ["A 1", "B 2"]
                }
            }]
        }"#;
        let err = Catalog::from_json(raw).unwrap_err();
        assert!(matches!(err, CatalogError::DanglingRequirement { ref code, .. } if code == "B 2"));
    }

    #[test]
    fn rejects_duplicate_codes() {
        let raw = r#"{
            "courses": [
                {"id": "a", "code": "A 1", "name": "A", "credits": 3},
                {"id": "b", "code": "A 1", "name": "A again", "credits": 3}
            ],
            "majors": []
        }"#;
        assert!(matches!(
            Catalog::from_json(raw),
            Err(CatalogError::DuplicateCourse(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_credits() {
        for credits in [0, MAX_COURSE_CREDITS + 1, u32::MAX] {
            let raw = format!(
                r#"{{"courses": [{{"id": "a", "code": "A 1", "name": "A", "credits": {credits}}}], "majors": []}}"#
            );
            let err = Catalog::from_json(&raw).unwrap_err();
            assert!(matches!(
                err,
                CatalogError::InvalidCredits { ref code, credits: c } if code == "A 1" && c == credits
            ));
        }

        let raw = format!(
            r#"{{"courses": [{{"id": "a", "code": "A 1", "name": "A", "credits": {MAX_COURSE_CREDITS}}}], "majors": []}}"#
        );
        assert!(Catalog::from_json(&raw).is_ok());
    }
}
