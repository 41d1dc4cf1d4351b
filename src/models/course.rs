use std::fmt;

use serde::{Deserialize, Serialize};

/// A catalog course. Identity is `id`; `code` is what prerequisites and
/// requirement lists refer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub code: String,
    pub name: String,
    pub credits: u32,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub corequisites: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub terms_offered: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub career_relevance: Vec<String>,
}

/// Academic term of a semester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    Fall,
    Winter,
    #[serde(rename = "Spring/Summer")]
    SpringSummer,
}

impl Term {
    pub fn as_str(self) -> &'static str {
        match self {
            Term::Fall => "Fall",
            Term::Winter => "Winter",
            Term::SpringSummer => "Spring/Summer",
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_serializes_with_display_label() {
        let json = serde_json::to_string(&Term::SpringSummer).unwrap();
        assert_eq!(json, "\"Spring/Summer\"");
        let back: Term = serde_json::from_str("\"Winter\"").unwrap();
        assert_eq!(back, Term::Winter);
    }

    #[test]
    fn course_defaults_missing_lists() {
        let course: Course = serde_json::from_str(
            r#"{"id":"stat121","code":"STAT 121","name":"Principles of Statistics","credits":3}"#,
        )
        .unwrap();
        assert!(course.prerequisites.is_empty());
        assert!(course.category.is_none());
    }
}
