use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Major {
    pub id: String,
    pub name: String,
    pub college: String,
    pub department: String,
    pub requirements: RequirementSpec,
}

/// Graduation rules for a major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementSpec {
    pub total_credits: u32,
    #[serde(default)]
    pub general_education: Vec<GeneralEducationRequirement>,
    #[serde(default)]
    pub major_requirements: Vec<MajorRequirement>,
    /// Flattened list of every course code the major requires.
    #[serde(default)]
    pub required_courses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralEducationRequirement {
    pub category: String,
    pub credits: u32,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MajorRequirement {
    pub category: String,
    pub credits: u32,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required_courses: Vec<String>,
}

impl RequirementSpec {
    /// Required codes that no major-requirement bucket lists.
    pub fn dangling_required_courses(&self) -> Vec<&str> {
        self.required_courses
            .iter()
            .filter(|code| {
                !self
                    .major_requirements
                    .iter()
                    .any(|bucket| bucket.required_courses.contains(code))
            })
            .map(String::as_str)
            .collect()
    }
}
