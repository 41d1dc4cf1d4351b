use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub major: Option<String>,
    pub minor: Option<String>,
    pub start_year: i32,
    pub has_transfer_credits: bool,
    pub completed_courses: Vec<String>,
    pub preferences: Preferences,
    pub career_goals: Option<String>,
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub max_credits_per_semester: u32,
    #[serde(default)]
    pub include_summer: bool,
    #[serde(default)]
    pub target_graduation: Option<String>,
    #[serde(default)]
    pub preferred_days_of_week: Vec<String>,
    #[serde(default)]
    pub preferred_time_of_day: Option<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            max_credits_per_semester: 15,
            include_summer: false,
            target_graduation: None,
            preferred_days_of_week: Vec::new(),
            preferred_time_of_day: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub minor: Option<String>,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub has_transfer_credits: bool,
    #[serde(default)]
    pub completed_courses: Vec<String>,
    #[serde(default)]
    pub preferences: Option<Preferences>,
    #[serde(default)]
    pub career_goals: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub max_credits_per_semester: Option<u32>,
    pub include_summer: Option<bool>,
    pub target_graduation: Option<String>,
    pub preferred_time_of_day: Option<String>,
}
