//! Minimum-bar graduation check: major assigned, total credits, required
//! courses. General-education buckets and per-bucket minimums are not
//! checked.

use std::collections::HashSet;

use serde::Serialize;

use crate::models::{AcademicPlan, RequirementSpec};

pub const NO_MAJOR_ISSUE: &str = "No major selected";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub issues: Vec<String>,
}

impl ValidationResult {
    fn from_issues(issues: Vec<String>) -> Self {
        Self {
            valid: issues.is_empty(),
            issues,
        }
    }

    pub fn invalid(issue: impl Into<String>) -> Self {
        Self::from_issues(vec![issue.into()])
    }
}

pub fn validate(plan: &AcademicPlan, requirements: &RequirementSpec) -> ValidationResult {
    if !has_major(plan) {
        return ValidationResult::invalid(NO_MAJOR_ISSUE);
    }

    let mut issues = Vec::new();

    let total = plan.total_credits();
    if total < requirements.total_credits {
        issues.push(format!(
            "Plan has {} credits but requires {}",
            total, requirements.total_credits
        ));
    }

    let planned: HashSet<&str> = plan.courses().map(|c| c.code.as_str()).collect();
    let missing: Vec<&str> = requirements
        .required_courses
        .iter()
        .map(String::as_str)
        .filter(|code| !planned.contains(code))
        .collect();
    if !missing.is_empty() {
        issues.push(format!("Missing required courses: {}", missing.join(", ")));
    }

    ValidationResult::from_issues(issues)
}

pub fn has_major(plan: &AcademicPlan) -> bool {
    plan.major.as_deref().is_some_and(|m| !m.trim().is_empty())
}

/// Credit progress toward the major's total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanProgress {
    pub total_credits: u32,
    pub required_credits: u32,
    pub percent: f64,
    pub semester_credits: Vec<SemesterCredits>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemesterCredits {
    pub semester_id: String,
    pub label: String,
    pub credits: u32,
}

pub fn progress(plan: &AcademicPlan, requirements: &RequirementSpec) -> PlanProgress {
    let total_credits = plan.total_credits();
    let required_credits = requirements.total_credits;
    let percent = if required_credits == 0 {
        100.0
    } else {
        (f64::from(total_credits) / f64::from(required_credits) * 100.0).min(100.0)
    };

    PlanProgress {
        total_credits,
        required_credits,
        percent,
        semester_credits: plan
            .semesters
            .iter()
            .map(|s| SemesterCredits {
                semester_id: s.id.clone(),
                label: format!("{} {}", s.term, s.year),
                credits: s.total_credits(),
            })
            .collect(),
    }
}
