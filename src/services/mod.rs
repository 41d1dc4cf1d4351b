pub mod onboarding;
pub mod planning_service;

pub use onboarding::{OnboardingResult, OnboardingService};
pub use planning_service::{PlanLocks, PlanView, PlanningService};
