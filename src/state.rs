use std::sync::Arc;

use sqlx::SqlitePool;

use crate::catalog::Catalog;
use crate::recommend::Recommender;
use crate::services::{OnboardingService, PlanLocks, PlanningService};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub catalog: Arc<Catalog>,
    pub recommender: Arc<dyn Recommender>,
    pub plan_locks: PlanLocks,
}

impl AppState {
    pub fn new(db: SqlitePool, catalog: Arc<Catalog>, recommender: Arc<dyn Recommender>) -> Self {
        Self {
            db,
            catalog,
            recommender,
            plan_locks: PlanLocks::default(),
        }
    }

    pub fn planning(&self) -> PlanningService {
        PlanningService::with_locks(self.db.clone(), self.catalog.clone(), self.plan_locks.clone())
    }

    pub fn onboarding(&self) -> OnboardingService {
        OnboardingService::new(self.db.clone(), self.catalog.clone(), self.recommender.clone())
    }
}
