use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use course_planner::api::router;
use course_planner::catalog::Catalog;
use course_planner::config::AppConfig;
use course_planner::db;
use course_planner::recommend::{NoopRecommender, OpenAiRecommender, Recommender, RecommenderConfig};
use course_planner::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "course_planner=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let catalog = match &config.catalog_path {
        Some(path) => {
            info!("loading catalog from {}", path.display());
            Catalog::load(path)?
        }
        None => Catalog::builtin()?,
    };
    info!(
        "catalog ready: {} courses, {} majors",
        catalog.courses().len(),
        catalog.majors().len()
    );

    let recommender: Arc<dyn Recommender> = match RecommenderConfig::new_from_env()? {
        Some(cfg) => {
            info!("elective recommendations enabled (model {})", cfg.model);
            Arc::new(OpenAiRecommender::new(cfg)?)
        }
        None => {
            warn!("OPENAI_API_KEY not set; elective recommendations disabled");
            Arc::new(NoopRecommender)
        }
    };

    let pool = db::connect(&config.database_url).await?;

    let state = AppState::new(pool, Arc::new(catalog), recommender);

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
