use std::time::Duration;

use anyhow::Context;
use axum::Router;
use storage::Database;
use storage::services::rating::{INITIAL_RATING, RatingSettings};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod jobs;
mod state;

use config::Config;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::leagues::handlers::plan_gamedays,
        features::leagues::handlers::get_standings,
        features::gamedays::handlers::create_schedule,
        features::gamedays::handlers::assign_teams,
        features::gamedays::handlers::submit_results,
        features::gamedays::handlers::get_standings,
        features::events::handlers::create_schedule,
        features::events::handlers::assign_teams,
        features::events::handlers::submit_results,
        features::events::handlers::get_standings,
        features::ratings::handlers::get_leaderboard,
        features::ratings::handlers::get_history,
        features::ratings::handlers::sweep,
        features::ratings::handlers::recalculate,
    ),
    components(
        schemas(
            storage::dto::schedule::PlanGamedaysRequest,
            storage::dto::schedule::PlannedGamedaysResponse,
            storage::dto::schedule::ScheduleResponse,
            storage::dto::teams::AssignTeamsRequest,
            storage::dto::teams::TeamResponse,
            storage::dto::results::SubmitResultsRequest,
            storage::dto::results::GameScore,
            storage::dto::standings::StandingsResponse,
            storage::dto::rating::RatingStanding,
            storage::dto::common::PaginationMeta,
            storage::models::Game,
            storage::models::Gameday,
            storage::models::Scope,
            storage::models::StandingsRow,
            storage::models::TeamSlot,
            storage::models::RatingHistoryEntry,
            storage::models::RecordedRatingChange,
            storage::services::teams::TeamMode,
            storage::services::winners::Winners,
            storage::services::rating::SweepReport,
            storage::services::results::SubmissionOutcome,
        )
    ),
    tags(
        (name = "leagues", description = "League calendar and standings"),
        (name = "gamedays", description = "Playing day schedule, teams, results and standings"),
        (name = "events", description = "Event schedule, teams, results and standings"),
        (name = "ratings", description = "Participant ratings"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting league engine API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let state = AppState {
        db,
        rating: RatingSettings {
            epoch: config.rating_epoch,
            initial_rating: INITIAL_RATING,
        },
    };

    if config.rating_sweep_interval_secs > 0 {
        tracing::info!(
            "Rating sweep every {} seconds (epoch {})",
            config.rating_sweep_interval_secs,
            config.rating_epoch
        );
        jobs::spawn_rating_sweep(
            state.clone(),
            Duration::from_secs(config.rating_sweep_interval_secs),
        );
    } else {
        tracing::info!("Periodic rating sweep disabled");
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    let app = Router::new()
        .nest("/api/leagues", features::leagues::routes::routes())
        .nest("/api/gamedays", features::gamedays::routes::routes())
        .nest("/api/events", features::events::routes::routes())
        .nest("/api", features::ratings::routes::routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", bind_address);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    axum::serve(listener, app).await?;

    Ok(())
}
