//! JobFinder Backend
//!
//! Candidate matching, saved-search alerts and applicant mapping for a job
//! board, served over REST with SQLite persistence and Tantivy job search.

mod alerts;
mod api;
mod auth;
mod config;
mod db;
mod errors;
mod geo;
mod matching;
mod models;
mod notify;
mod search;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use clap::{Parser, Subcommand};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use alerts::CheckOptions;
use config::Config;
use db::Repository;
use search::JobIndex;

#[derive(Debug, Parser)]
#[command(name = "jobboard", version, about = "JobFinder matching backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Check saved searches for new candidate matches and notify recruiters
    CheckMatches {
        /// Compute and report without recording notifications or sending email
        #[arg(long)]
        dry_run: bool,
        /// Only print current and new matches for this saved search
        #[arg(long, value_name = "ID")]
        search: Option<String>,
    },
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub search: Arc<JobIndex>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::CheckMatches { dry_run, search } => check_matches(config, dry_run, search).await,
    }
}

async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting JobFinder backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Index path: {:?}", config.index_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (JOBBOARD_API_PSK). Authentication is disabled!");
    }

    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    let search = Arc::new(JobIndex::open(&config.index_path)?);
    let jobs = repo.list_jobs().await?;
    search.rebuild(&jobs).await?;

    let state = AppState {
        repo,
        search,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn check_matches(
    config: Config,
    dry_run: bool,
    search: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pool = db::init_database(&config.db_path).await?;
    let repo = Repository::new(pool);

    if let Some(search_id) = search {
        let report = alerts::report_search(&repo, &search_id).await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    let mailer = notify::mailer_from_config(&config);

    let options = CheckOptions {
        dry_run,
        site_url: config.site_url.clone(),
        mail_from: config.mail_from.clone(),
    };

    let summary = alerts::check_new_matches(&repo, &mailer, &options).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.api_psk.clone();

    let api_routes = Router::new()
        // Users and profiles
        .route("/users", post(api::create_user))
        .route("/users/{username}/profile", get(api::get_profile))
        .route("/profile", put(api::upsert_profile))
        .route("/skills", get(api::list_skills))
        // Jobs
        .route("/jobs", get(api::list_jobs).post(api::create_job))
        .route("/jobs/search", get(api::search_jobs))
        .route("/jobs/near", get(api::jobs_near))
        .route(
            "/jobs/{id}",
            get(api::get_job)
                .put(api::update_job)
                .delete(api::delete_job),
        )
        .route("/jobs/{id}/apply", post(api::apply_to_job))
        .route("/jobs/{id}/application", get(api::track_application))
        // Applications
        .route("/applications/mine", get(api::my_applications))
        .route("/applications/manage", get(api::manage_applications))
        .route("/applications/{id}", patch(api::update_application_status))
        // Candidates
        .route("/candidates/search", get(api::search_candidates))
        // Saved searches
        .route(
            "/saved-searches",
            get(api::list_saved_searches).post(api::create_saved_search),
        )
        .route(
            "/saved-searches/{id}",
            get(api::get_saved_search).delete(api::delete_saved_search),
        )
        .route("/saved-searches/{id}/toggle", post(api::toggle_saved_search))
        // Map
        .route("/applicant-clusters", get(api::applicant_clusters))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
