use living_stones::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    mock::{SeedPlan, seed_repository},
    repository::{InMemoryRepository, PostgresRepository, RepositoryState},
    storage::{S3StorageClient, StorageService, StorageState},
};
use sqlx::postgres::PgPoolOptions;
use std::{process::ExitCode, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(env: Env) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "living_stones=debug,tower_http=info,axum=trace".into());

    match env {
        // Human-readable output while developing.
        Env::Local => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init(),
        // One JSON object per line for the log aggregator.
        Env::Production => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Postgres when `DATABASE_URL` is set, otherwise the in-memory store filled with
/// generated demo data. A failed seed is logged and the service starts empty.
async fn build_repository(config: &AppConfig) -> Result<RepositoryState, String> {
    if let Some(url) = &config.db_url {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| format!("failed to connect to Postgres: {e}"))?;
        let repo = PostgresRepository::new(pool);
        repo.migrate()
            .await
            .map_err(|e| format!("failed to run migrations: {e}"))?;
        tracing::info!("using Postgres repository");
        return Ok(Arc::new(repo));
    }

    let repo = InMemoryRepository::new();
    let plan = SeedPlan::uniform(config.mock_count);
    if let Err(e) = seed_repository(&repo, &plan, config.mock_seed).await {
        tracing::error!(error = %e, "mock seeding failed; starting with an empty store");
    }
    tracing::info!(seed = ?config.mock_seed, "using in-memory repository");
    Ok(Arc::new(repo))
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    // Fail fast: a production start with missing secrets never binds.
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.env);
    tracing::info!("Application starting in {:?} mode", config.env);

    let repo = match build_repository(&config).await {
        Ok(repo) => repo,
        Err(e) => {
            tracing::error!(error = %e, "repository initialisation failed");
            return ExitCode::FAILURE;
        }
    };

    let s3_client = S3StorageClient::new(
        &config.s3_endpoint,
        &config.s3_region,
        &config.s3_key,
        &config.s3_secret,
        &config.s3_bucket,
    )
    .await;

    // Local MinIO starts without the bucket.
    if config.env == Env::Local {
        s3_client.ensure_bucket_exists().await;
    }
    let storage = Arc::new(s3_client) as StorageState;

    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState {
        repo,
        storage,
        config,
    });

    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, addr = %bind_addr, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Listening on {bind_addr}");
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server stopped");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
