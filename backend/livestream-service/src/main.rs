use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use livestream_service::db::{create_pool, run_migrations, PgStore, Store};
use livestream_service::handlers::{configure_routes, AppState};
use livestream_service::middleware::{issue_session_token, SessionVerifier};
use livestream_service::Config;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// `issue-token <user_id> [ttl_secs]`: print a session token signed with the
/// configured secret, for local testing and load generation.
fn issue_token(config: &Config, mut args: impl Iterator<Item = String>) -> anyhow::Result<()> {
    let user_id: i64 = args
        .next()
        .context("usage: livestream-service issue-token <user_id> [ttl_secs]")?
        .parse()
        .context("user_id must be an integer")?;
    let ttl_secs: i64 = match args.next() {
        Some(raw) => raw.parse().context("ttl_secs must be an integer")?,
        None => DEFAULT_TOKEN_TTL_SECS,
    };

    let token = issue_session_token(&config.session.jwt_secret, user_id, ttl_secs)
        .context("failed to sign session token")?;
    println!("{}", token);
    Ok(())
}

/// Livestream Service
///
/// Serves emoji reactions and ranking statistics for livestreams and users.
///
/// # Routes
///
/// - `/livestreams/{id}/reactions` - list (GET) and post (POST) reactions
/// - `/livestreams/{id}/statistics` - livestream ranking statistics
/// - `/users/{username}/statistics` - user ranking statistics
/// - `/api/v1/health*`, `/metrics` - probes and Prometheus metrics
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to load configuration")?;

    let mut args = std::env::args().skip(1);
    if let Some(cmd) = args.next() {
        if cmd == "issue-token" {
            return issue_token(&config, args);
        }
        anyhow::bail!("unknown command: {}", cmd);
    }

    init_tracing();

    tracing::info!("Starting livestream-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);
    tracing::debug!(?config, "configuration loaded");

    let pool = create_pool(&config.database)
        .await
        .context("failed to connect to PostgreSQL")?;

    if config.database.run_migrations {
        run_migrations(&pool)
            .await
            .context("failed to run database migrations")?;
    }

    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool.clone()));
    let state = web::Data::new(AppState::new(store));
    let verifier = Arc::new(SessionVerifier::new(&config.session.jwt_secret));

    let allowed_origins: Vec<String> = config
        .allowed_origins()
        .into_iter()
        .map(str::to_owned)
        .collect();

    let bind_address = config.http_bind_address();
    tracing::info!("Starting HTTP server on {}", bind_address);

    let server = HttpServer::new(move || {
        let mut cors = Cors::default()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);
        for origin in &allowed_origins {
            cors = if origin == "*" {
                cors.allow_any_origin()
            } else {
                cors.allowed_origin(origin)
            };
        }

        let verifier = verifier.clone();
        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(move |cfg| configure_routes(cfg, verifier))
    })
    .workers(config.app.workers)
    .disable_signals()
    .bind(&bind_address)
    .with_context(|| format!("failed to bind {}", bind_address))?
    .run();

    let handle = server.handle();
    let mut server_task = tokio::spawn(server);

    let result = tokio::select! {
        result = &mut server_task => result,
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received, stopping HTTP server");
            handle.stop(true).await;
            server_task.await
        }
    };

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("HTTP server error: {}", e),
        Err(e) => tracing::error!("HTTP server task failed: {}", e),
    }

    pool.close().await;
    tracing::info!("livestream-service stopped");
    Ok(())
}
