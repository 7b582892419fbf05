use actix_cors::Cors;
use actix_web::{http::header, middleware::NormalizePath, web, App, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use portfolio_catalog::{
    db::postgres::{create_pool, run_migrations},
    graceful_shutdown::shutdown_signal,
    middlewares::auth::AuthMiddleware,
    routes::configure_routes,
    settings::AppConfig,
    AppState,
};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

fn build_cors(origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600);

    if origins.iter().any(|o| o == "*") {
        return cors.allow_any_origin();
    }
    origins.iter().fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match AppConfig::new() {
        Ok(cfg) => cfg,
        Err(e) => {
            init_tracing(false);
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.is_production());
    tracing::info!("Loaded configuration: {:?}", config);

    let pool = match create_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&pool).await {
        tracing::error!("Failed to apply migrations: {}", e);
        std::process::exit(1);
    }

    let app_state = web::Data::new(AppState::new(&config, pool));
    app_state.contact_limiter.spawn_eviction();

    let server_addr = format!("{}:{}", config.host, config.port);
    let origins = config.cors_origins();
    let max_upload_bytes = config.max_upload_bytes;

    tracing::info!(
        "Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(AuthMiddleware)
            .wrap(NormalizePath::trim())
            .wrap(build_cors(&origins))
            .wrap(TracingLogger::default())
            .configure(|cfg| configure_routes(cfg, max_upload_bytes))
    })
    .workers(config.worker_count)
    .bind(server_addr)?
    .run();

    tokio::select! {
        res = server => res,
        reason = shutdown_signal() => {
            tracing::info!(?reason, "Server stopped");
            Ok(())
        }
    }
}
