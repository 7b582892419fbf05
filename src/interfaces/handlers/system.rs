use actix_web::{web, HttpResponse, Responder};
use humantime::format_duration;
use once_cell::sync::Lazy;
use chrono::Utc;
use parking_lot::RwLock;
use std::{
    time::Duration,
    sync::atomic::{AtomicI64, Ordering},
};
use sysinfo::System;
use serde::Serialize;
use tracing::instrument;

use crate::{
    constants::START_TIME,
    repositories::project::ProjectRepository,
    use_cases::extractors::AdminClaims,
    AppState,
};

const HEALTH_CACHE_SECS: i64 = 5;

#[derive(Serialize, Clone, Default)]
struct SystemInfo {
    os: String,
    kernel: String,
    hostname: String,
    cpu_count: usize,
    memory_total: String,
}

#[derive(Serialize, Clone, Default)]
struct HealthCheckResponse {
    status: String,
    uptime: String,
    timestamp: String,
    start_at: String,
    database: String,
    mail_relay: String,
    media_storage: String,
    version: String,
    memory_usage: String,
    system: SystemInfo,
}

static LAST_CHECK: AtomicI64 = AtomicI64::new(0);
static CACHED_STATUS: Lazy<RwLock<HealthCheckResponse>> = Lazy::new(||
    RwLock::new(HealthCheckResponse::default())
);

fn configured(present: bool) -> String {
    if present { "Configured" } else { "Not configured" }.to_string()
}

async fn build_health_response(state: &web::Data<AppState>) -> HealthCheckResponse {
    let now_utc = Utc::now();
    let uptime_duration = now_utc.signed_duration_since(*START_TIME);
    let human_uptime = format_duration(Duration::from_secs(uptime_duration.num_seconds().max(0) as u64));

    let mut sys = System::new_all();
    sys.refresh_all();

    let system_info = SystemInfo {
        os: System::name().unwrap_or_else(|| "Unknown".to_string()),
        kernel: System::kernel_version().unwrap_or_else(|| "Unknown".to_string()),
        hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        cpu_count: sys.cpus().len(),
        memory_total: format!("{:.2} GB", sys.total_memory() as f64 / 1024.0 / 1024.0 / 1024.0),
    };

    let db_ok = state.project_handler.project_repo.check_connection().await.is_ok();

    let memory_usage = sysinfo::get_current_pid()
        .ok()
        .and_then(|pid| sys.process(pid))
        .map_or("Unknown".to_string(), |p| format!("{:.2} MB", p.memory() as f64 / 1024.0 / 1024.0));

    HealthCheckResponse {
        status: if db_ok { "healthy" } else { "degraded" }.to_string(),
        uptime: human_uptime.to_string(),
        timestamp: now_utc.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        database: if db_ok { "OK" } else { "Unavailable" }.to_string(),
        mail_relay: configured(state.contact_handler.relay.is_some()),
        media_storage: configured(state.media_handler.uploader.is_some()),
        version: env!("CARGO_PKG_VERSION").to_string(),
        memory_usage,
        system: system_info,
    }
}

#[instrument(skip(_claims, state))]
pub async fn health_check(_claims: AdminClaims, state: web::Data<AppState>) -> impl Responder {
    let now = Utc::now().timestamp();
    let last = LAST_CHECK.load(Ordering::Relaxed);

    if now - last > HEALTH_CACHE_SECS {
        let response = build_health_response(&state).await;
        *CACHED_STATUS.write() = response.clone();
        LAST_CHECK.store(now, Ordering::Relaxed);
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::Ok().json(CACHED_STATUS.read().clone())
    }
}
