use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::{DateTime, TimeDelta, Utc};
use mergington::data::{HealthResponse, HealthStatus, ServiceInfo, UptimeInfo};
use mergington::log;

fn human_readable_uptime(uptime: TimeDelta) -> String {
    let total = uptime.num_seconds();
    let days = uptime.num_days();
    let hours = (total % 86400) / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m {secs}s")
    } else if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

fn service_uptime(started_at: DateTime<Utc>, now: DateTime<Utc>) -> UptimeInfo {
    let uptime = now.signed_duration_since(started_at);
    UptimeInfo {
        seconds: uptime.num_seconds(),
        human: human_readable_uptime(uptime),
    }
}

pub async fn get(State(state): State<Arc<crate::AppState>>) -> Json<HealthResponse> {
    let now = Utc::now();

    let health_response = HealthResponse {
        status: HealthStatus::Healthy,
        timestamp: now.to_rfc3339(),
        started_at: state.started_at.to_rfc3339(),
        uptime: service_uptime(state.started_at, now),
        services: ServiceInfo {
            activities: state.activities.activity_count(),
            enrollments: state.activities.enrollment_count(),
        },
    };

    log::debug!("Health check: {:?}", health_response);

    Json(health_response)
}
