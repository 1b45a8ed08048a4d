use {
    axum::response::{IntoResponse, Json},
    chrono::{DateTime, Utc},
    serde::Serialize,
};

#[derive(Serialize)]
struct HealthReply {
    status: &'static str,
    message: &'static str,
    version: &'static str,
    timestamp: DateTime<Utc>,
}

pub async fn health_handler() -> impl IntoResponse {
    Json(HealthReply {
        status: "OK",
        message: "swap gateway is running",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    })
}
