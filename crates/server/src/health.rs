use api_types::health::{ServiceInfo, Status};
use axum::Json;

pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        ok: true,
        service: "spendlog".to_string(),
    })
}

pub async fn status() -> Json<Status> {
    Json(Status {
        message: "API is up and running!".to_string(),
    })
}
