use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::database::MongoDB;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub database: String,
    pub timestamp: i64,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up; `database` reports MongoDB reachability", body = HealthResponse)
    )
)]
pub async fn health_check(db: Option<web::Data<MongoDB>>) -> impl Responder {
    let database = match db {
        Some(db) if db.health_check().await => "up",
        Some(_) => "down",
        None => "unavailable",
    };

    HttpResponse::Ok().json(HealthResponse {
        status: if database == "up" { "healthy" } else { "degraded" }.to_string(),
        service: "duty-roster".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_health_without_database() {
        let app = test::init_service(App::new().route("/health", web::get().to(health_check))).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: HealthResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.service, "duty-roster");
        assert_eq!(body.database, "unavailable");
        assert_eq!(body.status, "degraded");
    }
}
