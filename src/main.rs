mod api;
mod config;
mod database;
mod jobs;
mod middleware;
mod models;
mod services;
mod twilio;
mod utils;

use actix_cors::Cors;
use actix_web::{dev::Service, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppConfig,
    middleware::auth::AuthMiddleware,
    services::notification_service::Notifier,
    twilio::{LogSender, MessageSender, TwilioClient},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    log::info!("🚀 Starting Duty Roster Service...");

    // Initialize MongoDB connection
    let db = database::MongoDB::new(&config.database_url)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to connect to MongoDB: {}", e)))?;

    log::info!("✅ MongoDB connected successfully");

    // SMS sender: Twilio when configured, otherwise dry run
    let sender: Arc<dyn MessageSender> = match config.twilio.clone() {
        Some(settings) => Arc::new(
            TwilioClient::new(settings).map_err(|e| std::io::Error::other(e.to_string()))?,
        ),
        None => {
            log::warn!("⚠️  Twilio credentials not set, SMS notifications will only be logged");
            Arc::new(LogSender)
        }
    };

    // 📨 Duty notifications worker
    log::info!("📅 Starting background jobs...");
    let notifier = Notifier::new(Arc::new(db.clone()), sender, config.notify_offset);
    let events = jobs::duty_events::start_duty_event_worker(notifier);
    log::info!("✅ Background jobs started");

    let bind_address = config.bind_address();
    log::info!("🌐 Server starting on {}", bind_address);
    log::info!("📚 Swagger UI available at: http://{}/swagger-ui/", bind_address);

    let db_data = web::Data::new(db);
    let events_data = web::Data::new(events);
    let config_data = web::Data::new(config);

    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in &config_data.cors_origins {
            cors = cors.allowed_origin(origin);
        }
        let cors = cors
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        let openapi = api::swagger::ApiDoc::openapi();
        let jwt = config_data.jwt.clone();

        App::new()
            .app_data(db_data.clone())
            .app_data(events_data.clone())
            .app_data(config_data.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .wrap_fn(|req, srv| {
                api::metrics::increment_request_count();
                srv.call(req)
            })
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi)
            )
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Metrics
            .route("/metrics", web::get().to(api::metrics::get_metrics))
            .service(
                web::scope("/api/v1")
                    .wrap(AuthMiddleware::new(jwt))
                    // Users
                    .service(
                        web::scope("/users")
                            .route("", web::get().to(api::users::list_users))
                            .route("/me", web::get().to(api::users::get_me))
                            .route("/{netid}", web::get().to(api::users::get_user))
                            .route("/{netid}", web::put().to(api::users::upsert_user))
                            .route("/{netid}", web::delete().to(api::users::delete_user))
                            .route("/{netid}/credits", web::get().to(api::users::get_user_credits))
                    )
                    // Duties
                    .service(
                        web::scope("/duties")
                            .route("", web::get().to(api::duties::list_duties))
                            .route("", web::post().to(api::duties::create_duty))
                            .route("/{id}", web::get().to(api::duties::get_duty))
                            .route("/{id}", web::delete().to(api::duties::delete_duty))
                            .route("/{id}/checked", web::put().to(api::duties::check_duty))
                            .route("/{id}/credits/{netid}", web::put().to(api::duties::update_credits))
                    )
                    // Checklist (check duties page)
                    .service(
                        web::scope("/checklist")
                            .route("", web::get().to(api::checklist::get_checklist))
                            .route("/{id}/assignees/{netid}", web::post().to(api::checklist::mark_assignee))
                    )
                    // Roster (duties of one resident)
                    .route("/roster/{netid}", web::get().to(api::roster::get_roster))
            )
    })
    .bind(bind_address)?
    .run()
    .await
}
