// API route configuration

use crate::api::handlers;
use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health_check))
        .route("/", web::get().to(handlers::health_check))
        .service(
            web::scope("/api/v1")
                .route("/games", web::get().to(handlers::games_report))
                .route("/companies", web::get().to(handlers::companies_report))
                .route("/platforms", web::get().to(handlers::list_platforms)),
        );
}
