// Route configuration

use crate::api::handlers;
use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Static assets never trigger refreshes
        .route("/favicon.ico", web::get().to(handlers::favicon))
        .route("/styles.css", web::get().to(handlers::styles))
        .route("/health", web::get().to(handlers::health_check))
        // Pages
        .route("/", web::get().to(handlers::landing))
        .route("/{category}", web::get().to(handlers::category_page))
        .default_service(web::to(handlers::redirect_home));
}
