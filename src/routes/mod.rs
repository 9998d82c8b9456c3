// Route exports
pub mod matches;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(matches::service_info))
        .route("/health", web::get().to(matches::health_check))
        .service(
            web::scope("/api/v1")
                .configure(matches::configure),
        );
}
