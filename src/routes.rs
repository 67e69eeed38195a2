use crate::{
    api::{leave_request, notification},
    auth::middleware::auth_middleware,
    config::Config,
    error::{json_error_handler, path_error_handler, query_error_handler},
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

// Helper to build per-scope limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    // both quotas are non-zero, so the builder always yields a config
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

/// Body, path and query parse failures answer with the JSON envelope.
fn extractor_errors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler));
}

pub fn leave_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/leave")
            .configure(extractor_errors)
            // /leave
            .service(web::resource("").route(web::post().to(leave_request::create_request)))
            .service(
                web::resource("/my-requests").route(web::get().to(leave_request::my_requests)),
            )
            .service(web::resource("/all").route(web::get().to(leave_request::all_requests)))
            .service(
                web::resource("/status/{status}")
                    .route(web::get().to(leave_request::requests_by_status)),
            )
            .service(
                web::resource("/employee/{employee_id}")
                    .route(web::get().to(leave_request::employee_requests)),
            )
            .service(
                web::resource("/department/{department_id}")
                    .route(web::get().to(leave_request::department_requests)),
            )
            .service(
                web::resource("/manager/{manager_id}")
                    .route(web::get().to(leave_request::manager_requests)),
            )
            .service(web::resource("/summary").route(web::get().to(leave_request::my_summary)))
            .service(
                web::resource("/summary/{employee_id}")
                    .route(web::get().to(leave_request::employee_summary)),
            )
            .service(
                web::resource("/reset-balances")
                    .route(web::post().to(leave_request::reset_balances)),
            )
            // /leave/{id}, registered last so the static segments above win
            .service(
                web::resource("/{id}")
                    .route(web::get().to(leave_request::get_request))
                    .route(web::put().to(leave_request::update_request))
                    .route(web::delete().to(leave_request::delete_request)),
            ),
    );
}

pub fn notification_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notifications")
            .configure(extractor_errors)
            .service(web::resource("").route(web::get().to(notification::list_notifications)))
            .service(
                web::resource("/unread-count").route(web::get().to(notification::unread_count)),
            )
            .service(
                web::resource("/read-all").route(web::put().to(notification::mark_all_read)),
            )
            .service(web::resource("/{id}/read").route(web::put().to(notification::mark_read))),
    );
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .configure(leave_routes)
            .configure(notification_routes),
    );
}
