use crate::auth::auth::AuthUser;
use crate::models::ApiResponse;
use crate::service::notification::NotificationService;
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "Caller's notifications, newest first", body = [crate::model::notification::Notification]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn list_notifications(
    auth: AuthUser,
    service: web::Data<NotificationService>,
) -> actix_web::Result<impl Responder> {
    let notifications = service.inbox(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        notifications,
        "Notifications retrieved successfully",
    )))
}

#[utoipa::path(
    get,
    path = "/api/notifications/unread-count",
    responses(
        (status = 200, description = "Unread notification count", body = Object, example = json!({
            "success": true,
            "data": { "count": 3 },
            "message": "Unread count retrieved successfully"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn unread_count(
    auth: AuthUser,
    service: web::Data<NotificationService>,
) -> actix_web::Result<impl Responder> {
    let count = service.unread_count(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        json!({ "count": count }),
        "Unread count retrieved successfully",
    )))
}

#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification marked as read"),
        (status = 404, description = "Notification not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn mark_read(
    auth: AuthUser,
    service: web::Data<NotificationService>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    service.mark_as_read(&path, auth.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Notification marked as read")))
}

#[utoipa::path(
    put,
    path = "/api/notifications/read-all",
    responses(
        (status = 200, description = "All notifications marked as read", body = Object, example = json!({
            "success": true,
            "data": { "updated": 5 },
            "message": "All notifications marked as read"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn mark_all_read(
    auth: AuthUser,
    service: web::Data<NotificationService>,
) -> actix_web::Result<impl Responder> {
    let updated = service.mark_all_as_read(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        json!({ "updated": updated }),
        "All notifications marked as read",
    )))
}

#[cfg(test)]
mod tests {
    use crate::auth::jwt::generate_access_token;
    use crate::auth::middleware::auth_middleware;
    use crate::config::{Allowance, Config};
    use crate::model::notification::{NotificationPayload, NotificationType};
    use crate::model::role::Role;
    use crate::routes;
    use crate::service::notification::NotificationService;
    use crate::store::memory::MemoryStore;
    use actix_web::{App, http::StatusCode, middleware::from_fn, test, web};
    use serde_json::Value;
    use std::sync::Arc;

    const SECRET: &str = "test-secret";

    fn config() -> Config {
        Config {
            database_url: String::new(),
            jwt_secret: SECRET.to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            log_dir: "logs".to_string(),
            rate_protected_per_min: 1000,
            api_prefix: "/api".to_string(),
            recipient_cache_ttl_secs: 60,
            allowance: Allowance::default(),
        }
    }

    fn payload(recipient_id: u64) -> NotificationPayload {
        NotificationPayload {
            recipient_id,
            sender_id: Some(1),
            notification_type: NotificationType::PtoRequestCreated,
            title: "New PTO Request".into(),
            content: "Ada Lovelace has submitted a PTO request".into(),
            data: None,
        }
    }

    #[actix_web::test]
    async fn inbox_flow_over_http() {
        let service = NotificationService::new(Arc::new(MemoryStore::new()));
        let first = service.create_notification(payload(100)).await.unwrap();
        service.create_notification(payload(100)).await.unwrap();
        service.create_notification(payload(200)).await.unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(config()))
                .app_data(web::Data::new(service.clone()))
                .service(
                    web::scope("/api")
                        .wrap(from_fn(auth_middleware))
                        .configure(routes::notification_routes),
                ),
        )
        .await;

        let token = generate_access_token(100, Role::Employee, Some(1), SECRET);
        let auth = ("Authorization", format!("Bearer {token}"));

        let req = test::TestRequest::get()
            .uri("/api/notifications/unread-count")
            .insert_header(auth.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["count"], 2);

        let req = test::TestRequest::put()
            .uri(&format!("/api/notifications/{}/read", first.id))
            .insert_header(auth.clone())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::put()
            .uri("/api/notifications/missing/read")
            .insert_header(auth.clone())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::put()
            .uri("/api/notifications/read-all")
            .insert_header(auth.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["updated"], 1);

        let req = test::TestRequest::get()
            .uri("/api/notifications")
            .insert_header(auth)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    }
}
