use actix_web::{HttpResponse, middleware, web};

use crate::auth;
use crate::errors::NOT_FOUND_PAGE;
use crate::handlers::{admin_handlers, auth_handlers, poll_handlers};

/// Register every route of the app. Shared by `main` and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Public routes
        .route("/", web::get().to(|| async {
            HttpResponse::SeeOther()
                .insert_header(("Location", "/polls/"))
                .finish()
        }))
        .route("/login", web::get().to(auth_handlers::login_page))
        .route("/login", web::post().to(auth_handlers::login_submit))
        .route("/logout", web::post().to(auth_handlers::logout))
        .service(
            web::scope("/polls")
                .route("/", web::get().to(poll_handlers::index))
                .route("/{id}/", web::get().to(poll_handlers::detail))
                .route("/{id}/vote/", web::get().to(poll_handlers::detail))
                .route("/{id}/vote/", web::post().to(poll_handlers::vote))
                .route("/{id}/results/", web::get().to(poll_handlers::results)),
        )
        // Superuser area
        .service(
            web::scope("/admin")
                .wrap(middleware::from_fn(auth::middleware::require_superuser))
                .route("", web::get().to(admin_handlers::index))
                .route("/questions", web::post().to(admin_handlers::create_question))
                .route("/questions/{id}", web::get().to(admin_handlers::question_detail))
                .route("/questions/{id}/choices", web::post().to(admin_handlers::add_choice))
                .route("/questions/{id}/delete", web::post().to(admin_handlers::delete_question))
                .route("/users/new", web::get().to(admin_handlers::new_user_form))
                .route("/users", web::post().to(admin_handlers::create_user)),
        );
}

/// Fallback for unmatched paths (must be registered last).
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body(NOT_FOUND_PAGE)
}
