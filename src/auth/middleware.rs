use actix_session::SessionExt;
use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
};

use crate::auth::session::{get_user_id, is_superuser};

/// Middleware function guarding the admin area.
/// Anonymous requests are redirected to /login; logged-in non-superusers get 403.
pub async fn require_superuser(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let session = req.get_session();

    if get_user_id(&session).is_none() {
        let response = HttpResponse::SeeOther()
            .insert_header(("Location", "/login"))
            .finish();
        return Ok(req.into_response(response).map_into_right_body());
    }

    if !is_superuser(&session) {
        log::warn!("Non-superuser denied access to {}", req.path());
        let response = HttpResponse::Forbidden().body("Forbidden");
        return Ok(req.into_response(response).map_into_right_body());
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}
