use actix_web::{web, HttpRequest, HttpResponse};

use crate::{
    entities::contact::{ContactForm, ContactResponse},
    errors::ContactError,
    utils::get_client_ip::get_client_ip,
    AppState,
};

pub async fn send_email(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Json<ContactForm>,
) -> Result<HttpResponse, ContactError> {
    let identity = get_client_ip(&req, state.trust_forwarded_headers);
    let now = state.clock.now();

    let receipt = state
        .contact_handler
        .handle(form.into_inner(), &identity, now)
        .await?;

    Ok(HttpResponse::Ok().json(ContactResponse::from(receipt)))
}

pub async fn method_not_allowed(req: HttpRequest) -> Result<HttpResponse, ContactError> {
    tracing::debug!("Rejected {} {}", req.method(), req.path());
    Err(ContactError::MethodNotAllowed)
}
