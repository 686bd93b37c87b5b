use actix_cors::Cors;
use actix_web::http::{header, Method};

use crate::settings::AppConfig;

const PREFLIGHT_MAX_AGE_SECS: usize = 3600;

/// Cross-origin POST with a `Content-Type` header, from the configured origins.
pub fn build_cors(config: &AppConfig) -> Cors {
    let cors = Cors::default()
        .allowed_methods([Method::POST])
        .allowed_header(header::CONTENT_TYPE)
        .supports_credentials()
        .max_age(PREFLIGHT_MAX_AGE_SECS);

    let origins = config.cors_origins();
    if origins.iter().any(|o| o == "*") {
        return cors.allow_any_origin();
    }

    origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}
