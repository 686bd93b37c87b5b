use actix_web::{http::StatusCode, HttpResponse};

use crate::errors::ErrorKind;

pub fn json_error(status: StatusCode, error: &str, code: Option<ErrorKind>) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({
        "success": false,
        "error": error,
        "code": code
    }))
}
