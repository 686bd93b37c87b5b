use actix_web::{
    error::ResponseError,
    http::{header::{self, ContentType}, StatusCode},
    HttpResponse,
};
use chrono::{DateTime, Utc};
use derive_more::{Display, Error};
use serde::Serialize;

use crate::use_cases::rate_limit::format_remaining_time;

/// Reasons a submission can be turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    #[display("missing-fields")]
    MissingFields,

    #[display("bot-honeypot")]
    BotHoneypot,

    #[display("too-fast")]
    TooFast,

    #[display("session-expired")]
    SessionExpired,

    #[display("invalid-email")]
    InvalidEmail,

    #[display("message-too-short")]
    MessageTooShort,

    #[display("content-suspicious")]
    ContentSuspicious,

    #[display("rate-limited")]
    RateLimited,

    #[display("delivery-failed")]
    DeliveryFailed,

    #[display("internal-error")]
    InternalError,

    #[display("method-not-allowed")]
    MethodNotAllowed,
}

impl ErrorKind {
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::MissingFields => "All fields are required",
            ErrorKind::BotHoneypot => "Bot detected",
            ErrorKind::TooFast => "Please take the time to fill in the form properly",
            ErrorKind::SessionExpired => "Your session has expired. Please refresh the page",
            ErrorKind::InvalidEmail => "Invalid email format",
            ErrorKind::MessageTooShort => "The message must contain at least 3 words",
            ErrorKind::ContentSuspicious => "Suspicious message detected",
            ErrorKind::RateLimited => "Too many attempts. Please try again later",
            ErrorKind::DeliveryFailed => "Error while sending the email",
            ErrorKind::InternalError => "Internal server error",
            ErrorKind::MethodNotAllowed => "Method not allowed",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::MissingFields
            | ErrorKind::BotHoneypot
            | ErrorKind::TooFast
            | ErrorKind::SessionExpired
            | ErrorKind::InvalidEmail
            | ErrorKind::MessageTooShort
            | ErrorKind::ContentSuspicious => StatusCode::BAD_REQUEST,
            ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::DeliveryFailed | ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

#[derive(Debug)]
pub enum ContactError {
    Rejected(ErrorKind),
    RateLimited {
        reset_at: DateTime<Utc>,
        now: DateTime<Utc>,
    },
    Delivery(DeliveryError),
    MethodNotAllowed,
}

impl ContactError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContactError::Rejected(kind) => *kind,
            ContactError::RateLimited { .. } => ErrorKind::RateLimited,
            ContactError::Delivery(DeliveryError::Rejected { .. }) => ErrorKind::DeliveryFailed,
            ContactError::Delivery(DeliveryError::Transport(_)) => ErrorKind::InternalError,
            ContactError::MethodNotAllowed => ErrorKind::MethodNotAllowed,
        }
    }

    fn user_message(&self) -> String {
        match self {
            ContactError::RateLimited { reset_at, now } => format!(
                "Too many attempts. Please try again in {}.",
                format_remaining_time(*reset_at, *now)
            ),
            _ => self.kind().message().to_string(),
        }
    }
}

// Display carries the collaborator detail for logs; responses use `user_message`.
impl std::fmt::Display for ContactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContactError::Rejected(kind) => write!(f, "Submission rejected: {}", kind),
            ContactError::RateLimited { reset_at, .. } => {
                write!(f, "Rate limited until {}", reset_at.to_rfc3339())
            }
            ContactError::Delivery(e) => write!(f, "Delivery error: {}", e),
            ContactError::MethodNotAllowed => write!(f, "Method not allowed"),
        }
    }
}

impl From<DeliveryError> for ContactError {
    fn from(err: DeliveryError) -> Self {
        ContactError::Delivery(err)
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub code: ErrorKind,
}

impl ResponseError for ContactError {
    fn error_response(&self) -> HttpResponse {
        let body = ErrorBody {
            success: false,
            error: self.user_message(),
            code: self.kind(),
        };

        let mut response = HttpResponse::build(self.status_code());
        response.insert_header(ContentType::json());

        if let ContactError::RateLimited { reset_at, now } = self {
            let millis = (*reset_at - *now).num_milliseconds().max(0);
            let seconds = (millis + 999) / 1000;
            response.insert_header((header::RETRY_AFTER, seconds.to_string()));
        }

        response.json(body)
    }

    fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }
}

/// Failures of the outbound email collaborator.
#[derive(Debug, Display, Error)]
pub enum DeliveryError {
    #[display("{name} ({status}): {message}")]
    Rejected {
        name: String,
        message: String,
        status: u16,
    },

    #[display("Transport error: {_0}")]
    Transport(#[error(not(source))] String),
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        DeliveryError::Transport(err.to_string())
    }
}

/// Failures of a rate-limit store.
#[derive(Debug, Display, Error)]
pub enum StoreError {
    #[display("Rate store unavailable: {_0}")]
    Unavailable(#[error(not(source))] String),

    #[display("Rate record corrupted: {_0}")]
    Corrupt(#[error(not(source))] String),
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Corrupt(err.to_string())
    }
}

/// Failures of a key-value storage backend.
#[derive(Debug, Display, Error)]
pub enum StorageError {
    #[display("Storage I/O error: {_0}")]
    Io(std::io::Error),

    #[display("Storage unavailable: {_0}")]
    Unavailable(#[error(not(source))] String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}
