use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Raw contact form payload as posted by the browser.
///
/// Text fields default to empty, whether omitted or sent as `null`, so they
/// are reported as missing fields rather than a malformed body.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub subject: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,

    #[serde(default)]
    pub honeypot: Option<String>,

    /// Epoch milliseconds at which the form was rendered.
    #[serde(default, deserialize_with = "string_or_number")]
    pub submission_time: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(i64),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<StringOrNumber>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        StringOrNumber::Text(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    }))
}

/// A submission ready for validation.
#[derive(Debug, Clone)]
pub struct SubmissionRecord {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub honeypot: Option<String>,
    pub form_rendered_at: Option<DateTime<Utc>>,
}

impl From<ContactForm> for SubmissionRecord {
    fn from(form: ContactForm) -> Self {
        let form_rendered_at = form
            .submission_time
            .as_deref()
            .and_then(parse_epoch_millis);

        SubmissionRecord {
            name: form.name,
            email: form.email,
            subject: form.subject,
            message: form.message,
            honeypot: form.honeypot,
            form_rendered_at,
        }
    }
}

/// Parses an epoch-milliseconds string. Blank or malformed input yields `None`.
pub fn parse_epoch_millis(raw: &str) -> Option<DateTime<Utc>> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
}

/// Receipt handed back by the delivery service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeliveryReceipt {
    pub id: String,
}

/// Message relayed to the site owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub reply_to: String,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
    pub id: String,
}

impl From<DeliveryReceipt> for ContactResponse {
    fn from(receipt: DeliveryReceipt) -> Self {
        ContactResponse {
            success: true,
            message: "Email sent successfully".to_string(),
            id: receipt.id,
        }
    }
}
