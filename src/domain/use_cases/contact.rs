use std::sync::Arc;

use ammonia::clean_text;
use chrono::{DateTime, Utc};

use crate::{
    entities::contact::{ContactForm, DeliveryReceipt, OutboundEmail, SubmissionRecord},
    errors::{ContactError, DeliveryError},
    repositories::{mailer::Mailer, rate_store::RateStore},
    settings::AppConfig,
    use_cases::{rate_limit::RateLimiter, validation::SubmissionValidator},
};

/// Addressing used for relayed messages.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub from: String,
    pub to: String,
    pub subject_tag: String,
}

impl From<&AppConfig> for MailSettings {
    fn from(config: &AppConfig) -> Self {
        MailSettings {
            from: config.resend_from_email.clone(),
            to: config.resend_to_email.clone(),
            subject_tag: config.subject_tag.clone(),
        }
    }
}

impl OutboundEmail {
    /// Builds the relayed message. Every user supplied value is HTML-escaped.
    pub fn compose(
        submission: &SubmissionRecord,
        identity: &str,
        now: DateTime<Utc>,
        settings: &MailSettings,
    ) -> Self {
        let message = submission
            .message
            .lines()
            .map(clean_text)
            .collect::<Vec<_>>()
            .join("<br>");

        let html = format!(
            "<h2>New message from your portfolio</h2>\
             <p><strong>Name:</strong> {name}</p>\
             <p><strong>Email:</strong> {email}</p>\
             <p><strong>Subject:</strong> {subject}</p>\
             <hr />\
             <h3>Message:</h3>\
             <p>{message}</p>\
             <hr />\
             <p style=\"color: #666; font-size: 12px;\">IP: {identity}<br>Date: {date}</p>",
            name = clean_text(&submission.name),
            email = clean_text(&submission.email),
            subject = clean_text(&submission.subject),
            message = message,
            identity = clean_text(identity),
            date = now.format("%d/%m/%Y %H:%M:%S UTC"),
        );

        OutboundEmail {
            from: settings.from.clone(),
            to: settings.to.clone(),
            subject: format!("{} {}", settings.subject_tag, submission.subject.trim()),
            html,
            reply_to: submission.email.trim().to_string(),
        }
    }
}

/// Server-side admission pipeline: quota, validation, then delivery.
pub struct ContactHandler<S>
where
    S: RateStore,
{
    pub rate_limiter: RateLimiter<S>,
    pub validator: SubmissionValidator,
    pub mail_settings: MailSettings,
    pub mailer: Arc<dyn Mailer>,
}

impl<S> ContactHandler<S>
where
    S: RateStore,
{
    pub fn new(
        rate_limiter: RateLimiter<S>,
        validator: SubmissionValidator,
        mail_settings: MailSettings,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        ContactHandler {
            rate_limiter,
            validator,
            mail_settings,
            mailer,
        }
    }

    /// Admits or rejects a contact submission from `identity` and relays the
    /// accepted ones.
    pub async fn handle(
        &self,
        form: ContactForm,
        identity: &str,
        now: DateTime<Utc>,
    ) -> Result<DeliveryReceipt, ContactError> {
        let quota = self.rate_limiter.check_and_record(identity, now);
        if !quota.allowed {
            tracing::warn!(client = %identity, reset_at = %quota.reset_at, "Contact submission rate limited");
            return Err(ContactError::RateLimited {
                reset_at: quota.reset_at,
                now,
            });
        }

        let submission = SubmissionRecord::from(form);
        if let Err(kind) = self.validator.validate(&submission, now) {
            tracing::warn!(client = %identity, kind = %kind, "Contact submission rejected");
            return Err(ContactError::Rejected(kind));
        }

        let email = OutboundEmail::compose(&submission, identity, now, &self.mail_settings);

        match self.mailer.send(&email).await {
            Ok(receipt) => {
                tracing::info!(client = %identity, id = %receipt.id, "Contact message relayed");
                Ok(receipt)
            }
            Err(e) => {
                match &e {
                    DeliveryError::Rejected { .. } => {
                        tracing::error!(client = %identity, "Email delivery rejected: {}", e)
                    }
                    DeliveryError::Transport(_) => {
                        tracing::error!(client = %identity, "Email delivery failed: {}", e)
                    }
                }
                Err(e.into())
            }
        }
    }
}
