//! Email notifications for submitted request batches

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use std::str::FromStr;
use uuid::Uuid;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
    models::cart::SubmittedRequest,
};

pub const BATCH_SUBJECT: &str = "Nouvelles demandes de matériel";

/// Outgoing notification channel
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> AppResult<()>;
}

/// Plain-text summary of a submitted batch
pub fn batch_body(username: &str, batch_id: Uuid, requests: &[SubmittedRequest]) -> String {
    let mut body = format!(
        "Nouvelles demandes de matériel de {} (Lot: {}):\n\n",
        username, batch_id
    );
    for request in requests {
        body.push_str(&format!(
            "- Type: {}, Matériel: {}, Description: {}\n",
            request.request_type,
            request.reference_interne.as_deref().unwrap_or("N/A"),
            request.description.as_deref().filter(|d| !d.is_empty()).unwrap_or("Aucune"),
        ));
    }
    body
}

/// Announce a batch; delivery failures are logged and swallowed
pub async fn notify_batch(notifier: &dyn Notifier, username: &str, batch_id: Uuid, requests: &[SubmittedRequest]) -> bool {
    let body = batch_body(username, batch_id, requests);
    match notifier.send(BATCH_SUBJECT, &body).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(%batch_id, "Failed to send batch notification: {}", e);
            false
        }
    }
}

/// SMTP notifier sending to the configured recipients
#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, subject: &str, body: &str) -> AppResult<Message> {
        let from_name = self.config.smtp_from_name.as_deref().unwrap_or("LocEHPAD");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let mut builder = Message::builder().from(from_mailbox).subject(subject);
        for recipient in &self.config.recipients {
            let to_mailbox = Mailbox::from_str(recipient)
                .map_err(|e| AppError::Internal(format!("Invalid to address {}: {}", recipient, e)))?;
            builder = builder.to(to_mailbox);
        }

        builder
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))
    }

    fn transport(&self) -> AppResult<SmtpTransport> {
        let mailer_builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer_builder = if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            mailer_builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer_builder
        };

        Ok(mailer_builder.build())
    }
}

#[async_trait]
impl Notifier for EmailService {
    async fn send(&self, subject: &str, body: &str) -> AppResult<()> {
        if !self.config.enabled || self.config.recipients.is_empty() {
            tracing::debug!("Email notifications disabled, skipping '{}'", subject);
            return Ok(());
        }

        let email = self.build_message(subject, body)?;
        let mailer = self.transport()?;

        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::Internal(format!("Email task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        tracing::info!(recipients = self.config.recipients.len(), "notification sent");
        Ok(())
    }
}
