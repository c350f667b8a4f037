//! `trimatch-email`: SMTP delivery of finished reports.
//!
//! Delivery is opt-in: with `enabled = false` (the default) the sender
//! logs and returns without touching the network, so runs work without
//! any SMTP credentials configured.

use lettre::message::header::ContentType;
use lettre::message::{Attachment, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;
use thiserror::Error;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const PDF_MIME: &str = "application/pdf";

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("invalid attachment content type: {0}")]
    ContentType(#[from] lettre::message::header::ContentTypeErr),
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub enabled: bool,
    pub host: String,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

/// One file to attach to the report email.
#[derive(Debug, Clone)]
pub struct ReportAttachment {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ReportAttachment {
    pub fn workbook(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime: XLSX_MIME,
            bytes,
        }
    }

    pub fn summary_pdf(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime: PDF_MIME,
            bytes,
        }
    }
}

/// Sends the report email with its attachments. Returns `Ok(false)` when
/// delivery is disabled in config, `Ok(true)` after a successful send.
pub async fn send_report(
    config: &EmailConfig,
    client: &str,
    attachments: Vec<ReportAttachment>,
) -> Result<bool, EmailError> {
    if !config.enabled {
        tracing::info!(client, "email delivery disabled, skipping send");
        return Ok(false);
    }

    let body = format!(
        "Hi,\n\nThe reconciliation report for {client} is attached.\n\n\
         This message was sent automatically.\n"
    );

    let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(body));
    for attachment in attachments {
        let content_type = ContentType::parse(attachment.mime)?;
        parts = parts.singlepart(
            Attachment::new(attachment.filename).body(attachment.bytes, content_type),
        );
    }

    let message = Message::builder()
        .from(config.from.parse()?)
        .to(config.to.parse()?)
        .subject(format!("Reconciliation report - {client}"))
        .multipart(parts)?;

    let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        .credentials(Credentials::new(
            config.username.clone(),
            config.password.clone(),
        ))
        .build();

    mailer.send(message).await?;
    tracing::info!(client, to = %config.to, "report email sent");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_config_skips_delivery() {
        let config = EmailConfig::default();
        let sent = send_report(&config, "Acme Ltd", vec![]).await.unwrap();
        assert!(!sent);
    }

    #[test]
    fn config_parses_from_toml() {
        let config: EmailConfig = toml::from_str(
            r#"
            enabled = true
            host = "smtp.example.com"
            username = "reports"
            password = "secret"
            from = "reports@example.com"
            to = "finance@example.com"
            "#,
        )
        .unwrap();
        assert!(config.enabled);
        assert_eq!(config.host, "smtp.example.com");
    }

    #[test]
    fn config_defaults_to_disabled() {
        let config: EmailConfig = toml::from_str("").unwrap();
        assert!(!config.enabled);
    }
}
