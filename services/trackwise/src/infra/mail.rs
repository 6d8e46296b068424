//! Email transports behind the [`EmailSender`] port.

use std::time::Duration;

use anyhow::{Context, bail};
use lettre::message::{Mailbox, MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Serialize;

use crate::config::{MailTransportKind, TrackwiseConfig};
use crate::domain::repository::EmailSender;
use crate::domain::types::{MailError, OutgoingEmail};

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Configured mail transport.
#[derive(Clone)]
pub enum Mailer {
    /// Log the message instead of delivering it.
    Log,
    Smtp(SmtpMailer),
    Http(HttpMailer),
}

impl Mailer {
    pub fn from_config(config: &TrackwiseConfig) -> anyhow::Result<Self> {
        match config.mail_transport {
            MailTransportKind::Log => Ok(Self::Log),
            MailTransportKind::Smtp => {
                let Some(host) = config.smtp_host.as_deref() else {
                    bail!("SMTP_HOST is required when MAIL_TRANSPORT=smtp");
                };
                let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                    .context("failed to create SMTP transport")?
                    .port(config.smtp_port);
                if let (Some(user), Some(pass)) = (&config.smtp_username, &config.smtp_password) {
                    builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
                }
                Ok(Self::Smtp(SmtpMailer {
                    transport: builder.build(),
                    from: parse_mailbox(&config.mail_from).context("invalid MAIL_FROM")?,
                }))
            }
            MailTransportKind::Http => {
                let (Some(url), Some(key)) = (&config.mail_api_url, &config.mail_api_key) else {
                    bail!("MAIL_API_URL and MAIL_API_KEY are required when MAIL_TRANSPORT=http");
                };
                let client = reqwest::Client::builder()
                    .timeout(HTTP_TIMEOUT)
                    .build()
                    .context("failed to build mail HTTP client")?;
                Ok(Self::Http(HttpMailer {
                    client,
                    url: url.clone(),
                    api_key: key.clone(),
                    from: config.mail_from.clone(),
                }))
            }
        }
    }
}

impl EmailSender for Mailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        match self {
            Self::Log => {
                tracing::info!(to = %email.to, subject = %email.subject, "mail transport disabled, message not sent");
                tracing::debug!(body = %email.text_body, "suppressed message body");
                Ok(())
            }
            Self::Smtp(mailer) => mailer.send(email).await,
            Self::Http(mailer) => mailer.send(email).await,
        }
    }
}

// ── SMTP ─────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let message = build_message(self.from.clone(), email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Delivery(e.to_string()))?;
        tracing::info!(to = %email.to, subject = %email.subject, "email sent via smtp");
        Ok(())
    }
}

fn parse_mailbox(raw: &str) -> Result<Mailbox, MailError> {
    raw.parse()
        .map_err(|e: lettre::address::AddressError| MailError::Address(format!("{raw}: {e}")))
}

/// Plain-text part first, HTML alternative second.
fn build_message(from: Mailbox, email: &OutgoingEmail) -> Result<Message, MailError> {
    let body = MultiPart::alternative()
        .singlepart(
            SinglePart::builder()
                .header(header::ContentType::TEXT_PLAIN)
                .body(email.text_body.clone()),
        )
        .singlepart(
            SinglePart::builder()
                .header(header::ContentType::TEXT_HTML)
                .body(email.html_body.clone()),
        );
    Message::builder()
        .from(from)
        .to(parse_mailbox(&email.to)?)
        .subject(&email.subject)
        .multipart(body)
        .map_err(|e| MailError::Build(e.to_string()))
}

// ── HTTP API ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    url: String,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct HttpMailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
    html: &'a str,
}

impl HttpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let request = HttpMailRequest {
            from: &self.from,
            to: [&email.to],
            subject: &email.subject,
            text: &email.text_body,
            html: &email.html_body,
        };
        self.client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| MailError::Delivery(e.to_string()))?;
        tracing::info!(to = %email.to, subject = %email.subject, "email sent via http api");
        Ok(())
    }
}
