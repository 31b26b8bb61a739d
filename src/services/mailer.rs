use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;

use crate::config::Config;

/// Async SMTP wrapper. Operates in no-op mode (logs only) when no SMTP host
/// is configured, so development and tests never need a mail server.
/// All sends are best-effort: failures are logged, never propagated.
#[derive(Clone)]
pub struct Mailer {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: String,
    /// Fixed operator mailbox for moderation notifications.
    moderation_email: String,
}

impl Mailer {
    pub fn new(config: &Config) -> Self {
        let transport = if config.smtp_host.trim().is_empty() {
            tracing::warn!("SMTP host not configured; mailer running in no-op mode");
            None
        } else {
            match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host) {
                Ok(builder) => {
                    let builder = builder.port(config.smtp_port);
                    let builder = if !config.smtp_username.is_empty() {
                        builder.credentials(Credentials::new(
                            config.smtp_username.clone(),
                            config.smtp_password.clone(),
                        ))
                    } else {
                        builder
                    };
                    Some(Arc::new(builder.build()))
                }
                Err(e) => {
                    tracing::error!("failed to configure SMTP transport: {}", e);
                    None
                }
            }
        };

        Self {
            transport,
            from: config.smtp_username.clone(),
            moderation_email: config.moderation_email.clone(),
        }
    }

    /// Send to the operator mailbox. Used by the quarantine pipeline.
    pub async fn send_moderation_mail(&self, subject: &str, body: &str) {
        let to = self.moderation_email.clone();
        self.send(&to, subject, body).await;
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) {
        let Some(transport) = &self.transport else {
            tracing::info!(to, subject, "mailer no-op: {}", body);
            return;
        };

        let from: Mailbox = match self.from.parse() {
            Ok(m) => m,
            Err(e) => {
                tracing::error!("invalid sender address {}: {}", self.from, e);
                return;
            }
        };
        let to: Mailbox = match to.parse() {
            Ok(m) => m,
            Err(e) => {
                tracing::error!("invalid recipient address: {}", e);
                return;
            }
        };

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .body(body.to_string());

        match message {
            Ok(message) => {
                if let Err(e) = transport.send(message).await {
                    tracing::error!("failed to send mail: {}", e);
                }
            }
            Err(e) => tracing::error!("failed to build mail: {}", e),
        }
    }
}
