use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::SmtpSettings;

/// Outbound "send message" capability used by the notification dispatcher.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MessengerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MessengerError {
    #[error("invalid address `{0}`")]
    InvalidAddress(String),
    #[error("failed to build message: {0}")]
    Build(String),
    #[error("transport error: {0}")]
    Transport(String),
}

pub struct SmtpMessenger {
    from: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMessenger {
    pub fn new(settings: &SmtpSettings) -> Result<Self, MessengerError> {
        let creds = Credentials::new(settings.user.clone(), settings.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| MessengerError::Transport(format!("SMTP relay error: {}", e)))?
            .port(settings.port)
            .credentials(creds)
            .build();

        Ok(Self {
            from: settings.from.clone(),
            transport,
        })
    }
}

#[async_trait]
impl Messenger for SmtpMessenger {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MessengerError> {
        let email = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|_| MessengerError::InvalidAddress(self.from.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| MessengerError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MessengerError::Build(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| MessengerError::Transport(e.to_string()))?;

        Ok(())
    }
}

/// Writes messages to the log instead of delivering them; used when SMTP is not configured.
pub struct LogMessenger;

#[async_trait]
impl Messenger for LogMessenger {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MessengerError> {
        info!(to, subject, body, "Outgoing message (SMTP disabled)");
        Ok(())
    }
}
