use futures::future::join_all;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Serialize;
use thiserror::Error;

use crate::config;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("SMTP transport could not be built: {0}")]
    Transport(String),

    #[error("Invalid sender address: {0}")]
    InvalidSender(String),
}

/// One recipient that could not be delivered to
#[derive(Debug, Clone, Serialize)]
pub struct SendFailure {
    pub email: String,
    pub message: String,
}

/// Settled outcome of a blast: per-recipient success/failure counts,
/// with the failures listed. No retries are attempted.
#[derive(Debug, Default, Serialize)]
pub struct BlastReport {
    pub sent: usize,
    pub failed: usize,
    pub errors: Vec<SendFailure>,
}

/// Campaign mail delivery over the configured SMTP relay
pub struct EmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailService {
    pub fn from_config() -> Result<Self, EmailError> {
        let smtp = &config::config().smtp;

        let credentials = Credentials::new(smtp.username.clone(), smtp.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
            .map_err(|e| EmailError::Transport(e.to_string()))?
            .port(smtp.port)
            .credentials(credentials)
            .build();

        let from = smtp
            .sender()
            .parse::<Mailbox>()
            .map_err(|e| EmailError::InvalidSender(e.to_string()))?;

        Ok(Self { transport, from })
    }

    /// Send one message per recipient, concurrently, and collect the
    /// settled outcomes. A bad address is a per-recipient failure, not an
    /// error for the whole batch.
    pub async fn send_blast(&self, recipients: &[String], subject: &str, body: &str) -> BlastReport {
        let sends = recipients.iter().map(|raw| {
            let email = raw.trim().to_string();
            async move {
                match self.send_one(&email, subject, body).await {
                    Ok(()) => Ok(email),
                    Err(message) => Err(SendFailure { email, message }),
                }
            }
        });

        tally(join_all(sends).await)
    }

    async fn send_one(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        let mailbox = to
            .parse::<Mailbox>()
            .map_err(|e| format!("invalid recipient address: {}", e))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(mailbox)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| e.to_string())?;

        match self.transport.send(message).await {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::error!("Failed to send email to {}: {}", to, e);
                Err(e.to_string())
            }
        }
    }
}

fn tally(outcomes: Vec<Result<String, SendFailure>>) -> BlastReport {
    let mut report = BlastReport::default();
    for outcome in outcomes {
        match outcome {
            Ok(_) => report.sent += 1,
            Err(failure) => {
                report.failed += 1;
                report.errors.push(failure);
            }
        }
    }
    report
}
