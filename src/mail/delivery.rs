//! Outbound delivery.
//!
//! [`Transport`] is the seam between the mail service and the outside world.
//! [`SmtpTransport`] relays through an SMTP server with lettre,
//! [`LogTransport`] only logs, and [`MemoryTransport`] keeps envelopes in
//! memory for tests and local runs.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox as Address};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::{debug, info};

use crate::config::{SmtpConfig, SmtpSecurity};
use crate::{MailroomError, Result};

/// A message ready to leave the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Envelope {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Hands envelopes to a delivery mechanism.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver one envelope. Failures are reported as `MailroomError::Delivery`.
    async fn send(&self, envelope: &Envelope) -> Result<()>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Build the transport described by `config`.
pub fn transport_from_config(config: &SmtpConfig) -> Result<Arc<dyn Transport>> {
    if config.enabled {
        Ok(Arc::new(SmtpTransport::new(config)?))
    } else {
        info!("SMTP disabled, outgoing mail will only be logged");
        Ok(Arc::new(LogTransport))
    }
}

/// SMTP relay transport.
pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// Build a transport from configuration. No connection is made until the first send.
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)));

        let builder = match config.security {
            SmtpSecurity::None => builder.tls(Tls::None),
            security => {
                let params = TlsParameters::new(config.host.clone())
                    .map_err(|e| MailroomError::Config(format!("SMTP TLS setup failed: {e}")))?;
                if security == SmtpSecurity::Tls {
                    builder.tls(Tls::Wrapper(params))
                } else {
                    builder.tls(Tls::Required(params))
                }
            }
        };

        let builder = if config.username.is_empty() {
            builder
        } else {
            builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
        };

        info!(
            host = %config.host,
            port = config.port,
            security = ?config.security,
            "SMTP transport configured"
        );

        Ok(Self {
            mailer: builder.build(),
        })
    }

    fn build_message(envelope: &Envelope) -> Result<lettre::Message> {
        let from: Address = envelope
            .from
            .parse()
            .map_err(|e| MailroomError::Delivery(format!("invalid sender address: {e}")))?;
        let to: Address = envelope
            .to
            .parse()
            .map_err(|e| MailroomError::Delivery(format!("invalid recipient address: {e}")))?;

        lettre::Message::builder()
            .from(from)
            .to(to)
            .subject(envelope.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(envelope.body.clone())
            .map_err(|e| MailroomError::Delivery(e.to_string()))
    }
}

#[async_trait]
impl Transport for SmtpTransport {
    async fn send(&self, envelope: &Envelope) -> Result<()> {
        let message = Self::build_message(envelope)?;
        self.mailer
            .send(message)
            .await
            .map_err(|e| MailroomError::Delivery(e.to_string()))?;
        debug!(from = %envelope.from, to = %envelope.to, "Relayed via SMTP");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

/// Transport that logs instead of sending.
pub struct LogTransport;

#[async_trait]
impl Transport for LogTransport {
    async fn send(&self, envelope: &Envelope) -> Result<()> {
        info!(
            from = %envelope.from,
            to = %envelope.to,
            subject = %envelope.subject,
            "Outgoing mail (not relayed)"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Transport that keeps every envelope in memory.
///
/// A failing instance rejects every send, which is how delivery errors are
/// exercised without a network.
#[derive(Default)]
pub struct MemoryTransport {
    sent: Mutex<Vec<Envelope>>,
    fail_with: Option<String>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose sends all fail with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(reason.into()),
        }
    }

    /// Envelopes accepted so far.
    pub fn sent(&self) -> Vec<Envelope> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, envelope: &Envelope) -> Result<()> {
        if let Some(reason) = &self.fail_with {
            return Err(MailroomError::Delivery(reason.clone()));
        }
        self.sent
            .lock()
            .map_err(|_| MailroomError::Delivery("transport state poisoned".to_string()))?
            .push(envelope.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
