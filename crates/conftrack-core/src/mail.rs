//! Mail collaborator contract
//!
//! Delivery is always best-effort: `send` returns a `Result`, callers
//! log failures and carry on. No mail outcome may fail the write it
//! decorates.

use async_trait::async_trait;
use serde::Serialize;

/// One outbound message.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    /// Plain-text body
    pub text: String,
    /// Optional HTML alternative
    pub html: Option<String>,
}

impl OutboundEmail {
    /// Plain-text message.
    #[must_use]
    pub fn plain(
        to: impl Into<String>,
        subject: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            text: text.into(),
            html: None,
        }
    }
}

/// Delivery acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SendReceipt {
    /// Whether the provider accepted the message
    pub success: bool,
    /// True when no real delivery was attempted
    pub mock: bool,
}

/// Delivery failure. An explicit value, never control flow.
#[derive(Debug, thiserror::Error)]
#[error("mail delivery failed: {0}")]
pub struct MailError(pub String);

/// Mail collaborator contract.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message.
    async fn send(&self, email: &OutboundEmail) -> Result<SendReceipt, MailError>;
}

/// Mailer that logs instead of delivering.
///
/// The default when no provider is configured; receipts carry
/// `mock: true` so callers can tell.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<SendReceipt, MailError> {
        tracing::info!(to = %email.to, subject = %email.subject, "mail (log only)");
        Ok(SendReceipt {
            success: true,
            mock: true,
        })
    }
}

/// Send and log, never propagate.
///
/// The one place the "mail failures stay on this side of the write
/// boundary" rule is implemented; every caller goes through here.
pub async fn send_best_effort(mailer: &dyn Mailer, email: OutboundEmail) {
    match mailer.send(&email).await {
        Ok(receipt) if receipt.success => {
            tracing::debug!(to = %email.to, mock = receipt.mock, "mail sent");
        }
        Ok(receipt) => {
            tracing::warn!(to = %email.to, mock = receipt.mock, "mail provider refused message");
        }
        Err(err) => {
            tracing::warn!(to = %email.to, error = %err, "mail delivery failed");
        }
    }
}
