//! Shared helpers for the unit tests in this crate

use crate::mail::{MailError, Mailer, OutboundEmail, SendReceipt};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Mailer that records every message instead of delivering.
#[derive(Default)]
pub(crate) struct RecordingMailer {
    pub(crate) sent: Mutex<Vec<OutboundEmail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<SendReceipt, MailError> {
        self.sent.lock().push(email.clone());
        Ok(SendReceipt {
            success: true,
            mock: true,
        })
    }
}
