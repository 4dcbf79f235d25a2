use std::{
    future::Future,
    pin::Pin,
    sync::{Mutex, PoisonError},
};

/// A password-reset email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetEmail {
    pub to: String,
    pub reset_url: String,
}

/// Outbound mail, boxed for dynamic dispatch.
pub trait Mailer: Send + Sync {
    fn send_password_reset<'a>(
        &'a self,
        email: ResetEmail,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;
}

/// Records deliveries in the log. The reset URL carries the token and is
/// never written out.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMailer;

impl Mailer for TracingMailer {
    fn send_password_reset<'a>(
        &'a self,
        email: ResetEmail,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            tracing::info!(to = %email.to, "password reset email queued");
            Ok(())
        })
    }
}

/// Keeps every message in memory for later inspection.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<ResetEmail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<ResetEmail> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Mailer for RecordingMailer {
    fn send_password_reset<'a>(
        &'a self,
        email: ResetEmail,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.sent.lock().unwrap_or_else(PoisonError::into_inner).push(email);
            Ok(())
        })
    }
}
