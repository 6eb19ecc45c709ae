// ==================== SMS MESSAGING ====================
// Abstração do provedor de SMS. Em produção: Twilio REST API.
// Sem credenciais configuradas, as mensagens são apenas logadas (dry run).

pub mod client;
pub mod types;

use async_trait::async_trait;

pub use client::TwilioClient;
pub use types::{OutboundMessage, SentMessage, TwilioError};

#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<SentMessage, TwilioError>;
}

/// Sender used when no Twilio credentials are configured
pub struct LogSender;

#[async_trait]
impl MessageSender for LogSender {
    async fn send(&self, message: &OutboundMessage) -> Result<SentMessage, TwilioError> {
        log::info!("📵 [dry run] SMS to {}:\n{}", message.to, message.body);
        Ok(SentMessage {
            sid: format!("dry-run-{}", uuid::Uuid::new_v4()),
            status: Some("logged".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sender_always_succeeds() {
        let sent = LogSender
            .send(&OutboundMessage {
                to: "+15551234567".into(),
                body: "Hi Jane".into(),
            })
            .await
            .unwrap();
        assert!(sent.sid.starts_with("dry-run-"));
        assert_eq!(sent.status.as_deref(), Some("logged"));
    }
}
