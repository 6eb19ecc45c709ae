use async_trait::async_trait;

use super::types::{OutboundMessage, SentMessage, TwilioError, TwilioErrorBody};
use super::MessageSender;
use crate::config::TwilioSettings;

const API_VERSION: &str = "2010-04-01";

pub struct TwilioClient {
    http: reqwest::Client,
    settings: TwilioSettings,
}

impl TwilioClient {
    pub fn new(settings: TwilioSettings) -> Result<Self, TwilioError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| TwilioError::transport(format!("Failed to build HTTP client: {}", e)))?;

        log::info!(
            "📨 Twilio client ready (account {}, messaging service {})",
            mask(&settings.account_sid),
            mask(&settings.messaging_service_sid)
        );

        Ok(Self { http, settings })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/{}/Accounts/{}/Messages.json",
            self.settings.api_base.trim_end_matches('/'),
            API_VERSION,
            self.settings.account_sid
        )
    }

    fn form<'a>(&'a self, message: &'a OutboundMessage) -> [(&'static str, &'a str); 3] {
        [
            ("To", message.to.as_str()),
            ("Body", message.body.as_str()),
            ("MessagingServiceSid", self.settings.messaging_service_sid.as_str()),
        ]
    }
}

#[async_trait]
impl MessageSender for TwilioClient {
    async fn send(&self, message: &OutboundMessage) -> Result<SentMessage, TwilioError> {
        let response = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.settings.account_sid, Some(&self.settings.auth_token))
            .form(&self.form(message))
            .send()
            .await
            .map_err(|e| TwilioError::transport(format!("Failed to reach Twilio: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body: Option<TwilioErrorBody> = response.json().await.ok();
            return Err(TwilioError {
                message: body
                    .as_ref()
                    .and_then(|b| b.message.clone())
                    .unwrap_or_else(|| status.to_string()),
                code: body.and_then(|b| b.code),
                status: Some(status.as_u16()),
            });
        }

        response
            .json::<SentMessage>()
            .await
            .map_err(|e| TwilioError::transport(format!("Failed to parse Twilio response: {}", e)))
    }
}

/// Keeps the first 4 chars of a credential for logs
fn mask(value: &str) -> String {
    let visible: String = value.chars().take(4).collect();
    format!("{}…", visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_base: &str) -> TwilioSettings {
        TwilioSettings {
            account_sid: "AC0123456789".into(),
            auth_token: "token".into(),
            messaging_service_sid: "MG0123456789".into(),
            api_base: api_base.into(),
        }
    }

    #[test]
    fn test_messages_url() {
        let client = TwilioClient::new(settings("https://api.twilio.com/")).unwrap();
        assert_eq!(
            client.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC0123456789/Messages.json"
        );
    }

    #[test]
    fn test_form_fields() {
        let client = TwilioClient::new(settings("https://api.twilio.com")).unwrap();
        let message = OutboundMessage {
            to: "+15551234567".into(),
            body: "Hi Jane".into(),
        };
        assert_eq!(
            client.form(&message),
            [
                ("To", "+15551234567"),
                ("Body", "Hi Jane"),
                ("MessagingServiceSid", "MG0123456789"),
            ]
        );
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("AC0123456789"), "AC01…");
        assert_eq!(mask("AC"), "AC…");
    }

    #[tokio::test]
    #[ignore] // Requires real Twilio credentials and network access
    async fn test_send_real_message() {
        dotenv::dotenv().ok();
        let config = crate::config::AppConfig::from_env().unwrap();
        let client = TwilioClient::new(config.twilio.expect("Twilio not configured")).unwrap();
        let to = std::env::var("TWILIO_TEST_TO").expect("TWILIO_TEST_TO must be set");
        let sent = client
            .send(&OutboundMessage {
                to,
                body: "duty-roster test message".into(),
            })
            .await;
        assert!(sent.is_ok());
    }
}
