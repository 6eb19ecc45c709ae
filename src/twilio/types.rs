use serde::{Deserialize, Serialize};

/// Uma mensagem pronta para envio (telefone já em E.164)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundMessage {
    pub to: String,
    pub body: String,
}

/// Subset of the Twilio message resource we care about
#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    pub sid: String,
    pub status: Option<String>,
}

/// Twilio error body: {"code": 21211, "message": "...", "status": 400}
#[derive(Debug, Deserialize)]
pub struct TwilioErrorBody {
    pub code: Option<i64>,
    pub message: Option<String>,
}

#[derive(Debug)]
pub struct TwilioError {
    pub message: String,
    pub code: Option<i64>,
    pub status: Option<u16>,
}

impl TwilioError {
    pub fn transport(message: impl Into<String>) -> Self {
        TwilioError {
            message: message.into(),
            code: None,
            status: None,
        }
    }
}

impl std::fmt::Display for TwilioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.status, self.code) {
            (Some(status), Some(code)) => {
                write!(f, "Twilio error {} (HTTP {}): {}", code, status, self.message)
            }
            (Some(status), None) => write!(f, "Twilio error (HTTP {}): {}", status, self.message),
            _ => write!(f, "Twilio error: {}", self.message),
        }
    }
}

impl std::error::Error for TwilioError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = TwilioError {
            message: "The 'To' number is not a valid phone number.".into(),
            code: Some(21211),
            status: Some(400),
        };
        assert_eq!(
            e.to_string(),
            "Twilio error 21211 (HTTP 400): The 'To' number is not a valid phone number."
        );
        assert_eq!(TwilioError::transport("timeout").to_string(), "Twilio error: timeout");
    }

    #[test]
    fn test_parses_message_resource() {
        let sent: SentMessage = serde_json::from_str(
            r#"{"sid":"SM123","status":"accepted","to":"+15551234567","body":"hi"}"#,
        )
        .unwrap();
        assert_eq!(sent.sid, "SM123");
        assert_eq!(sent.status.as_deref(), Some("accepted"));
    }
}
