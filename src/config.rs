// ==================== APP CONFIGURATION ====================
// Todas as variáveis vêm do ambiente (.env carregado via dotenv no main)

use chrono::FixedOffset;
use std::env;

use crate::utils::dates;

pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";

#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone)]
pub struct TwilioSettings {
    pub account_sid: String,
    pub auth_token: String,
    pub messaging_service_sid: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt: JwtSettings,
    /// None = dry run, messages are only logged
    pub twilio: Option<TwilioSettings>,
    pub notify_offset: FixedOffset,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup (the process env in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match get("PORT") {
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| format!("PORT must be a valid port number, got '{}'", p))?,
            None => 3002,
        };
        let database_url = get("DATABASE_URL").ok_or("DATABASE_URL must be set")?;

        let jwt = JwtSettings {
            secret: get("JWT_SECRET").ok_or("JWT_SECRET must be set")?,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| "duty-roster".to_string()),
            audience: get("JWT_AUDIENCE").unwrap_or_else(|| "duty-roster-api".to_string()),
        };

        let twilio = match (
            get("TWILIO_ACCOUNT_SID"),
            get("TWILIO_AUTH_TOKEN"),
            get("TWILIO_MESSAGING_SID"),
        ) {
            (Some(account_sid), Some(auth_token), Some(messaging_service_sid)) => {
                Some(TwilioSettings {
                    account_sid,
                    auth_token,
                    messaging_service_sid,
                    api_base: get("TWILIO_API_BASE")
                        .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string()),
                })
            }
            (None, None, None) => None,
            _ => {
                return Err(
                    "TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN and TWILIO_MESSAGING_SID must be set together"
                        .to_string(),
                )
            }
        };

        let notify_offset = match get("NOTIFY_UTC_OFFSET_HOURS") {
            Some(h) => {
                let hours = h
                    .parse::<i32>()
                    .map_err(|_| format!("NOTIFY_UTC_OFFSET_HOURS must be an integer, got '{}'", h))?;
                dates::offset_from_hours(hours).ok_or_else(|| {
                    format!("NOTIFY_UTC_OFFSET_HOURS must be between -23 and 23, got {}", hours)
                })?
            }
            None => dates::utc_offset(),
        };

        let cors_origins = get("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://127.0.0.1:3000".to_string(),
                ]
            });

        Ok(Self {
            host,
            port,
            database_url,
            jwt,
            twilio,
            notify_offset,
            cors_origins,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
