use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender in Twilio's `whatsapp:+<number>` form.
    pub whatsapp_from: String,
}

#[derive(Debug, Clone)]
pub struct TextGatewayConfig {
    pub url: String,
    pub auth_key: String,
    pub sender_id: String,
}

/// Branding used when composing customer-facing messages.
#[derive(Debug, Clone)]
pub struct StoreProfile {
    pub name: String,
    pub site_url: String,
    /// Store WhatsApp number for `wa.me` links, digits only with country code.
    pub whatsapp_number: String,
}

impl Default for StoreProfile {
    fn default() -> Self {
        Self {
            name: "HarvestBites".to_string(),
            site_url: "https://harvestbites.com".to_string(),
            whatsapp_number: "919876543210".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay before retrying after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub smtp: Option<SmtpConfig>,
    pub twilio: Option<TwilioConfig>,
    pub text_gateway: TextGatewayConfig,
    /// Unset means OTPs never expire.
    pub otp_ttl: Option<Duration>,
    pub retry: RetryPolicy,
    pub http_timeout: Duration,
    pub store: StoreProfile,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let smtp = match get("SMTP_HOST") {
            Some(host) => {
                let username =
                    get("EMAIL_HOST_USER").ok_or(ConfigError::Missing("EMAIL_HOST_USER"))?;
                let password = get("EMAIL_HOST_PASSWORD")
                    .ok_or(ConfigError::Missing("EMAIL_HOST_PASSWORD"))?;
                Some(SmtpConfig {
                    host,
                    port: parse("SMTP_PORT", get("SMTP_PORT"), 587)?,
                    from_address: get("DEFAULT_FROM_EMAIL").unwrap_or_else(|| username.clone()),
                    username,
                    password,
                })
            }
            None => None,
        };

        let twilio = match (
            get("TWILIO_ACCOUNT_SID"),
            get("TWILIO_AUTH_TOKEN"),
            get("TWILIO_WHATSAPP_FROM"),
        ) {
            (Some(account_sid), Some(auth_token), Some(whatsapp_from)) => Some(TwilioConfig {
                account_sid,
                auth_token,
                whatsapp_from,
            }),
            _ => None,
        };

        let defaults = StoreProfile::default();

        Ok(AppConfig {
            database_url,
            host: or("HOST", "0.0.0.0"),
            port: parse("PORT", get("PORT"), 8080)?,
            smtp,
            twilio,
            text_gateway: TextGatewayConfig {
                url: or("MSG91_URL", "https://www.mydemoapi.com/sendhttp.php"),
                auth_key: or("MSG91_AUTH_KEY", "demo"),
                sender_id: or("MSG91_SENDER_ID", "HBITES"),
            },
            otp_ttl: match get("OTP_TTL_SECS") {
                Some(raw) => Some(Duration::from_secs(parse("OTP_TTL_SECS", Some(raw), 0)?)),
                None => None,
            },
            retry: RetryPolicy {
                max_attempts: parse("NOTIFY_MAX_ATTEMPTS", get("NOTIFY_MAX_ATTEMPTS"), 3u32)?
                    .max(1),
                base_delay: Duration::from_millis(parse(
                    "NOTIFY_BACKOFF_MS",
                    get("NOTIFY_BACKOFF_MS"),
                    500,
                )?),
            },
            http_timeout: Duration::from_secs(parse(
                "HTTP_TIMEOUT_SECS",
                get("HTTP_TIMEOUT_SECS"),
                10,
            )?),
            store: StoreProfile {
                name: or("STORE_NAME", defaults.name.as_str()),
                site_url: or("STORE_SITE_URL", defaults.site_url.as_str()),
                whatsapp_number: or("STORE_WHATSAPP_NUMBER", defaults.whatsapp_number.as_str()),
            },
        })
    }
}

fn parse<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
