use serde::Deserialize;

use trackwise_auth_types::cookie::CookieSettings;
use trackwise_core::config::Config;
use trackwise_domain::money::DEFAULT_CURRENCY_SYMBOL;

/// How verification emails leave the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailTransportKind {
    /// Write the message to the log only (development).
    #[default]
    Log,
    Smtp,
    /// JSON HTTP mail API with bearer auth.
    Http,
}

/// TrackWise service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackwiseConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server. Env var: `PORT`.
    #[serde(default = "default_port")]
    pub port: u16,
    /// HMAC secret for session tokens.
    pub jwt_secret: String,
    #[serde(default)]
    pub cookie_domain: Option<String>,
    #[serde(default = "default_true")]
    pub cookie_secure: bool,

    #[serde(default)]
    pub mail_transport: MailTransportKind,
    #[serde(default = "default_mail_from")]
    pub mail_from: String,
    #[serde(default)]
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_username: Option<String>,
    #[serde(default)]
    pub smtp_password: Option<String>,
    #[serde(default)]
    pub mail_api_url: Option<String>,
    #[serde(default)]
    pub mail_api_key: Option<String>,

    /// Echo the verification code in the API response when delivery failed.
    #[serde(default)]
    pub otp_fallback_in_response: bool,
    #[serde(default = "default_currency")]
    pub currency_symbol: String,
}

impl Config for TrackwiseConfig {}

impl TrackwiseConfig {
    pub fn cookie_settings(&self) -> CookieSettings {
        CookieSettings {
            domain: self.cookie_domain.clone(),
            secure: self.cookie_secure,
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_smtp_port() -> u16 {
    587
}

fn default_mail_from() -> String {
    "TrackWise <noreply@trackwise.local>".to_owned()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_owned()
}
