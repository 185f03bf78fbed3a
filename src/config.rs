//! Configuration types.
//!
//! Every integration is toggled by the presence of its secret in the
//! environment. Empty values count as absent.

use secrecy::SecretString;

use crate::error::{ConfigError, Result};

pub const DEFAULT_PORT: u16 = 8788;
pub const DEFAULT_NOTIFICATION_EMAIL: &str = "hi@openclawmac.com";
pub const DEFAULT_BOOKING_TYPE_ID: u64 = 1_756_759;
pub const DEFAULT_TIMEZONE: &str = "America/Chicago";
pub const DEFAULT_BOOKING_URL: &str =
    "https://tidycal.com/team/openclaw/15-minute-open-claw-consultation-call";

const RESEND_API_URL: &str = "https://api.resend.com";
const EMAILIT_API_URL: &str = "https://api.emailit.com/v1";
const TIDYCAL_API_URL: &str = "https://tidycal.com/api";

/// An email provider that accepts bearer-authenticated JSON.
#[derive(Debug, Clone)]
pub struct EmailApiConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub from: String,
}

/// Supabase REST access for the `leads` table.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub project_url: String,
    pub anon_key: SecretString,
}

/// TidyCal scheduling API access.
#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    /// Absent means the booking endpoints answer 500 "Missing API key".
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub default_booking_type: u64,
    /// Returned to the client when the provider omits a booking page URL.
    pub fallback_booking_url: String,
    pub default_timezone: String,
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub notification_email: String,
    pub resend: Option<EmailApiConfig>,
    pub emailit: Option<EmailApiConfig>,
    pub zapier_webhook: Option<String>,
    pub supabase: Option<SupabaseConfig>,
    pub scheduling: SchedulingConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            notification_email: DEFAULT_NOTIFICATION_EMAIL.to_string(),
            resend: None,
            emailit: None,
            zapier_webhook: None,
            supabase: None,
            scheduling: SchedulingConfig::default(),
        }
    }
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: TIDYCAL_API_URL.to_string(),
            default_booking_type: DEFAULT_BOOKING_TYPE_ID,
            fallback_booking_url: DEFAULT_BOOKING_URL.to_string(),
            default_timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl GatewayConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_lookup(|key| std::env::var(key).ok())?)
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> std::result::Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("LEAD_GATEWAY_PORT") {
            Some(raw) => parse_number("LEAD_GATEWAY_PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        let resend = get("RESEND_API_KEY").map(|key| EmailApiConfig {
            api_key: SecretString::from(key),
            base_url: get("RESEND_API_URL").unwrap_or_else(|| RESEND_API_URL.to_string()),
            from: get("RESEND_FROM")
                .unwrap_or_else(|| "OpenClaw Mac <onboarding@resend.dev>".to_string()),
        });

        let emailit = get("EMAILIT_API_KEY").map(|key| EmailApiConfig {
            api_key: SecretString::from(key),
            base_url: get("EMAILIT_API_URL").unwrap_or_else(|| EMAILIT_API_URL.to_string()),
            from: get("EMAILIT_FROM")
                .unwrap_or_else(|| "OpenClaw Mac <hi@openclawmac.com>".to_string()),
        });

        // Both halves are needed; a URL without a key is ignored.
        let supabase = match (get("SUPABASE_PROJECT_URL"), get("SUPABASE_ANON_KEY")) {
            (Some(url), Some(key)) => Some(SupabaseConfig {
                project_url: url.trim_end_matches('/').to_string(),
                anon_key: SecretString::from(key),
            }),
            _ => None,
        };

        let default_booking_type = match get("TIDYCAL_DEFAULT_BOOKING_TYPE") {
            Some(raw) => parse_number("TIDYCAL_DEFAULT_BOOKING_TYPE", &raw)?,
            None => DEFAULT_BOOKING_TYPE_ID,
        };

        let scheduling = SchedulingConfig {
            api_key: get("TIDYCAL_API_KEY").map(SecretString::from),
            base_url: get("TIDYCAL_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| TIDYCAL_API_URL.to_string()),
            default_booking_type,
            fallback_booking_url: get("BOOKING_FALLBACK_URL")
                .unwrap_or_else(|| DEFAULT_BOOKING_URL.to_string()),
            default_timezone: get("DEFAULT_TIMEZONE")
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
        };

        Ok(Self {
            port,
            notification_email: get("NOTIFICATION_EMAIL")
                .unwrap_or_else(|| DEFAULT_NOTIFICATION_EMAIL.to_string()),
            resend,
            emailit,
            zapier_webhook: get("ZAPIER_WEBHOOK"),
            supabase,
            scheduling,
        })
    }

    /// Names of the notification integrations this configuration enables.
    pub fn enabled_integrations(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.resend.is_some() {
            names.push("resend");
        }
        if self.zapier_webhook.is_some() {
            names.push("zapier");
        }
        if self.emailit.is_some() {
            names.push("emailit");
        }
        if self.supabase.is_some() {
            names.push("supabase");
        }
        names
    }
}

fn parse_number<T: std::str::FromStr>(
    key: &str,
    raw: &str,
) -> std::result::Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}
