use thiserror::Error;

use crate::emailjs::EMAILJS_SEND_URL;

const DEFAULT_PORT: u16 = 3000;

/// Startup-only settings for the HTTP server itself.
pub struct ServerConfig {
    pub port: u16,
    pub emailjs_url: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("EMAILJS_RELAY_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let emailjs_url = env_var("EMAILJS_API_URL").unwrap_or_else(|| EMAILJS_SEND_URL.to_string());

        Self { port, emailjs_url }
    }
}

/// Provider credentials plus the optional cron secret, read once per invocation.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub service_id: Option<String>,
    pub template_id: Option<String>,
    pub public_key: Option<String>,
    pub cron_secret: Option<String>,
}

/// The three EmailJS identifiers, all known to be present.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

#[derive(Debug, Error)]
#[error(
    "missing EmailJS credentials (has_public_key: {has_public_key}, has_service_id: {has_service_id}, has_template_id: {has_template_id})"
)]
pub struct MissingCredentials {
    pub has_public_key: bool,
    pub has_service_id: bool,
    pub has_template_id: bool,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            service_id: env_var("EMAILJS_SERVICE_ID"),
            template_id: env_var("EMAILJS_TEMPLATE_ID"),
            public_key: env_var("EMAILJS_PUBLIC_KEY"),
            cron_secret: env_var("CRON_SECRET"),
        }
    }

    pub fn credentials(&self) -> Result<Credentials, MissingCredentials> {
        match (
            non_empty(&self.service_id),
            non_empty(&self.template_id),
            non_empty(&self.public_key),
        ) {
            (Some(service_id), Some(template_id), Some(public_key)) => Ok(Credentials {
                service_id: service_id.to_string(),
                template_id: template_id.to_string(),
                public_key: public_key.to_string(),
            }),
            (service_id, template_id, public_key) => Err(MissingCredentials {
                has_public_key: public_key.is_some(),
                has_service_id: service_id.is_some(),
                has_template_id: template_id.is_some(),
            }),
        }
    }

    pub fn cron_secret(&self) -> Option<&str> {
        non_empty(&self.cron_secret)
    }
}

/// Where handlers get their [`Settings`] from on each invocation.
#[derive(Clone)]
pub enum SettingsSource {
    Environment,
    Fixed(Settings),
}

impl SettingsSource {
    pub fn load(&self) -> Settings {
        match self {
            Self::Environment => Settings::from_env(),
            Self::Fixed(settings) => settings.clone(),
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
