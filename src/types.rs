use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::emailjs::TemplateParams;

#[derive(Deserialize)]
pub struct SendEmailRequest {
    #[serde(default)]
    pub action: Option<Value>,
}

/// Body of every JSON result, success or not.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

impl ApiResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayAction {
    SendTestEmail,
    SendBirthdayEmail,
}

impl RelayAction {
    pub fn template_params(self) -> TemplateParams {
        TemplateParams::new()
    }

    pub fn success_message(self) -> &'static str {
        match self {
            Self::SendTestEmail => "Test email sent successfully!",
            Self::SendBirthdayEmail => "Birthday email sent successfully!",
        }
    }
}

impl FromStr for RelayAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "send_test_email" => Ok(Self::SendTestEmail),
            "send_birthday_email" => Ok(Self::SendBirthdayEmail),
            _ => Err(()),
        }
    }
}

/// Outcome of reading `action` out of a relay request.
#[derive(Debug, PartialEq, Eq)]
pub enum ActionField {
    Missing,
    Invalid,
    Valid(RelayAction),
}

impl SendEmailRequest {
    /// Falsy JSON values (`null`, `false`, `0`, `""`) count as missing.
    pub fn action(&self) -> ActionField {
        match &self.action {
            None | Some(Value::Null) | Some(Value::Bool(false)) => ActionField::Missing,
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => ActionField::Missing,
            Some(Value::String(s)) if s.is_empty() => ActionField::Missing,
            Some(Value::String(s)) => s
                .parse()
                .map(ActionField::Valid)
                .unwrap_or(ActionField::Invalid),
            Some(_) => ActionField::Invalid,
        }
    }
}
