use std::collections::BTreeMap;

use log::debug;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::config::Credentials;

pub const EMAILJS_SEND_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Variables substituted into the EmailJS-side template.
pub type TemplateParams = BTreeMap<String, String>;

/// Transport failure while talking to EmailJS (DNS, TLS, reset, ...).
#[derive(Debug, Error)]
#[error("EmailJS request failed: {0}")]
pub struct NetworkError(#[from] reqwest::Error);

/// Whatever EmailJS answered. The body is kept raw for logging only.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub status_code: u16,
    pub body: String,
}

#[derive(Serialize)]
struct SendPayload<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a TemplateParams,
}

#[derive(Clone)]
pub struct EmailJsClient {
    http_client: Client,
    endpoint: String,
}

impl EmailJsClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// POSTs one send request. Every call goes out on the wire; there is no
    /// retry and no timeout beyond the transport defaults.
    pub async fn send_email(
        &self,
        params: &TemplateParams,
        credentials: &Credentials,
    ) -> Result<ProviderResponse, NetworkError> {
        let payload = SendPayload {
            service_id: &credentials.service_id,
            template_id: &credentials.template_id,
            user_id: &credentials.public_key,
            template_params: params,
        };

        debug!("POST {} with {} template params", self.endpoint, params.len());

        // `json` sets Content-Type; the buffered body gives Content-Length.
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await?;

        let status_code = response.status().as_u16();
        let body = response.text().await?;

        Ok(ProviderResponse { status_code, body })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            service_id: "service_123".into(),
            template_id: "template_456".into(),
            public_key: "pk_789".into(),
        }
    }

    #[tokio::test]
    async fn posts_credentials_and_template_params() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1.0/email/send"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "service_id": "service_123",
                "template_id": "template_456",
                "user_id": "pk_789",
                "template_params": { "to_name": "Ada" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
            .expect(1)
            .mount(&server)
            .await;

        let client = EmailJsClient::new(format!("{}/api/v1.0/email/send", server.uri()));
        let params = TemplateParams::from([("to_name".to_string(), "Ada".to_string())]);
        let response = client.send_email(&params, &credentials()).await.unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "OK");
    }

    #[tokio::test]
    async fn empty_params_serialize_as_empty_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({
                "service_id": "service_123",
                "template_id": "template_456",
                "user_id": "pk_789",
                "template_params": {}
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = EmailJsClient::new(server.uri());
        client
            .send_email(&TemplateParams::new(), &credentials())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_200_is_returned_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("The user_id parameter is required"))
            .mount(&server)
            .await;

        let client = EmailJsClient::new(server.uri());
        let response = client
            .send_email(&TemplateParams::new(), &credentials())
            .await
            .unwrap();

        assert_eq!(response.status_code, 400);
        assert_eq!(response.body, "The user_id parameter is required");
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_network_error() {
        let client = EmailJsClient::new("http://127.0.0.1:1/api/v1.0/email/send");
        let err = client
            .send_email(&TemplateParams::new(), &credentials())
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("EmailJS request failed"));
    }
}
