//! Client for the incant generation service.
//!
//! Every endpoint speaks the service's JSON envelope: requests are wrapped in
//! an `Input` object and responses arrive under an `Output` object. Transport
//! failures and non-200 statuses are errors; service-level conditions (an
//! invalid credential, an exhausted quota) come back inside the envelope and
//! are surfaced to the caller as data, not errors, so a session can keep
//! running after showing a warning.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::http_client::HttpClient;

const GENERATE_URL: &str = "https://api.incant.dev/v1/generate";
const EXPLAIN_URL: &str = "https://api.incant.dev/v1/explain";
const LOGIN_URL: &str = "https://api.incant.dev/v1/login";
const REGISTER_IP_URL: &str = "https://api.incant.dev/v1/register-ip";
const SUBSCRIPTION_STATUS_URL: &str = "https://api.incant.dev/v1/subscription/status";
const SUBSCRIPTION_START_URL: &str = "https://api.incant.dev/v1/subscription/start";
const SUBSCRIPTION_CANCEL_URL: &str = "https://api.incant.dev/v1/subscription/cancel";
const EXTERNAL_IP_URL: &str = "https://api.ipify.org";

/// A generated command as returned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedCommand {
    /// Whether the caller's credential was accepted.
    #[serde(default)]
    pub valid: bool,
    /// Remaining generation quota for this credential.
    #[serde(default)]
    pub quota: i64,
    /// The generated shell command text.
    #[serde(default)]
    pub cmd: String,
}

impl GeneratedCommand {
    /// A non-fatal warning to show alongside the command, if the service
    /// flagged the credential or quota.
    pub fn warning(&self) -> Option<String> {
        if !self.valid {
            Some(
                "Your credential was not accepted. Run 'incant login' to re-authenticate."
                    .to_string(),
            )
        } else if self.quota <= 0 {
            Some(
                "You have exceeded your quota. Run 'incant subscription start' to subscribe."
                    .to_string(),
            )
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateEnvelope {
    #[serde(rename = "Output")]
    output: GeneratedCommand,
}

#[derive(Debug, Deserialize)]
struct ExplainEnvelope {
    #[serde(rename = "Output")]
    output: ExplainBody,
}

#[derive(Debug, Deserialize)]
struct ExplainBody {
    #[serde(default)]
    output: String,
}

#[derive(Debug, Deserialize)]
struct LoginEnvelope {
    #[serde(rename = "Output")]
    output: LoginBody,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    #[serde(default)]
    flid: String,
}

#[derive(Debug, Deserialize)]
struct RegisterEnvelope {
    #[serde(rename = "Output")]
    output: String,
}

/// Subscription state as reported by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionStatus {
    #[serde(default)]
    pub subscription: bool,
    #[serde(default, rename = "subscriptionURL")]
    pub subscription_url: String,
    #[serde(default)]
    pub error: String,
}

#[derive(Debug, Deserialize)]
struct SubscriptionEnvelope {
    #[serde(rename = "Output")]
    output: SubscriptionStatus,
}

/// The remote operations the interactive session depends on.
///
/// The generation state machine only ever sees this trait, so tests drive it
/// with mock services instead of the network.
#[async_trait]
pub trait CommandService: Send + Sync {
    /// Generate a shell command from a natural-language prompt.
    async fn generate(&self, prompt: &str, language: &str) -> Result<GeneratedCommand>;

    /// Ask the service to explain a generated command.
    async fn explain(&self, command: &str, language: &str) -> Result<String>;
}

/// Production client backed by the incant service.
pub struct ApiClient {
    http: Arc<dyn HttpClient>,
    flid: String,
}

impl ApiClient {
    pub fn new(http: Arc<dyn HttpClient>, flid: String) -> Self {
        Self { http, flid }
    }

    async fn post_envelope(&self, url: &str, input: serde_json::Value) -> Result<String> {
        let body = json!({ "Input": input });
        let (status, response) = self.http.post_json(url, &[], &body).await?;
        if status != 200 {
            return Err(anyhow!("service returned status {}: {}", status, response));
        }
        Ok(response)
    }

    /// Exchange a device-flow access token (plus any existing FLID) for a
    /// fresh FLID.
    pub async fn login(&self, token: &str) -> Result<String> {
        let response = self
            .post_envelope(LOGIN_URL, json!({ "flid": self.flid, "token": token }))
            .await?;
        let envelope: LoginEnvelope = serde_json::from_str(&response)
            .map_err(|e| anyhow!("could not parse login response: {}", e))?;
        if envelope.output.flid.is_empty() {
            return Err(anyhow!("login response carried no flid"));
        }
        Ok(envelope.output.flid)
    }

    /// Register a guest credential keyed on the caller's public IP.
    pub async fn register_guest(&self) -> Result<String> {
        let ip = self.http.get_text(EXTERNAL_IP_URL).await?;
        if ip.is_empty() {
            return Err(anyhow!("could not determine external IP"));
        }
        info!("Registering guest credential for {}", ip);

        let response = self
            .post_envelope(REGISTER_IP_URL, json!({ "ip": ip }))
            .await?;
        let envelope: RegisterEnvelope = serde_json::from_str(&response)
            .map_err(|e| anyhow!("could not parse registration response: {}", e))?;
        if envelope.output.is_empty() {
            return Err(anyhow!("registration response carried no flid"));
        }
        Ok(envelope.output)
    }

    async fn subscription(&self, url: &str) -> Result<SubscriptionStatus> {
        let response = self
            .post_envelope(url, json!({ "flid": self.flid }))
            .await?;
        let envelope: SubscriptionEnvelope = serde_json::from_str(&response)
            .map_err(|e| anyhow!("could not parse subscription response: {}", e))?;
        if !envelope.output.error.is_empty() {
            return Err(anyhow!(envelope.output.error.clone()));
        }
        Ok(envelope.output)
    }

    pub async fn subscription_status(&self) -> Result<SubscriptionStatus> {
        self.subscription(SUBSCRIPTION_STATUS_URL).await
    }

    pub async fn subscription_start(&self) -> Result<SubscriptionStatus> {
        self.subscription(SUBSCRIPTION_START_URL).await
    }

    pub async fn subscription_cancel(&self) -> Result<SubscriptionStatus> {
        self.subscription(SUBSCRIPTION_CANCEL_URL).await
    }
}

#[async_trait]
impl CommandService for ApiClient {
    async fn generate(&self, prompt: &str, language: &str) -> Result<GeneratedCommand> {
        info!("Requesting command generation for language: {}", language);
        let response = self
            .post_envelope(
                GENERATE_URL,
                json!({ "prompt": prompt, "language": language, "flid": self.flid }),
            )
            .await?;

        let envelope: GenerateEnvelope = serde_json::from_str(&response)
            .map_err(|e| anyhow!("could not parse generation response: {}", e))?;
        if !envelope.output.valid {
            warn!("Service rejected credential during generation");
        }
        Ok(envelope.output)
    }

    async fn explain(&self, command: &str, language: &str) -> Result<String> {
        let response = self
            .post_envelope(EXPLAIN_URL, json!({ "command": command, "language": language }))
            .await?;
        let envelope: ExplainEnvelope = serde_json::from_str(&response)
            .map_err(|e| anyhow!("could not parse explanation response: {}", e))?;
        if envelope.output.output.is_empty() {
            return Err(anyhow!("expected output field not found in explanation response"));
        }
        Ok(envelope.output.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::mock::MockHttpClient;

    fn client_with(responses: Vec<(u16, &str)>) -> ApiClient {
        ApiClient::new(Arc::new(MockHttpClient::new(responses)), "flid-1".to_string())
    }

    #[tokio::test]
    async fn test_generate_parses_envelope() {
        let client = client_with(vec![(
            200,
            r#"{"Output": {"valid": true, "quota": 50, "cmd": "ls -la"}}"#,
        )]);

        let generated = client.generate("list files", "Unix/Bash").await.unwrap();
        assert!(generated.valid);
        assert_eq!(generated.cmd, "ls -la");
        assert!(generated.warning().is_none());
    }

    #[tokio::test]
    async fn test_generate_non_200_is_error() {
        let client = client_with(vec![(500, "internal error")]);
        let result = client.generate("list files", "Unix/Bash").await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_generate_invalid_credential_yields_warning() {
        let client = client_with(vec![(
            200,
            r#"{"Output": {"valid": false, "quota": 10, "cmd": ""}}"#,
        )]);

        let generated = client.generate("list files", "Unix/Bash").await.unwrap();
        let warning = generated.warning().unwrap();
        assert!(warning.contains("incant login"));
    }

    #[tokio::test]
    async fn test_generate_exhausted_quota_yields_warning() {
        let client = client_with(vec![(
            200,
            r#"{"Output": {"valid": true, "quota": 0, "cmd": "ls"}}"#,
        )]);

        let generated = client.generate("list files", "Unix/Bash").await.unwrap();
        let warning = generated.warning().unwrap();
        assert!(warning.contains("subscription"));
        // The command is still usable despite the warning
        assert_eq!(generated.cmd, "ls");
    }

    #[tokio::test]
    async fn test_explain_parses_output() {
        let client = client_with(vec![(
            200,
            r#"{"Output": {"output": "Lists directory contents in long form."}}"#,
        )]);

        let explanation = client.explain("ls -la", "Unix/Bash").await.unwrap();
        assert!(explanation.contains("long form"));
    }

    #[tokio::test]
    async fn test_explain_missing_output_is_error() {
        let client = client_with(vec![(200, r#"{"Output": {}}"#)]);
        assert!(client.explain("ls", "Unix/Bash").await.is_err());
    }

    #[tokio::test]
    async fn test_login_returns_flid() {
        let client = client_with(vec![(200, r#"{"Output": {"flid": "flid-next"}}"#)]);
        let flid = client.login("gh-token").await.unwrap();
        assert_eq!(flid, "flid-next");
    }

    #[tokio::test]
    async fn test_login_empty_flid_is_error() {
        let client = client_with(vec![(200, r#"{"Output": {"flid": ""}}"#)]);
        assert!(client.login("gh-token").await.is_err());
    }

    #[tokio::test]
    async fn test_register_guest_uses_external_ip() {
        let client = client_with(vec![
            (200, "203.0.113.9"),
            (200, r#"{"Output": "flid-guest"}"#),
        ]);
        let flid = client.register_guest().await.unwrap();
        assert_eq!(flid, "flid-guest");
    }

    #[tokio::test]
    async fn test_subscription_error_field_propagates() {
        let client = client_with(vec![(
            200,
            r#"{"Output": {"subscription": false, "subscriptionURL": "", "error": "no such account"}}"#,
        )]);
        let result = client.subscription_status().await;
        assert!(result.unwrap_err().to_string().contains("no such account"));
    }
}
