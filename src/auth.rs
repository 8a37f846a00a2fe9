//! Device authorization flow for logging in through GitHub.
//!
//! The flow is a bounded polling state machine: request a device code, show
//! the user code, then exchange the device code for an access token on a
//! fixed cadence. Each poll iteration performs exactly one network call and
//! one sleep, so total wall-clock time is bounded by
//! `MAX_POLL_ATTEMPTS * interval`. An empty access token is not an error, it
//! means the user has not authorized yet and consumes one attempt.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::http_client::HttpClient;
use crate::output;

const GITHUB_CLIENT_ID: &str = "Ov23liak5XRTpeHgGDtx";
const DEVICE_CODE_URL: &str = "https://github.com/login/device/code";
const ACCESS_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

/// Hard cap on token polls per login attempt.
pub const MAX_POLL_ATTEMPTS: u32 = 12;

/// State of a device authorization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Requesting,
    Polling,
    Succeeded,
    Failed,
    TimedOut,
}

/// A device-code grant in progress.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceAuthSession {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    /// Seconds to wait between token polls.
    pub interval: u64,
}

#[derive(Debug, Default, Deserialize)]
struct AccessTokenResponse {
    #[serde(default)]
    access_token: String,
}

/// The two network operations of the device flow, injectable for tests.
#[async_trait]
pub trait DeviceAuthEndpoint: Send + Sync {
    async fn request_device_code(&self) -> Result<DeviceAuthSession>;

    /// Exchange the device code for an access token. An empty string means
    /// the user has not authorized yet.
    async fn poll_token(&self, device_code: &str) -> Result<String>;
}

/// Async sleep, injectable so tests run without real time.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// GitHub-backed implementation of the device flow endpoints.
pub struct GitHubAuthEndpoint {
    http: Arc<dyn HttpClient>,
}

impl GitHubAuthEndpoint {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl DeviceAuthEndpoint for GitHubAuthEndpoint {
    async fn request_device_code(&self) -> Result<DeviceAuthSession> {
        let url = format!("{}?client_id={}&scope=user", DEVICE_CODE_URL, GITHUB_CLIENT_ID);
        let (status, body) = self
            .http
            .post_json(&url, &[], &serde_json::Value::Null)
            .await?;
        if status != 200 {
            return Err(anyhow!("device code request failed with status {}", status));
        }
        let session: DeviceAuthSession = serde_json::from_str(&body)
            .map_err(|e| anyhow!("could not parse device code response: {}", e))?;
        Ok(session)
    }

    async fn poll_token(&self, device_code: &str) -> Result<String> {
        let url = format!(
            "{}?client_id={}&device_code={}&grant_type=urn:ietf:params:oauth:grant-type:device_code",
            ACCESS_TOKEN_URL, GITHUB_CLIENT_ID, device_code
        );
        let (_, body) = self
            .http
            .post_json(&url, &[], &serde_json::Value::Null)
            .await?;
        let token: AccessTokenResponse = serde_json::from_str(&body)
            .map_err(|e| anyhow!("could not parse access token response: {}", e))?;
        Ok(token.access_token)
    }
}

/// Drives one login attempt through the bounded polling state machine.
pub struct DeviceAuthFlow<E: DeviceAuthEndpoint, S: Sleeper> {
    endpoint: E,
    sleeper: S,
    max_attempts: u32,
    phase: AuthPhase,
}

impl<E: DeviceAuthEndpoint, S: Sleeper> DeviceAuthFlow<E, S> {
    pub fn new(endpoint: E, sleeper: S) -> Self {
        Self {
            endpoint,
            sleeper,
            max_attempts: MAX_POLL_ATTEMPTS,
            phase: AuthPhase::Requesting,
        }
    }

    pub fn phase(&self) -> AuthPhase {
        self.phase
    }

    /// Request a device code from the endpoint.
    pub async fn request(&mut self) -> Result<DeviceAuthSession> {
        match self.endpoint.request_device_code().await {
            Ok(session) => {
                self.phase = AuthPhase::Polling;
                Ok(session)
            }
            Err(e) => {
                self.phase = AuthPhase::Failed;
                Err(e)
            }
        }
    }

    /// Poll the token endpoint until success, failure, or attempt exhaustion.
    ///
    /// Every iteration performs one network call and then one sleep, in that
    /// order, so the loop never exceeds `max_attempts` calls.
    pub async fn poll(&mut self, session: &DeviceAuthSession) -> Result<String> {
        if self.phase != AuthPhase::Polling {
            return Err(anyhow!("poll called before a device code was requested"));
        }

        let interval = Duration::from_secs(session.interval);
        for attempt in 1..=self.max_attempts {
            let token = match self.endpoint.poll_token(&session.device_code).await {
                Ok(token) => token,
                Err(e) => {
                    self.phase = AuthPhase::Failed;
                    return Err(e);
                }
            };

            if !token.is_empty() {
                info!("Access token received after {} poll(s)", attempt);
                self.phase = AuthPhase::Succeeded;
                return Ok(token);
            }

            self.sleeper.sleep(interval).await;
        }

        self.phase = AuthPhase::TimedOut;
        Err(anyhow!("timed out waiting for access token"))
    }
}

/// Open a URL in the user's browser. Non-fatal on failure; callers print the
/// URL as a fallback.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    let opener = "open";
    #[cfg(not(target_os = "macos"))]
    let opener = "xdg-open";

    let status = std::process::Command::new(opener).arg(url).status()?;
    if !status.success() {
        return Err(anyhow!("browser opener exited with {}", status));
    }
    Ok(())
}

/// Run the full interactive device login and return the access token.
pub async fn login(http: Arc<dyn HttpClient>) -> Result<String> {
    let mut flow = DeviceAuthFlow::new(GitHubAuthEndpoint::new(http), TokioSleeper);
    let session = flow.request().await?;

    if let Err(e) = output::copy_to_clipboard(&session.user_code) {
        warn!("Could not copy user code to clipboard: {}", e);
    }
    println!(
        "Enter the following code to log in (already copied to your clipboard): {}",
        session.user_code
    );

    let verification_url = format!("{}?code={}", session.verification_uri, session.user_code);
    if open_browser(&verification_url).is_err() {
        println!(
            "Could not open the browser automatically. Please navigate to:\n\t{}",
            session.verification_uri
        );
    }

    println!("Waiting for authorization...");
    flow.poll(&session).await
}
