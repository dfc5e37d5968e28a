//! Resend API key resolution.
//!
//! Keys are looked up in Bitwarden Secrets Manager when the machine-account
//! token `BWS_ACCESS_TOKEN` is set and a secret id is configured for the key.
//! Otherwise, or when Bitwarden fails, the plain environment variable wins.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

pub struct SecretsClient {
    access_token: Option<String>,
    api_url: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct BwsSecretResponse {
    value: String,
}

impl SecretsClient {
    /// Reads `BWS_ACCESS_TOKEN` and `BWS_API_URL` from the environment.
    pub fn from_env() -> Self {
        let access_token = std::env::var("BWS_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        let api_url = std::env::var("BWS_API_URL")
            .unwrap_or_else(|_| "https://api.bitwarden.com".to_string());

        Self {
            access_token,
            api_url,
            http: reqwest::Client::new(),
        }
    }

    /// Resolve a secret stored under `env_var`.
    ///
    /// The Bitwarden secret id is taken from `BWS_<env_var>_ID`.
    pub async fn resolve(&self, env_var: &str) -> Result<String> {
        let secret_id = std::env::var(format!("BWS_{env_var}_ID")).ok();

        if let (Some(token), Some(secret_id)) = (&self.access_token, &secret_id) {
            match self.fetch_from_bitwarden(token, secret_id).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!(
                        secret_id = %secret_id,
                        env_var = %env_var,
                        error = %e,
                        "Bitwarden lookup failed, falling back to env var"
                    );
                }
            }
        }

        std::env::var(env_var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .with_context(|| format!("env var '{env_var}' is not set"))
    }

    async fn fetch_from_bitwarden(&self, token: &str, secret_id: &str) -> Result<String> {
        let url = format!("{}/secrets/{}", self.api_url, secret_id);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .context("HTTP request to Bitwarden Secrets Manager failed")?;

        if !resp.status().is_success() {
            return Err(anyhow!("Bitwarden API returned status {}", resp.status()));
        }

        let body: BwsSecretResponse = resp
            .json()
            .await
            .context("Failed to parse Bitwarden response")?;
        Ok(body.value)
    }
}
