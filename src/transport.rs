//! The injected request boundary.
//!
//! A dispatch is one POST and one response body; there are no retries,
//! timeouts, or cancellation here. Backoff, if wanted, belongs to the
//! `Transport` implementation an integrator supplies.

use async_trait::async_trait;

use crate::error::KamarError;

/// Sends one form-encoded POST and returns the raw response body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        url: &str,
        form: &[(String, String)],
        user_agent: &str,
    ) -> Result<String, KamarError>;
}

/// Default transport over reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        HttpTransport {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        url: &str,
        form: &[(String, String)],
        user_agent: &str,
    ) -> Result<String, KamarError> {
        let resp = self
            .client
            .post(url)
            .header(reqwest::header::USER_AGENT, user_agent)
            .form(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(KamarError::Transport(format!("HTTP {status} from {url}")));
        }

        Ok(resp.text().await?)
    }
}
