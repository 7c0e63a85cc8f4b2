//! Digest mail sink.
//!
//! Renders the whole batch into one HTML digest and posts it to a
//! SendGrid-compatible v3 mail-send endpoint.

use askama::Template;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::models::{NotifyConfig, Record};
use crate::sinks::DigestNotifier;
use crate::sinks::templates::DigestEmail;

const FROM_EMAIL_ENV: &str = "FROM_EMAIL";
const TO_EMAIL_ENV: &str = "TO_EMAIL";

/// Sends digests through the mail-send API.
#[cfg_attr(test, derive(Debug))]
pub struct MailNotifier {
    client: Client,
    endpoint: String,
    api_key: String,
    from: String,
    to: String,
    subject: String,
}

impl MailNotifier {
    /// Build a notifier from config, reading the API key (and any missing
    /// addresses) from the environment.
    pub fn from_config(client: Client, config: &NotifyConfig) -> Result<Self> {
        let api_key = env_var(&config.api_key_env)?;
        let from = match &config.from_email {
            Some(address) => address.clone(),
            None => env_var(FROM_EMAIL_ENV)?,
        };
        let to = match &config.to_email {
            Some(address) => address.clone(),
            None => env_var(TO_EMAIL_ENV)?,
        };

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            from,
            to,
            subject: config.subject.clone(),
        })
    }

    /// Render the digest body.
    pub fn render(&self, records: &[Record]) -> Result<String> {
        Ok(DigestEmail {
            subject: &self.subject,
            records,
        }
        .render()?)
    }

    /// Request body for the mail-send API.
    fn payload(&self, html: String) -> Value {
        json!({
            "personalizations": [{ "to": [{ "email": self.to }] }],
            "from": { "email": self.from },
            "subject": self.subject,
            "content": [{ "type": "text/html", "value": html }],
        })
    }
}

#[async_trait]
impl DigestNotifier for MailNotifier {
    async fn notify(&self, records: &[Record]) -> Result<()> {
        let html = self.render(records)?;
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.payload(html))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::ACCEPTED {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::transport(
                &self.endpoint,
                format!("mail API answered {status}: {body}"),
            ));
        }

        log::info!("Digest with {} records sent to {}", records.len(), self.to);
        Ok(())
    }
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::config(format!("environment variable {name} is not set")))
}
