//! Email delivery via the Resend API.

use serde::Serialize;
use tracing::info;

use crate::errors::{PodsiftError, Result};
use crate::types::DigestConfig;

const RESEND_URL: &str = "https://api.resend.com/emails";
const FROM_ADDRESS: &str = "podsift <digest@podsift.dev>";

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

/// Send a rendered digest to the configured recipient.
///
/// # Errors
/// Returns [`PodsiftError::Config`] when Resend credentials or the recipient
/// address are missing, and [`PodsiftError::Output`] on a rejected request.
pub async fn send_digest(subject: &str, markdown: &str, config: &DigestConfig) -> Result<()> {
    let api_key = config
        .resend_api_key
        .as_deref()
        .ok_or_else(|| PodsiftError::Config("RESEND_API_KEY is not set".to_string()))?;
    let recipient = config
        .digest_email
        .as_deref()
        .ok_or_else(|| PodsiftError::Config("DIGEST_EMAIL is not set".to_string()))?;

    let request = EmailRequest {
        from: FROM_ADDRESS,
        to: [recipient],
        subject,
        text: markdown,
    };

    let response = reqwest::Client::new()
        .post(RESEND_URL)
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(PodsiftError::Output(format!(
            "Resend rejected the digest: {status} {body}"
        )));
    }

    info!(to = recipient, "digest email sent");
    Ok(())
}
