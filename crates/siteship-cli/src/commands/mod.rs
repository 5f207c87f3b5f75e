//! CLI command implementations.

pub mod deploy;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

#[derive(Deserialize)]
struct PublishResponse {
    subdomain: String,
    full_domain: String,
    message: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    subdomain: String,
    status: String,
    error: Option<String>,
    updated_at: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Render an error response as "{status}: {message}", preferring the
/// `error` field of the body over raw text.
pub(crate) async fn api_error(response: reqwest::Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    format!("{}: {}", status, message)
}

pub async fn publish(api_url: &str, subscription_id: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/api/v1/publish", api_url))
        .json(&serde_json::json!({ "subscription_id": subscription_id }))
        .send()
        .await
        .context("publish request failed")?;

    if !response.status().is_success() {
        bail!("publish rejected ({})", api_error(response).await);
    }

    let receipt: PublishResponse = response
        .json()
        .await
        .context("unexpected publish response")?;

    println!("Publish scheduled for subscription {}", subscription_id);
    println!("  subdomain: {}", receipt.subdomain);
    println!("  site:      https://{}", receipt.full_domain);
    println!("{}", receipt.message);
    Ok(())
}

pub async fn status(api_url: &str, subscription_id: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!(
            "{}/api/v1/publish/{}/status",
            api_url, subscription_id
        ))
        .send()
        .await
        .context("status request failed")?;

    if !response.status().is_success() {
        bail!("status lookup failed ({})", api_error(response).await);
    }

    let status: StatusResponse = response
        .json()
        .await
        .context("unexpected status response")?;

    println!("Subscription {}", subscription_id);
    println!("  subdomain: {}", status.subdomain);
    println!("  status:    {}", status.status);
    if let Some(error) = status.error {
        println!("  error:     {}", error);
    }
    println!("  updated:   {}", status.updated_at);
    Ok(())
}
