use anyhow::Context;
use async_trait::async_trait;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha1::Sha1;

use super::Notifier;
use crate::models::Booking;

pub const SIGNATURE_HEADER: &str = "X-Cottagebook-Signature";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmationPayload<'a> {
    event: &'static str,
    to: &'a str,
    booking: &'a Booking,
}

/// Posts confirmation notices to an HTTP endpoint that handles delivery.
pub struct WebhookNotifier {
    url: String,
    secret: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: String, secret: String) -> Self {
        Self {
            url,
            secret,
            client: reqwest::Client::new(),
        }
    }
}

/// Base64 HMAC-SHA1 of the raw body, keyed with the shared secret.
pub fn sign_payload(secret: &str, body: &[u8]) -> anyhow::Result<String> {
    let mut mac = Hmac::<Sha1>::new_from_slice(secret.as_bytes())
        .map_err(|e| anyhow::anyhow!("invalid webhook secret: {e}"))?;
    mac.update(body);
    let result = mac.finalize().into_bytes();
    Ok(base64::engine::general_purpose::STANDARD.encode(result))
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn booking_confirmed(&self, booking: &Booking) -> anyhow::Result<()> {
        let Some(to) = booking.contact_email.as_deref() else {
            tracing::debug!(booking_id = %booking.id, "no contact email, skipping confirmation notice");
            return Ok(());
        };

        let body = serde_json::to_vec(&ConfirmationPayload {
            event: "booking.confirmed",
            to,
            booking,
        })
        .context("failed to encode confirmation payload")?;

        let mut request = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if !self.secret.is_empty() {
            request = request.header(SIGNATURE_HEADER, sign_payload(&self.secret, &body)?);
        }

        request
            .body(body)
            .send()
            .await
            .context("failed to send confirmation webhook")?
            .error_for_status()
            .context("confirmation webhook returned error")?;

        tracing::info!(booking_id = %booking.id, to = %to, "confirmation notice sent");
        Ok(())
    }
}
