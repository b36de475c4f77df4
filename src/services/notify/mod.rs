pub mod webhook;

use async_trait::async_trait;

use crate::models::Booking;

/// Delivers guest-facing notices for lifecycle changes.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn booking_confirmed(&self, booking: &Booking) -> anyhow::Result<()>;
}

/// Used when no webhook is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn booking_confirmed(&self, booking: &Booking) -> anyhow::Result<()> {
        tracing::info!(
            booking_id = %booking.id,
            email = booking.contact_email.as_deref().unwrap_or("-"),
            "booking confirmed (no notifier configured)"
        );
        Ok(())
    }
}
