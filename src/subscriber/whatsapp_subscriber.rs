use std::sync::Arc;

use anyhow::Result;
use log::error;
use log::info;

use crate::event::MatchUpdateEvent;
use crate::messenger::Messenger;
use crate::subscriber::Subscriber;

/// Delivers match update pushes over WhatsApp.
pub struct WhatsAppSubscriber {
    messenger: Arc<dyn Messenger>,
}

impl WhatsAppSubscriber {
    pub fn new(messenger: Arc<dyn Messenger>) -> Self {
        info!("Initializing WhatsAppSubscriber.");
        Self { messenger }
    }
}

#[async_trait::async_trait]
impl Subscriber<MatchUpdateEvent> for WhatsAppSubscriber {
    async fn callback(&self, event: MatchUpdateEvent) -> Result<()> {
        // Fire and forget: a failed push is not retried and must not fail the bus.
        match self.messenger.send_text(&event.phone, &event.message).await {
            Ok(()) => info!(
                "Sent {} update for event {} to {}.",
                event.kind, event.event.id, event.phone
            ),
            Err(e) => error!(
                "Failed to send {} update for event {} to {}: {e}",
                event.kind, event.event.id, event.phone
            ),
        }
        Ok(())
    }
}
