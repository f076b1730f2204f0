//! Outbound text delivery to users.

use async_trait::async_trait;

use crate::messenger::error::MessengerError;

pub mod error;
pub mod whatsapp_messenger;

/// Sends a plain text message to a user, identified by phone number.
///
/// Delivery is best effort: callers log failures and move on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, to: &str, body: &str) -> Result<(), MessengerError>;
}
