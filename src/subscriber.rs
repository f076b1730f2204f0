//! Event subscribers that act on published events.

use anyhow::Result;

pub mod whatsapp_subscriber;

#[async_trait::async_trait]
pub trait Subscriber<E> {
    async fn callback(&self, event: E) -> Result<()>;
}
