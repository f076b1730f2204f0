//! WhatsApp Cloud API text sender.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::Quota;
use governor::RateLimiter;
use governor::clock::QuantaClock;
use governor::state::InMemoryState;
use governor::state::direct::NotKeyed;
use log::debug;
use log::info;
use serde::Serialize;
use wreq::Client;
use wreq::header::AUTHORIZATION;
use wreq::header::CONTENT_TYPE;

use crate::messenger::Messenger;
use crate::messenger::error::MessengerError;

// Cloud API business-initiated throughput is 80 msg/s; a chat bot needs far less.
const MESSAGES_PER_SECOND: NonZeroU32 = NonZeroU32::new(20).unwrap();

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    text: TextBody<'a>,
}

impl<'a> TextMessage<'a> {
    fn new(to: &'a str, body: &'a str) -> Self {
        Self {
            messaging_product: "whatsapp",
            to,
            kind: "text",
            text: TextBody { body },
        }
    }
}

pub struct WhatsAppMessenger {
    messages_url: String,
    access_token: String,
    timeout: Duration,
    client: Client,
    limiter: RateLimiter<NotKeyed, InMemoryState, QuantaClock>,
}

impl WhatsAppMessenger {
    pub fn new(
        graph_api_url: &str,
        graph_version: &str,
        phone_id: &str,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MessengerError> {
        let messages_url = format!(
            "{}/{graph_version}/{phone_id}/messages",
            graph_api_url.trim_end_matches('/')
        );
        info!("Initializing WhatsAppMessenger for {messages_url}.");

        Ok(Self {
            messages_url,
            access_token: access_token.into(),
            timeout,
            client: Client::builder().build()?,
            limiter: RateLimiter::direct(Quota::per_second(MESSAGES_PER_SECOND)),
        })
    }
}

#[async_trait]
impl Messenger for WhatsAppMessenger {
    async fn send_text(&self, to: &str, body: &str) -> Result<(), MessengerError> {
        let payload = serde_json::to_vec(&TextMessage::new(to, body))?;

        self.limiter.until_ready().await;
        let request = self
            .client
            .post(&self.messages_url)
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token))
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .build()?;

        debug!("Sending message to {to}.");
        let response = match tokio::time::timeout(self.timeout, self.client.execute(request)).await
        {
            Ok(resp) => resp?,
            Err(_) => {
                return Err(MessengerError::Timeout {
                    secs: self.timeout.as_secs(),
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MessengerError::Rejected {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_message_payload() {
        let json = serde_json::to_value(TextMessage::new("15551234567", "hi")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "messaging_product": "whatsapp",
                "to": "15551234567",
                "type": "text",
                "text": {"body": "hi"}
            })
        );
    }
}
